//! Role capability checks
//!
//! One predicate instead of role-string comparisons sprinkled through the
//! handlers. Staff are the roles allowed to moderate: admin, coordinator and
//! teacher. Admins additionally own destructive global operations.

use crate::orm::users::Role;

/// Roles with moderation capability.
pub const STAFF_ROLES: [Role; 3] = [Role::Admin, Role::Coordinator, Role::Teacher];

/// True if the identity's role is in the allowed set.
pub fn has_any_role(role: &Role, allowed: &[Role]) -> bool {
    allowed.contains(role)
}

pub fn is_staff(role: &Role) -> bool {
    has_any_role(role, &STAFF_ROLES)
}

pub fn is_admin(role: &Role) -> bool {
    has_any_role(role, &[Role::Admin])
}

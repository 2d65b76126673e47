pub mod announcements;
pub mod comments;
pub mod company_standardizations;
pub mod experience_rounds;
pub mod experiences;
pub mod notifications;
pub mod reports;
pub mod round_questions;
pub mod sessions;
pub mod users;

//! Company name standardization
//!
//! Moderators keep a catalog of canonical company names with free-text
//! variation lists, and can rewrite an experience's company to a canonical
//! name. The catalog is reference data only; nothing matches against it
//! automatically.

use crate::error::OpError;
use crate::orm::{company_standardizations, experiences};
use chrono::Utc;
use sea_orm::{entity::*, query::*, DatabaseConnection};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

/// Company name with how many experiences carry it verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompanyCount {
    pub name: String,
    pub count: u32,
}

/// The catalog, alphabetical by canonical name.
pub async fn list_standards(
    db: &DatabaseConnection,
) -> Result<Vec<company_standardizations::Model>, OpError> {
    Ok(company_standardizations::Entity::find()
        .order_by_asc(company_standardizations::Column::StandardName)
        .all(db)
        .await?)
}

pub async fn create_standard(
    db: &DatabaseConnection,
    standard_name: &str,
    variations: Vec<String>,
    created_by: i32,
) -> Result<company_standardizations::Model, OpError> {
    let standard_name = standard_name.trim();
    if standard_name.is_empty() {
        return Err(OpError::validation("Standard name is required"));
    }

    let existing = company_standardizations::Entity::find()
        .filter(company_standardizations::Column::StandardName.eq(standard_name))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(OpError::conflict("Company standardization already exists"));
    }

    let now = Utc::now().naive_utc();
    let variations: Vec<String> = variations.into_iter().map(|v| v.trim().to_owned()).collect();
    let standard = company_standardizations::ActiveModel {
        standard_name: Set(standard_name.to_owned()),
        variations: Set(json!(variations)),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::info!(
        "Company standard {} created: {}",
        standard.id,
        standard.standard_name
    );
    Ok(standard)
}

/// Partial update. A provided variation list replaces the stored one
/// wholesale; there is no per-item merge.
pub async fn update_standard(
    db: &DatabaseConnection,
    standard_id: i32,
    standard_name: Option<String>,
    variations: Option<Vec<String>>,
    updated_by: i32,
) -> Result<company_standardizations::Model, OpError> {
    let standard = company_standardizations::Entity::find_by_id(standard_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Company standardization not found"))?;

    let mut active: company_standardizations::ActiveModel = standard.clone().into();
    if let Some(name) = standard_name {
        let name = name.trim().to_owned();
        if name.is_empty() {
            return Err(OpError::validation("Standard name is required"));
        }
        if name != standard.standard_name {
            let taken = company_standardizations::Entity::find()
                .filter(company_standardizations::Column::StandardName.eq(name.as_str()))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(OpError::conflict("Company standardization already exists"));
            }
        }
        active.standard_name = Set(name);
    }
    if let Some(variations) = variations {
        let variations: Vec<String> =
            variations.into_iter().map(|v| v.trim().to_owned()).collect();
        active.variations = Set(json!(variations));
    }
    active.updated_by = Set(Some(updated_by));
    active.updated_at = Set(Utc::now().naive_utc());

    Ok(active.update(db).await?)
}

pub async fn delete_standard(db: &DatabaseConnection, standard_id: i32) -> Result<(), OpError> {
    let result = company_standardizations::Entity::delete_by_id(standard_id)
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(OpError::not_found("Company standardization not found"));
    }
    Ok(())
}

/// Rewrite one experience's company to a canonical name. The name is applied
/// as given; it does not have to exist in the catalog.
pub async fn standardize_experience(
    db: &DatabaseConnection,
    experience_id: i32,
    standard_name: &str,
) -> Result<experiences::Model, OpError> {
    let experience = experiences::Entity::find_by_id(experience_id)
        .one(db)
        .await?
        .ok_or_else(|| OpError::not_found("Experience not found"))?;

    let previous = experience.company.clone();
    let mut active: experiences::ActiveModel = experience.into();
    active.company = Set(standard_name.to_owned());
    active.updated_at = Set(Utc::now().naive_utc());
    let updated = active.update(db).await?;

    log::info!(
        "Experience {} company standardized: {:?} -> {:?}",
        updated.id,
        previous,
        updated.company
    );
    Ok(updated)
}

/// Every distinct company name in the corpus with its usage count, most used
/// first. Ties order by name so repeated calls paginate identically.
pub async fn list_company_counts(db: &DatabaseConnection) -> Result<Vec<CompanyCount>, OpError> {
    let names: Vec<String> = experiences::Entity::find()
        .select_only()
        .column(experiences::Column::Company)
        .into_tuple()
        .all(db)
        .await?;

    let mut counts: HashMap<String, u32> = HashMap::new();
    for name in names {
        *counts.entry(name).or_insert(0) += 1;
    }

    let mut companies: Vec<CompanyCount> = counts
        .into_iter()
        .map(|(name, count)| CompanyCount { name, count })
        .collect();
    companies.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    Ok(companies)
}

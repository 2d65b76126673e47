//! Read-side analytics over the experience corpus
//!
//! Every request recomputes from a full scan; there is no materialized
//! state to invalidate. Package figures are free text and parsed
//! best-effort, so a malformed entry silently drops out of the numeric
//! aggregates instead of failing the request.

use crate::error::OpError;
use crate::experiences::ExperienceData;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

static CURRENCY_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[$₹]|LPA|USD|INR").unwrap());
static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)").unwrap());

/// Difficulty bucket derived from a round's name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

/// Round-name keywords decide the bucket; easy keywords win over hard ones
/// and anything unrecognized counts as Medium (which also covers "medium"
/// and "technical").
pub fn infer_level(round_name: &str) -> Level {
    let name = round_name.to_lowercase();
    if name.contains("easy") || name.contains("basic") || name.contains("screening") {
        Level::Easy
    } else if name.contains("hard")
        || name.contains("system design")
        || name.contains("advanced")
        || name.contains("final")
    {
        Level::Hard
    } else {
        Level::Medium
    }
}

/// Best-effort numeric value from a free-text package ("₹12 LPA" -> 12.0).
/// Currency markers are stripped and the leading number of whatever remains
/// is taken; entries without one are discarded.
pub fn parse_package(raw: &str) -> Option<f64> {
    let stripped = CURRENCY_MARKERS.replace_all(raw, "");
    let trimmed = stripped.trim();
    LEADING_NUMBER
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// One interview question tagged with where it was asked.
#[derive(Clone, Debug, Serialize)]
pub struct TaggedQuestion {
    pub question: String,
    pub company: String,
    pub role: String,
    pub round_number: i32,
    pub round_name: String,
    pub level: Level,
    pub year: i32,
}

/// Flatten every round of every experience into its questions.
pub fn flatten_questions(corpus: &[ExperienceData]) -> Vec<TaggedQuestion> {
    let mut out = Vec::new();
    for data in corpus {
        for round in &data.rounds {
            let level = infer_level(&round.round_name);
            for question in &round.questions {
                out.push(TaggedQuestion {
                    question: question.clone(),
                    company: data.experience.company.clone(),
                    role: data.experience.role.clone(),
                    round_number: round.round_number,
                    round_name: round.round_name.clone(),
                    level,
                    year: data.experience.year,
                });
            }
        }
    }
    out
}

#[derive(Clone, Debug, Serialize)]
pub struct Overview {
    pub total_experiences: usize,
    pub unique_companies: usize,
    pub unique_roles: usize,
    /// Mean of parseable packages rounded to 2 decimals, 0 when none parse.
    pub avg_package: f64,
    pub max_package: f64,
    pub min_package: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuestionFrequency {
    pub question: String,
    pub count: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PackagePoint {
    pub value: f64,
    pub company: String,
    pub role: String,
    pub year: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Insights {
    pub overview: Overview,
    pub frequent_questions: Vec<QuestionFrequency>,
    pub company_distribution: BTreeMap<String, u32>,
    pub year_distribution: BTreeMap<i32, u32>,
    pub role_distribution: BTreeMap<String, u32>,
    pub package_trends: Vec<PackagePoint>,
}

/// Aggregate the whole corpus. Question counting is case-insensitive and
/// ties keep first-encountered order.
pub fn compute(corpus: &[ExperienceData]) -> Insights {
    let questions = flatten_questions(corpus);

    let mut companies: BTreeMap<String, u32> = BTreeMap::new();
    let mut years: BTreeMap<i32, u32> = BTreeMap::new();
    let mut roles: BTreeMap<String, u32> = BTreeMap::new();
    let mut packages: Vec<PackagePoint> = Vec::new();

    for data in corpus {
        *companies
            .entry(data.experience.company.clone())
            .or_insert(0) += 1;
        *years.entry(data.experience.year).or_insert(0) += 1;
        *roles.entry(data.experience.role.clone()).or_insert(0) += 1;

        if let Some(raw) = data.experience.package.as_deref() {
            if let Some(value) = parse_package(raw) {
                packages.push(PackagePoint {
                    value,
                    company: data.experience.company.clone(),
                    role: data.experience.role.clone(),
                    year: data.experience.year,
                });
            }
        }
    }

    let avg_package = if packages.is_empty() {
        0.0
    } else {
        let sum: f64 = packages.iter().map(|p| p.value).sum();
        (sum / packages.len() as f64 * 100.0).round() / 100.0
    };
    let (max_package, min_package) = if packages.is_empty() {
        (0.0, 0.0)
    } else {
        (
            packages
                .iter()
                .map(|p| p.value)
                .fold(f64::NEG_INFINITY, f64::max),
            packages
                .iter()
                .map(|p| p.value)
                .fold(f64::INFINITY, f64::min),
        )
    };

    // Count under the lowercased text so casing variants merge; the stable
    // sort keeps first-encountered order for equal counts.
    let mut frequent_questions: Vec<QuestionFrequency> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for tagged in &questions {
        let key = tagged.question.to_lowercase();
        match index.get(&key) {
            Some(&i) => frequent_questions[i].count += 1,
            None => {
                index.insert(key.clone(), frequent_questions.len());
                frequent_questions.push(QuestionFrequency {
                    question: key,
                    count: 1,
                });
            }
        }
    }
    frequent_questions.sort_by(|a, b| b.count.cmp(&a.count));
    frequent_questions.truncate(10);

    let mut package_trends = packages.clone();
    package_trends.sort_by(|a, b| b.value.total_cmp(&a.value));
    package_trends.truncate(10);

    Insights {
        overview: Overview {
            total_experiences: corpus.len(),
            unique_companies: companies.len(),
            unique_roles: roles.len(),
            avg_package,
            max_package,
            min_package,
        },
        frequent_questions,
        company_distribution: companies,
        year_distribution: years,
        role_distribution: roles,
        package_trends,
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct QuestionSearch {
    pub questions: Vec<TaggedQuestion>,
    pub total: usize,
    /// Distinct roles seen at the matched companies, only populated when a
    /// company filter was given. Computed before the role filter so the
    /// dropdown does not collapse to the current selection.
    pub available_roles: Vec<String>,
}

/// Questions filtered by case-insensitive company/role substrings.
pub fn search_questions(
    corpus: &[ExperienceData],
    company: Option<&str>,
    role: Option<&str>,
) -> QuestionSearch {
    let company = company.map(str::to_lowercase);
    let role = role.map(str::to_lowercase);

    let company_matched: Vec<&ExperienceData> = corpus
        .iter()
        .filter(|data| match &company {
            Some(term) => data.experience.company.to_lowercase().contains(term),
            None => true,
        })
        .collect();

    let mut available_roles: Vec<String> = Vec::new();
    if company.is_some() {
        available_roles = company_matched
            .iter()
            .map(|data| data.experience.role.clone())
            .filter(|r| !r.is_empty())
            .collect();
        available_roles.sort();
        available_roles.dedup();
    }

    let mut questions = Vec::new();
    for data in &company_matched {
        if let Some(term) = &role {
            if !data.experience.role.to_lowercase().contains(term) {
                continue;
            }
        }
        for round in &data.rounds {
            let level = infer_level(&round.round_name);
            for question in &round.questions {
                questions.push(TaggedQuestion {
                    question: question.clone(),
                    company: data.experience.company.clone(),
                    role: data.experience.role.clone(),
                    round_number: round.round_number,
                    round_name: round.round_name.clone(),
                    level,
                    year: data.experience.year,
                });
            }
        }
    }

    let total = questions.len();
    QuestionSearch {
        questions,
        total,
        available_roles,
    }
}

/// Recompute the snapshot from the database.
pub async fn build(db: &DatabaseConnection) -> Result<Insights, OpError> {
    let corpus = crate::experiences::load_all(db).await?;
    Ok(compute(&corpus))
}

/// Question bank search against the database.
pub async fn questions(
    db: &DatabaseConnection,
    company: Option<&str>,
    role: Option<&str>,
) -> Result<QuestionSearch, OpError> {
    let corpus = crate::experiences::load_all(db).await?;
    Ok(search_questions(&corpus, company, role))
}

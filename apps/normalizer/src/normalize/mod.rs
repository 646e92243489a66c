//! Field normalization: raw job-board payloads in, canonical typed records
//! with content-derived ids out.
//!
//! Two entry points:
//! - [`normalize_vacancy`] runs on the parser side, turning a raw HH.ru
//!   record into a full 4-part [`VacancyEntry`].
//! - [`prepare_for_ingest`] runs in the consumer, rewriting the title
//!   through the synonym map and deriving the experience range on an entry
//!   that already has the 4-part shape.

pub mod benefits;
pub mod company;
pub mod experience;
pub mod salary;

use chrono::{DateTime, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::records::{CompanyRecord, VacancyEntry, VacancyRecord};
use crate::models::raw::RawVacancy;
use crate::titles::SynonymMap;

/// SHA-256 hex digest of normalized content. Every content-derived id in
/// the pipeline goes through this one function, so identity is a pure
/// function of field values — independent of any store state.
pub fn content_id(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Why a record was excluded from persistence. A skip is a deliberate
/// analytics decision, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyDescription,
    NoSalaryBounds,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::EmptyDescription => "empty description",
            SkipReason::NoSalaryBounds => "no salary bounds",
        }
    }
}

/// Result of normalizing one raw record.
#[derive(Debug)]
pub enum Outcome {
    Entry(Box<VacancyEntry>),
    Skipped(SkipReason),
}

/// Normalizes one raw HH.ru vacancy into the 4-part entry persisted by the
/// reconciler. Returns `Skipped` when the record cannot feed the salary
/// analytics downstream: no description text, or no salary bound at all.
pub fn normalize_vacancy(raw: &RawVacancy) -> Outcome {
    let description = raw.description.trim().to_string();
    if description.is_empty() {
        return Outcome::Skipped(SkipReason::EmptyDescription);
    }

    let compensation = salary::normalize(raw.salary.as_ref());
    if compensation.salary_min.is_none() && compensation.salary_max.is_none() {
        return Outcome::Skipped(SkipReason::NoSalaryBounds);
    }

    let benefits = benefits::extract(&description);

    let company_name = raw
        .employer
        .as_ref()
        .and_then(|e| e.name.clone())
        .unwrap_or_else(|| "Не указан".to_string());
    let company_id = company::company_id(&company_name);

    let schedule = named_or_default(raw.schedule.as_ref());
    let work_format = detect_work_format(&schedule, &description);

    let experience_name = raw
        .experience
        .as_ref()
        .and_then(|e| e.name.as_deref());
    let experience_required = experience::experience_text(&description, experience_name);

    let entry = VacancyEntry {
        vacancies: VacancyRecord {
            external_id: raw.id.clone(),
            title: raw.name.clone(),
            description,
            requirements: raw.snippet.requirement.clone().unwrap_or_default(),
            work_format: work_format.to_string(),
            employment_type: named_or_default(raw.employment.as_ref()),
            schedule,
            experience_required,
            source_url: raw.alternate_url.clone(),
            source_name: "hh.ru".to_string(),
            publication_date: raw
                .published_at
                .as_deref()
                .and_then(|s| parse_publication_date(s, &raw.id)),
            is_relevant: true,
            company_id: company_id.clone(),
            compensation_id: compensation.id.clone(),
            benefits_id: benefits.id.clone(),
            created_at: Some(Utc::now().naive_utc()),
            similar_titles: Vec::new(),
            exclude_keywords: Vec::new(),
            experience_years: None,
        },
        companies: CompanyRecord {
            id: company_id,
            name_variations: vec![company::normalize_name(&company_name)],
            name: company_name,
            industry: "Не указан".to_string(),
            size: "Не указан".to_string(),
            is_foreign: false,
            location_city: named_or_default(raw.area.as_ref()),
            location_radius_km: 50,
        },
        compensations: compensation,
        benefits,
    };

    Outcome::Entry(Box::new(entry))
}

/// Ingest-time preparation of an already-parsed entry: canonical title,
/// derived experience range, and the same skip rules the parser applies.
/// Returns the skip reason when the entry must not be persisted.
pub fn prepare_for_ingest(entry: &mut VacancyEntry, titles: &SynonymMap) -> Option<SkipReason> {
    if entry.vacancies.description.trim().is_empty() {
        return Some(SkipReason::EmptyDescription);
    }
    let comp = &entry.compensations;
    if comp.salary_min.is_none() && comp.salary_max.is_none() {
        return Some(SkipReason::NoSalaryBounds);
    }

    let resolved = titles.resolve(&entry.vacancies.title).to_string();
    entry.vacancies.title = resolved;
    entry.vacancies.experience_years = Some(
        experience::normalize_experience(&entry.vacancies.experience_required).to_vec(),
    );
    None
}

/// Schedule text beats description text; remote beats hybrid beats office.
pub fn detect_work_format(schedule: &str, description: &str) -> &'static str {
    let schedule = schedule.to_lowercase();
    let description = description.to_lowercase();
    if schedule.contains("удален")
        || schedule.contains("remote")
        || description.contains("удаленная работа")
    {
        "remote"
    } else if schedule.contains("гибрид") || description.contains("гибридный") {
        "hybrid"
    } else {
        "office"
    }
}

fn named_or_default(named: Option<&crate::models::raw::RawNamed>) -> String {
    named
        .and_then(|n| n.name.clone())
        .unwrap_or_else(|| "Не указан".to_string())
}

/// HH.ru publishes timestamps as `%Y-%m-%dT%H:%M:%S%z` (offset without a
/// colon, so not strictly RFC 3339). A bad date is logged and dropped
/// rather than failing the record.
fn parse_publication_date(raw: &str, external_id: &str) -> Option<NaiveDate> {
    match DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        Ok(dt) => Some(dt.date_naive()),
        Err(e) => {
            warn!("Bad publication date '{raw}' for vacancy {external_id}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::raw::{RawNamed, RawSalary, RawSnippet};

    fn raw_vacancy(description: &str, salary: Option<RawSalary>) -> RawVacancy {
        RawVacancy {
            id: "777".to_string(),
            name: "Водитель-курьер".to_string(),
            description: description.to_string(),
            salary,
            employer: Some(RawNamed {
                name: Some("ООО Ромашка".to_string()),
            }),
            schedule: Some(RawNamed {
                name: Some("Полный день".to_string()),
            }),
            employment: Some(RawNamed {
                name: Some("Полная занятость".to_string()),
            }),
            experience: Some(RawNamed {
                name: Some("От 1 года до 3 лет".to_string()),
            }),
            area: Some(RawNamed {
                name: Some("Москва".to_string()),
            }),
            snippet: RawSnippet {
                requirement: Some("Права категории B".to_string()),
            },
            published_at: Some("2025-06-17T12:00:00+0300".to_string()),
            alternate_url: Some("https://hh.ru/vacancy/777".to_string()),
        }
    }

    fn some_salary() -> Option<RawSalary> {
        Some(RawSalary {
            from: Some(50000),
            to: Some(70000),
            currency: Some("RUR".to_string()),
            gross: false,
        })
    }

    #[test]
    fn test_normalize_produces_linked_entry() {
        let raw = raw_vacancy("Развозим заказы. ДМС с первого дня.", some_salary());
        let Outcome::Entry(entry) = normalize_vacancy(&raw) else {
            panic!("expected an entry");
        };
        assert_eq!(entry.vacancies.external_id, "777");
        assert_eq!(entry.vacancies.company_id, entry.companies.id);
        assert_eq!(
            entry.vacancies.compensation_id.as_deref(),
            entry.compensations.id.as_deref()
        );
        assert_eq!(entry.vacancies.benefits_id, entry.benefits.id);
        assert!(entry.benefits.health_insurance);
        assert_eq!(
            entry.vacancies.publication_date,
            chrono::NaiveDate::from_ymd_opt(2025, 6, 17)
        );
        assert_eq!(entry.vacancies.source_name, "hh.ru");
    }

    #[test]
    fn test_skip_on_empty_description() {
        let raw = raw_vacancy("   ", some_salary());
        let Outcome::Skipped(reason) = normalize_vacancy(&raw) else {
            panic!("expected a skip");
        };
        assert_eq!(reason, SkipReason::EmptyDescription);
    }

    #[test]
    fn test_skip_on_missing_salary_bounds() {
        let raw = raw_vacancy("Описание есть, зарплаты нет", None);
        let Outcome::Skipped(reason) = normalize_vacancy(&raw) else {
            panic!("expected a skip");
        };
        assert_eq!(reason, SkipReason::NoSalaryBounds);
    }

    #[test]
    fn test_work_format_priority() {
        assert_eq!(detect_work_format("Удаленная работа", ""), "remote");
        assert_eq!(detect_work_format("Remote", ""), "remote");
        // Remote wins even when the description also mentions hybrid.
        assert_eq!(
            detect_work_format("удаленка", "гибридный график"),
            "remote"
        );
        assert_eq!(detect_work_format("Полный день", "гибридный формат"), "hybrid");
        assert_eq!(detect_work_format("Полный день", "работа в офисе"), "office");
    }

    #[test]
    fn test_bad_publication_date_becomes_none() {
        let mut raw = raw_vacancy("Описание", some_salary());
        raw.published_at = Some("17.06.2025".to_string());
        let Outcome::Entry(entry) = normalize_vacancy(&raw) else {
            panic!("expected an entry");
        };
        assert!(entry.vacancies.publication_date.is_none());
    }

    #[test]
    fn test_content_id_is_stable_and_hex() {
        let a = content_id("рога и копыта");
        let b = content_id("рога и копыта");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_prepare_for_ingest_resolves_title_and_experience() {
        let raw = raw_vacancy("Описание", some_salary());
        let Outcome::Entry(mut entry) = normalize_vacancy(&raw) else {
            panic!("expected an entry");
        };
        let mut mappings = std::collections::HashMap::new();
        mappings.insert(
            "Courier".to_string(),
            vec!["Водитель-курьер".to_string(), "Курьер".to_string()],
        );
        let titles = SynonymMap::from_mappings(&mappings);

        let skip = prepare_for_ingest(&mut entry, &titles);
        assert!(skip.is_none());
        assert_eq!(entry.vacancies.title, "Courier");
        assert_eq!(entry.vacancies.experience_years, Some(vec![1, 3]));
    }

    #[test]
    fn test_prepare_for_ingest_skips_salaryless_entry() {
        let raw = raw_vacancy("Описание", some_salary());
        let Outcome::Entry(mut entry) = normalize_vacancy(&raw) else {
            panic!("expected an entry");
        };
        entry.compensations.salary_min = None;
        entry.compensations.salary_max = None;

        let skip = prepare_for_ingest(&mut entry, &SynonymMap::default());
        assert_eq!(skip, Some(SkipReason::NoSalaryBounds));
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One fully normalized vacancy as it travels through the queue: the four
/// related sub-records produced by the field normalizer, keyed the way the
/// relational tables are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyEntry {
    pub vacancies: VacancyRecord,
    pub companies: CompanyRecord,
    pub compensations: CompensationRecord,
    pub benefits: BenefitsRecord,
}

/// Inbound queue message body: a single entry or a batch of them.
/// Resolved once at the decode boundary — downstream code only ever sees
/// a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    Batch(Vec<VacancyEntry>),
    Single(Box<VacancyEntry>),
}

impl MessageBody {
    pub fn into_entries(self) -> Vec<VacancyEntry> {
        match self {
            MessageBody::Batch(entries) => entries,
            MessageBody::Single(entry) => vec![*entry],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyRecord {
    pub external_id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    pub work_format: String,
    pub employment_type: String,
    pub schedule: String,
    pub experience_required: String,
    pub source_url: Option<String>,
    pub source_name: String,
    pub publication_date: Option<NaiveDate>,
    pub is_relevant: bool,
    pub company_id: String,
    pub compensation_id: Option<String>,
    pub benefits_id: String,
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub similar_titles: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    /// Derived at ingest time from `experience_required`; never present in
    /// the inbound payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_years: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_variations: Vec<String>,
    pub industry: String,
    pub size: String,
    pub is_foreign: bool,
    pub location_city: String,
    pub location_radius_km: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationRecord {
    /// Content hash of min:max:currency, or the fixed no-salary sentinel.
    pub id: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_median: Option<i64>,
    pub salary_avg: Option<i64>,
    pub salary_net: Option<bool>,
    pub currency: Option<String>,
    #[serde(default)]
    pub bonuses: String,
    #[serde(default)]
    pub payment_frequency: String,
    #[serde(default)]
    pub payment_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitsRecord {
    pub id: String,
    pub health_insurance: bool,
    pub fuel_compensation: bool,
    pub mobile_compensation: bool,
    pub free_meals: bool,
    #[serde(default)]
    pub other_benefits: Vec<String>,
    #[serde(default)]
    pub new_column: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_json(external_id: &str) -> String {
        format!(
            r#"{{
                "vacancies": {{
                    "external_id": "{external_id}",
                    "title": "Водитель",
                    "description": "Развоз заказов по городу",
                    "work_format": "office",
                    "employment_type": "Полная занятость",
                    "schedule": "Полный день",
                    "experience_required": "От 1 года",
                    "source_url": "https://hh.ru/vacancy/{external_id}",
                    "source_name": "hh.ru",
                    "publication_date": "2025-06-17",
                    "is_relevant": true,
                    "company_id": "c1",
                    "compensation_id": "p1",
                    "benefits_id": "b1",
                    "created_at": "2025-06-17T12:00:00"
                }},
                "companies": {{
                    "id": "c1",
                    "name": "ООО Ромашка",
                    "industry": "Не указан",
                    "size": "Не указан",
                    "is_foreign": false,
                    "location_city": "Москва",
                    "location_radius_km": 50
                }},
                "compensations": {{
                    "id": "p1",
                    "salary_min": 50000,
                    "salary_max": 70000,
                    "salary_median": 60000,
                    "salary_avg": 60000,
                    "salary_net": true,
                    "currency": "RUR"
                }},
                "benefits": {{
                    "id": "b1",
                    "health_insurance": true,
                    "fuel_compensation": false,
                    "mobile_compensation": false,
                    "free_meals": false
                }}
            }}"#
        )
    }

    #[test]
    fn test_message_body_decodes_single_object() {
        let body: MessageBody = serde_json::from_str(&entry_json("1")).unwrap();
        let entries = body.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].vacancies.external_id, "1");
    }

    #[test]
    fn test_message_body_decodes_batch_array() {
        let json = format!("[{},{}]", entry_json("1"), entry_json("2"));
        let body: MessageBody = serde_json::from_str(&json).unwrap();
        let entries = body.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].vacancies.external_id, "2");
    }

    #[test]
    fn test_missing_optional_lists_default_to_empty() {
        let body: MessageBody = serde_json::from_str(&entry_json("1")).unwrap();
        let entries = body.into_entries();
        let entry = &entries[0];
        assert!(entry.vacancies.similar_titles.is_empty());
        assert!(entry.vacancies.exclude_keywords.is_empty());
        assert!(entry.companies.name_variations.is_empty());
        assert!(entry.vacancies.experience_years.is_none());
    }

    #[test]
    fn test_experience_years_not_serialized_when_absent() {
        let body: MessageBody = serde_json::from_str(&entry_json("1")).unwrap();
        let entries = body.into_entries();
        let out = serde_json::to_string(&entries[0]).unwrap();
        assert!(!out.contains("experience_years"));
    }
}

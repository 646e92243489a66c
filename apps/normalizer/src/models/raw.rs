use serde::Deserialize;

/// Raw vacancy payload as returned by the HH.ru vacancy detail endpoint.
/// Only the fields the normalizer consumes are modeled; everything else in
/// the payload is ignored on deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVacancy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub salary: Option<RawSalary>,
    pub employer: Option<RawNamed>,
    pub schedule: Option<RawNamed>,
    pub employment: Option<RawNamed>,
    pub experience: Option<RawNamed>,
    pub area: Option<RawNamed>,
    #[serde(default)]
    pub snippet: RawSnippet,
    pub published_at: Option<String>,
    pub alternate_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSalary {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub currency: Option<String>,
    /// True when the figures are pre-tax.
    #[serde(default)]
    pub gross: bool,
}

/// HH.ru wraps most enumerated fields as `{"id": ..., "name": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNamed {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnippet {
    pub requirement: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_vacancy_decodes_hh_detail_shape() {
        let json = r#"{
            "id": "12345678",
            "name": "Курьер",
            "description": "<p>Доставка документов</p>",
            "salary": {"from": 60000, "to": null, "currency": "RUR", "gross": true},
            "employer": {"id": "42", "name": "ООО Ромашка"},
            "schedule": {"id": "fullDay", "name": "Полный день"},
            "employment": {"id": "full", "name": "Полная занятость"},
            "experience": {"id": "noExperience", "name": "Нет опыта"},
            "area": {"id": "1", "name": "Москва"},
            "snippet": {"requirement": "Ответственность"},
            "published_at": "2025-06-17T12:00:00+0300",
            "alternate_url": "https://hh.ru/vacancy/12345678",
            "unknown_field": {"nested": true}
        }"#;
        let raw: RawVacancy = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, "12345678");
        assert_eq!(raw.salary.as_ref().unwrap().from, Some(60000));
        assert!(raw.salary.as_ref().unwrap().gross);
        assert_eq!(raw.employer.unwrap().name.as_deref(), Some("ООО Ромашка"));
    }

    #[test]
    fn test_raw_vacancy_tolerates_missing_salary_and_snippet() {
        let json = r#"{"id": "1", "name": "Грузчик"}"#;
        let raw: RawVacancy = serde_json::from_str(json).unwrap();
        assert!(raw.salary.is_none());
        assert!(raw.snippet.requirement.is_none());
        assert!(raw.description.is_empty());
    }
}

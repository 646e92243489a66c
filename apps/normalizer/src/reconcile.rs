//! Conflict-aware persistence of one normalized vacancy entry.
//!
//! Order is mandatory, not incidental: company and benefits (and the
//! compensation, when it has an id) must be committed before the vacancy
//! row references them. All four statements run on one transaction owned
//! by the coordinator; any failure aborts the whole unit.

use sqlx::types::Json;
use sqlx::{PgConnection, Postgres, Transaction};

use crate::errors::AppError;
use crate::models::records::{
    BenefitsRecord, CompanyRecord, CompensationRecord, VacancyEntry, VacancyRecord,
};

const COMPANY_INSERT: &str = r#"
    INSERT INTO companies
        (id, name, name_variations, industry, size, is_foreign, location_city, location_radius_km)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (id) DO NOTHING
"#;

const BENEFITS_INSERT: &str = r#"
    INSERT INTO benefits
        (id, health_insurance, fuel_compensation, mobile_compensation,
         free_meals, other_benefits, new_column)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (id) DO NOTHING
"#;

const COMPENSATION_INSERT: &str = r#"
    INSERT INTO compensations
        (id, salary_min, salary_max, salary_median, salary_avg,
         salary_net, currency, bonuses, payment_frequency, payment_type)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    ON CONFLICT (id) DO NOTHING
"#;

const VACANCY_UPSERT: &str = r#"
    INSERT INTO vacancies
        (external_id, title, description, requirements, work_format,
         employment_type, schedule, experience_required, source_url,
         source_name, publication_date, is_relevant, company_id,
         compensation_id, benefits_id, created_at, similar_titles,
         exclude_keywords, experience_years)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
    ON CONFLICT (external_id) DO UPDATE SET
        title = EXCLUDED.title,
        similar_titles = EXCLUDED.similar_titles,
        exclude_keywords = EXCLUDED.exclude_keywords,
        experience_years = EXCLUDED.experience_years
"#;

/// Persists one entry as part of the caller's transaction.
pub async fn reconcile(
    tx: &mut Transaction<'_, Postgres>,
    entry: &VacancyEntry,
) -> Result<(), AppError> {
    insert_company(&mut **tx, &entry.companies).await?;
    insert_benefits(&mut **tx, &entry.benefits).await?;
    insert_compensation(&mut **tx, &entry.compensations).await?;
    upsert_vacancy(&mut **tx, &entry.vacancies).await?;
    Ok(())
}

/// First write wins: conflicting inserts leave the existing row untouched,
/// including `name_variations`.
async fn insert_company(conn: &mut PgConnection, company: &CompanyRecord) -> Result<(), AppError> {
    sqlx::query(COMPANY_INSERT)
        .bind(&company.id)
        .bind(&company.name)
        .bind(Json(&company.name_variations))
        .bind(&company.industry)
        .bind(&company.size)
        .bind(company.is_foreign)
        .bind(&company.location_city)
        .bind(company.location_radius_km)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn insert_benefits(
    conn: &mut PgConnection,
    benefits: &BenefitsRecord,
) -> Result<(), AppError> {
    sqlx::query(BENEFITS_INSERT)
        .bind(&benefits.id)
        .bind(benefits.health_insurance)
        .bind(benefits.fuel_compensation)
        .bind(benefits.mobile_compensation)
        .bind(benefits.free_meals)
        .bind(Json(&benefits.other_benefits))
        .bind(benefits.new_column)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// No-op when the compensation carries no id at all; the no-salary
/// sentinel counts as a valid id and is inserted like any other.
async fn insert_compensation(
    conn: &mut PgConnection,
    compensation: &CompensationRecord,
) -> Result<(), AppError> {
    let Some(id) = &compensation.id else {
        return Ok(());
    };
    sqlx::query(COMPENSATION_INSERT)
        .bind(id)
        .bind(compensation.salary_min)
        .bind(compensation.salary_max)
        .bind(compensation.salary_median)
        .bind(compensation.salary_avg)
        .bind(compensation.salary_net)
        .bind(&compensation.currency)
        .bind(&compensation.bonuses)
        .bind(&compensation.payment_frequency)
        .bind(&compensation.payment_type)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Re-ingestion of a known `external_id` may only move the title,
/// similar-title/exclude-keyword lists, and the derived experience range.
/// Everything else is fixed at first insert.
async fn upsert_vacancy(conn: &mut PgConnection, vacancy: &VacancyRecord) -> Result<(), AppError> {
    sqlx::query(VACANCY_UPSERT)
        .bind(&vacancy.external_id)
        .bind(&vacancy.title)
        .bind(&vacancy.description)
        .bind(&vacancy.requirements)
        .bind(&vacancy.work_format)
        .bind(&vacancy.employment_type)
        .bind(&vacancy.schedule)
        .bind(&vacancy.experience_required)
        .bind(&vacancy.source_url)
        .bind(&vacancy.source_name)
        .bind(vacancy.publication_date)
        .bind(vacancy.is_relevant)
        .bind(&vacancy.company_id)
        .bind(&vacancy.compensation_id)
        .bind(&vacancy.benefits_id)
        .bind(vacancy.created_at)
        .bind(Json(&vacancy.similar_titles))
        .bind(Json(&vacancy.exclude_keywords))
        .bind(&vacancy.experience_years)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the four pipeline tables if they do not exist yet.
/// Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for ddl in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("Database schema ensured");
    Ok(())
}

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY,
        name TEXT,
        name_variations JSONB,
        industry TEXT,
        size TEXT,
        is_foreign BOOLEAN,
        location_city TEXT,
        location_radius_km INTEGER
    )"#,
    r#"CREATE TABLE IF NOT EXISTS benefits (
        id TEXT PRIMARY KEY,
        health_insurance BOOLEAN,
        fuel_compensation BOOLEAN,
        mobile_compensation BOOLEAN,
        free_meals BOOLEAN,
        other_benefits JSONB,
        new_column BOOLEAN
    )"#,
    r#"CREATE TABLE IF NOT EXISTS compensations (
        id TEXT PRIMARY KEY,
        salary_min BIGINT,
        salary_max BIGINT,
        salary_median BIGINT,
        salary_avg BIGINT,
        salary_net BOOLEAN,
        currency TEXT,
        bonuses TEXT,
        payment_frequency TEXT,
        payment_type TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS vacancies (
        external_id TEXT PRIMARY KEY,
        title TEXT,
        description TEXT,
        requirements TEXT,
        work_format TEXT,
        employment_type TEXT,
        schedule TEXT,
        experience_required TEXT,
        source_url TEXT,
        source_name TEXT,
        publication_date DATE,
        is_relevant BOOLEAN,
        company_id TEXT REFERENCES companies(id),
        compensation_id TEXT,
        benefits_id TEXT REFERENCES benefits(id),
        created_at TIMESTAMP,
        similar_titles JSONB,
        exclude_keywords JSONB,
        experience_years INTEGER[]
    )"#,
];

//! Read-side queries over the normalized store: filtered vacancy listings
//! and the aggregate figures the reporting layer renders.
//!
//! This module stops at data — charts, PDF rendering, and the RPC surface
//! live in a separate service that consumes these results.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::errors::AppError;

/// Caller-supplied filter set. Every field is optional; empty lists mean
/// "no constraint".
#[derive(Debug, Clone, Default)]
pub struct VacancyFilter {
    /// Matches vacancies whose experience range overlaps this one.
    pub experience_range: Option<(i32, i32)>,
    /// Bounds on the estimated average salary.
    pub salary_range: Option<(i64, i64)>,
    /// Case-insensitive substring of the canonical title.
    pub position: Option<String>,
    pub cities: Vec<String>,
    pub companies: Vec<String>,
    pub sources: Vec<String>,
}

/// One row of the vacancies ⋈ companies ⟕ compensations join.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VacancyView {
    pub external_id: String,
    pub title: String,
    pub company_name: String,
    pub location_city: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_avg: Option<i64>,
    pub salary_median: Option<i64>,
    pub currency: Option<String>,
    pub experience_required: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
    pub employment_type: Option<String>,
    pub work_format: Option<String>,
    pub experience_years: Option<Vec<i32>>,
}

/// Fetches vacancies matching the filter, newest first.
///
/// An empty result set is reported as `NotFound` so callers can tell
/// "query was fine, nothing matched" from an actual failure.
pub async fn fetch_vacancies(
    pool: &PgPool,
    filter: &VacancyFilter,
) -> Result<Vec<VacancyView>, AppError> {
    let mut qb = build_query(filter);
    let rows = qb.build_query_as::<VacancyView>().fetch_all(pool).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound(
            "no vacancies matched the filter".to_string(),
        ));
    }
    Ok(rows)
}

fn build_query(filter: &VacancyFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT v.external_id, v.title, c.name AS company_name, c.location_city, \
         comp.salary_min, comp.salary_max, comp.salary_avg, comp.salary_median, comp.currency, \
         v.experience_required, v.publication_date, v.source_name, v.source_url, \
         v.employment_type, v.work_format, v.experience_years \
         FROM vacancies v \
         JOIN companies c ON v.company_id = c.id \
         LEFT JOIN compensations comp ON v.compensation_id = comp.id \
         WHERE 1=1",
    );

    if let Some((min, max)) = filter.experience_range {
        // Range overlap: vacancy's [lo, hi] intersects the requested [min, max].
        qb.push(" AND v.experience_years[1] <= ").push_bind(max);
        qb.push(" AND v.experience_years[2] >= ").push_bind(min);
    }
    if let Some((lo, hi)) = filter.salary_range {
        qb.push(" AND comp.salary_avg BETWEEN ").push_bind(lo);
        qb.push(" AND ").push_bind(hi);
    }
    if let Some(position) = &filter.position {
        qb.push(" AND v.title ILIKE ").push_bind(format!("%{position}%"));
    }
    if !filter.cities.is_empty() {
        qb.push(" AND c.location_city = ANY(").push_bind(filter.cities.clone());
        qb.push(")");
    }
    if !filter.companies.is_empty() {
        qb.push(" AND c.name = ANY(").push_bind(filter.companies.clone());
        qb.push(")");
    }
    if !filter.sources.is_empty() {
        qb.push(" AND v.source_name = ANY(").push_bind(filter.sources.clone());
        qb.push(")");
    }

    qb.push(" ORDER BY v.publication_date DESC");
    qb
}

/// Aggregate salary figures over a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryStats {
    pub mean: f64,
    pub median: f64,
    pub min: i64,
    pub max: i64,
    pub sample_size: usize,
}

impl SalaryStats {
    /// Computes the stats over rows that carry an estimated average salary.
    /// Returns `None` when no row does.
    pub fn compute(rows: &[VacancyView]) -> Option<SalaryStats> {
        let mut salaries: Vec<i64> = rows.iter().filter_map(|r| r.salary_avg).collect();
        if salaries.is_empty() {
            return None;
        }
        salaries.sort_unstable();

        let n = salaries.len();
        let sum: i64 = salaries.iter().sum();
        let median = if n % 2 == 1 {
            salaries[n / 2] as f64
        } else {
            (salaries[n / 2 - 1] + salaries[n / 2]) as f64 / 2.0
        };

        Some(SalaryStats {
            mean: sum as f64 / n as f64,
            median,
            min: salaries[0],
            max: salaries[n - 1],
            sample_size: n,
        })
    }
}

/// Companies by posting count, descending; ties break alphabetically so
/// the report ordering is stable.
pub fn top_companies(rows: &[VacancyView], n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.company_name.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

/// Posting counts per source ("hh.ru", "superjob.ru", ...).
pub fn source_breakdown(rows: &[VacancyView]) -> HashMap<String, usize> {
    breakdown(rows, |r| r.source_name.as_deref())
}

/// Posting counts per work format (office / remote / hybrid).
pub fn work_format_breakdown(rows: &[VacancyView]) -> HashMap<String, usize> {
    breakdown(rows, |r| r.work_format.as_deref())
}

fn breakdown(
    rows: &[VacancyView],
    key: impl Fn(&VacancyView) -> Option<&str>,
) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for row in rows {
        let label = key(row).unwrap_or("Не указан").to_string();
        *counts.entry(label).or_default() += 1;
    }
    counts
}

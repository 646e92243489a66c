//! Salary normalization and compensation identity.

use crate::models::raw::RawSalary;
use crate::models::records::CompensationRecord;

use super::content_id;

/// Adjustment applied when only one salary bound is reported: the midpoint
/// is estimated at +15% of the minimum or -15% of the maximum.
const SINGLE_BOUND_ADJUSTMENT: f64 = 0.15;

/// Compensation id shared by every vacancy that reports no salary at all.
/// One sentinel row instead of an unbounded pile of empty near-duplicates.
pub fn no_salary_sentinel_id() -> String {
    content_id("no_salary:default")
}

/// Normalizes a raw salary object into a compensation record.
///
/// Midpoint rules: both bounds -> rounded mean; only `from` -> from * 1.15;
/// only `to` -> to * 0.85; neither -> all money fields null under the
/// sentinel id.
pub fn normalize(salary: Option<&RawSalary>) -> CompensationRecord {
    let Some(salary) = salary else {
        return CompensationRecord {
            id: Some(no_salary_sentinel_id()),
            salary_min: None,
            salary_max: None,
            salary_median: None,
            salary_avg: None,
            salary_net: None,
            currency: None,
            bonuses: String::new(),
            payment_frequency: String::new(),
            payment_type: String::new(),
        };
    };

    let from = salary.from;
    let to = salary.to;
    let currency = salary.currency.clone().unwrap_or_else(|| "RUR".to_string());

    let midpoint = match (from, to) {
        (Some(from), Some(to)) => Some((((from + to) as f64) / 2.0).round() as i64),
        (Some(from), None) => Some((from as f64 * (1.0 + SINGLE_BOUND_ADJUSTMENT)).round() as i64),
        (None, Some(to)) => Some((to as f64 * (1.0 - SINGLE_BOUND_ADJUSTMENT)).round() as i64),
        (None, None) => None,
    };

    CompensationRecord {
        id: Some(compensation_id(from, to, &currency)),
        salary_min: from,
        salary_max: to,
        salary_median: midpoint,
        salary_avg: midpoint,
        salary_net: Some(!salary.gross),
        currency: Some(currency),
        bonuses: String::new(),
        payment_frequency: "monthly".to_string(),
        payment_type: "fixed".to_string(),
    }
}

/// Deterministic, order-sensitive content id over `from:to:currency`.
/// Absent parts hash as the literal "none" so re-ingestion of logically
/// identical salaries dedups to the same row.
pub fn compensation_id(from: Option<i64>, to: Option<i64>, currency: &str) -> String {
    let from = from.map_or_else(|| "none".to_string(), |v| v.to_string());
    let to = to.map_or_else(|| "none".to_string(), |v| v.to_string());
    content_id(&format!("{from}:{to}:{currency}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(from: Option<i64>, to: Option<i64>) -> RawSalary {
        RawSalary {
            from,
            to,
            currency: Some("RUR".to_string()),
            gross: true,
        }
    }

    #[test]
    fn test_both_bounds_midpoint() {
        let comp = normalize(Some(&raw(Some(100_000), Some(200_000))));
        assert_eq!(comp.salary_avg, Some(150_000));
        assert_eq!(comp.salary_median, Some(150_000));
        assert_eq!(comp.salary_min, Some(100_000));
        assert_eq!(comp.salary_max, Some(200_000));
    }

    #[test]
    fn test_only_from_estimates_up() {
        let comp = normalize(Some(&raw(Some(100_000), None)));
        assert_eq!(comp.salary_avg, Some(115_000));
        assert_eq!(comp.salary_median, Some(115_000));
    }

    #[test]
    fn test_only_to_estimates_down() {
        let comp = normalize(Some(&raw(None, Some(200_000))));
        assert_eq!(comp.salary_avg, Some(170_000));
        assert_eq!(comp.salary_median, Some(170_000));
    }

    #[test]
    fn test_absent_salary_uses_sentinel() {
        let comp = normalize(None);
        assert_eq!(comp.id, Some(no_salary_sentinel_id()));
        assert_eq!(comp.salary_min, None);
        assert_eq!(comp.salary_max, None);
        assert_eq!(comp.salary_avg, None);
        assert_eq!(comp.salary_net, None);
        assert_eq!(comp.currency, None);
        assert!(comp.payment_frequency.is_empty());
    }

    #[test]
    fn test_empty_salary_object_also_uses_sentinel_values() {
        // Salary object present but both bounds null: id still hashes the
        // "none:none:RUR" content, money fields stay null.
        let comp = normalize(Some(&RawSalary {
            from: None,
            to: None,
            currency: None,
            gross: false,
        }));
        assert_eq!(comp.salary_min, None);
        assert_eq!(comp.salary_max, None);
        assert_eq!(comp.salary_avg, None);
        assert_eq!(comp.id, Some(compensation_id(None, None, "RUR")));
    }

    #[test]
    fn test_net_is_inverse_of_gross() {
        let comp = normalize(Some(&raw(Some(1), None)));
        assert_eq!(comp.salary_net, Some(false)); // gross: true above

        let mut net_raw = raw(Some(1), None);
        net_raw.gross = false;
        let comp = normalize(Some(&net_raw));
        assert_eq!(comp.salary_net, Some(true));
    }

    #[test]
    fn test_compensation_id_is_stable_and_order_sensitive() {
        let a = compensation_id(Some(50_000), Some(70_000), "RUR");
        let b = compensation_id(Some(50_000), Some(70_000), "RUR");
        let swapped = compensation_id(Some(70_000), Some(50_000), "RUR");
        assert_eq!(a, b);
        assert_ne!(a, swapped);
    }

    #[test]
    fn test_missing_currency_defaults_to_rur() {
        let comp = normalize(Some(&RawSalary {
            from: Some(10),
            to: None,
            currency: None,
            gross: false,
        }));
        assert_eq!(comp.currency.as_deref(), Some("RUR"));
    }
}

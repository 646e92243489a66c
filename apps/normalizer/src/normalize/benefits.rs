//! Benefits extraction: keyword probes over the description text.

use crate::models::records::BenefitsRecord;

use super::content_id;

/// Extracts the four benefit flags from a description via case-insensitive
/// Russian keyword tests, and derives the content id so every identical
/// flag combination shares one row.
pub fn extract(description: &str) -> BenefitsRecord {
    let desc = description.to_lowercase();

    let health_insurance = desc.contains("дмс") || desc.contains("медицинская страховка");
    let fuel_compensation = desc.contains("гсм") || desc.contains("топливо");
    let mobile_compensation =
        desc.contains("связь") && (desc.contains("оплата") || desc.contains("компенсация"));
    let free_meals =
        desc.contains("питание") && (desc.contains("оплата") || desc.contains("бесплатное"));

    BenefitsRecord {
        id: benefits_id(
            health_insurance,
            fuel_compensation,
            mobile_compensation,
            free_meals,
        ),
        health_insurance,
        fuel_compensation,
        mobile_compensation,
        free_meals,
        other_benefits: Vec::new(),
        new_column: false,
    }
}

/// Content id over the four flags, in fixed order.
pub fn benefits_id(health: bool, fuel: bool, mobile: bool, meals: bool) -> String {
    content_id(&format!("{health}:{fuel}:{mobile}:{meals}"))
}

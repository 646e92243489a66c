pub mod raw;
pub mod records;

pub use records::{
    BenefitsRecord, CompanyRecord, CompensationRecord, MessageBody, VacancyEntry, VacancyRecord,
};

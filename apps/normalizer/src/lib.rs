//! Vacancy ingestion and normalization pipeline.
//!
//! Raw job-board postings (HH.ru, SuperJob) arrive as JSON on a durable
//! queue, get normalized into four related records (vacancy, company,
//! compensation, benefits) with content-derived ids, have their titles
//! rewritten through an LLM-built synonym map, and are upserted into
//! PostgreSQL as one transactional unit per message.

pub mod analytics;
pub mod config;
pub mod consumer;
pub mod db;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod titles;

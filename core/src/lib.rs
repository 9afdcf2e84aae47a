pub mod aggregate;
pub mod columns;
pub mod config;
pub mod correlation;
pub mod error;
pub mod format;
pub mod glossary;
pub mod gov_buckets;
pub mod insights;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod recommendations;
pub mod session;
pub mod table;
pub mod types;

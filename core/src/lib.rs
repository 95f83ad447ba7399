//! Ingestion of cyber-scam, voice-phishing and travel statistics into SQLite.

pub mod aggregate;
pub mod coerce;
pub mod config;
pub mod error;
pub mod http;
pub mod ingest;
pub mod outcome;
pub mod sources;
pub mod store;
pub mod types;
pub mod xml;

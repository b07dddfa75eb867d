pub mod candidate;
pub mod config;
pub mod evaluation;
pub mod i18n;
pub mod metrics;
pub mod provider;
pub mod retry;
pub mod scoring;
pub mod selection;

//! Vigil: Personal Change Monitoring
//!
//! A change-monitoring dashboard: register a URL plus CSS selector, re-check it
//! on demand, and get flagged when the observed text differs from the last
//! observation. Includes LLM-assisted selector suggestion and change summaries.

pub mod assist;
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod repository;
pub mod store;

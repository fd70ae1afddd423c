//! Spending Tracker
//!
//! Pulls the full transaction history from Up Bank, drops internal transfers,
//! fills in missing categories with Gemini and totals spending by day, ISO
//! week, month and year. Questions about the totals are answered by Gemini.
//!
//! PIPELINE:
//! FETCH → CACHE → CLEAN → CLASSIFY → AGGREGATE → (API | CLI | SUMMARIZE)

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod classifier;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod gemini;
pub mod models;
pub mod source;
pub mod summarizer;
pub mod throttle;
pub mod tracker;

pub use error::Result;

// Re-export common types
pub use config::Config;
pub use error::TrackerError;
pub use models::*;
pub use tracker::Tracker;

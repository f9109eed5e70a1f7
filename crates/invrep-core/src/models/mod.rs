//! Data models for the unified invoice report.

pub mod config;
pub mod item;
pub mod report;

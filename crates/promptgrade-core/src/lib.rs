//! promptgrade-core — Prompt evaluation engine, scoring, and statistics.
//!
//! This crate defines the data model, the heuristic scorer, the AI evaluator
//! seam, and the service that records attempts and keeps user statistics
//! consistent under concurrent submissions.

pub mod engine;
pub mod error;
pub mod features;
pub mod grade;
pub mod heuristic;
pub mod memory;
pub mod model;
pub mod parser;
pub mod service;
pub mod statistics;
pub mod traits;

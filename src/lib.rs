// src/lib.rs
//! Extracts payment transactions from an HTML activity export and normalizes
//! their free-text fields into typed records.

pub mod utils;
pub mod records;
pub mod normalizer;
pub mod extractors;
pub mod analysis;
pub mod pipeline;
pub mod storage;

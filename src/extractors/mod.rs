// src/extractors/mod.rs
pub mod activity;

// Re-export key extraction types for convenience
pub use activity::{
    parse_export,
    ActivityExtractor,
    ExtractorConfig,
    RawEntry,
};

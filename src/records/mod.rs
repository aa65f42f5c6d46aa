// src/records/mod.rs
pub mod models;

pub use models::{
    weekday_name,
    Money,
    Timestamp,
    TransactionRecord,
    TransactionStatus,
    TransactionType,
    TIMESTAMP_FORMAT,
};

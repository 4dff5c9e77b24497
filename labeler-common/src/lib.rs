//! # Labeler Common Library
//!
//! Shared code for the image labeling server and client:
//! - Label and pairwise comparison records (wire + storage shape)
//! - Per-segment path encoding for image and label URLs
//! - Root folder configuration resolution
//! - Database initialization (behind the `sqlx` feature)

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod paths;
pub mod time;

pub use error::{Error, Result};
pub use models::{
    DeleteResponse, ImageDescriptor, LabelRecord, LabelUpsert, PairwiseComparisonRecord,
    PairwiseCreate, Winner,
};

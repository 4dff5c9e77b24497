//! # Labeler Client
//!
//! Annotation state manager for the image labeling server:
//! - Image catalog and label store caches, refreshed wholesale
//! - Paginated, filterable grid with lazy, bounded image loading
//! - Absolute labeling (tags, scores, notes) and pairwise A/B sessions
//! - CSV export of either results table
//!
//! The UI drives an [`App`] by dispatching [`Action`]s; the server is
//! reached through the [`LabelApi`] trait ([`HttpApi`] in production).

pub mod absolute;
pub mod api;
pub mod app;
pub mod display;
pub mod error;
pub mod export;
pub mod grid;
pub mod http;
pub mod pagination;
pub mod pairwise;
pub mod prompt;
pub mod store;

pub use api::LabelApi;
pub use app::{Action, App, AppState, Mode};
pub use error::{ClientError, Result, ValidationError};
pub use export::ResultsTab;
pub use grid::{Filter, GridCell, GridPage, LoadState};
pub use http::HttpApi;
pub use prompt::{LogPrompt, Prompt};

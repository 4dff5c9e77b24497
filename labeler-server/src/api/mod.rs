//! HTTP API handlers for labeler-server

pub mod comparisons;
pub mod error;
pub mod export;
pub mod health;
pub mod images;
pub mod labels;

pub use comparisons::{create_comparison, delete_comparison, list_comparisons};
pub use error::ApiError;
pub use export::{export_comparisons, export_labels};
pub use health::health_routes;
pub use images::{list_images, serve_image};
pub use labels::{delete_label, get_label, list_labels, save_label};

//! REST API seam
//!
//! `App` talks to the server only through [`LabelApi`], so tests can swap
//! in an in-memory implementation.

use async_trait::async_trait;
use labeler_common::{
    ImageDescriptor, LabelRecord, LabelUpsert, PairwiseComparisonRecord, PairwiseCreate,
};

use crate::error::Result;

/// One method per server endpoint
#[async_trait]
pub trait LabelApi: Send + Sync {
    /// GET /api/images
    async fn list_images(&self) -> Result<Vec<ImageDescriptor>>;

    /// GET /api/images/{path}
    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>>;

    /// GET /api/labels
    async fn list_labels(&self) -> Result<Vec<LabelRecord>>;

    /// GET /api/labels/{path}; `None` when the image has no label
    async fn get_label(&self, path: &str) -> Result<Option<LabelRecord>>;

    /// POST /api/labels
    async fn save_label(&self, upsert: &LabelUpsert) -> Result<()>;

    /// DELETE /api/labels/{path}
    async fn delete_label(&self, path: &str) -> Result<()>;

    /// GET /api/labels/export
    async fn export_labels(&self) -> Result<String>;

    /// GET /api/pairwise
    async fn list_comparisons(&self) -> Result<Vec<PairwiseComparisonRecord>>;

    /// POST /api/pairwise
    async fn create_comparison(&self, create: &PairwiseCreate)
        -> Result<PairwiseComparisonRecord>;

    /// DELETE /api/pairwise/{id}
    async fn delete_comparison(&self, id: i64) -> Result<()>;

    /// GET /api/pairwise/export
    async fn export_comparisons(&self) -> Result<String>;
}

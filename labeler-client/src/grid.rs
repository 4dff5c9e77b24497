//! Paginated, filterable image grid with lazy image loading

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use labeler_common::ImageDescriptor;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::LabelApi;
use crate::pagination::{calculate_pagination, Pagination, PAGE_SIZE};
use crate::store::LabelStore;

/// Cells loaded right after a page renders, before any visibility report
pub const EAGER_LOAD_COUNT: usize = 9;

/// Upper bound on image requests in flight at once
pub const MAX_CONCURRENT_FETCHES: usize = 6;

/// Which images the grid shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Labeled,
    Unlabeled,
}

impl Filter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Labeled => "labeled",
            Filter::Unlabeled => "unlabeled",
        }
    }

    pub fn matches(&self, labeled: bool) -> bool {
        match self {
            Filter::All => true,
            Filter::Labeled => labeled,
            Filter::Unlabeled => !labeled,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "labeled" => Ok(Filter::Labeled),
            "unlabeled" => Ok(Filter::Unlabeled),
            other => Err(format!("Unknown filter: {}", other)),
        }
    }
}

/// Catalog images passing `filter`, in catalog order
pub fn filter_catalog<'a>(
    catalog: &'a [ImageDescriptor],
    store: &LabelStore,
    filter: Filter,
) -> Vec<&'a ImageDescriptor> {
    catalog
        .iter()
        .filter(|image| filter.matches(store.is_labeled(&image.path)))
        .collect()
}

/// Page and filter selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    pub page: usize,
    pub filter: Filter,
    pub page_size: usize,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl GridState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            filter: Filter::All,
            page_size: page_size.max(1),
        }
    }

    pub fn pagination(&self, filtered_count: usize) -> Pagination {
        calculate_pagination(filtered_count, self.page, self.page_size)
    }

    /// Advance one page, never past the last
    pub fn next_page(&mut self, total_pages: usize) {
        self.page = (self.page + 1).min(total_pages.max(1));
    }

    /// Go back one page, never before the first
    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Changing the filter always returns to page 1
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
        self.page = 1;
    }

    /// Pull the page back in range after the filtered set shrank
    pub fn clamp(&mut self, total_pages: usize) {
        self.page = self.page.clamp(1, total_pages.max(1));
    }
}

/// Fetched and recognised image bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: &'static str,
    pub bytes: Arc<[u8]>,
}

/// Per-cell load state; `Loaded` and `Failed` are terminal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded(ImageData),
    Failed(String),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    /// Classify fetched bytes; anything that is not a known image format fails
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match infer::get(&bytes) {
            Some(kind) if matches!(kind.matcher_type(), infer::MatcherType::Image) => {
                LoadState::Loaded(ImageData {
                    mime_type: kind.mime_type(),
                    bytes: Arc::from(bytes),
                })
            }
            _ => LoadState::Failed("Not a recognised image".to_string()),
        }
    }
}

/// One rendered grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub path: String,
    pub name: String,
    /// Completion badge
    pub labeled: bool,
    pub selected: bool,
    pub load: LoadState,
}

/// One rendered page of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridPage {
    pub filter: Filter,
    pub page: usize,
    pub total_pages: usize,
    /// Size of the filtered set across all pages
    pub filtered_count: usize,
    pub cells: Vec<GridCell>,
}

impl GridPage {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn cell(&self, path: &str) -> Option<&GridCell> {
        self.cells.iter().find(|c| c.path == path)
    }
}

/// Render the current page of the grid
pub fn render_page(
    catalog: &[ImageDescriptor],
    store: &LabelStore,
    grid: &GridState,
    images: &HashMap<String, LoadState>,
    selected: Option<&str>,
) -> GridPage {
    let filtered = filter_catalog(catalog, store, grid.filter);
    let pagination = grid.pagination(filtered.len());

    let cells = filtered[pagination.range()]
        .iter()
        .map(|image| GridCell {
            path: image.path.clone(),
            name: image.name.clone(),
            labeled: store.is_labeled(&image.path),
            selected: selected == Some(image.path.as_str()),
            load: images.get(&image.path).cloned().unwrap_or_default(),
        })
        .collect();

    GridPage {
        filter: grid.filter,
        page: pagination.page,
        total_pages: pagination.total_pages,
        filtered_count: filtered.len(),
        cells,
    }
}

/// Fetch image bytes with at most [`MAX_CONCURRENT_FETCHES`] requests in flight
///
/// Each failure is confined to its own cell.
pub async fn fetch_images<A>(api: &A, paths: Vec<String>) -> Vec<(String, LoadState)>
where
    A: LabelApi + ?Sized,
{
    stream::iter(paths)
        .map(|path| async move {
            let state = match api.fetch_image(&path).await {
                Ok(bytes) => LoadState::from_bytes(bytes),
                Err(e) => LoadState::Failed(e.to_string()),
            };
            match &state {
                LoadState::Failed(reason) => warn!(path = %path, "Image failed to load: {}", reason),
                _ => debug!(path = %path, "Image loaded"),
            }
            (path, state)
        })
        .buffer_unordered(MAX_CONCURRENT_FETCHES)
        .collect()
        .await
}

//! CSV export of the active results tab

use std::path::{Path, PathBuf};

use labeler_common::time::file_stamp;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::LabelApi;
use crate::error::Result;

/// Results table currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsTab {
    #[default]
    Labels,
    Pairwise,
}

impl ResultsTab {
    fn file_prefix(&self) -> &'static str {
        match self {
            ResultsTab::Labels => "labels",
            ResultsTab::Pairwise => "pairwise",
        }
    }
}

/// Download the tab's CSV from the server and write it into `dir`
pub async fn export_csv<A>(api: &A, tab: ResultsTab, dir: &Path) -> Result<PathBuf>
where
    A: LabelApi + ?Sized,
{
    let csv = match tab {
        ResultsTab::Labels => api.export_labels().await?,
        ResultsTab::Pairwise => api.export_comparisons().await?,
    };

    let path = dir.join(format!("{}_{}.csv", tab.file_prefix(), file_stamp()));
    tokio::fs::write(&path, csv.as_bytes()).await?;

    info!("Exported {} ({} bytes)", path.display(), csv.len());
    Ok(path)
}

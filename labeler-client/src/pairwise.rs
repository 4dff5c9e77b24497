//! Pairwise A/B comparison session

use std::collections::BTreeMap;

use futures::future::join_all;
use labeler_common::{ImageDescriptor, PairwiseComparisonRecord, PairwiseCreate, Winner};
use rand::Rng;
use tracing::{info, warn};

use crate::api::LabelApi;
use crate::display::Brightness;
use crate::error::{ClientError, ValidationError};

/// Two distinct catalog images shown side by side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub first: ImageDescriptor,
    pub second: ImageDescriptor,
}

/// Draw two distinct images uniformly at random
///
/// Rejection sampling: the second index is redrawn until it differs from
/// the first. Pairs may repeat across draws.
pub fn draw_pair<R: Rng>(
    catalog: &[ImageDescriptor],
    rng: &mut R,
) -> Result<ImagePair, ValidationError> {
    if catalog.len() < 2 {
        return Err(ValidationError::CatalogTooSmall(catalog.len()));
    }

    let first = rng.gen_range(0..catalog.len());
    let mut second = rng.gen_range(0..catalog.len());
    while second == first {
        second = rng.gen_range(0..catalog.len());
    }

    Ok(ImagePair {
        first: catalog[first].clone(),
        second: catalog[second].clone(),
    })
}

/// Current pair, per-tag judgments and display adjustments
#[derive(Debug, Clone, Default)]
pub struct PairwiseSession {
    pub pair: Option<ImagePair>,
    pub judgments: BTreeMap<String, Winner>,
    pub labeler_name: String,
    pub notes: String,
    /// One slider per side of the pair
    pub brightness: [Brightness; 2],
}

impl PairwiseSession {
    /// Show a new pair with a fresh draft
    pub fn set_pair(&mut self, pair: ImagePair) {
        info!(first = %pair.first.path, second = %pair.second.path, "New comparison pair");
        self.pair = Some(pair);
        self.clear();
    }

    pub fn judge(&mut self, tag: &str, winner: Winner) {
        self.judgments.insert(tag.to_string(), winner);
    }

    pub fn unjudge(&mut self, tag: &str) {
        self.judgments.remove(tag);
    }

    /// Reset judgments, notes and brightness; the labeler stays
    pub fn clear(&mut self) {
        self.judgments.clear();
        self.notes.clear();
        self.brightness = Default::default();
    }

    /// Validate the draft and build one create request per judged tag
    pub fn build_requests(&self) -> Result<Vec<PairwiseCreate>, ValidationError> {
        let labeler_name = self.labeler_name.trim();
        if labeler_name.is_empty() {
            return Err(ValidationError::MissingLabelerName);
        }
        let pair = self.pair.as_ref().ok_or(ValidationError::NoPairDrawn)?;
        if self.judgments.is_empty() {
            return Err(ValidationError::NoComparisonMade);
        }

        let notes = self.notes.trim();
        Ok(self
            .judgments
            .iter()
            .map(|(tag, winner)| PairwiseCreate {
                image1_path: pair.first.path.clone(),
                image1_name: pair.first.name.clone(),
                image2_path: pair.second.path.clone(),
                image2_name: pair.second.name.clone(),
                reconstruction_type: tag.clone(),
                winner: *winner,
                labeler_name: labeler_name.to_string(),
                notes: (!notes.is_empty()).then(|| notes.to_string()),
            })
            .collect())
    }
}

/// Send every create request concurrently
///
/// Succeeds only if all requests do. Records saved before a failure stay
/// saved.
pub async fn save_judgments<A>(
    api: &A,
    requests: &[PairwiseCreate],
) -> Result<Vec<PairwiseComparisonRecord>, ClientError>
where
    A: LabelApi + ?Sized,
{
    let results = join_all(requests.iter().map(|req| api.create_comparison(req))).await;

    let mut saved = Vec::with_capacity(results.len());
    let mut failed = Vec::new();
    for (req, result) in requests.iter().zip(results) {
        match result {
            Ok(record) => saved.push(record),
            Err(e) => {
                warn!(reconstruction_type = %req.reconstruction_type, "Comparison not saved: {}", e);
                failed.push(format!("{}: {}", req.reconstruction_type, e));
            }
        }
    }

    if failed.is_empty() {
        info!("Saved {} comparisons", saved.len());
        Ok(saved)
    } else {
        Err(ClientError::PartialSave {
            saved: saved.len(),
            attempted: requests.len(),
            failed,
        })
    }
}

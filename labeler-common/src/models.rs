//! Label and comparison records
//!
//! These types are both the JSON wire format of the REST API and the shape
//! the server persists. Collections are ordered (`BTreeSet`/`BTreeMap`) so
//! records compare and serialize deterministically.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Lowest quality score a reconstruction may receive
pub const MIN_SCORE: u8 = 0;
/// Highest quality score a reconstruction may receive
pub const MAX_SCORE: u8 = 10;
/// Score assigned when a reconstruction tag is first checked
pub const DEFAULT_SCORE: u8 = 5;

/// One image in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    /// Path relative to the data directory, `/`-separated; unique key
    pub path: String,
    /// Display name (file name)
    pub name: String,
}

/// Absolute label stored for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub file_path: String,
    pub file_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reconstruction: BTreeSet<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reconstruction_scores: BTreeMap<String, u8>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labeler_name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl LabelRecord {
    /// An image counts as labeled once at least one reconstruction is tagged
    pub fn is_labeled(&self) -> bool {
        !self.reconstruction.is_empty()
    }

    /// Tags rendered for tables and CSV, `;`-joined in tag order
    pub fn reconstruction_summary(&self) -> String {
        self.reconstruction
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Scores rendered as `tag:score` pairs, `;`-joined in tag order
    pub fn scores_summary(&self) -> String {
        self.reconstruction_scores
            .iter()
            .map(|(tag, score)| format!("{}:{}", tag, score))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Body of `POST /api/labels`
///
/// Empty collections and notes travel as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelUpsert {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_name: String,
    pub reconstruction: Option<Vec<String>>,
    /// Signed so out-of-range input reaches `validate` instead of failing to parse
    pub reconstruction_scores: Option<BTreeMap<String, i64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labeler_name: String,
    pub notes: Option<String>,
}

impl LabelUpsert {
    /// Reject upserts the server must not store
    pub fn validate(&self) -> Result<()> {
        if self.file_path.is_empty() || self.file_name.is_empty() {
            return Err(Error::InvalidInput(
                "file_path and file_name are required".to_string(),
            ));
        }
        if self.labeler_name.trim().is_empty() {
            return Err(Error::InvalidInput("labeler_name is required".to_string()));
        }
        let tags = self.tags();
        if let Some((tag, score)) = self
            .scored_tags()
            .filter(|(tag, _)| tags.contains(*tag))
            .find(|(_, score)| !(i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(score))
        {
            return Err(Error::InvalidInput(format!(
                "Score for '{}' must be between {} and {}, got {}",
                tag, MIN_SCORE, MAX_SCORE, score
            )));
        }
        Ok(())
    }

    /// Tag set and scores with orphan scores removed
    ///
    /// Tags and score keys are trimmed alike. Tags that arrive without a
    /// score keep no score entry; the client always sends one per tag.
    pub fn normalized(&self) -> (BTreeSet<String>, BTreeMap<String, u8>) {
        let tags = self.tags();

        let scores = self
            .scored_tags()
            .filter(|(tag, _)| tags.contains(*tag))
            .filter_map(|(tag, score)| Some((tag.to_string(), u8::try_from(score).ok()?)))
            .filter(|(_, score)| *score <= MAX_SCORE)
            .collect();

        (tags, scores)
    }

    fn tags(&self) -> BTreeSet<String> {
        self.reconstruction
            .iter()
            .flatten()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn scored_tags(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.reconstruction_scores
            .iter()
            .flatten()
            .map(|(tag, score)| (tag.trim(), *score))
    }

    /// Notes with blank input collapsed to `None`
    pub fn normalized_notes(&self) -> Option<String> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

/// Outcome of one pairwise judgment for one reconstruction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    #[serde(rename = "1")]
    Image1,
    #[serde(rename = "2")]
    Image2,
    #[serde(rename = "tie")]
    Tie,
    #[serde(rename = "not_apply")]
    NotApplicable,
}

impl Winner {
    pub const ALL: [Winner; 4] = [
        Winner::Image1,
        Winner::Image2,
        Winner::Tie,
        Winner::NotApplicable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Winner::Image1 => "1",
            Winner::Image2 => "2",
            Winner::Tie => "tie",
            Winner::NotApplicable => "not_apply",
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Winner {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Winner::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown winner: {}", s)))
    }
}

/// Persisted pairwise judgment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparisonRecord {
    pub id: i64,
    pub image1_path: String,
    pub image1_name: String,
    pub image2_path: String,
    pub image2_name: String,
    pub reconstruction_type: String,
    pub winner: Winner,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labeler_name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/pairwise`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseCreate {
    pub image1_path: String,
    pub image1_name: String,
    pub image2_path: String,
    pub image2_name: String,
    pub reconstruction_type: String,
    pub winner: Winner,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labeler_name: String,
    pub notes: Option<String>,
}

impl PairwiseCreate {
    pub fn validate(&self) -> Result<()> {
        if self.labeler_name.trim().is_empty() {
            return Err(Error::InvalidInput("labeler_name is required".to_string()));
        }
        if self.reconstruction_type.trim().is_empty() {
            return Err(Error::InvalidInput(
                "reconstruction_type is required".to_string(),
            ));
        }
        if self.image1_path.is_empty() || self.image2_path.is_empty() {
            return Err(Error::InvalidInput(
                "image1_path and image2_path are required".to_string(),
            ));
        }
        if self.image1_path == self.image2_path {
            return Err(Error::InvalidInput(
                "A comparison needs two different images".to_string(),
            ));
        }
        Ok(())
    }
}

/// Response body of the DELETE endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! Absolute labeling session: one selected image and its label draft

use std::collections::{BTreeMap, BTreeSet};

use labeler_common::models::{DEFAULT_SCORE, MAX_SCORE, MIN_SCORE};
use labeler_common::{ImageDescriptor, LabelRecord, LabelUpsert};

use crate::display::Brightness;
use crate::error::ValidationError;

/// Where the session is in the select → edit → save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Editing,
    Saving,
}

/// Unsaved edits for the selected image
///
/// Every selected tag has exactly one score entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelDraft {
    pub reconstruction: BTreeSet<String>,
    pub scores: BTreeMap<String, u8>,
    pub notes: String,
}

impl LabelDraft {
    pub fn from_record(record: &LabelRecord) -> Self {
        let reconstruction = record.reconstruction.clone();
        let scores = reconstruction
            .iter()
            .map(|tag| {
                let score = record
                    .reconstruction_scores
                    .get(tag)
                    .copied()
                    .unwrap_or(DEFAULT_SCORE);
                (tag.clone(), score.min(MAX_SCORE))
            })
            .collect();

        Self {
            reconstruction,
            scores,
            notes: record.notes.clone().unwrap_or_default(),
        }
    }

    /// Flip a tag; returns whether it is now selected
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let checked = !self.reconstruction.contains(tag);
        self.set_tag(tag, checked);
        checked
    }

    /// Checking a tag creates its score at the default unless one exists;
    /// unchecking removes the score
    pub fn set_tag(&mut self, tag: &str, checked: bool) {
        if checked {
            self.reconstruction.insert(tag.to_string());
            self.scores.entry(tag.to_string()).or_insert(DEFAULT_SCORE);
        } else {
            self.reconstruction.remove(tag);
            self.scores.remove(tag);
        }
    }

    /// Set a score, clamped to the valid range; ignored for unselected tags
    pub fn set_score(&mut self, tag: &str, score: i32) -> bool {
        match self.scores.get_mut(tag) {
            Some(slot) => {
                *slot = score.clamp(i32::from(MIN_SCORE), i32::from(MAX_SCORE)) as u8;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.reconstruction.is_empty() && self.notes.trim().is_empty()
    }

    /// Upsert body; empty collections and notes travel as null
    pub fn to_upsert(&self, image: &ImageDescriptor, labeler_name: &str) -> LabelUpsert {
        let notes = self.notes.trim();
        LabelUpsert {
            file_path: image.path.clone(),
            file_name: image.name.clone(),
            reconstruction: (!self.reconstruction.is_empty())
                .then(|| self.reconstruction.iter().cloned().collect()),
            reconstruction_scores: (!self.scores.is_empty()).then(|| {
                self.scores
                    .iter()
                    .map(|(tag, score)| (tag.clone(), i64::from(*score)))
                    .collect()
            }),
            labeler_name: labeler_name.trim().to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}

/// Selected image, its draft, and the labeler identity
#[derive(Debug, Clone, Default)]
pub struct AbsoluteSession {
    pub phase: Phase,
    pub selected: Option<ImageDescriptor>,
    pub draft: LabelDraft,
    /// Kept across selections and clears
    pub labeler_name: String,
    pub brightness: Brightness,
}

impl AbsoluteSession {
    pub fn selected_path(&self) -> Option<&str> {
        self.selected.as_ref().map(|image| image.path.as_str())
    }

    /// Enter `Loading` for a newly selected image
    pub fn begin_loading(&mut self, image: ImageDescriptor) {
        self.selected = Some(image);
        self.draft = LabelDraft::default();
        self.brightness.reset();
        self.phase = Phase::Loading;
    }

    /// Populate the draft from the stored record, or start empty
    pub fn finish_loading(&mut self, record: Option<&LabelRecord>) {
        self.draft = record.map(LabelDraft::from_record).unwrap_or_default();
        if let Some(name) = record.map(|r| r.labeler_name.trim()).filter(|n| !n.is_empty()) {
            self.labeler_name = name.to_string();
        }
        self.phase = Phase::Editing;
    }

    /// Validate and build the upsert, entering `Saving`
    pub fn begin_save(&mut self) -> Result<LabelUpsert, ValidationError> {
        let image = self.selected.as_ref().ok_or(ValidationError::NoImageSelected)?;
        if self.labeler_name.trim().is_empty() {
            return Err(ValidationError::MissingLabelerName);
        }

        let upsert = self.draft.to_upsert(image, &self.labeler_name);
        self.phase = Phase::Saving;
        Ok(upsert)
    }

    pub fn finish_save(&mut self) {
        self.phase = if self.selected.is_some() {
            Phase::Editing
        } else {
            Phase::Idle
        };
    }

    /// Drop the draft; the server is untouched
    pub fn clear(&mut self) {
        self.draft = LabelDraft::default();
    }

    /// Back to "no selection"
    pub fn deselect(&mut self) {
        self.selected = None;
        self.draft = LabelDraft::default();
        self.brightness.reset();
        self.phase = Phase::Idle;
    }
}

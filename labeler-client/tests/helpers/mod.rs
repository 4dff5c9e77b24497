//! In-memory server and prompt doubles for App tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use labeler_client::{ClientError, LabelApi, Prompt, Result};
use labeler_common::{
    ImageDescriptor, LabelRecord, LabelUpsert, PairwiseComparisonRecord, PairwiseCreate,
};

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

#[derive(Default)]
struct MockState {
    images: Vec<ImageDescriptor>,
    image_bytes: HashMap<String, Vec<u8>>,
    labels: BTreeMap<String, LabelRecord>,
    comparisons: Vec<PairwiseComparisonRecord>,
    next_id: i64,
    failing_tags: HashSet<String>,
    catalog_down: bool,
    comparison_list_down: bool,
}

/// Behaves like labeler-server, minus HTTP
#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
    calls: Mutex<Vec<&'static str>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockApi {
    /// Catalog of `img1.png` .. `img{n}.png`, all valid PNGs
    pub fn with_images(n: usize) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            for i in 1..=n {
                let name = format!("img{}.png", i);
                state.image_bytes.insert(name.clone(), PNG_BYTES.to_vec());
                state.images.push(ImageDescriptor {
                    path: name.clone(),
                    name,
                });
            }
            state.next_id = 1;
        }
        api
    }

    pub fn path(i: usize) -> String {
        format!("img{}.png", i)
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Serve non-image bytes for `path`
    pub fn corrupt_image(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .image_bytes
            .insert(path.to_string(), b"<html>oops</html>".to_vec());
    }

    /// Make create requests for `tag` fail with a 500
    pub fn fail_comparisons_for(&self, tag: &str) {
        self.state.lock().unwrap().failing_tags.insert(tag.to_string());
    }

    /// Make `GET /api/pairwise` fail with a 500
    pub fn take_comparison_list_down(&self) {
        self.state.lock().unwrap().comparison_list_down = true;
    }

    pub fn take_catalog_down(&self) {
        self.state.lock().unwrap().catalog_down = true;
    }

    pub fn seed_label(&self, path: &str, tags: &[&str]) {
        let record = LabelRecord {
            file_path: path.to_string(),
            file_name: path.to_string(),
            reconstruction: tags.iter().map(|t| t.to_string()).collect(),
            reconstruction_scores: tags.iter().map(|t| (t.to_string(), 5)).collect(),
            labeler_name: "seed".to_string(),
            notes: None,
            updated_at: Utc::now(),
        };
        self.state.lock().unwrap().labels.insert(path.to_string(), record);
    }

    pub fn stored_label(&self, path: &str) -> Option<LabelRecord> {
        self.state.lock().unwrap().labels.get(path).cloned()
    }

    pub fn stored_comparisons(&self) -> Vec<PairwiseComparisonRecord> {
        self.state.lock().unwrap().comparisons.clone()
    }
}

fn server_error(status: u16, message: &str) -> ClientError {
    ClientError::Server {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl LabelApi for MockApi {
    async fn list_images(&self) -> Result<Vec<ImageDescriptor>> {
        self.record("list_images");
        let state = self.state.lock().unwrap();
        if state.catalog_down {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        Ok(state.images.clone())
    }

    async fn fetch_image(&self, path: &str) -> Result<Vec<u8>> {
        self.record("fetch_image");
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Let other queued fetches start before this one completes
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let bytes = self.state.lock().unwrap().image_bytes.get(path).cloned();
        bytes.ok_or_else(|| server_error(404, &format!("Image not found: {}", path)))
    }

    async fn list_labels(&self) -> Result<Vec<LabelRecord>> {
        self.record("list_labels");
        Ok(self.state.lock().unwrap().labels.values().cloned().collect())
    }

    async fn get_label(&self, path: &str) -> Result<Option<LabelRecord>> {
        self.record("get_label");
        Ok(self.state.lock().unwrap().labels.get(path).cloned())
    }

    async fn save_label(&self, upsert: &LabelUpsert) -> Result<()> {
        self.record("save_label");
        upsert
            .validate()
            .map_err(|e| server_error(400, &e.to_string()))?;

        let (reconstruction, reconstruction_scores) = upsert.normalized();
        let record = LabelRecord {
            file_path: upsert.file_path.clone(),
            file_name: upsert.file_name.clone(),
            reconstruction,
            reconstruction_scores,
            labeler_name: upsert.labeler_name.trim().to_string(),
            notes: upsert.normalized_notes(),
            updated_at: Utc::now(),
        };
        self.state
            .lock()
            .unwrap()
            .labels
            .insert(record.file_path.clone(), record);
        Ok(())
    }

    async fn delete_label(&self, path: &str) -> Result<()> {
        self.record("delete_label");
        match self.state.lock().unwrap().labels.remove(path) {
            Some(_) => Ok(()),
            None => Err(server_error(404, "Label not found")),
        }
    }

    async fn export_labels(&self) -> Result<String> {
        self.record("export_labels");
        let state = self.state.lock().unwrap();
        let mut csv = String::from("File,Path,Reconstruction,Scores,Labeler,Notes,Updated\n");
        for label in state.labels.values() {
            csv.push_str(&format!(
                "{},{},{},{},{},-,{}\n",
                label.file_name,
                label.file_path,
                label.reconstruction_summary(),
                label.scores_summary(),
                label.labeler_name,
                label.updated_at.to_rfc3339()
            ));
        }
        Ok(csv)
    }

    async fn list_comparisons(&self) -> Result<Vec<PairwiseComparisonRecord>> {
        self.record("list_comparisons");
        let state = self.state.lock().unwrap();
        if state.comparison_list_down {
            return Err(server_error(500, "database is locked"));
        }
        Ok(state.comparisons.clone())
    }

    async fn create_comparison(
        &self,
        create: &PairwiseCreate,
    ) -> Result<PairwiseComparisonRecord> {
        self.record("create_comparison");
        create
            .validate()
            .map_err(|e| server_error(400, &e.to_string()))?;

        let mut state = self.state.lock().unwrap();
        if state.failing_tags.contains(&create.reconstruction_type) {
            return Err(server_error(500, "database is locked"));
        }

        let record = PairwiseComparisonRecord {
            id: state.next_id,
            image1_path: create.image1_path.clone(),
            image1_name: create.image1_name.clone(),
            image2_path: create.image2_path.clone(),
            image2_name: create.image2_name.clone(),
            reconstruction_type: create.reconstruction_type.clone(),
            winner: create.winner,
            labeler_name: create.labeler_name.clone(),
            notes: create.notes.clone(),
            created_at: Utc::now(),
        };
        state.next_id += 1;
        state.comparisons.push(record.clone());
        Ok(record)
    }

    async fn delete_comparison(&self, id: i64) -> Result<()> {
        self.record("delete_comparison");
        let mut state = self.state.lock().unwrap();
        let before = state.comparisons.len();
        state.comparisons.retain(|c| c.id != id);
        if state.comparisons.len() == before {
            return Err(server_error(404, "Comparison not found"));
        }
        Ok(())
    }

    async fn export_comparisons(&self) -> Result<String> {
        self.record("export_comparisons");
        let state = self.state.lock().unwrap();
        let mut csv =
            String::from("Image 1,Image 2,Reconstruction Type,Winner,Labeler,Notes,Created\n");
        for c in &state.comparisons {
            csv.push_str(&format!(
                "{},{},{},{},{},-,{}\n",
                c.image1_name,
                c.image2_name,
                c.reconstruction_type,
                c.winner,
                c.labeler_name,
                c.created_at.to_rfc3339()
            ));
        }
        Ok(csv)
    }
}

/// Records notifications; answers every confirmation with `answer`
pub struct RecordingPrompt {
    pub answer: bool,
    notices: Mutex<Vec<String>>,
    questions: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            notices: Mutex::new(Vec::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Prompt for RecordingPrompt {
    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().unwrap().push(question.to_string());
        self.answer
    }
}

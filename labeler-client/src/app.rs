//! Application state and action dispatch
//!
//! All session state lives in one owned [`AppState`]. The UI layer sends
//! [`Action`]s to [`App::dispatch`], which talks to the server through
//! [`LabelApi`] and updates the state; views are derived from the state on
//! demand ([`AppState::grid_page`], the table rows).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use labeler_common::{ImageDescriptor, LabelRecord, PairwiseComparisonRecord, Winner};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::absolute::AbsoluteSession;
use crate::api::LabelApi;
use crate::display::Brightness;
use crate::error::{ClientError, Result, ValidationError};
use crate::export::{export_csv, ResultsTab};
use crate::grid::{
    fetch_images, filter_catalog, render_page, Filter, GridPage, GridState, LoadState,
    EAGER_LOAD_COUNT,
};
use crate::pairwise::{draw_pair, save_judgments, PairwiseSession};
use crate::pagination::PAGE_SIZE;
use crate::prompt::Prompt;
use crate::store::{ComparisonList, LabelStore};

/// Which labeling view is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Absolute,
    Pairwise,
}

/// Everything the client knows during a browsing session
#[derive(Debug, Default)]
pub struct AppState {
    pub catalog: Vec<ImageDescriptor>,
    pub labels: LabelStore,
    pub comparisons: ComparisonList,
    pub grid: GridState,
    /// Load state of every image requested so far
    pub images: HashMap<String, LoadState>,
    pub mode: Mode,
    pub absolute: AbsoluteSession,
    pub pairwise: PairwiseSession,
    pub results_tab: ResultsTab,
    pub last_export: Option<PathBuf>,
}

impl AppState {
    pub fn new(page_size: usize) -> Self {
        Self {
            grid: GridState::new(page_size),
            ..Default::default()
        }
    }

    pub fn find_image(&self, path: &str) -> Option<&ImageDescriptor> {
        self.catalog.iter().find(|image| image.path == path)
    }

    pub fn total_pages(&self) -> usize {
        let filtered = filter_catalog(&self.catalog, &self.labels, self.grid.filter).len();
        self.grid.pagination(filtered).total_pages
    }

    pub fn grid_page(&self) -> GridPage {
        render_page(
            &self.catalog,
            &self.labels,
            &self.grid,
            &self.images,
            self.absolute.selected_path(),
        )
    }

    /// Label table rows, most recently updated first
    pub fn label_rows(&self) -> Vec<&LabelRecord> {
        self.labels.table_rows()
    }

    /// Comparison table rows, newest first
    pub fn comparison_rows(&self) -> &[PairwiseComparisonRecord] {
        self.comparisons.rows()
    }
}

/// User intents
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RefreshLabels,
    RefreshComparisons,

    SetFilter(Filter),
    NextPage,
    PrevPage,
    /// Cells that entered the viewport margin
    CellsVisible(Vec<String>),

    SelectImage(String),
    ToggleTag(String),
    SetScore { tag: String, score: i32 },
    SetNotes(String),
    SetLabelerName(String),
    SetBrightness(i32),
    SaveLabel,
    ClearLabel,
    DeleteLabel(String),

    SetMode(Mode),
    DrawPair,
    Judge { tag: String, winner: Winner },
    ClearJudgment(String),
    SetPairwiseNotes(String),
    SetPairwiseLabelerName(String),
    /// `side` 0 is the first image of the pair, 1 the second
    SetPairBrightness { side: usize, percent: i32 },
    SavePairwise,
    SavePairwiseAndAdvance,
    ClearPairwise,
    DeleteComparison(i64),

    SelectResultsTab(ResultsTab),
    /// Write the active tab's CSV into this directory
    Export(PathBuf),
}

/// Annotation client: owned state plus its collaborators
pub struct App<A, P> {
    api: A,
    prompt: P,
    rng: StdRng,
    state: AppState,
}

impl<A: LabelApi, P: Prompt> App<A, P> {
    pub fn new(api: A, prompt: P) -> Self {
        Self::with_rng(api, prompt, StdRng::from_entropy())
    }

    /// Construct with a fixed RNG for reproducible pair draws
    pub fn with_rng(api: A, prompt: P, rng: StdRng) -> Self {
        Self {
            api,
            prompt,
            rng,
            state: AppState::new(PAGE_SIZE),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.state.grid = GridState::new(page_size);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Load the catalog, labels and comparisons, then render the first page
    ///
    /// A catalog failure leaves the catalog empty and is only logged.
    pub async fn start(&mut self) {
        match self.api.list_images().await {
            Ok(images) => {
                info!("Loaded catalog of {} images", images.len());
                self.state.catalog = images;
            }
            Err(e) => {
                warn!("Failed to load image catalog: {}", e);
                self.state.catalog.clear();
            }
        }

        if let Err(e) = self.reload_labels().await {
            self.report(&e);
        }
        if let Err(e) = self.reload_comparisons().await {
            self.report(&e);
        }

        self.render().await;
    }

    /// Apply one action
    ///
    /// Errors are logged and shown through the prompt before being returned.
    pub async fn dispatch(&mut self, action: Action) -> Result<()> {
        debug!(?action, "Dispatching");
        let result = self.apply(action).await;
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    fn report(&self, err: &ClientError) {
        match err {
            ClientError::Validation(_) => warn!("{}", err),
            _ => error!("{}", err),
        }
        self.prompt.notify(&err.to_string());
    }

    async fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::RefreshLabels => {
                self.reload_labels().await?;
                self.render().await;
            }
            Action::RefreshComparisons => self.reload_comparisons().await?,

            Action::SetFilter(filter) => {
                self.state.grid.set_filter(filter);
                self.render().await;
            }
            Action::NextPage => {
                let total_pages = self.state.total_pages();
                self.state.grid.next_page(total_pages);
                self.render().await;
            }
            Action::PrevPage => {
                self.state.grid.prev_page();
                self.render().await;
            }
            Action::CellsVisible(paths) => self.load_images(paths).await,

            Action::SelectImage(path) => self.select_image(&path).await?,
            Action::ToggleTag(tag) => {
                self.state.absolute.draft.toggle_tag(&tag);
            }
            Action::SetScore { tag, score } => {
                self.state.absolute.draft.set_score(&tag, score);
            }
            Action::SetNotes(notes) => self.state.absolute.draft.notes = notes,
            Action::SetLabelerName(name) => self.state.absolute.labeler_name = name,
            Action::SetBrightness(percent) => {
                self.state.absolute.brightness = Brightness::new(percent)
            }
            Action::SaveLabel => self.save_label().await?,
            Action::ClearLabel => self.state.absolute.clear(),
            Action::DeleteLabel(path) => self.delete_label(&path).await?,

            Action::SetMode(mode) => self.set_mode(mode)?,
            Action::DrawPair => {
                let pair = draw_pair(&self.state.catalog, &mut self.rng)?;
                self.state.pairwise.set_pair(pair);
            }
            Action::Judge { tag, winner } => self.state.pairwise.judge(&tag, winner),
            Action::ClearJudgment(tag) => self.state.pairwise.unjudge(&tag),
            Action::SetPairwiseNotes(notes) => self.state.pairwise.notes = notes,
            Action::SetPairwiseLabelerName(name) => self.state.pairwise.labeler_name = name,
            Action::SetPairBrightness { side, percent } => {
                if let Some(slot) = self.state.pairwise.brightness.get_mut(side) {
                    *slot = Brightness::new(percent);
                }
            }
            Action::SavePairwise => self.save_pairwise(false).await?,
            Action::SavePairwiseAndAdvance => self.save_pairwise(true).await?,
            Action::ClearPairwise => self.state.pairwise.clear(),
            Action::DeleteComparison(id) => self.delete_comparison(id).await?,

            Action::SelectResultsTab(tab) => self.state.results_tab = tab,
            Action::Export(dir) => {
                let path = export_csv(&self.api, self.state.results_tab, &dir).await?;
                self.state.last_export = Some(path);
            }
        }
        Ok(())
    }

    async fn reload_labels(&mut self) -> Result<()> {
        let records = self.api.list_labels().await?;
        debug!("Label store refreshed: {} records", records.len());
        self.state.labels.replace_all(records);
        Ok(())
    }

    async fn reload_comparisons(&mut self) -> Result<()> {
        let records = self.api.list_comparisons().await?;
        debug!("Comparison list refreshed: {} records", records.len());
        self.state.comparisons.replace_all(records);
        Ok(())
    }

    /// Re-clamp the page and force-load the first cells of it
    async fn render(&mut self) {
        let total_pages = self.state.total_pages();
        self.state.grid.clamp(total_pages);

        let eager: Vec<String> = self
            .state
            .grid_page()
            .cells
            .into_iter()
            .take(EAGER_LOAD_COUNT)
            .filter(|cell| cell.load.is_pending())
            .map(|cell| cell.path)
            .collect();
        self.load_images(eager).await;
    }

    /// Fetch bytes for catalog images not yet loaded or failed
    async fn load_images(&mut self, paths: Vec<String>) {
        let mut seen = HashSet::new();
        let wanted: Vec<String> = paths
            .into_iter()
            .filter(|path| {
                self.state.find_image(path).is_some()
                    && self
                        .state
                        .images
                        .get(path)
                        .map_or(true, LoadState::is_pending)
                    && seen.insert(path.clone())
            })
            .collect();
        if wanted.is_empty() {
            return;
        }

        for (path, load) in fetch_images(&self.api, wanted).await {
            self.state.images.insert(path, load);
        }
    }

    async fn select_image(&mut self, path: &str) -> Result<()> {
        let image = self
            .state
            .find_image(path)
            .cloned()
            .ok_or(ValidationError::NoImageSelected)?;

        self.state.mode = Mode::Absolute;
        self.state.absolute.begin_loading(image);

        match self.api.get_label(path).await {
            Ok(record) => self.state.absolute.finish_loading(record.as_ref()),
            Err(e) => {
                warn!(path = %path, "Could not load label, starting empty: {}", e);
                self.state.absolute.finish_loading(None);
            }
        }

        self.load_images(vec![path.to_string()]).await;
        Ok(())
    }

    async fn save_label(&mut self) -> Result<()> {
        let upsert = self.state.absolute.begin_save()?;
        let saved = self.api.save_label(&upsert).await;
        self.state.absolute.finish_save();
        saved?;

        info!(file_path = %upsert.file_path, "Label saved");
        self.reload_labels().await?;
        self.render().await;
        Ok(())
    }

    async fn delete_label(&mut self, path: &str) -> Result<()> {
        if !self
            .prompt
            .confirm(&format!("Delete the label for {}?", path))
        {
            return Ok(());
        }

        self.api.delete_label(path).await?;
        info!(file_path = %path, "Label deleted");

        self.state.labels.remove(path);
        if self.state.absolute.selected_path() == Some(path) {
            self.state.absolute.deselect();
        }
        self.render().await;
        Ok(())
    }

    fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.state.mode = mode;
        if mode == Mode::Pairwise && self.state.pairwise.pair.is_none() {
            let pair = draw_pair(&self.state.catalog, &mut self.rng)?;
            self.state.pairwise.set_pair(pair);
        }
        Ok(())
    }

    async fn save_pairwise(&mut self, advance: bool) -> Result<()> {
        let requests = self.state.pairwise.build_requests()?;
        let outcome = save_judgments(&self.api, &requests).await;

        // Some records may exist even when the batch failed
        let refreshed = self.reload_comparisons().await;
        if let Err(e) = outcome {
            if let Err(refresh_err) = &refreshed {
                self.report(refresh_err);
            }
            return Err(e);
        }

        if advance {
            let pair = draw_pair(&self.state.catalog, &mut self.rng)?;
            self.state.pairwise.set_pair(pair);
        } else {
            self.state.pairwise.clear();
        }
        refreshed
    }

    async fn delete_comparison(&mut self, id: i64) -> Result<()> {
        if !self
            .prompt
            .confirm(&format!("Delete comparison #{}?", id))
        {
            return Ok(());
        }

        self.api.delete_comparison(id).await?;
        info!(id, "Comparison deleted");

        self.state.comparisons.remove(id);
        self.reload_comparisons().await
    }
}

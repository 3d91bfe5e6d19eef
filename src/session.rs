use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use serde_json::Value;

use crate::client::{DatasetClient, PreviewPage, Row};
use crate::config::ResolvedConfig;
use crate::domain::{Dataset, Tag};
use crate::download::{
    DownloadCoordinator, DownloadOutcome, DownloadSink, DownloadState, FileSaver, Rejected,
};
use crate::filter::{FilterStore, TagIndex};
use crate::lifecycle::RequestLine;
use crate::listeners::Subscription;
use crate::query;
use crate::suggest::{
    Applied, DEFAULT_QUIET_INTERVAL, DEFAULT_REQUEST_TIMEOUT, SuggestState, SuggestionEngine,
};
use crate::worker::{Completion, Job, Worker};

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub suggest_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_QUIET_INTERVAL,
            suggest_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl From<&ResolvedConfig> for SessionSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            debounce: config.debounce,
            suggest_timeout: config.suggest_timeout,
        }
    }
}

/// What a call to [`Explorer::tick`] changed, for the activity log.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PreviewLoaded { rows: usize, has_more: bool },
    PreviewFailed(String),
    SuggestionsLoaded { facet: String, count: usize },
    SuggestionsFailed { facet: String, message: String },
    SuggestionsExpired { facet: String },
    Download(DownloadOutcome),
}

/// One interactive exploration of a dataset.
///
/// Everything here lives on the event loop thread. Network calls go to the
/// worker and come back through [`tick`](Self::tick); only responses for the
/// newest request of each line are applied.
pub struct Explorer<C: DatasetClient + 'static> {
    dataset: Dataset,
    store: FilterStore,
    engines: Vec<SuggestionEngine>,
    preview_due: Rc<Cell<bool>>,
    _store_watch: Subscription,
    preview_line: RequestLine,
    page: PreviewPage,
    notice: Option<String>,
    column_filters: IndexMap<String, String>,
    downloads: DownloadCoordinator,
    saver: Box<dyn FileSaver>,
    worker: Worker<C>,
}

impl<C: DatasetClient + 'static> Explorer<C> {
    pub fn new(
        client: Arc<C>,
        dataset: Dataset,
        settings: SessionSettings,
        saver: Box<dyn FileSaver>,
    ) -> Self {
        let store = FilterStore::new();
        // The unfiltered page is loaded on the first tick.
        let preview_due = Rc::new(Cell::new(true));
        let due = Rc::clone(&preview_due);
        let store_watch = store.subscribe(move |_| due.set(true));
        let engines = dataset
            .free_text_facets()
            .map(|facet| {
                SuggestionEngine::with_timing(facet.key, settings.debounce, settings.suggest_timeout)
            })
            .collect();

        Self {
            dataset,
            store,
            engines,
            preview_due,
            _store_watch: store_watch,
            preview_line: RequestLine::new(),
            page: PreviewPage::default(),
            notice: None,
            column_filters: IndexMap::new(),
            downloads: DownloadCoordinator::new(),
            saver,
            worker: Worker::new(client),
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    pub fn page(&self) -> &PreviewPage {
        &self.page
    }

    /// Passive message left by the last failed preview.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn preview_loading(&self) -> bool {
        self.preview_line.in_flight().is_some()
    }

    pub fn engines(&self) -> &[SuggestionEngine] {
        &self.engines
    }

    pub fn engine(&self, facet: &str) -> Option<&SuggestionEngine> {
        self.engines.iter().find(|engine| engine.facet() == facet)
    }

    pub fn download_state(&self) -> DownloadState {
        self.downloads.state()
    }

    pub fn last_download(&self) -> Option<&DownloadOutcome> {
        self.downloads.last_outcome()
    }

    pub fn can_download(&self) -> bool {
        self.downloads.can_download(&self.store)
    }

    pub fn query_string(&self) -> String {
        query::serialize(self.store.state())
    }

    pub fn toggle(&mut self, facet: &str, value: &str, checked: bool) {
        self.store.toggle_value(facet, value, checked);
    }

    pub fn remove_tag(&mut self, facet: &str, index: TagIndex) {
        self.store.remove_tag(facet, index);
    }

    pub fn type_char(&mut self, facet: &str, ch: char, now: Instant) {
        if let Some(engine) = self.engine_mut(facet) {
            engine.push_char(ch, now);
        }
    }

    pub fn set_text(&mut self, facet: &str, text: &str, now: Instant) {
        if let Some(engine) = self.engine_mut(facet) {
            engine.input(text, now);
        }
    }

    pub fn backspace(&mut self, facet: &str, now: Instant) {
        let Some(engine) = self.engines.iter_mut().find(|engine| engine.facet() == facet) else {
            return;
        };
        engine.backspace(&mut self.store, now);
    }

    pub fn highlight_next(&mut self, facet: &str) {
        if let Some(engine) = self.engine_mut(facet) {
            engine.move_down();
        }
    }

    pub fn highlight_previous(&mut self, facet: &str) {
        if let Some(engine) = self.engine_mut(facet) {
            engine.move_up();
        }
    }

    pub fn accept(&mut self, facet: &str) -> Option<Tag> {
        let engine = self.engines.iter_mut().find(|engine| engine.facet() == facet)?;
        engine.accept(&mut self.store)
    }

    pub fn accept_at(&mut self, facet: &str, index: usize) -> Option<Tag> {
        let engine = self.engines.iter_mut().find(|engine| engine.facet() == facet)?;
        engine.accept_at(index, &mut self.store)
    }

    /// Narrows the displayed rows to those whose `column` contains `term`,
    /// ignoring case. An empty term drops the column's filter.
    pub fn local_filter(&mut self, column: &str, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.column_filters.shift_remove(column);
        } else {
            self.column_filters
                .insert(column.to_string(), term.to_lowercase());
        }
    }

    pub fn column_filter(&self, column: &str) -> Option<&str> {
        self.column_filters.get(column).map(String::as_str)
    }

    pub fn clear_filters(&mut self) {
        self.column_filters.clear();
        self.store.clear();
    }

    pub fn visible_rows(&self) -> Vec<&Row> {
        self.page
            .rows
            .iter()
            .filter(|row| {
                self.column_filters.iter().all(|(column, term)| {
                    row.get(column)
                        .map(|value| cell_text(value).to_lowercase().contains(term.as_str()))
                        .unwrap_or(false)
                })
            })
            .collect()
    }

    pub fn request_download(
        &mut self,
        now: DateTime<Local>,
        sink: &dyn DownloadSink,
    ) -> Result<(), Rejected> {
        let request = self.downloads.begin(&self.store, self.dataset, now, sink)?;
        self.worker.spawn(Job::Download {
            dataset: request.dataset,
            query: request.query_string,
        });
        Ok(())
    }

    /// Earliest armed debounce deadline, so the caller knows how long it may
    /// block waiting for input.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.engines.iter().filter_map(SuggestionEngine::deadline).min()
    }

    pub fn tick(&mut self, now: Instant, sink: &dyn DownloadSink) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for engine in &mut self.engines {
            if engine.expire(now) {
                events.push(SessionEvent::SuggestionsExpired {
                    facet: engine.facet().to_string(),
                });
            }
            if let Some(request) = engine.poll(now) {
                self.worker.spawn(Job::Suggest {
                    facet: request.facet,
                    ticket: request.ticket,
                    dataset: self.dataset,
                    text: request.text,
                });
            }
        }

        if self.preview_due.replace(false) {
            self.issue_preview();
        }

        while let Some(completion) = self.worker.try_recv() {
            events.extend(self.apply(completion, sink));
        }
        events
    }

    /// Blocks up to `timeout` for the next completion, then applies it and
    /// anything else already waiting.
    pub fn settle(&mut self, timeout: Duration, sink: &dyn DownloadSink) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let Some(completion) = self.worker.recv_timeout(timeout) {
            events.extend(self.apply(completion, sink));
        }
        while let Some(completion) = self.worker.try_recv() {
            events.extend(self.apply(completion, sink));
        }
        events
    }

    fn issue_preview(&mut self) {
        let ticket = self.preview_line.issue();
        let query = query::serialize(self.store.state());
        tracing::debug!(
            dataset = self.dataset.slug(),
            ticket = ticket.sequence(),
            query = %query,
            "preview requested"
        );
        self.worker.spawn(Job::Preview {
            ticket,
            dataset: self.dataset,
            query,
        });
    }

    fn apply(&mut self, completion: Completion, sink: &dyn DownloadSink) -> Option<SessionEvent> {
        match completion {
            Completion::Preview { ticket, result } => {
                if !self.preview_line.settle(ticket) {
                    return None;
                }
                match result {
                    Ok(page) => {
                        self.notice = None;
                        let event = SessionEvent::PreviewLoaded {
                            rows: page.rows.len(),
                            has_more: page.has_more,
                        };
                        self.page = page;
                        Some(event)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "preview request failed");
                        let message = format!("Preview unavailable: {err}");
                        self.notice = Some(message.clone());
                        Some(SessionEvent::PreviewFailed(message))
                    }
                }
            }
            Completion::Suggest {
                facet,
                ticket,
                result,
            } => {
                let engine = self.engine_mut(&facet)?;
                if engine.complete(ticket, result) == Applied::Stale {
                    return None;
                }
                match engine.state() {
                    SuggestState::Failed(message) => {
                        Some(SessionEvent::SuggestionsFailed {
                            facet,
                            message: message.clone(),
                        })
                    }
                    _ => Some(SessionEvent::SuggestionsLoaded {
                        count: engine.suggestions().len(),
                        facet,
                    }),
                }
            }
            Completion::Download { result } => self
                .downloads
                .finish(result, self.saver.as_ref(), sink)
                .map(SessionEvent::Download),
        }
    }

    fn engine_mut(&mut self, facet: &str) -> Option<&mut SuggestionEngine> {
        self.engines.iter_mut().find(|engine| engine.facet() == facet)
    }
}

/// Text shown for a cell; strings unquoted, everything else as JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;

use crate::client::{DatasetClient, DownloadBlob};
use crate::domain::Dataset;
use crate::error::GridError;
use crate::filter::FilterStore;
use crate::query;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    Idle,
    Requesting,
    Waiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub path: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: usize,
}

/// How the last cycle ended; the coordinator is idle again either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DownloadOutcome {
    Saved(SavedFile),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub dataset: Dataset,
    pub query_string: String,
    pub requested_at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// Downloads need at least one active filter.
    NoFilters,
    /// A download is already in flight; the request is ignored, not queued.
    InFlight,
}

pub trait DownloadSink {
    fn transition(&self, state: DownloadState);
}

/// The client-side "save as" step.
pub trait FileSaver {
    fn save(&self, file_name: &str, blob: &DownloadBlob) -> Result<SavedFile, GridError>;
}

/// `<DATASET>_<year>-<month>-<day>.csv`, month and day without padding.
pub fn download_file_name(dataset: Dataset, date: NaiveDate) -> String {
    format!(
        "{}_{}-{}-{}.csv",
        dataset.slug().to_uppercase(),
        date.year(),
        date.month(),
        date.day()
    )
}

/// Saves downloads into one directory. The file appears under its final name
/// only once fully written.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: Utf8PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: Utf8PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, file_name: &str, blob: &DownloadBlob) -> Result<SavedFile, GridError> {
        fs::create_dir_all(self.dir.as_std_path())
            .map_err(|err| GridError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix("laborgrid-download")
            .tempfile_in(self.dir.as_std_path())
            .map_err(|err| GridError::Filesystem(err.to_string()))?;
        temp.write_all(&blob.bytes)
            .map_err(|err| GridError::Filesystem(err.to_string()))?;
        let path = self.dir.join(file_name);
        temp.persist(path.as_std_path())
            .map_err(|err| GridError::Filesystem(err.to_string()))?;
        Ok(SavedFile {
            path: path.to_string(),
            file_name: file_name.to_string(),
            content_type: blob.content_type.clone(),
            bytes: blob.bytes.len(),
        })
    }
}

/// Sequences one download at a time: Idle -> Requesting -> Waiting -> Idle.
#[derive(Debug)]
pub struct DownloadCoordinator {
    state: DownloadState,
    pending: Option<DownloadRequest>,
    last: Option<DownloadOutcome>,
}

impl DownloadCoordinator {
    pub fn new() -> Self {
        Self {
            state: DownloadState::Idle,
            pending: None,
            last: None,
        }
    }

    pub fn state(&self) -> DownloadState {
        self.state
    }

    pub fn last_outcome(&self) -> Option<&DownloadOutcome> {
        self.last.as_ref()
    }

    pub fn pending(&self) -> Option<&DownloadRequest> {
        self.pending.as_ref()
    }

    /// Whether the download action should be offered at all.
    pub fn can_download(&self, store: &FilterStore) -> bool {
        self.state == DownloadState::Idle && !store.is_empty()
    }

    pub fn begin(
        &mut self,
        store: &FilterStore,
        dataset: Dataset,
        now: DateTime<Local>,
        sink: &dyn DownloadSink,
    ) -> Result<DownloadRequest, Rejected> {
        if self.state != DownloadState::Idle {
            tracing::debug!("download already in flight; request ignored");
            return Err(Rejected::InFlight);
        }
        if store.is_empty() {
            return Err(Rejected::NoFilters);
        }

        self.set_state(DownloadState::Requesting, sink);
        let request = DownloadRequest {
            dataset,
            query_string: query::serialize(store.state()),
            requested_at: now,
        };
        tracing::info!(
            dataset = dataset.slug(),
            query = %request.query_string,
            "download requested"
        );
        self.pending = Some(request.clone());
        self.set_state(DownloadState::Waiting, sink);
        Ok(request)
    }

    /// Completes the cycle started by [`begin`](Self::begin). Returns `None`
    /// when nothing was waiting.
    pub fn finish(
        &mut self,
        result: Result<DownloadBlob, GridError>,
        saver: &dyn FileSaver,
        sink: &dyn DownloadSink,
    ) -> Option<DownloadOutcome> {
        if self.state != DownloadState::Waiting {
            return None;
        }
        let request = self.pending.take()?;
        let file_name = download_file_name(request.dataset, request.requested_at.date_naive());

        let outcome = match result.and_then(|blob| saver.save(&file_name, &blob)) {
            Ok(saved) => {
                tracing::info!(path = %saved.path, bytes = saved.bytes, "download saved");
                DownloadOutcome::Saved(saved)
            }
            Err(err) => {
                tracing::error!(error = %err, file_name = %file_name, "download failed");
                DownloadOutcome::Failed {
                    message: format!("Download failed: {err}"),
                }
            }
        };
        self.last = Some(outcome.clone());
        self.set_state(DownloadState::Idle, sink);
        Some(outcome)
    }

    /// One full blocking cycle against `client`.
    pub fn run<C: DatasetClient + ?Sized>(
        &mut self,
        client: &C,
        store: &FilterStore,
        dataset: Dataset,
        saver: &dyn FileSaver,
        sink: &dyn DownloadSink,
    ) -> Result<DownloadOutcome, Rejected> {
        let request = self.begin(store, dataset, Local::now(), sink)?;
        let result = client.download(request.dataset, &request.query_string);
        self.finish(result, saver, sink).ok_or(Rejected::InFlight)
    }

    fn set_state(&mut self, state: DownloadState, sink: &dyn DownloadSink) {
        self.state = state;
        sink.transition(state);
    }
}

impl Default for DownloadCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

use std::cell::RefCell;
use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use chrono::{Datelike, Local};
use serde_json::json;

use laborgrid::app::{App, build_store};
use laborgrid::client::{DatasetClient, DownloadBlob, PreviewPage, Row};
use laborgrid::domain::{Dataset, FilterArg};
use laborgrid::download::{DirectorySaver, DownloadOutcome, DownloadSink, DownloadState};
use laborgrid::error::GridError;
use laborgrid::filter::FilterStore;
use laborgrid::output::JsonOutput;
use laborgrid::query;

#[derive(Default)]
struct MockClient {
    queries: Mutex<Vec<String>>,
    fail_download: bool,
}

impl DatasetClient for MockClient {
    fn preview(&self, _dataset: Dataset, query: &str) -> Result<PreviewPage, GridError> {
        self.queries.lock().unwrap().push(query.to_string());
        let mut row = Row::new();
        row.insert("area".to_string(), json!("Ohio"));
        row.insert("value".to_string(), json!("4.9"));
        Ok(PreviewPage {
            rows: vec![row],
            has_more: true,
        })
    }

    fn suggest(&self, _dataset: Dataset, text: &str) -> Result<Vec<String>, GridError> {
        self.queries.lock().unwrap().push(format!("geo={text}"));
        Ok(vec!["Ohio".to_string()])
    }

    fn download(&self, _dataset: Dataset, query: &str) -> Result<DownloadBlob, GridError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail_download {
            return Err(GridError::HttpStatus {
                status: 500,
                message: "export failed".to_string(),
            });
        }
        Ok(DownloadBlob {
            content_type: "text/csv".to_string(),
            bytes: b"area,measure_type\nOhio,Unemployment\n".to_vec(),
        })
    }
}

#[derive(Default)]
struct Recorder {
    states: RefCell<Vec<DownloadState>>,
}

impl DownloadSink for Recorder {
    fn transition(&self, state: DownloadState) {
        self.states.borrow_mut().push(state);
    }
}

fn saver(temp: &tempfile::TempDir) -> DirectorySaver {
    DirectorySaver::new(Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap())
}

#[test]
fn toggle_serialize_download_end_to_end() {
    let temp = tempfile::tempdir().unwrap();
    let mut store = FilterStore::new();
    store.toggle_value("measure_type", "Unemployment", true);
    assert_eq!(query::serialize(store.state()), "measure_type=Unemployment");

    let app = App::new(MockClient::default());
    let sink = Recorder::default();
    let result = app
        .download(Dataset::Laus, &store, &saver(&temp), &sink)
        .unwrap();

    assert_eq!(
        *sink.states.borrow(),
        vec![
            DownloadState::Requesting,
            DownloadState::Waiting,
            DownloadState::Idle
        ]
    );
    let today = Local::now().date_naive();
    let expected = format!("LAUS_{}-{}-{}.csv", today.year(), today.month(), today.day());
    assert_matches!(&result.outcome, DownloadOutcome::Saved(saved) => {
        assert_eq!(saved.file_name, expected);
        assert!(temp.path().join(&expected).exists());
    });
    assert_eq!(result.query, "measure_type=Unemployment");
}

#[test]
fn download_without_filters_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let app = App::new(MockClient::default());
    let err = app
        .download(Dataset::Unemp, &FilterStore::new(), &saver(&temp), &JsonOutput)
        .unwrap_err();
    assert_matches!(err, GridError::NoActiveFilters);
}

#[test]
fn failed_download_reports_message_and_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let client = MockClient {
        fail_download: true,
        ..MockClient::default()
    };
    let store = build_store(
        Dataset::Laus,
        None,
        &["area_type=Statewide".parse::<FilterArg>().unwrap()],
    )
    .unwrap();
    let result = App::new(client)
        .download(Dataset::Laus, &store, &saver(&temp), &JsonOutput)
        .unwrap();
    assert_matches!(result.outcome, DownloadOutcome::Failed { message } => {
        assert!(message.starts_with("Download failed"));
        assert!(message.contains("500"));
    });
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn preview_sends_serialized_filters() {
    let client = MockClient::default();
    let store = build_store(
        Dataset::Laus,
        Some("area=New%20York"),
        &["seasonality_enum=Seasonally Adjusted".parse().unwrap()],
    )
    .unwrap();
    let app = App::new(client);
    let result = app.preview(Dataset::Laus, &store).unwrap();
    assert_eq!(
        result.query,
        "area=New%20York&seasonality_enum=Seasonally%20Adjusted"
    );
    assert_eq!(result.row_count, 1);
    assert!(result.has_more);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["dataset"], "laus");
    assert_eq!(json["rows"][0]["area"], "Ohio");
}

#[test]
fn blank_suggest_text_skips_the_server() {
    let client = MockClient::default();
    let app = App::new(client);
    let result = app.suggest(Dataset::Laus, "   ").unwrap();
    assert!(result.suggestions.is_empty());

    let result = app.suggest(Dataset::Laus, " Oh ").unwrap();
    assert_eq!(result.text, "Oh");
    assert_eq!(result.suggestions, vec!["Ohio"]);
}

#[test]
fn query_result_serializes_filters_in_selection_order() {
    let store = build_store(
        Dataset::Unemp,
        None,
        &[
            "measure_type=All Employees".parse().unwrap(),
            "area=Ohio".parse().unwrap(),
            "measure_type=Average Weekly Hours".parse().unwrap(),
        ],
    )
    .unwrap();
    let result = App::new(MockClient::default()).query(&store);
    assert_eq!(
        result.query,
        "measure_type=All%20Employees|Average%20Weekly%20Hours&area=Ohio"
    );
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json["filters"],
        json!({
            "measure_type": ["All Employees", "Average Weekly Hours"],
            "area": ["Ohio"]
        })
    );
}

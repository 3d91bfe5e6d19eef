use std::cell::RefCell;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;

use laborgrid::client::{DatasetClient, DownloadBlob, PreviewPage};
use laborgrid::domain::Dataset;
use laborgrid::download::{DirectorySaver, DownloadSink, DownloadState};
use laborgrid::error::GridError;
use laborgrid::session::{Explorer, SessionEvent, SessionSettings};
use laborgrid::suggest::SuggestState;

/// Answers suggestion requests, slowly for the texts listed in `slow`.
#[derive(Default)]
struct SuggestServer {
    calls: Mutex<Vec<String>>,
    slow: Vec<&'static str>,
}

impl DatasetClient for SuggestServer {
    fn preview(&self, _dataset: Dataset, _query: &str) -> Result<PreviewPage, GridError> {
        Ok(PreviewPage::default())
    }

    fn suggest(&self, _dataset: Dataset, text: &str) -> Result<Vec<String>, GridError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.slow.iter().any(|slow| *slow == text) {
            thread::sleep(Duration::from_millis(300));
        }
        Ok(vec![format!("{text} County")])
    }

    fn download(&self, _dataset: Dataset, _query: &str) -> Result<DownloadBlob, GridError> {
        Err(GridError::NetworkFailure("not used".to_string()))
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

fn explorer(server: Arc<SuggestServer>, temp: &tempfile::TempDir) -> Explorer<SuggestServer> {
    let saver = DirectorySaver::new(Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap());
    Explorer::new(
        server,
        Dataset::Laus,
        SessionSettings {
            debounce: Duration::from_millis(500),
            suggest_timeout: Duration::from_secs(10),
        },
        Box::new(saver),
    )
}

fn wait_for_suggestions(explorer: &mut Explorer<SuggestServer>, sink: &Recorder) {
    for _ in 0..20 {
        if explorer.engine("area").map(|engine| engine.state()) != Some(&SuggestState::Pending) {
            return;
        }
        explorer.settle(Duration::from_millis(500), sink);
    }
    panic!("suggestions never arrived");
}

#[test]
fn typing_burst_issues_one_request_with_final_text() {
    let temp = tempfile::tempdir().unwrap();
    let sink = Recorder::default();
    let server = Arc::new(SuggestServer::default());
    let mut explorer = explorer(Arc::clone(&server), &temp);

    let start = Instant::now();
    for (i, ch) in "Cuyahoga".chars().enumerate() {
        let now = start + Duration::from_millis(60 * i as u64);
        explorer.type_char("area", ch, now);
        explorer.tick(now, &sink);
    }
    explorer.tick(start + Duration::from_millis(60 * 7 + 499), &sink);
    assert!(server.calls.lock().unwrap().is_empty());

    explorer.tick(start + Duration::from_millis(60 * 7 + 500), &sink);
    wait_for_suggestions(&mut explorer, &sink);

    assert_eq!(*server.calls.lock().unwrap(), vec!["Cuyahoga"]);
    let engine = explorer.engine("area").unwrap();
    assert_eq!(engine.suggestions(), ["Cuyahoga County".to_string()]);
}

#[test]
fn late_response_for_older_text_is_ignored() {
    let temp = tempfile::tempdir().unwrap();
    let sink = Recorder::default();
    let server = Arc::new(SuggestServer {
        slow: vec!["Ca"],
        ..SuggestServer::default()
    });
    let mut explorer = explorer(Arc::clone(&server), &temp);

    let start = Instant::now();
    explorer.set_text("area", "Ca", start);
    explorer.tick(start + Duration::from_millis(500), &sink);
    explorer.set_text("area", "Cal", start + Duration::from_millis(600));
    explorer.tick(start + Duration::from_millis(1100), &sink);

    wait_for_suggestions(&mut explorer, &sink);
    thread::sleep(Duration::from_millis(400));
    let events = explorer.tick(Instant::now(), &sink);
    assert!(
        !events
            .iter()
            .any(|event| matches!(event, SessionEvent::SuggestionsLoaded { .. }))
    );

    let engine = explorer.engine("area").unwrap();
    assert_eq!(engine.suggestions(), ["Cal County".to_string()]);
    assert_eq!(engine.state(), &SuggestState::Resolved);
}

#[test]
fn failed_download_surfaces_message_and_returns_to_idle() {
    let temp = tempfile::tempdir().unwrap();
    let sink = Recorder::default();
    let mut explorer = explorer(Arc::new(SuggestServer::default()), &temp);
    explorer.toggle("area_type", "Statewide", true);
    explorer.request_download(chrono::Local::now(), &sink).unwrap();

    for _ in 0..20 {
        if explorer.download_state() == DownloadState::Idle {
            break;
        }
        explorer.settle(Duration::from_millis(500), &sink);
    }
    assert_eq!(explorer.download_state(), DownloadState::Idle);
    let message = match explorer.last_download() {
        Some(laborgrid::download::DownloadOutcome::Failed { message }) => message.clone(),
        other => panic!("unexpected outcome {other:?}"),
    };
    assert!(message.contains("not used"));
    assert!(explorer.can_download());
}

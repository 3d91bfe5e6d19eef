//! Runs network jobs off the event loop and hands their results back over a
//! channel. Each job gets its own short-lived thread; ordering is left to the
//! tickets carried by the jobs.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::client::{DatasetClient, DownloadBlob, PreviewPage};
use crate::domain::Dataset;
use crate::error::GridError;
use crate::lifecycle::Ticket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Preview {
        ticket: Ticket,
        dataset: Dataset,
        query: String,
    },
    Suggest {
        facet: String,
        ticket: Ticket,
        dataset: Dataset,
        text: String,
    },
    Download {
        dataset: Dataset,
        query: String,
    },
}

#[derive(Debug)]
pub enum Completion {
    Preview {
        ticket: Ticket,
        result: Result<PreviewPage, GridError>,
    },
    Suggest {
        facet: String,
        ticket: Ticket,
        result: Result<Vec<String>, GridError>,
    },
    Download {
        result: Result<DownloadBlob, GridError>,
    },
}

/// Executes one job synchronously.
pub fn execute<C: DatasetClient + ?Sized>(client: &C, job: Job) -> Completion {
    match job {
        Job::Preview {
            ticket,
            dataset,
            query,
        } => Completion::Preview {
            ticket,
            result: client.preview(dataset, &query),
        },
        Job::Suggest {
            facet,
            ticket,
            dataset,
            text,
        } => Completion::Suggest {
            facet,
            ticket,
            result: client.suggest(dataset, &text),
        },
        Job::Download { dataset, query } => Completion::Download {
            result: client.download(dataset, &query),
        },
    }
}

pub struct Worker<C: DatasetClient + 'static> {
    client: Arc<C>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl<C: DatasetClient + 'static> Worker<C> {
    pub fn new(client: Arc<C>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { client, tx, rx }
    }

    pub fn spawn(&self, job: Job) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let completion = execute(client.as_ref(), job);
            // The receiver is gone only when the session has shut down.
            let _ = tx.send(completion);
        });
    }

    pub fn try_recv(&self) -> Option<Completion> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Completion> {
        match self.rx.recv_timeout(timeout) {
            Ok(completion) => Some(completion),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

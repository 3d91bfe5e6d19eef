use std::time::{Duration, Instant};

use crate::domain::Tag;
use crate::error::GridError;
use crate::filter::{FilterStore, TagIndex};
use crate::lifecycle::{RequestLine, Ticket};

pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestState {
    Idle,
    Pending,
    Resolved,
    Cancelled,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestRequest {
    pub facet: String,
    pub ticket: Ticket,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct DebounceTimer {
    deadline: Instant,
}

/// Typeahead for one free-text facet.
///
/// Keystrokes re-arm a quiet-interval timer; only when the input has been
/// stable for the whole interval does [`poll`](Self::poll) hand out a request.
/// Responses are matched against the newest ticket, so a slow answer for
/// older input never replaces suggestions for newer input.
pub struct SuggestionEngine {
    facet: String,
    quiet: Duration,
    request_timeout: Duration,
    text: String,
    timer: Option<DebounceTimer>,
    line: RequestLine,
    issued_at: Option<Instant>,
    state: SuggestState,
    suggestions: Vec<String>,
    highlighted: Option<usize>,
}

impl SuggestionEngine {
    pub fn new(facet: &str) -> Self {
        Self::with_timing(facet, DEFAULT_QUIET_INTERVAL, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timing(facet: &str, quiet: Duration, request_timeout: Duration) -> Self {
        Self {
            facet: facet.to_string(),
            quiet,
            request_timeout,
            text: String::new(),
            timer: None,
            line: RequestLine::new(),
            issued_at: None,
            state: SuggestState::Idle,
            suggestions: Vec::new(),
            highlighted: None,
        }
    }

    pub fn facet(&self) -> &str {
        &self.facet
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> &SuggestState {
        &self.state
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_value(&self) -> Option<&str> {
        self.highlighted
            .and_then(|index| self.suggestions.get(index))
            .map(String::as_str)
    }

    /// When the armed debounce timer fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.map(|timer| timer.deadline)
    }

    /// Replaces the input text. Current suggestions are dropped, any request
    /// in flight is superseded and the debounce timer restarts.
    pub fn input(&mut self, text: &str, now: Instant) {
        self.text = text.to_string();
        self.suggestions.clear();
        self.highlighted = None;
        self.supersede_in_flight();
        if self.text.trim().is_empty() {
            self.timer = None;
        } else {
            self.timer = Some(DebounceTimer {
                deadline: now + self.quiet,
            });
        }
    }

    pub fn push_char(&mut self, ch: char, now: Instant) {
        let mut text = std::mem::take(&mut self.text);
        text.push(ch);
        self.input(&text, now);
    }

    /// Issues a request once the input has been quiet for the full interval.
    pub fn poll(&mut self, now: Instant) -> Option<SuggestRequest> {
        let timer = self.timer?;
        if now < timer.deadline {
            return None;
        }
        self.timer = None;
        let ticket = self.line.issue();
        self.issued_at = Some(now);
        self.state = SuggestState::Pending;
        tracing::debug!(
            facet = %self.facet,
            ticket = ticket.sequence(),
            text = %self.text,
            "suggestion request issued"
        );
        Some(SuggestRequest {
            facet: self.facet.clone(),
            ticket,
            text: self.text.clone(),
        })
    }

    /// Stops the timer and discards whatever is in flight.
    pub fn cancel(&mut self) {
        self.timer = None;
        self.suggestions.clear();
        self.highlighted = None;
        self.supersede_in_flight();
    }

    pub fn complete(&mut self, ticket: Ticket, result: Result<Vec<String>, GridError>) -> Applied {
        if !self.line.settle(ticket) {
            return Applied::Stale;
        }
        self.issued_at = None;
        self.highlighted = None;
        match result {
            Ok(suggestions) => {
                self.suggestions = suggestions;
                self.state = SuggestState::Resolved;
            }
            Err(err) => {
                tracing::warn!(facet = %self.facet, error = %err, "suggestion request failed");
                self.suggestions.clear();
                self.state = SuggestState::Failed(err.to_string());
            }
        }
        Applied::Current
    }

    /// Abandons a request that has been outstanding longer than the timeout.
    pub fn expire(&mut self, now: Instant) -> bool {
        let Some(issued_at) = self.issued_at else {
            return false;
        };
        if self.line.in_flight().is_none() || now < issued_at + self.request_timeout {
            return false;
        }
        self.line.cancel();
        self.issued_at = None;
        self.suggestions.clear();
        self.state = SuggestState::Failed("suggestion request timed out".to_string());
        tracing::warn!(facet = %self.facet, "suggestion request timed out");
        true
    }

    pub fn move_up(&mut self) {
        if let Some(index) = self.highlighted {
            if index > 0 {
                self.highlighted = Some(index - 1);
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.highlighted {
            None if !self.suggestions.is_empty() => self.highlighted = Some(0),
            Some(index) if index + 1 < self.suggestions.len() => {
                self.highlighted = Some(index + 1)
            }
            _ => {}
        }
    }

    /// Writes the highlighted suggestion (or the typed text when nothing is
    /// highlighted) into the store as a tag and resets the input.
    pub fn accept(&mut self, store: &mut FilterStore) -> Option<Tag> {
        let value = match self.highlighted_value() {
            Some(value) => value.to_string(),
            None => self.text.trim().to_string(),
        };
        if value.is_empty() {
            return None;
        }
        let tag = Tag::new(value);
        store.add_tag(&self.facet, tag.clone());
        self.text.clear();
        self.cancel();
        self.state = SuggestState::Idle;
        Some(tag)
    }

    /// Accepts the suggestion at `index`, as a click on it would.
    pub fn accept_at(&mut self, index: usize, store: &mut FilterStore) -> Option<Tag> {
        if index >= self.suggestions.len() {
            return None;
        }
        self.highlighted = Some(index);
        self.accept(store)
    }

    /// With empty input this removes the facet's last tag; otherwise it edits
    /// the text.
    pub fn backspace(&mut self, store: &mut FilterStore, now: Instant) {
        if self.text.is_empty() {
            store.remove_tag(&self.facet, TagIndex::Last);
            return;
        }
        let mut text = std::mem::take(&mut self.text);
        text.pop();
        self.input(&text, now);
    }

    fn supersede_in_flight(&mut self) {
        if self.line.in_flight().is_some() {
            self.line.cancel();
            self.issued_at = None;
            self.state = SuggestState::Cancelled;
        }
    }
}

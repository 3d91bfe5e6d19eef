//! Canonical query string for a filter state.
//!
//! Format: `facet=value1|value2&facet2=value3`. Values within a facet are
//! OR-ed (`|`), facets are AND-ed (`&`), facets appear in the order they were
//! first selected and there is no trailing separator. Keys and values are
//! percent-encoded, leaving only RFC 3986 unreserved characters as-is, so a
//! value such as `5%` or `A|B` cannot be mistaken for a delimiter.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::GridError;
use crate::filter::FilterState;

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn serialize(state: &FilterState) -> String {
    state
        .iter()
        .map(|(facet, values)| {
            let joined = values
                .iter()
                .map(|value| encode(value))
                .collect::<Vec<_>>()
                .join("|");
            format!("{}={}", encode(facet), joined)
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Appends `?query` to `path` unless the query is empty.
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Rebuilds a filter state from a string produced by [`serialize`].
pub fn parse(query: &str) -> Result<FilterState, GridError> {
    let query = query.trim().trim_start_matches('?');
    let mut state = FilterState::new();
    if query.is_empty() {
        return Ok(state);
    }
    for group in query.split('&') {
        let (facet, values) = group
            .split_once('=')
            .ok_or_else(|| GridError::InvalidQuery(group.to_string()))?;
        let facet = decode(facet)?;
        if facet.is_empty() {
            return Err(GridError::InvalidQuery(group.to_string()));
        }
        for value in values.split('|') {
            let value = decode(value)?;
            if value.is_empty() {
                return Err(GridError::InvalidQuery(group.to_string()));
            }
            state.insert(&facet, &value);
        }
    }
    Ok(state)
}

fn encode(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

fn decode(component: &str) -> Result<String, GridError> {
    percent_decode_str(component)
        .decode_utf8()
        .map(|value| value.into_owned())
        .map_err(|err| GridError::InvalidQuery(format!("{component}: {err}")))
}

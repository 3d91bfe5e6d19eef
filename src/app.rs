use serde::Serialize;

use crate::client::{DatasetClient, Row};
use crate::domain::{Dataset, FacetKind, FilterArg, Tag};
use crate::download::{DownloadCoordinator, DownloadOutcome, DownloadSink, FileSaver, Rejected};
use crate::error::GridError;
use crate::filter::{FilterState, FilterStore};
use crate::query;

#[derive(Debug, Clone, Serialize)]
pub struct PreviewResult {
    pub dataset: Dataset,
    pub query: String,
    pub row_count: usize,
    pub has_more: bool,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestResult {
    pub dataset: Dataset,
    pub text: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadResult {
    pub dataset: Dataset,
    pub query: String,
    #[serde(flatten)]
    pub outcome: DownloadOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query: String,
    pub filters: FilterState,
}

/// Builds a store from an optional query string followed by `facet=value`
/// arguments. Facets must be declared by `dataset`.
pub fn build_store(
    dataset: Dataset,
    query_string: Option<&str>,
    filters: &[FilterArg],
) -> Result<FilterStore, GridError> {
    let mut store = FilterStore::new();
    let parsed = match query_string {
        Some(raw) => query::parse(raw)?,
        None => FilterState::new(),
    };
    let pairs = parsed
        .iter()
        .flat_map(|(facet, values)| values.iter().map(move |value| (facet, value.as_str())))
        .chain(
            filters
                .iter()
                .map(|arg| (arg.facet.as_str(), arg.value.as_str())),
        );

    for (facet, value) in pairs {
        let spec = dataset
            .facet(facet)
            .ok_or_else(|| GridError::InvalidFilter(format!("{facet}={value}")))?;
        match spec.kind {
            FacetKind::Checkbox(_) => store.toggle_value(spec.key, value, true),
            FacetKind::FreeText => store.add_tag(spec.key, Tag::new(value)),
        }
    }
    Ok(store)
}

/// One-shot operations behind the non-interactive commands.
pub struct App<C: DatasetClient> {
    client: C,
}

impl<C: DatasetClient> App<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn preview(&self, dataset: Dataset, store: &FilterStore) -> Result<PreviewResult, GridError> {
        let query = query::serialize(store.state());
        tracing::info!(dataset = dataset.slug(), query = %query, "preview");
        let page = self.client.preview(dataset, &query)?;
        Ok(PreviewResult {
            dataset,
            query,
            row_count: page.rows.len(),
            has_more: page.has_more,
            rows: page.rows,
        })
    }

    pub fn suggest(&self, dataset: Dataset, text: &str) -> Result<SuggestResult, GridError> {
        let text = text.trim();
        let suggestions = if text.is_empty() {
            Vec::new()
        } else {
            self.client.suggest(dataset, text)?
        };
        Ok(SuggestResult {
            dataset,
            text: text.to_string(),
            suggestions,
        })
    }

    pub fn download(
        &self,
        dataset: Dataset,
        store: &FilterStore,
        saver: &dyn FileSaver,
        sink: &dyn DownloadSink,
    ) -> Result<DownloadResult, GridError> {
        let mut coordinator = DownloadCoordinator::new();
        let outcome = coordinator
            .run(&self.client, store, dataset, saver, sink)
            .map_err(|rejected| match rejected {
                Rejected::NoFilters | Rejected::InFlight => GridError::NoActiveFilters,
            })?;
        Ok(DownloadResult {
            dataset,
            query: query::serialize(store.state()),
            outcome,
        })
    }

    pub fn query(&self, store: &FilterStore) -> QueryResult {
        QueryResult {
            query: query::serialize(store.state()),
            filters: store.state().clone(),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::GridError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// National and local labor force statistics.
    Laus,
    /// Current employment statistics.
    Unemp,
}

impl Dataset {
    pub fn slug(self) -> &'static str {
        match self {
            Dataset::Laus => "laus",
            Dataset::Unemp => "unemp",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Dataset::Laus => "National and Local Labor Force Statistics",
            Dataset::Unemp => "Current Employment",
        }
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Dataset::Laus => LAUS_COLUMNS,
            Dataset::Unemp => UNEMP_COLUMNS,
        }
    }

    pub fn facets(self) -> &'static [FacetSpec] {
        match self {
            Dataset::Laus => LAUS_FACETS,
            Dataset::Unemp => UNEMP_FACETS,
        }
    }

    pub fn facet(self, key: &str) -> Option<&'static FacetSpec> {
        self.facets().iter().find(|facet| facet.key == key)
    }

    pub fn free_text_facets(self) -> impl Iterator<Item = &'static FacetSpec> {
        self.facets()
            .iter()
            .filter(|facet| matches!(facet.kind, FacetKind::FreeText))
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Dataset {
    type Err = GridError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "laus" | "labor" => Ok(Dataset::Laus),
            "unemp" | "unemployment" | "employment" => Ok(Dataset::Unemp),
            _ => Err(GridError::InvalidDataset(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    /// Closed list of options rendered as checkboxes.
    Checkbox(&'static [&'static str]),
    /// Typed values with server-side suggestions, rendered as tags.
    FreeText,
}

/// A filterable dimension. Checkboxes carry their own facet key so a value
/// never has to be matched back to the facet it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FacetKind,
}

const fn column(key: &'static str, name: &'static str) -> Column {
    Column { key, name }
}

const LAUS_COLUMNS: &[Column] = &[
    column("survey_name", "Survey Name"),
    column("series_title", "Series Title"),
    column("series_id", "Series ID"),
    column("period", "Period"),
    column("label", "Label"),
    column("seasonality_enum", "Seasonality"),
    column("area", "Area"),
    column("area_type", "Area Type"),
    column("measure_type", "Measure Type"),
    column("value", "Value"),
];

const UNEMP_COLUMNS: &[Column] = &[
    column("area", "Area"),
    column("area_type", "Area Type"),
    column("measure_type", "Measure Type"),
    column("period", "Period"),
    column("seasonality_enum", "Seasonality"),
    column("series_id", "Series ID"),
    column("series_title", "Series Title"),
    column("survey_name", "Survey Name"),
    column("value", "Value"),
    column("label", "Label"),
];

const SEASONALITY: &[&str] = &["Seasonally Adjusted", "Not Seasonally Adjusted"];

const LAUS_FACETS: &[FacetSpec] = &[
    FacetSpec {
        key: "area_type",
        label: "Area Type",
        kind: FacetKind::Checkbox(&[
            "Statewide",
            "Metropolitan areas",
            "Micropolitan areas",
            "Counties and equivalents",
            "Cities and towns",
        ]),
    },
    FacetSpec {
        key: "measure_type",
        label: "Measure Type",
        kind: FacetKind::Checkbox(&[
            "Unemployment Rate",
            "Unemployment",
            "Employment",
            "Labor Force",
        ]),
    },
    FacetSpec {
        key: "seasonality_enum",
        label: "Seasonality",
        kind: FacetKind::Checkbox(SEASONALITY),
    },
    FacetSpec {
        key: "area",
        label: "Area",
        kind: FacetKind::FreeText,
    },
    FacetSpec {
        key: "period",
        label: "Period",
        kind: FacetKind::FreeText,
    },
    FacetSpec {
        key: "label",
        label: "Label",
        kind: FacetKind::FreeText,
    },
];

const UNEMP_FACETS: &[FacetSpec] = &[
    FacetSpec {
        key: "area_type",
        label: "Area Type",
        kind: FacetKind::Checkbox(&["Statewide", "Metropolitan areas"]),
    },
    FacetSpec {
        key: "measure_type",
        label: "Measure Type",
        kind: FacetKind::Checkbox(&[
            "All Employees",
            "Average Weekly Hours",
            "Average Hourly Earnings",
            "Average Weekly Earnings",
        ]),
    },
    FacetSpec {
        key: "seasonality_enum",
        label: "Seasonality",
        kind: FacetKind::Checkbox(SEASONALITY),
    },
    FacetSpec {
        key: "area",
        label: "Area",
        kind: FacetKind::FreeText,
    },
    FacetSpec {
        key: "period",
        label: "Period",
        kind: FacetKind::FreeText,
    },
    FacetSpec {
        key: "label",
        label: "Label",
        kind: FacetKind::FreeText,
    },
];

/// A display chip for one selected free-text value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub text: String,
    pub id: String,
}

impl Tag {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: text.clone(),
            text,
        }
    }
}

/// `facet=value` pair as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub facet: String,
    pub value: String,
}

impl FromStr for FilterArg {
    type Err = GridError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (facet, rest) = value
            .split_once('=')
            .ok_or_else(|| GridError::InvalidFilter(value.to_string()))?;
        let facet = facet.trim();
        let rest = rest.trim();
        let valid_key = !facet.is_empty()
            && facet
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if !valid_key || rest.is_empty() {
            return Err(GridError::InvalidFilter(value.to_string()));
        }
        Ok(Self {
            facet: facet.to_string(),
            value: rest.to_string(),
        })
    }
}

//! Active filter summary.
//!
//! Each active filter dimension becomes one or more removable chips. Removing
//! a chip produces a [`QueryUpdate`], so it goes through the same encoding
//! (and page reset) as any other filter change.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::DroneModel;
use crate::query::{QuerySpec, QueryUpdate, DATE_FORMAT};

/// One removable filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveFilter {
    /// The date bounds covered by the chip. Both are set for the combined
    /// chip, one of them for a single-bound chip.
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// One selected drone model.
    DroneModel { model: DroneModel },
    /// The pilot filter.
    Pilot { name: String },
    /// One selected tag.
    Tag { name: String },
}

impl ActiveFilter {
    /// The update that removes this filter from `spec`.
    #[must_use]
    pub fn removal(&self, spec: &QuerySpec) -> QueryUpdate {
        match self {
            Self::DateRange { from, to } => remove_date_range(from.is_some(), to.is_some()),
            Self::DroneModel { model } => remove_drone_model(spec, *model),
            Self::Pilot { .. } => remove_pilot(),
            Self::Tag { name } => remove_tag(spec, name),
        }
    }
}

impl fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateRange {
                from: Some(from),
                to: Some(to),
            } => write!(f, "Date: {} to {}", from.format(DATE_FORMAT), to.format(DATE_FORMAT)),
            Self::DateRange { from: Some(from), to: None } => {
                write!(f, "From: {}", from.format(DATE_FORMAT))
            }
            Self::DateRange { from: None, to: Some(to) } => {
                write!(f, "Until: {}", to.format(DATE_FORMAT))
            }
            Self::DateRange { from: None, to: None } => f.write_str("Date: any"),
            Self::DroneModel { model } => write!(f, "Model: {model}"),
            Self::Pilot { name } => write!(f, "Pilot: {name}"),
            Self::Tag { name } => write!(f, "Tag: {name}"),
        }
    }
}

/// A chip as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    /// Human-readable label.
    pub label: String,
    /// The filter the chip removes.
    pub filter: ActiveFilter,
}

impl From<ActiveFilter> for FilterChip {
    fn from(filter: ActiveFilter) -> Self {
        Self {
            label: filter.to_string(),
            filter,
        }
    }
}

/// Chips for every active filter, in display order: dates, models, pilot,
/// tags.
#[must_use]
pub fn active_filters(spec: &QuerySpec) -> Vec<FilterChip> {
    let mut filters = Vec::new();

    match (spec.date_from, spec.date_to) {
        (Some(from), Some(to)) => filters.push(ActiveFilter::DateRange {
            from: Some(from),
            to: Some(to),
        }),
        (from, to) => {
            if let Some(from) = from {
                filters.push(ActiveFilter::DateRange { from: Some(from), to: None });
            }
            if let Some(to) = to {
                filters.push(ActiveFilter::DateRange { from: None, to: Some(to) });
            }
        }
    }

    filters.extend(
        spec.drone_models
            .iter()
            .map(|model| ActiveFilter::DroneModel { model: *model }),
    );

    if let Some(name) = &spec.pilot {
        filters.push(ActiveFilter::Pilot { name: name.clone() });
    }

    filters.extend(spec.tags.iter().map(|name| ActiveFilter::Tag { name: name.clone() }));

    filters.into_iter().map(FilterChip::from).collect()
}

fn remove_date_range(clear_from: bool, clear_to: bool) -> QueryUpdate {
    QueryUpdate {
        date_from: clear_from.then_some(None),
        date_to: clear_to.then_some(None),
        ..QueryUpdate::default()
    }
}

fn remove_drone_model(spec: &QuerySpec, model: DroneModel) -> QueryUpdate {
    QueryUpdate::drone_models(
        spec.drone_models
            .iter()
            .copied()
            .filter(|m| *m != model)
            .collect(),
    )
}

fn remove_pilot() -> QueryUpdate {
    QueryUpdate::pilot(None)
}

fn remove_tag(spec: &QuerySpec, tag: &str) -> QueryUpdate {
    QueryUpdate::tags(spec.tags.iter().filter(|t| *t != tag).cloned().collect())
}

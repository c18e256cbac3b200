//! Structured list-view state and its fail-soft parser.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::params::QueryString;
use crate::model::DroneModel;

/// Query parameter names.
pub mod keys {
    pub const SEARCH: &str = "search";
    pub const DATE_FROM: &str = "date_from";
    pub const DATE_TO: &str = "date_to";
    pub const DRONE_MODEL: &str = "drone_model";
    pub const PILOT: &str = "pilot";
    pub const TAGS: &str = "tags";
    pub const PAGE: &str = "page";
    pub const PER_PAGE: &str = "per_page";
}

/// Format used for dates in the query string.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Allowed page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    #[default]
    TwentyFive,
    Fifty,
    Hundred,
}

impl PageSize {
    /// All page sizes, smallest first.
    pub const ALL: [PageSize; 3] = [Self::TwentyFive, Self::Fifty, Self::Hundred];

    /// Number of items per page.
    #[must_use]
    pub fn get(self) -> u32 {
        match self {
            Self::TwentyFive => 25,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }

    /// The page size for `value`, if it is one of 25, 50 or 100.
    #[must_use]
    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.get() == value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<u32> for PageSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_value(value).ok_or_else(|| format!("page size must be 25, 50 or 100, got {value}"))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// Search, filter and pagination state of the flight log list.
///
/// Always derived from a [`QueryString`]; see [`QuerySpec::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Free-text search; empty when not searching.
    pub search: String,
    /// Inclusive lower bound of the flight date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound of the flight date.
    pub date_to: Option<NaiveDate>,
    /// Selected models, in encounter order, without duplicates.
    pub drone_models: Vec<DroneModel>,
    /// Exact pilot name.
    pub pilot: Option<String>,
    /// Selected tags, in encounter order, without duplicates.
    pub tags: Vec<String>,
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub page_size: PageSize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            search: String::new(),
            date_from: None,
            date_to: None,
            drone_models: Vec::new(),
            pilot: None,
            tags: Vec::new(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

impl QuerySpec {
    /// Derive the state from URL parameters.
    ///
    /// Invalid values fall back to their defaults; this never fails.
    #[must_use]
    pub fn parse(params: &QueryString) -> Self {
        Self {
            search: params.get(keys::SEARCH).unwrap_or_default().to_string(),
            date_from: params.get(keys::DATE_FROM).and_then(parse_date),
            date_to: params.get(keys::DATE_TO).and_then(parse_date),
            drone_models: params
                .get(keys::DRONE_MODEL)
                .map(parse_drone_models)
                .unwrap_or_default(),
            pilot: params
                .get(keys::PILOT)
                .filter(|p| !p.trim().is_empty())
                .map(str::to_string),
            tags: params.get(keys::TAGS).map(split_list).unwrap_or_default(),
            page: params.get(keys::PAGE).map_or(1, parse_page),
            page_size: params
                .get(keys::PER_PAGE)
                .map_or_else(PageSize::default, parse_page_size),
        }
    }

    /// Whether any search text or filter is active.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.search.trim().is_empty()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || !self.drone_models.is_empty()
            || self.pilot.is_some()
            || !self.tags.is_empty()
    }

    /// Parameters for the backend list endpoint.
    ///
    /// Unlike the URL form, page and page size are always sent, and the date
    /// bounds are widened to whole days.
    #[must_use]
    pub fn api_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (keys::PAGE, self.page.to_string()),
            (keys::PER_PAGE, self.page_size.to_string()),
        ];
        if !self.search.trim().is_empty() {
            params.push((keys::SEARCH, self.search.clone()));
        }
        if !self.drone_models.is_empty() {
            params.push((keys::DRONE_MODEL, join(self.drone_models.iter())));
        }
        if let Some(pilot) = &self.pilot {
            params.push((keys::PILOT, pilot.clone()));
        }
        if !self.tags.is_empty() {
            params.push((keys::TAGS, self.tags.join(",")));
        }
        if let Some(from) = self.date_from {
            params.push((keys::DATE_FROM, format!("{}T00:00:00", from.format(DATE_FORMAT))));
        }
        if let Some(to) = self.date_to {
            params.push((keys::DATE_TO, format!("{}T23:59:59", to.format(DATE_FORMAT))));
        }
        params
    }
}

/// Page numbers below 1 or that don't parse become 1.
fn parse_page(raw: &str) -> u32 {
    raw.trim().parse::<u32>().ok().filter(|p| *p >= 1).unwrap_or(1)
}

fn parse_page_size(raw: &str) -> PageSize {
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(PageSize::from_value)
        .unwrap_or_default()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_drone_models(raw: &str) -> Vec<DroneModel> {
    let mut models = Vec::new();
    for model in raw.split(',').filter_map(|token| token.parse::<DroneModel>().ok()) {
        if !models.contains(&model) {
            models.push(model);
        }
    }
    models
}

/// Split a comma-separated list, trimming tokens and dropping empty or
/// repeated ones.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !items.iter().any(|existing| existing == token) {
            items.push(token.to_string());
        }
    }
    items
}

pub(crate) fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(qs: &str) -> QuerySpec {
        QuerySpec::parse(&QueryString::parse(qs))
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse(""), QuerySpec::default());
        assert!(!QuerySpec::default().has_filters());
    }

    #[test]
    fn test_full_parse() {
        let spec = parse(
            "search=foo&date_from=2024-01-01&date_to=2024-02-01&drone_model=XLT%2CCX10\
             &pilot=Alex&tags=survey%2Calps&page=3&per_page=50",
        );
        assert_eq!(spec.search, "foo");
        assert_eq!(spec.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(spec.date_to, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(spec.drone_models, vec![DroneModel::Xlt, DroneModel::Cx10]);
        assert_eq!(spec.pilot.as_deref(), Some("Alex"));
        assert_eq!(spec.tags, vec!["survey", "alps"]);
        assert_eq!(spec.page, 3);
        assert_eq!(spec.page_size, PageSize::Fifty);
        assert!(spec.has_filters());
    }

    #[test]
    fn test_invalid_page_defaults_to_one() {
        for raw in ["0", "-2", "abc", "1.5", ""] {
            assert_eq!(parse(&format!("page={raw}")).page, 1, "page={raw}");
        }
        assert_eq!(parse("page=7").page, 7);
    }

    #[test]
    fn test_invalid_per_page_defaults_to_25() {
        for raw in ["10", "0", "26", "1000", "fifty", "-25"] {
            assert_eq!(
                parse(&format!("per_page={raw}")).page_size,
                PageSize::TwentyFive,
                "per_page={raw}"
            );
        }
        assert_eq!(parse("per_page=100").page_size, PageSize::Hundred);
    }

    #[test]
    fn test_drone_models_filtered_ordered_deduplicated() {
        let spec = parse("drone_model=S1,BOGUS,XLT,S1,,x99,xlt");
        assert_eq!(spec.drone_models, vec![DroneModel::S1, DroneModel::Xlt]);
    }

    #[test]
    fn test_tags_drop_empty_tokens() {
        let spec = parse("tags=a,,b, ,a");
        assert_eq!(spec.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_dates_are_absent() {
        let spec = parse("date_from=yesterday&date_to=2024-13-40");
        assert!(spec.date_from.is_none());
        assert!(spec.date_to.is_none());
    }

    #[test]
    fn test_rfc3339_date_keeps_date_part() {
        let spec = parse("date_from=2024-03-05T10%3A00%3A00Z");
        assert_eq!(spec.date_from, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn test_blank_pilot_is_absent() {
        assert!(parse("pilot=+++").pilot.is_none());
    }

    #[test]
    fn test_api_params_always_paginate() {
        let params = QuerySpec::default().api_params();
        assert_eq!(
            params,
            vec![("page", "1".to_string()), ("per_page", "25".to_string())]
        );
    }

    #[test]
    fn test_api_params_widen_dates() {
        let spec = parse("date_from=2024-01-01&date_to=2024-01-31&drone_model=XLT,S1");
        let params = spec.api_params();
        assert!(params.contains(&("date_from", "2024-01-01T00:00:00".to_string())));
        assert!(params.contains(&("date_to", "2024-01-31T23:59:59".to_string())));
        assert!(params.contains(&("drone_model", "XLT,S1".to_string())));
    }

    #[test]
    fn test_page_size_serde() {
        assert_eq!(serde_json::to_string(&PageSize::Fifty).unwrap(), "50");
        assert_eq!(
            serde_json::from_str::<PageSize>("100").unwrap(),
            PageSize::Hundred
        );
        assert!(serde_json::from_str::<PageSize>("30").is_err());
    }
}

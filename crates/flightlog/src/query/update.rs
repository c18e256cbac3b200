//! Partial state updates and their encoding back into the URL.

use chrono::NaiveDate;

use super::params::QueryString;
use super::spec::{join, keys, split_list, PageSize, DATE_FORMAT};
use crate::model::DroneModel;

/// A partial change to the list-view state.
///
/// `None` leaves a dimension untouched. For optional dimensions the inner
/// `Option` is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryUpdate {
    pub search: Option<String>,
    pub date_from: Option<Option<NaiveDate>>,
    pub date_to: Option<Option<NaiveDate>>,
    pub drone_models: Option<Vec<DroneModel>>,
    pub pilot: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub page: Option<u32>,
    pub page_size: Option<PageSize>,
}

impl QueryUpdate {
    /// Replace the search text.
    #[must_use]
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Replace both date bounds.
    #[must_use]
    pub fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            date_from: Some(from),
            date_to: Some(to),
            ..Self::default()
        }
    }

    /// Replace the selected drone models.
    #[must_use]
    pub fn drone_models(models: Vec<DroneModel>) -> Self {
        Self {
            drone_models: Some(models),
            ..Self::default()
        }
    }

    /// Replace the pilot filter.
    #[must_use]
    pub fn pilot(pilot: Option<String>) -> Self {
        Self {
            pilot: Some(pilot),
            ..Self::default()
        }
    }

    /// Replace the selected tags.
    #[must_use]
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    /// Go to `page`.
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    /// Change the page size.
    #[must_use]
    pub fn page_size(size: PageSize) -> Self {
        Self {
            page_size: Some(size),
            ..Self::default()
        }
    }

    /// Clear search text and every filter, keeping the page size.
    #[must_use]
    pub fn clear_all() -> Self {
        Self {
            search: Some(String::new()),
            date_from: Some(None),
            date_to: Some(None),
            drone_models: Some(Vec::new()),
            pilot: Some(None),
            tags: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Whether this update changes search text or any filter.
    #[must_use]
    pub fn touches_filters(&self) -> bool {
        self.search.is_some()
            || self.date_from.is_some()
            || self.date_to.is_some()
            || self.drone_models.is_some()
            || self.pilot.is_some()
            || self.tags.is_some()
    }

    /// Encode this update on top of `previous`.
    ///
    /// Keys are set for non-default values and removed for default or empty
    /// ones. A search or filter change drops `page` so the view restarts at
    /// page 1; an explicit `page` in the same update still applies. Keys the
    /// list view does not own are carried over.
    #[must_use]
    pub fn apply(&self, previous: &QueryString) -> QueryString {
        let mut next = previous.clone();

        if let Some(search) = &self.search {
            if search.trim().is_empty() {
                next.remove(keys::SEARCH);
            } else {
                next.set(keys::SEARCH, search.as_str());
            }
        }
        if let Some(from) = self.date_from {
            set_date(&mut next, keys::DATE_FROM, from);
        }
        if let Some(to) = self.date_to {
            set_date(&mut next, keys::DATE_TO, to);
        }
        if let Some(models) = &self.drone_models {
            let mut unique: Vec<DroneModel> = Vec::with_capacity(models.len());
            for model in models {
                if !unique.contains(model) {
                    unique.push(*model);
                }
            }
            next.set(keys::DRONE_MODEL, join(unique.iter()));
        }
        if let Some(pilot) = &self.pilot {
            match pilot.as_deref().map(str::trim) {
                Some(p) if !p.is_empty() => next.set(keys::PILOT, p),
                _ => {
                    next.remove(keys::PILOT);
                }
            }
        }
        if let Some(tags) = &self.tags {
            next.set(keys::TAGS, split_list(&tags.join(",")).join(","));
        }

        if self.touches_filters() {
            next.remove(keys::PAGE);
        }
        if let Some(page) = self.page {
            if page > 1 {
                next.set(keys::PAGE, page.to_string());
            } else {
                next.remove(keys::PAGE);
            }
        }
        if let Some(size) = self.page_size {
            if size == PageSize::default() {
                next.remove(keys::PER_PAGE);
            } else {
                next.set(keys::PER_PAGE, size.to_string());
            }
        }

        next
    }
}

fn set_date(params: &mut QueryString, key: &str, date: Option<NaiveDate>) {
    match date {
        Some(date) => params.set(key, date.format(DATE_FORMAT).to_string()),
        None => {
            params.remove(key);
        }
    }
}

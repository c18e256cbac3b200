//! Core data types exchanged with the flight-log backend.
//!
//! These mirror the JSON shapes of the backend API. The backend is an
//! external collaborator; nothing here validates beyond what serde enforces.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The drone models known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DroneModel {
    /// XLT airframe.
    #[serde(rename = "XLT")]
    Xlt,
    /// S1 airframe.
    #[serde(rename = "S1")]
    S1,
    /// CX10 airframe.
    #[serde(rename = "CX10")]
    Cx10,
}

impl DroneModel {
    /// All models, in the order the backend reports them.
    pub const ALL: [DroneModel; 3] = [Self::Xlt, Self::S1, Self::Cx10];

    /// The wire name of this model.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Xlt => "XLT",
            Self::S1 => "S1",
            Self::Cx10 => "CX10",
        }
    }
}

impl fmt::Display for DroneModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known drone model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown drone model '{0}' (expected XLT, S1 or CX10)")]
pub struct UnknownDroneModel(pub String);

impl FromStr for DroneModel {
    type Err = UnknownDroneModel;

    /// Parses a model name, ignoring surrounding whitespace and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| UnknownDroneModel(token.to_string()))
    }
}

/// A tag attached to flight logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Backend identifier.
    pub id: i64,
    /// Lower-case tag name.
    pub name: String,
}

/// A file attached to a flight log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Backend identifier.
    pub id: String,
    /// Original file name.
    pub filename: String,
    /// Size in bytes.
    pub file_size: u64,
    /// MIME type.
    pub content_type: String,
    /// Upload time (naive, as stored by the backend).
    pub created_at: NaiveDateTime,
}

impl Attachment {
    /// File name to save this attachment under. Only the last component of
    /// the uploaded name is used.
    #[must_use]
    pub fn download_name(&self) -> String {
        Path::new(&self.filename)
            .file_name()
            .map_or_else(|| self.id.clone(), |name| name.to_string_lossy().into_owned())
    }
}

/// A flight log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightLog {
    pub id: String,
    pub title: String,
    pub pilot: String,
    pub serial_number: Option<String>,
    #[serde(default)]
    pub log_identifier: Option<String>,
    pub drone_model: DroneModel,
    pub duration_seconds: Option<f64>,
    pub file_path: String,
    pub comment: Option<String>,
    pub takeoff_lat: Option<f64>,
    pub takeoff_lon: Option<f64>,
    pub flight_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub flight_review_id: Option<String>,
    #[serde(default)]
    pub flight_modes: Vec<String>,
    #[serde(default)]
    pub tow: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl FlightLog {
    /// Flight duration formatted as `H:MM:SS`, or `-` when unknown.
    #[must_use]
    pub fn duration_display(&self) -> String {
        match self.duration_seconds {
            Some(secs) if secs >= 0.0 => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let total = secs.round() as u64;
                format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
            }
            _ => "-".to_string(),
        }
    }

    /// File name offered for downloads of this log.
    #[must_use]
    pub fn download_name(&self) -> String {
        format!("{}_{}.ulg", self.title.replace(' ', "_"), self.id)
    }

    /// Tag names joined with commas.
    #[must_use]
    pub fn tag_names(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One page of results from a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items matching the query.
    pub total: u64,
    /// 1-based page number.
    pub page: u32,
    /// Page size used by the backend.
    pub per_page: u32,
    /// Number of pages (at least 1).
    pub total_pages: u32,
}

/// A page of flight logs.
pub type LogPage = Paginated<FlightLog>;

/// Partial update of a flight log. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightLogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pilot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drone_model: Option<DroneModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl FlightLogUpdate {
    /// Whether the update would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Metadata sent alongside a new `.ulg` upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlightLog {
    pub title: String,
    pub pilot: String,
    pub drone_model: DroneModel,
    pub serial_number: Option<String>,
    pub comment: Option<String>,
    pub tags: Vec<String>,
}

/// Fleet-wide flight statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_flights: u64,
    pub total_hours: f64,
    pub hours_by_model: BTreeMap<String, f64>,
}

/// Response of a delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": "0b6c",
            "title": "Morning survey",
            "pilot": "Alex",
            "serial_number": "SN-1",
            "log_identifier": null,
            "drone_model": "S1",
            "duration_seconds": 3725.4,
            "file_path": "data/logs/0b6c.ulg",
            "comment": null,
            "takeoff_lat": 47.1,
            "takeoff_lon": 8.5,
            "flight_date": "2024-05-02T09:15:00",
            "flight_review_id": null,
            "flight_modes": ["Position", "Mission"],
            "tow": null,
            "created_at": "2024-05-02T10:00:00",
            "updated_at": "2024-05-02T10:00:00",
            "tags": [{"id": 1, "name": "survey"}, {"id": 2, "name": "alps"}],
            "attachments": []
        }"#
    }

    #[test]
    fn test_drone_model_display() {
        assert_eq!(DroneModel::Xlt.to_string(), "XLT");
        assert_eq!(DroneModel::S1.to_string(), "S1");
        assert_eq!(DroneModel::Cx10.to_string(), "CX10");
    }

    #[test]
    fn test_drone_model_from_str_is_lenient() {
        assert_eq!("xlt".parse::<DroneModel>(), Ok(DroneModel::Xlt));
        assert_eq!(" CX10 ".parse::<DroneModel>(), Ok(DroneModel::Cx10));
        assert!("X99".parse::<DroneModel>().is_err());
        assert!("".parse::<DroneModel>().is_err());
    }

    #[test]
    fn test_flight_log_deserialize() {
        let log: FlightLog = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(log.drone_model, DroneModel::S1);
        assert_eq!(log.tags.len(), 2);
        assert_eq!(log.tag_names(), "survey, alps");
        assert_eq!(log.flight_modes, vec!["Position", "Mission"]);
    }

    #[test]
    fn test_duration_display() {
        let mut log: FlightLog = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(log.duration_display(), "1:02:05");
        log.duration_seconds = None;
        assert_eq!(log.duration_display(), "-");
    }

    #[test]
    fn test_download_name() {
        let log: FlightLog = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(log.download_name(), "Morning_survey_0b6c.ulg");
    }

    #[test]
    fn test_attachment_download_name() {
        let mut attachment: Attachment = serde_json::from_str(
            r#"{"id": "a1", "filename": "notes.pdf", "file_size": 3,
                "content_type": "application/pdf", "created_at": "2024-05-02T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(attachment.download_name(), "notes.pdf");
        attachment.filename = "../../etc/passwd".to_string();
        assert_eq!(attachment.download_name(), "passwd");
        attachment.filename = "..".to_string();
        assert_eq!(attachment.download_name(), "a1");
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = FlightLogUpdate {
            title: Some("New".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"title":"New"}"#);
        assert!(!update.is_empty());
        assert!(FlightLogUpdate::default().is_empty());
    }

    #[test]
    fn test_paginated_deserialize() {
        let json = format!(
            r#"{{"items": [{}], "total": 51, "page": 3, "per_page": 25, "total_pages": 3}}"#,
            sample_json()
        );
        let page: LogPage = serde_json::from_str(&json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_stats_deserialize() {
        let json = r#"{"total_flights": 4, "total_hours": 2.5, "hours_by_model": {"XLT": 1.0, "S1": 1.5, "CX10": 0.0}}"#;
        let stats: Stats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_flights, 4);
        assert_eq!(stats.hours_by_model.get("S1"), Some(&1.5));
    }
}

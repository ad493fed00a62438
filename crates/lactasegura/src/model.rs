//! Core record types for the lactasegura data files.
//!
//! This module defines the entities persisted by the JSON stores: BMI
//! history entries, named caregiver records, cached articles, the remote
//! endpoint configuration, and the combined sync backup blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Keyed;

/// One entry in the IMC (BMI) history.
///
/// History entries are append-only: once written they are never edited or
/// deleted, so they carry no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiRecord {
    /// When the calculation was made.
    pub timestamp: DateTime<Utc>,
    /// Weight entered, in kilograms.
    pub weight_kg: f64,
    /// Height entered, in centimeters.
    pub height_cm: f64,
    /// Age entered, in months.
    pub age_months: f64,
    /// The computed BMI, at full precision.
    pub bmi: f64,
    /// The categorical interpretation shown to the caregiver.
    pub interpretation: String,
}

impl BmiRecord {
    /// Create a history entry timestamped now.
    #[must_use]
    pub fn new(
        weight_kg: f64,
        height_cm: f64,
        age_months: f64,
        bmi: f64,
        interpretation: String,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            weight_kg,
            height_cm,
            age_months,
            bmi,
            interpretation,
        }
    }
}

/// A named record in the local log (one child observation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRecord {
    /// Store-assigned identifier. Empty until inserted.
    #[serde(default)]
    pub id: String,
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
    /// Name of the child.
    pub name: String,
    /// Age in months.
    pub age_months: f64,
    /// Weight in kilograms.
    pub weight_kg: f64,
    /// Free-text observation.
    pub observation: String,
}

impl NamedRecord {
    /// Create an unsaved record timestamped now. The id is assigned by the
    /// store on insert.
    #[must_use]
    pub fn new(name: String, age_months: f64, weight_kg: f64, observation: String) -> Self {
        Self {
            id: String::new(),
            timestamp: Utc::now(),
            name,
            age_months,
            weight_kg,
            observation,
        }
    }
}

impl Keyed for NamedRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn assign_id(&mut self, id: String) {
        self.id = id;
    }
}

/// A curated article reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier.
    pub id: String,
    /// Article title.
    pub title: String,
    /// Author list, as one display string.
    pub authors: String,
    /// Publication source, including DOI where available.
    pub source: String,
    /// Link to the article.
    pub url: String,
    /// Short summary shown in the app.
    pub summary: String,
}

/// User-editable remote endpoint configuration (`remote_config.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// URL returning a JSON array of articles, if one is configured.
    pub remote_articles_url: Option<String>,
}

/// The combined backup blob written by the sync service (`backup.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncBackup {
    /// Snapshot of the IMC history store.
    pub imc_history: Vec<BmiRecord>,
    /// Snapshot of the named-records store.
    pub records: Vec<NamedRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_record_new() {
        let record = BmiRecord::new(6.0, 60.0, 6.0, 16.7, "expected range".to_string());

        assert!((record.weight_kg - 6.0).abs() < f64::EPSILON);
        assert!((record.height_cm - 60.0).abs() < f64::EPSILON);
        assert_eq!(record.interpretation, "expected range");
    }

    #[test]
    fn test_named_record_new_has_empty_id() {
        let record = NamedRecord::new("Ana".to_string(), 6.0, 7.2, "control".to_string());
        assert!(record.id().is_empty());
    }

    #[test]
    fn test_named_record_assign_id() {
        let mut record = NamedRecord::new("Ana".to_string(), 6.0, 7.2, String::new());
        record.assign_id("3".to_string());
        assert_eq!(record.id(), "3");
    }

    #[test]
    fn test_bmi_record_serialization_round_trip() {
        let record = BmiRecord::new(3.0, 50.0, 0.0, 12.0, "severe underweight".to_string());

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: BmiRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(record, deserialized);
    }

    #[test]
    fn test_bmi_record_timestamp_is_iso8601() {
        let record = BmiRecord::new(3.0, 50.0, 0.0, 12.0, String::new());
        let json = serde_json::to_value(&record).unwrap();

        let ts = json["timestamp"].as_str().unwrap();
        assert!(ts.parse::<DateTime<Utc>>().is_ok());
    }

    #[test]
    fn test_named_record_deserialize_without_id() {
        // Records written before an id was assigned still parse.
        let json = r#"{
            "timestamp": "2024-03-01T10:00:00Z",
            "name": "Luis",
            "age_months": 12.0,
            "weight_kg": 9.5,
            "observation": ""
        }"#;
        let record: NamedRecord = serde_json::from_str(json).unwrap();
        assert!(record.id.is_empty());
        assert_eq!(record.name, "Luis");
    }

    #[test]
    fn test_remote_config_default() {
        let config = RemoteConfig::default();
        assert!(config.remote_articles_url.is_none());
    }

    #[test]
    fn test_remote_config_deserialize_empty_object() {
        let config: RemoteConfig = serde_json::from_str("{}").unwrap();
        assert!(config.remote_articles_url.is_none());
    }

    #[test]
    fn test_sync_backup_round_trip() {
        let backup = SyncBackup {
            imc_history: vec![BmiRecord::new(6.0, 60.0, 6.0, 16.7, "ok".to_string())],
            records: vec![NamedRecord::new("Ana".to_string(), 6.0, 7.2, String::new())],
        };

        let json = serde_json::to_string_pretty(&backup).unwrap();
        let deserialized: SyncBackup = serde_json::from_str(&json).unwrap();

        assert_eq!(backup, deserialized);
    }

    #[test]
    fn test_article_serialization_preserves_non_ascii() {
        let article = Article {
            id: "art1".to_string(),
            title: "Asistencia de enfermería".to_string(),
            authors: "J. Bezerra".to_string(),
            source: "RSD Journal".to_string(),
            url: "https://example.org".to_string(),
            summary: "Revisión integrativa".to_string(),
        };

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("enfermería"));
        assert!(json.contains("Revisión"));
    }
}

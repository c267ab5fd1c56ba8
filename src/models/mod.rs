use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uploaded image bytes together with the media type the client declared.
/// The bytes are never validated against the declared type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    pub fn new(media_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            data,
        }
    }
}

/// Nutrient name mapped to the integer percentage scraped from the
/// advisory text. Keys stay within the extractor vocabulary.
pub type NutrientRecord = BTreeMap<String, u32>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Option<i64>,
    pub filename: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of one analyze action.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub filename: String,
    pub advice: String,
    pub nutrients: NutrientRecord,
}

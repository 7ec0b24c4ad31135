//! Wire shapes of the cricket data API.
//!
//! Every field defaults so a response with missing pieces still decodes;
//! absent, null or mistyped data shows up as empty strings, zeros and empty
//! lists.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Envelope around every API payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Match {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
    #[serde(deserialize_with = "lenient")]
    pub match_type: String,
    #[serde(deserialize_with = "lenient")]
    pub status: String,
    #[serde(deserialize_with = "lenient")]
    pub venue: String,
    #[serde(deserialize_with = "lenient")]
    pub date: String,
    #[serde(deserialize_with = "lenient_list")]
    pub teams: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub score: Vec<Innings>,
    #[serde(rename = "matchStarted", deserialize_with = "lenient")]
    pub started: bool,
    #[serde(rename = "matchEnded", deserialize_with = "lenient")]
    pub ended: bool,
}

impl Match {
    pub fn is_live(&self) -> bool {
        self.started && !self.ended
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Innings {
    #[serde(deserialize_with = "lenient")]
    pub inning: String,
    #[serde(rename = "r", deserialize_with = "lenient")]
    pub runs: u32,
    #[serde(rename = "w", deserialize_with = "lenient")]
    pub wickets: u32,
    #[serde(rename = "o", deserialize_with = "lenient")]
    pub overs: f32,
}

/// Season payload; fixtures live under `matchList`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeasonInfo {
    #[serde(deserialize_with = "lenient_list")]
    pub match_list: Vec<Match>,
}

// == Lenient Decoding ==

/// Decodes a field, falling back to the default on null or a wrong type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decodes a list field, skipping elements that do not decode. Null or a
/// non-list reads as empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(decode_list(Value::deserialize(deserializer)?))
}

/// Decodes every element of a JSON array that has the expected shape.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A schedule event as the remote API returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: i64,
    #[serde(default)]
    pub schedule_calendar_id: Option<i64>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_user_ids")]
    pub assigned_user_ids: Vec<i64>,
    #[serde(default, deserialize_with = "flag_or_false")]
    pub draft: bool,
    #[serde(default = "default_active", deserialize_with = "flag_or_true")]
    pub active: bool,
    #[serde(default, deserialize_with = "flag_or_false")]
    pub all_day: bool,
    #[serde(default)]
    pub jobcode_id: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    /// Fields the API sends that are not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_active() -> bool {
    true
}

// A `null` flag decodes to the same value as a missing one.
fn flag_or_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn flag_or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Payload for creating an event. `None` fields are left out of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_calendar_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_ids: Option<Vec<i64>>,
    pub draft: bool,
    pub active: bool,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobcode_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for NewEvent {
    fn default() -> Self {
        Self {
            schedule_calendar_id: None,
            start: None,
            end: None,
            title: None,
            notes: None,
            assigned_user_ids: None,
            draft: false,
            active: true,
            all_day: false,
            jobcode_id: None,
            color: None,
        }
    }
}

/// Partial update of an existing event. Every field is optional, including
/// the status flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_calendar_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobcode_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl EventPatch {
    pub fn deactivation(id: Option<i64>, schedule_calendar_id: Option<i64>) -> Self {
        Self {
            id,
            schedule_calendar_id,
            active: Some(false),
            ..Default::default()
        }
    }
}

/// Split a comma separated list of integer ids, skipping empty items.
pub fn parse_id_list(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>()
                .map_err(|_| format!("'{}' is not a valid user id", item))
        })
        .collect()
}

// The API is not consistent about this field: it may be a list of numbers,
// a list of numeric strings, or a single comma separated string.
fn deserialize_user_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(list) => parse_id_list(&list).map_err(D::Error::custom),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Number(number) => number
                    .as_i64()
                    .ok_or_else(|| D::Error::custom(format!("invalid user id: {}", number))),
                Value::String(text) => text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| D::Error::custom(format!("invalid user id: {}", text))),
                other => Err(D::Error::custom(format!("invalid user id: {}", other))),
            })
            .collect(),
        other => Err(D::Error::custom(format!(
            "unexpected assigned_user_ids value: {}",
            other
        ))),
    }
}

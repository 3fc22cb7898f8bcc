use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{EventCollection, ScheduleEvent};

#[derive(Debug, Deserialize)]
pub struct FetchEventsResponse {
    #[serde(default)]
    pub results: FetchResults,
    #[serde(default)]
    pub more: bool,
    #[serde(default)]
    pub supplemental_data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FetchResults {
    #[serde(default, deserialize_with = "deserialize_event_map")]
    pub schedule_events: HashMap<String, ScheduleEvent>,
}

// An empty result set comes back as `[]` rather than `{}`.
fn deserialize_event_map<'de, D>(deserializer: D) -> Result<HashMap<String, ScheduleEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let decode = |key: &str, value: Value| {
        serde_json::from_value::<ScheduleEvent>(value)
            .map_err(|e| D::Error::custom(format!("schedule event {}: {}", key, e)))
    };

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(HashMap::new()),
        Some(Value::Object(events)) => events
            .into_iter()
            .map(|(key, value)| decode(&key, value).map(|event| (key, event)))
            .collect(),
        Some(Value::Array(events)) => events
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                decode(&format!("#{}", index), value).map(|event| (event.id.to_string(), event))
            })
            .collect(),
        Some(other) => Err(D::Error::custom(format!(
            "unexpected schedule_events value: {}",
            other
        ))),
    }
}

impl From<FetchEventsResponse> for EventCollection {
    fn from(response: FetchEventsResponse) -> Self {
        EventCollection::new(response.results.schedule_events, response.supplemental_data)
    }
}

/// Envelope for create and update calls.
#[derive(Debug, Serialize)]
pub struct WriteRequest<'a, T> {
    pub data: [&'a T; 1],
    pub team_events: &'static str,
}

impl<'a, T> WriteRequest<'a, T> {
    pub fn single(item: &'a T) -> Self {
        Self {
            data: [item],
            team_events: "base",
        }
    }
}

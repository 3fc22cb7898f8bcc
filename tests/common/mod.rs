#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use schedule_forms::config::AppConfig;
use schedule_forms::error::ScheduleError;
use schedule_forms::schedule_api::{
    ApiConfig, ApiRequest, ApiResponse, ApiToken, CalendarPolicy, FlagPolicy, HttpMethod,
    ScheduleApi, Transport,
};
use serde_json::{Map, Value, json};

pub const FIXED_CALENDAR: i64 = 563646;

pub fn token() -> ApiToken {
    ApiToken::new("test-token").unwrap()
}

pub fn api_config(calendar: CalendarPolicy, flags: FlagPolicy) -> ApiConfig {
    ApiConfig {
        base_url: "http://localhost/api/v1".to_string(),
        calendar,
        flags,
    }
}

pub fn app_config(calendar: CalendarPolicy) -> AppConfig {
    let mut config = AppConfig::from_lookup(|_| None).unwrap();
    config.api.calendar = calendar;
    config
}

pub fn api_with(transport: Arc<dyn Transport>, calendar: CalendarPolicy) -> ScheduleApi {
    ScheduleApi::new(transport, api_config(calendar, FlagPolicy::AlwaysSend), token())
}

/// Records every request and answers from a script. Unscripted calls get
/// `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<ApiResponse, ScheduleError>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) {
        self.respond_raw(status, &body.to_string());
    }

    pub fn respond_raw(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(ApiResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, error: ScheduleError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_item(&self) -> Value {
        let request = self.requests().pop().expect("no request was sent");
        request.body.expect("request had no body")["data"][0].clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ScheduleError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse { status: 200, body: "{}".to_string() }))
    }
}

/// A small stand-in for the remote schedule events resource.
#[derive(Default)]
pub struct InMemorySchedule {
    events: Mutex<BTreeMap<i64, Map<String, Value>>>,
    calls: Mutex<usize>,
}

impl InMemorySchedule {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn event(&self, id: i64) -> Option<Map<String, Value>> {
        self.events.lock().unwrap().get(&id).cloned()
    }

    fn items(request: &ApiRequest) -> Vec<Map<String, Value>> {
        request
            .body
            .as_ref()
            .and_then(|body| body["data"].as_array().cloned())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.as_object().cloned())
            .collect()
    }

    fn param<'a>(request: &'a ApiRequest, key: &str) -> Option<&'a str> {
        request
            .query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn ok(events: Map<String, Value>) -> ApiResponse {
        ApiResponse {
            status: 200,
            body: json!({ "results": { "schedule_events": events } }).to_string(),
        }
    }
}

#[async_trait]
impl Transport for InMemorySchedule {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ScheduleError> {
        *self.calls.lock().unwrap() += 1;
        let mut events = self.events.lock().unwrap();

        match request.method {
            HttpMethod::Get => {
                let start = Self::param(&request, "start").unwrap_or("");
                let end = Self::param(&request, "end").unwrap_or("\u{10FFFF}");
                let calendar = Self::param(&request, "schedule_calendar_ids")
                    .and_then(|id| id.parse::<i64>().ok());

                let found: Map<String, Value> = events
                    .iter()
                    .filter(|(_, event)| {
                        let event_start = event.get("start").and_then(Value::as_str).unwrap_or("");
                        event_start >= start && event_start <= end
                    })
                    .filter(|(_, event)| {
                        calendar.is_none_or(|id| event.get("schedule_calendar_id") == Some(&json!(id)))
                    })
                    .map(|(id, event)| (id.to_string(), Value::Object(event.clone())))
                    .collect();

                if found.is_empty() {
                    return Ok(ApiResponse {
                        status: 200,
                        body: json!({ "results": { "schedule_events": [] } }).to_string(),
                    });
                }
                Ok(Self::ok(found))
            }
            HttpMethod::Post => {
                let mut created = Map::new();
                for mut item in Self::items(&request) {
                    let id = events.keys().next_back().copied().unwrap_or(0) + 1;
                    item.insert("id".to_string(), json!(id));
                    events.insert(id, item.clone());
                    created.insert(id.to_string(), Value::Object(item));
                }
                Ok(Self::ok(created))
            }
            HttpMethod::Put => {
                let mut updated = Map::new();
                for item in Self::items(&request) {
                    let Some(id) = item.get("id").and_then(Value::as_i64) else {
                        return Ok(ApiResponse { status: 417, body: "missing id".to_string() });
                    };
                    let Some(existing) = events.get_mut(&id) else {
                        return Ok(ApiResponse { status: 404, body: "not found".to_string() });
                    };
                    existing.extend(item);
                    updated.insert(id.to_string(), Value::Object(existing.clone()));
                }
                Ok(Self::ok(updated))
            }
        }
    }
}

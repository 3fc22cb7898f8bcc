pub mod dto;
pub mod transport;

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, SecondsFormat};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ScheduleError;
use crate::models::{EventCollection, EventPatch, NewEvent};

pub use transport::{ApiRequest, ApiResponse, ApiToken, HttpMethod, HttpTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://rest.tsheets.com/api/v1";
pub const SCHEDULE_EVENTS_PATH: &str = "schedule_events";

/// Where the schedule calendar id of each call comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarPolicy {
    /// Every call targets this calendar; caller input is ignored.
    Fixed(i64),
    /// The caller names the calendar on each call.
    CallerSupplied,
}

impl CalendarPolicy {
    pub fn fixed_id(&self) -> Option<i64> {
        match self {
            CalendarPolicy::Fixed(id) => Some(*id),
            CalendarPolicy::CallerSupplied => None,
        }
    }

    /// Calendar id for a write. Missing caller input is a validation error.
    pub fn resolve(&self, supplied: Option<i64>) -> Result<i64, ScheduleError> {
        match self {
            CalendarPolicy::Fixed(id) => {
                if let Some(other) = supplied.filter(|other| other != id) {
                    debug!("overriding schedule calendar id {} with fixed {}", other, id);
                }
                Ok(*id)
            }
            CalendarPolicy::CallerSupplied => match supplied {
                Some(id) if id > 0 => Ok(id),
                Some(id) => Err(ScheduleError::validation(format!(
                    "Schedule calendar id must be positive, got {}",
                    id
                ))),
                None => Err(ScheduleError::validation("Schedule calendar id is required")),
            },
        }
    }
}

/// How unset status flags are treated on partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagPolicy {
    /// Unset `draft`, `active` and `all_day` are sent as `false`.
    AlwaysSend,
    /// Unset flags are left out of the payload.
    OmitUnset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub calendar: CalendarPolicy,
    pub flags: FlagPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            calendar: CalendarPolicy::CallerSupplied,
            flags: FlagPolicy::AlwaysSend,
        }
    }
}

/// Created or updated representation, as returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteResponse {
    pub status: u16,
    pub body: Value,
}

/// Adapter between form-shaped data and the schedule events resource.
/// One instance per session token; each call is a single request.
pub struct ScheduleApi {
    transport: Arc<dyn Transport>,
    config: ApiConfig,
    token: ApiToken,
}

impl ScheduleApi {
    pub fn new(transport: Arc<dyn Transport>, config: ApiConfig, token: ApiToken) -> Self {
        Self {
            transport,
            config,
            token,
        }
    }

    pub fn calendar_policy(&self) -> CalendarPolicy {
        self.config.calendar
    }

    /// Events in `[start, end]`, with supplemental data. Without a fixed or
    /// supplied calendar id the calendar filter is left off.
    pub async fn fetch_events(
        &self,
        start: &str,
        end: &str,
        calendar_id: Option<i64>,
    ) -> Result<EventCollection, ScheduleError> {
        let start = normalize_timestamp("Start", start)?;
        let end = normalize_timestamp("End", end)?;

        let mut query = vec![
            ("start".to_string(), start),
            ("end".to_string(), end),
        ];
        let calendar = self.config.calendar.fixed_id().or(calendar_id);
        if let Some(id) = calendar {
            query.push(("schedule_calendar_ids".to_string(), id.to_string()));
        }
        query.push(("supplemental_data".to_string(), "yes".to_string()));

        let response = self.send(HttpMethod::Get, query, None).await?;
        if response.status != 200 {
            return Err(ScheduleError::Api {
                status: response.status,
                body: response.body,
            });
        }

        let parsed: dto::FetchEventsResponse = serde_json::from_str(&response.body)
            .map_err(|e| ScheduleError::Decode(e.to_string()))?;
        if parsed.more {
            debug!("api reports more events than returned for this range");
        }

        Ok(EventCollection::from(parsed))
    }

    pub async fn create_event(&self, mut event: NewEvent) -> Result<WriteResponse, ScheduleError> {
        event.schedule_calendar_id = Some(self.config.calendar.resolve(event.schedule_calendar_id)?);

        let start = event
            .start
            .as_deref()
            .ok_or_else(|| ScheduleError::validation("Start time is required"))?;
        event.start = Some(normalize_timestamp("Start", start)?);
        let end = event
            .end
            .as_deref()
            .ok_or_else(|| ScheduleError::validation("End time is required"))?;
        event.end = Some(normalize_timestamp("End", end)?);

        event.jobcode_id.get_or_insert(0);
        event.assigned_user_ids.get_or_insert_with(Vec::new);

        self.write(HttpMethod::Post, &event).await
    }

    /// Partial update. Only `id` and the calendar id are required.
    pub async fn update_event(&self, patch: EventPatch) -> Result<WriteResponse, ScheduleError> {
        let mut patch = self.prepare_patch(patch)?;
        if self.config.flags == FlagPolicy::AlwaysSend {
            patch.draft.get_or_insert(false);
            patch.active.get_or_insert(false);
            patch.all_day.get_or_insert(false);
        }
        self.write(HttpMethod::Put, &patch).await
    }

    /// Soft delete: sets `active = false` and nothing else.
    pub async fn deactivate_event(
        &self,
        event_id: Option<i64>,
        calendar_id: Option<i64>,
    ) -> Result<WriteResponse, ScheduleError> {
        let patch = self.prepare_patch(EventPatch::deactivation(event_id, calendar_id))?;
        self.write(HttpMethod::Put, &patch).await
    }

    fn prepare_patch(&self, mut patch: EventPatch) -> Result<EventPatch, ScheduleError> {
        match patch.id {
            Some(id) if id > 0 => {}
            Some(id) => {
                return Err(ScheduleError::validation(format!(
                    "Event ID must be positive, got {}",
                    id
                )));
            }
            None => return Err(ScheduleError::validation("Event ID is required")),
        }
        patch.schedule_calendar_id = Some(self.config.calendar.resolve(patch.schedule_calendar_id)?);

        if let Some(start) = patch.start.as_deref() {
            patch.start = Some(normalize_timestamp("Start", start)?);
        }
        if let Some(end) = patch.end.as_deref() {
            patch.end = Some(normalize_timestamp("End", end)?);
        }
        Ok(patch)
    }

    async fn write<T: Serialize>(
        &self,
        method: HttpMethod,
        item: &T,
    ) -> Result<WriteResponse, ScheduleError> {
        let body = serde_json::to_value(dto::WriteRequest::single(item))
            .map_err(|e| ScheduleError::Decode(format!("failed to encode request body: {}", e)))?;

        let response = self.send(method, Vec::new(), Some(body)).await?;
        match response.status {
            200 | 201 => {
                let body = if response.body.trim().is_empty() {
                    Value::Null
                } else {
                    serde_json::from_str(&response.body)
                        .map_err(|e| ScheduleError::Decode(e.to_string()))?
                };
                Ok(WriteResponse {
                    status: response.status,
                    body,
                })
            }
            status => Err(ScheduleError::Api {
                status,
                body: response.body,
            }),
        }
    }

    async fn send(
        &self,
        method: HttpMethod,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Result<ApiResponse, ScheduleError> {
        debug!(?method, path = SCHEDULE_EVENTS_PATH, "sending request");

        let request = ApiRequest {
            method,
            path: SCHEDULE_EVENTS_PATH.to_string(),
            query,
            body,
            token: self.token.clone(),
        };

        let response = self.transport.send(request).await.inspect_err(|e| {
            warn!(?method, "schedule events request failed: {}", e);
        })?;

        if response.is_success() {
            info!(?method, status = response.status, "schedule events request completed");
        } else {
            warn!(?method, status = response.status, "schedule events request rejected");
        }
        Ok(response)
    }
}

/// ISO-8601 timestamp with sub-second precision dropped. Values without an
/// offset are read as UTC.
pub fn normalize_timestamp(field: &str, raw: &str) -> Result<String, ScheduleError> {
    let trimmed = raw.trim();
    let parsed = DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc().fixed_offset())
        })
        .map_err(|_| {
            ScheduleError::validation(format!(
                "{} time must be an ISO-8601 timestamp, got '{}'",
                field, raw
            ))
        })?;

    Ok(parsed.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Identifier typed into a form: trimmed, integer, positive.
pub fn parse_identifier(field: &str, raw: &str) -> Result<i64, ScheduleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::validation(format!("{} is required", field)));
    }
    let id = trimmed
        .parse::<i64>()
        .map_err(|_| ScheduleError::validation(format!("{} must be a number, got '{}'", field, trimmed)))?;
    if id <= 0 {
        return Err(ScheduleError::validation(format!(
            "{} must be positive, got {}",
            field, id
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_lose_sub_second_precision() {
        assert_eq!(
            normalize_timestamp("Start", "2025-02-21T08:30:15.123456+00:00").unwrap(),
            "2025-02-21T08:30:15+00:00"
        );
        assert_eq!(
            normalize_timestamp("Start", "2025-02-21T08:30:15Z").unwrap(),
            "2025-02-21T08:30:15+00:00"
        );
        assert_eq!(
            normalize_timestamp("End", "2025-03-30T23:59:59.999999-05:00").unwrap(),
            "2025-03-30T23:59:59-05:00"
        );
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        assert_eq!(
            normalize_timestamp("Start", "2025-02-21T09:00:00.5").unwrap(),
            "2025-02-21T09:00:00+00:00"
        );
    }

    #[test]
    fn garbage_timestamp_is_a_validation_error() {
        let err = normalize_timestamp("Start", "next tuesday").unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn identifiers_must_be_positive_integers() {
        assert_eq!(parse_identifier("Event ID", " 42 ").unwrap(), 42);
        assert!(parse_identifier("Event ID", "").is_err());
        assert!(parse_identifier("Event ID", "abc").is_err());
        assert!(parse_identifier("Event ID", "0").is_err());
        assert!(parse_identifier("Event ID", "-3").is_err());
    }

    #[test]
    fn fixed_policy_overrides_caller_input() {
        let policy = CalendarPolicy::Fixed(563646);
        assert_eq!(policy.resolve(Some(1)).unwrap(), 563646);
        assert_eq!(policy.resolve(None).unwrap(), 563646);
    }

    #[test]
    fn caller_policy_requires_an_id() {
        let policy = CalendarPolicy::CallerSupplied;
        assert_eq!(policy.resolve(Some(5)).unwrap(), 5);
        assert!(matches!(policy.resolve(None), Err(ScheduleError::Validation(_))));
        assert!(matches!(policy.resolve(Some(0)), Err(ScheduleError::Validation(_))));
    }
}

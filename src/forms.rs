//! Raw form input and its coercion into adapter payloads.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;

use crate::error::ScheduleError;
use crate::models::{EventPatch, NewEvent, parse_id_list};
use crate::schedule_api::parse_identifier;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub calendar_id: Option<String>,
}

impl RangeQuery {
    /// The list view only fetches once the form has been submitted.
    pub fn is_submitted(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Prefills empty fields with a window from a week ago to a month ahead.
    pub fn with_defaults(mut self, today: NaiveDate) -> Self {
        if self.start_date.as_deref().is_none_or(|s| s.trim().is_empty()) {
            self.start_date = Some((today - Duration::days(7)).format(DATE_FORMAT).to_string());
        }
        if self.end_date.as_deref().is_none_or(|s| s.trim().is_empty()) {
            self.end_date = Some((today + Duration::days(30)).format(DATE_FORMAT).to_string());
        }
        self
    }

    pub fn to_range(&self) -> Result<(String, String), ScheduleError> {
        let start = parse_date("Start date", self.start_date.as_deref().unwrap_or(""))?;
        let end = parse_date("End date", self.end_date.as_deref().unwrap_or(""))?;
        Ok(date_range_bounds(start, end))
    }

    pub fn calendar_id(&self) -> Result<Option<i64>, ScheduleError> {
        optional_identifier("Schedule Calendar ID", self.calendar_id.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEventForm {
    #[serde(default)]
    pub calendar_id: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub assigned_user_ids: String,
    #[serde(default)]
    pub jobcode_id: String,
    #[serde(default)]
    pub color: String,
    pub draft: Option<String>,
    pub active: Option<String>,
    pub all_day: Option<String>,
}

impl CreateEventForm {
    /// Starts now, lasts two hours, draft and active.
    pub fn with_defaults(now: DateTime<Utc>) -> Self {
        Self {
            start: iso_seconds(now),
            end: iso_seconds(now + Duration::hours(2)),
            draft: Some("on".to_string()),
            active: Some("on".to_string()),
            ..Default::default()
        }
    }

    pub fn to_new_event(&self) -> Result<NewEvent, ScheduleError> {
        Ok(NewEvent {
            schedule_calendar_id: optional_identifier("Schedule Calendar ID", &self.calendar_id)?,
            start: text(&self.start),
            end: text(&self.end),
            title: text(&self.title),
            notes: text(&self.notes),
            assigned_user_ids: Some(user_ids(&self.assigned_user_ids)?),
            draft: self.draft.is_some(),
            active: self.active.is_some(),
            all_day: self.all_day.is_some(),
            jobcode_id: Some(optional_number("Job Code ID", &self.jobcode_id)?.unwrap_or(0)),
            color: text(&self.color),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventForm {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub calendar_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub assigned_user_ids: String,
    #[serde(default)]
    pub jobcode_id: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub draft: String,
    #[serde(default)]
    pub active: String,
    #[serde(default)]
    pub all_day: String,
}

impl UpdateEventForm {
    /// Blank fields stay unset. A blank event id is left for the adapter to
    /// reject.
    pub fn to_patch(&self) -> Result<EventPatch, ScheduleError> {
        let assigned = if self.assigned_user_ids.trim().is_empty() {
            None
        } else {
            Some(user_ids(&self.assigned_user_ids)?)
        };

        Ok(EventPatch {
            id: optional_identifier("Event ID", &self.event_id)?,
            schedule_calendar_id: optional_identifier("Schedule Calendar ID", &self.calendar_id)?,
            start: text(&self.start),
            end: text(&self.end),
            title: text(&self.title),
            notes: text(&self.notes),
            assigned_user_ids: assigned,
            draft: tri_state("Draft", &self.draft)?,
            active: tri_state("Active", &self.active)?,
            all_day: tri_state("All Day", &self.all_day)?,
            jobcode_id: optional_number("Job Code ID", &self.jobcode_id)?,
            color: text(&self.color),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeactivateEventForm {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub calendar_id: String,
}

impl DeactivateEventForm {
    pub fn identifiers(&self) -> Result<(Option<i64>, Option<i64>), ScheduleError> {
        Ok((
            optional_identifier("Event ID", &self.event_id)?,
            optional_identifier("Schedule Calendar ID", &self.calendar_id)?,
        ))
    }
}

/// Whole-day window in UTC: midnight of `start` to the last second of `end`.
pub fn date_range_bounds(start: NaiveDate, end: NaiveDate) -> (String, String) {
    let from = start.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let to = end.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc();
    (iso_seconds(from), iso_seconds(to))
}

pub fn iso_seconds(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        ScheduleError::validation(format!("{} must be a date (YYYY-MM-DD), got '{}'", field, raw))
    })
}

// Blank means unset. Anything else is sent exactly as typed.
fn text(raw: &str) -> Option<String> {
    (!raw.trim().is_empty()).then(|| raw.to_string())
}

fn optional_identifier(field: &str, raw: &str) -> Result<Option<i64>, ScheduleError> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_identifier(field, raw).map(Some)
    }
}

fn optional_number(field: &str, raw: &str) -> Result<Option<i64>, ScheduleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ScheduleError::validation(format!("{} must be a number, got '{}'", field, trimmed)))
}

fn user_ids(raw: &str) -> Result<Vec<i64>, ScheduleError> {
    parse_id_list(raw).map_err(|e| ScheduleError::validation(format!("Assigned User IDs: {}", e)))
}

fn tri_state(field: &str, raw: &str) -> Result<Option<bool>, ScheduleError> {
    match raw.trim() {
        "" => Ok(None),
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(ScheduleError::validation(format!(
            "{} must be true, false or unchanged, got '{}'",
            field, other
        ))),
    }
}

use askama::Template;
use axum::http::StatusCode;
use axum::response::Html;

use crate::error::PageResult;
use crate::forms::{CreateEventForm, DeactivateEventForm, UpdateEventForm};
use crate::models::ScheduleEvent;
use crate::schedule_api::FlagPolicy;

/// A one-line message shown above a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: "success", message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: "warning", message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: "error", message: message.into() }
    }
}

pub fn render<T: Template>(page: &T) -> PageResult {
    Ok(Html(page.render()?))
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub notice: Option<Notice>,
    pub fixed_calendar_id: Option<i64>,
    pub flags_always_sent: bool,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsPage {
    pub notice: Option<Notice>,
    pub has_token: bool,
}

#[derive(Template)]
#[template(path = "events.html")]
pub struct EventsPage {
    pub notice: Option<Notice>,
    pub fixed_calendar_id: Option<i64>,
    pub start_date: String,
    pub end_date: String,
    pub calendar_id: String,
    pub events: Vec<EventRow>,
}

/// Display strings for one fetched event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    pub notes: String,
}

impl From<&ScheduleEvent> for EventRow {
    fn from(event: &ScheduleEvent) -> Self {
        let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| "N/A".to_string());
        Self {
            id: event.id.to_string(),
            title: or_na(&event.title),
            start: or_na(&event.start),
            end: or_na(&event.end),
            notes: event.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "create.html")]
pub struct CreatePage {
    pub notice: Option<Notice>,
    pub fixed_calendar_id: Option<i64>,
    pub form: CreateEventForm,
    pub draft: bool,
    pub active: bool,
    pub all_day: bool,
    pub response_json: Option<String>,
}

impl CreatePage {
    pub fn new(fixed_calendar_id: Option<i64>, form: CreateEventForm) -> Self {
        Self {
            notice: None,
            fixed_calendar_id,
            draft: form.draft.is_some(),
            active: form.active.is_some(),
            all_day: form.all_day.is_some(),
            form,
            response_json: None,
        }
    }
}

#[derive(Template)]
#[template(path = "update.html")]
pub struct UpdatePage {
    pub notice: Option<Notice>,
    pub fixed_calendar_id: Option<i64>,
    pub form: UpdateEventForm,
    pub flags: Vec<FlagChoice>,
    pub response_json: Option<String>,
}

impl UpdatePage {
    pub fn new(fixed_calendar_id: Option<i64>, policy: FlagPolicy, form: UpdateEventForm) -> Self {
        let flags = vec![
            FlagChoice::new("draft", "Draft", &form.draft, policy),
            FlagChoice::new("active", "Active", &form.active, policy),
            FlagChoice::new("all_day", "All Day", &form.all_day, policy),
        ];
        Self {
            notice: None,
            fixed_calendar_id,
            form,
            flags,
            response_json: None,
        }
    }
}

/// A status flag rendered as a three-way select. The blank option is
/// labelled with what it actually sends under the flag policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagChoice {
    pub name: &'static str,
    pub label: &'static str,
    pub unset_label: &'static str,
    pub unset: bool,
    pub yes: bool,
    pub no: bool,
}

impl FlagChoice {
    fn new(name: &'static str, label: &'static str, current: &str, policy: FlagPolicy) -> Self {
        let unset_label = match policy {
            FlagPolicy::AlwaysSend => "No (form default)",
            FlagPolicy::OmitUnset => "Unchanged",
        };
        Self {
            name,
            label,
            unset_label,
            unset: current != "true" && current != "false",
            yes: current == "true",
            no: current == "false",
        }
    }
}

#[derive(Template)]
#[template(path = "deactivate.html")]
pub struct DeactivatePage {
    pub notice: Option<Notice>,
    pub fixed_calendar_id: Option<i64>,
    pub form: DeactivateEventForm,
    pub response_json: Option<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub notice: Option<Notice>,
    pub status: String,
}

impl ErrorPage {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self {
            notice: Some(Notice::error(message)),
            status: status.to_string(),
        }
    }

    pub fn into_html(self) -> Html<String> {
        match self.render() {
            Ok(html) => Html(html),
            Err(_) => Html(format!("<h1>{}</h1>", self.status)),
        }
    }
}

pub fn pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

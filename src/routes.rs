use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::PageResult;
use crate::forms::{CreateEventForm, DeactivateEventForm, RangeQuery, UpdateEventForm};
use crate::schedule_api::{ApiToken, FlagPolicy, WriteResponse};
use crate::session::{self, Session};
use crate::state::AppState;
use crate::views::{
    CreatePage, DeactivatePage, EventRow, EventsPage, HomePage, Notice, SettingsPage, UpdatePage,
    pretty_json, render,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/settings", get(settings_form).post(save_token))
        .route("/settings/clear", post(forget_token))
        .route("/events", get(list_events))
        .route("/events/new", get(create_form).post(create_event))
        .route("/events/update", get(update_form).post(update_event))
        .route("/events/deactivate", get(deactivate_form).post(deactivate_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn home(State(state): State<AppState>, _session: Session) -> PageResult {
    render(&HomePage {
        notice: None,
        fixed_calendar_id: state.fixed_calendar_id(),
        flags_always_sent: state.config.api.flags == FlagPolicy::AlwaysSend,
    })
}

async fn settings_form(jar: CookieJar) -> PageResult {
    render(&SettingsPage {
        notice: None,
        has_token: session::token_from(&jar).is_some(),
    })
}

#[derive(Deserialize)]
struct TokenForm {
    #[serde(default)]
    api_token: String,
}

async fn save_token(
    jar: CookieJar,
    Form(form): Form<TokenForm>,
) -> Result<(CookieJar, Redirect), PageResult> {
    match ApiToken::new(form.api_token) {
        Some(token) => {
            info!("api token stored for session");
            Ok((session::store_token(jar, &token), Redirect::to("/")))
        }
        None => Err(render(&SettingsPage {
            notice: Some(Notice::warning("Please enter your API token to continue.")),
            has_token: session::token_from(&jar).is_some(),
        })),
    }
}

async fn forget_token(jar: CookieJar) -> (CookieJar, Redirect) {
    (session::clear_token(jar), Redirect::to("/settings"))
}

async fn list_events(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<RangeQuery>,
) -> PageResult {
    let submitted = query.is_submitted();
    let query = query.with_defaults(Utc::now().date_naive());

    let mut page = EventsPage {
        notice: None,
        fixed_calendar_id: state.fixed_calendar_id(),
        start_date: query.start_date.clone().unwrap_or_default(),
        end_date: query.end_date.clone().unwrap_or_default(),
        calendar_id: query.calendar_id.clone().unwrap_or_default(),
        events: Vec::new(),
    };

    if submitted {
        let fetched = match (query.to_range(), query.calendar_id()) {
            (Ok((start, end)), Ok(calendar_id)) => {
                state
                    .api(session.token)
                    .fetch_events(&start, &end, calendar_id)
                    .await
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        page.notice = Some(match fetched {
            Ok(events) if events.is_empty() => {
                Notice::warning("No schedule events found for the selected range.")
            }
            Ok(events) => {
                page.events = events.sorted().into_iter().map(EventRow::from).collect();
                Notice::success(format!("Fetched {} schedule event(s).", events.len()))
            }
            Err(e) => {
                warn!("fetching schedule events failed: {}", e);
                Notice::error(format!("Error fetching schedules: {}", e))
            }
        });
    }

    render(&page)
}

async fn create_form(State(state): State<AppState>, _session: Session) -> PageResult {
    let form = CreateEventForm::with_defaults(Utc::now());
    render(&CreatePage::new(state.fixed_calendar_id(), form))
}

async fn create_event(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CreateEventForm>,
) -> PageResult {
    let result = match form.to_new_event() {
        Ok(event) => state.api(session.token).create_event(event).await,
        Err(e) => Err(e),
    };

    let mut page = CreatePage::new(state.fixed_calendar_id(), form);
    apply_outcome(
        result,
        "Schedule event created successfully!",
        "Failed to create event",
        &mut page.notice,
        &mut page.response_json,
    );
    render(&page)
}

async fn update_form(State(state): State<AppState>, _session: Session) -> PageResult {
    render(&UpdatePage::new(
        state.fixed_calendar_id(),
        state.config.api.flags,
        UpdateEventForm::default(),
    ))
}

async fn update_event(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateEventForm>,
) -> PageResult {
    let result = match form.to_patch() {
        Ok(patch) => state.api(session.token).update_event(patch).await,
        Err(e) => Err(e),
    };

    let mut page = UpdatePage::new(state.fixed_calendar_id(), state.config.api.flags, form);
    apply_outcome(
        result,
        "Schedule event updated successfully!",
        "Failed to update event",
        &mut page.notice,
        &mut page.response_json,
    );
    render(&page)
}

async fn deactivate_form(State(state): State<AppState>, _session: Session) -> PageResult {
    render(&DeactivatePage {
        notice: None,
        fixed_calendar_id: state.fixed_calendar_id(),
        form: DeactivateEventForm::default(),
        response_json: None,
    })
}

async fn deactivate_event(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<DeactivateEventForm>,
) -> PageResult {
    let result = match form.identifiers() {
        Ok((event_id, calendar_id)) => {
            state
                .api(session.token)
                .deactivate_event(event_id, calendar_id)
                .await
        }
        Err(e) => Err(e),
    };

    let mut page = DeactivatePage {
        notice: None,
        fixed_calendar_id: state.fixed_calendar_id(),
        form,
        response_json: None,
    };
    apply_outcome(
        result,
        "Schedule event deactivated successfully!",
        "Failed to deactivate event",
        &mut page.notice,
        &mut page.response_json,
    );
    render(&page)
}

fn apply_outcome(
    result: Result<WriteResponse, crate::error::ScheduleError>,
    success: &str,
    failure: &str,
    notice: &mut Option<Notice>,
    response_json: &mut Option<String>,
) {
    match result {
        Ok(response) => {
            *notice = Some(Notice::success(success));
            *response_json = Some(pretty_json(&response.body));
        }
        Err(e) => {
            warn!("{}: {}", failure, e);
            *notice = Some(Notice::error(format!("{}: {}", failure, e)));
        }
    }
}

use std::sync::Arc;

use crate::config::AppConfig;
use crate::schedule_api::{ApiToken, ScheduleApi, Transport};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub transport: Arc<dyn Transport>,
}

impl AppState {
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Adapter bound to one session's token.
    pub fn api(&self, token: ApiToken) -> ScheduleApi {
        ScheduleApi::new(self.transport.clone(), self.config.api.clone(), token)
    }

    pub fn fixed_calendar_id(&self) -> Option<i64> {
        self.config.api.calendar.fixed_id()
    }
}

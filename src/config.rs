use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;
use crate::schedule_api::{ApiConfig, CalendarPolicy, DEFAULT_BASE_URL, FlagPolicy};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub http_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Reads the process environment, after merging `.env` if present.
    pub fn new_from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let base_url = var("TSHEETS_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let calendar = match var("SCHEDULE_CALENDAR_ID") {
            Some(raw) => {
                let id = raw.parse::<i64>().map_err(|_| {
                    AppError::Config(format!("SCHEDULE_CALENDAR_ID must be a number, got '{}'", raw))
                })?;
                if id <= 0 {
                    return Err(AppError::Config(format!(
                        "SCHEDULE_CALENDAR_ID must be positive, got {}",
                        id
                    )));
                }
                CalendarPolicy::Fixed(id)
            }
            None => CalendarPolicy::CallerSupplied,
        };

        let flags = match var("SEND_UNSET_FLAGS") {
            Some(raw) => match parse_bool(&raw) {
                Some(true) => FlagPolicy::AlwaysSend,
                Some(false) => FlagPolicy::OmitUnset,
                None => {
                    return Err(AppError::Config(format!(
                        "SEND_UNSET_FLAGS must be true or false, got '{}'",
                        raw
                    )));
                }
            },
            None => FlagPolicy::AlwaysSend,
        };

        let timeout_secs = match var("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(AppError::Config(format!(
                        "HTTP_TIMEOUT_SECS must be a positive number of seconds, got '{}'",
                        raw
                    )));
                }
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|_| {
            AppError::Config(format!("BIND_ADDR is not a socket address: '{}'", bind_addr))
        })?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                calendar,
                flags,
            },
            http_timeout: Duration::from_secs(timeout_secs),
            bind_addr,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.calendar, CalendarPolicy::CallerSupplied);
        assert_eq!(config.api.flags, FlagPolicy::AlwaysSend);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn calendar_id_selects_fixed_policy() {
        let config = load(&[("SCHEDULE_CALENDAR_ID", "563646")]).unwrap();
        assert_eq!(config.api.calendar, CalendarPolicy::Fixed(563646));
    }

    #[test]
    fn flags_can_be_omitted_and_base_url_is_trimmed() {
        let config = load(&[
            ("SEND_UNSET_FLAGS", "false"),
            ("TSHEETS_API_BASE_URL", "http://localhost:9000/api/v1/"),
        ])
        .unwrap();
        assert_eq!(config.api.flags, FlagPolicy::OmitUnset);
        assert_eq!(config.api.base_url, "http://localhost:9000/api/v1");
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(matches!(load(&[("SCHEDULE_CALENDAR_ID", "abc")]), Err(AppError::Config(_))));
        assert!(matches!(load(&[("SCHEDULE_CALENDAR_ID", "-1")]), Err(AppError::Config(_))));
        assert!(matches!(load(&[("SEND_UNSET_FLAGS", "maybe")]), Err(AppError::Config(_))));
        assert!(matches!(load(&[("BIND_ADDR", "nowhere")]), Err(AppError::Config(_))));
    }

    #[test]
    fn timeout_must_be_positive() {
        for raw in ["0", "-5", "soon"] {
            assert!(
                matches!(load(&[("HTTP_TIMEOUT_SECS", raw)]), Err(AppError::Config(_))),
                "{}",
                raw
            );
        }
        let config = load(&[("HTTP_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }
}

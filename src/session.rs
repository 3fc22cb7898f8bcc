use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::error::AppError;
use crate::schedule_api::ApiToken;

pub const TOKEN_COOKIE: &str = "api_token";

/// The API token of the current browser session. Handlers that take this
/// extractor refuse to run without one.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: ApiToken,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        token_from(&jar)
            .map(|token| Session { token })
            .ok_or(AppError::MissingToken)
    }
}

pub fn token_from(jar: &CookieJar) -> Option<ApiToken> {
    jar.get(TOKEN_COOKIE)
        .and_then(|cookie| ApiToken::new(cookie.value()))
}

pub fn store_token(jar: CookieJar, token: &ApiToken) -> CookieJar {
    let cookie = Cookie::build((TOKEN_COOKIE, token.expose().to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict);
    jar.add(cookie)
}

pub fn clear_token(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
}

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::AppConfig;

pub const SESSION_COOKIE: &str = "token";

/// `token` cookie carrying a freshly issued session
pub fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(config.security.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.session_ttl_secs()))
        .path("/")
        .build()
}

/// Expired `token` cookie that makes the browser drop the session
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .path("/")
        .build()
}

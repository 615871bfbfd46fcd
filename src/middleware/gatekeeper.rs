//! Per-request authentication and coarse role routing.
//!
//! Every request passes through here exactly once. Client-supplied identity
//! headers are always dropped; for authenticated requests the decoded session
//! is stamped back as trusted `x-user-*` headers. Whether the token signature
//! is checked here depends on `security.verify_token_at_edge`; handlers that
//! change state verify it again regardless (see [`super::VerifiedSession`]).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::identity::{strip_identity_headers, Identity};
use crate::auth::{self, cookie, Claims, JwtError};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::Role;

const LOGIN_PAGE: &str = "/login";

/// Paths served without a session, matched by prefix
const PUBLIC_PREFIXES: &[&str] = &[
    "/login",
    "/register",
    "/api/auth/login",
    "/api/auth/register",
    "/health",
    "/_next/",
    "/static/",
    "/favicon.ico",
];

/// Role required below each path prefix
const ROLE_PREFIXES: &[(&str, Role)] = &[
    ("/api/admin", Role::SuperAdmin),
    ("/dashboard", Role::TeamLeader),
    ("/coordinator", Role::Coordinator),
    ("/admin", Role::SuperAdmin),
];

/// What to do with a request
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Public path; forward without identity
    Pass,
    /// Authenticated; forward with these claims as trusted headers
    Forward(Claims),
    /// API path refused with a JSON error
    Reject {
        status: StatusCode,
        message: &'static str,
        clear_cookie: bool,
    },
    /// Page path sent elsewhere
    Redirect {
        location: &'static str,
        clear_cookie: bool,
    },
}

enum Session {
    Missing,
    Invalid,
    Expired,
    Valid(Claims),
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub fn is_api(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// `path` equals `prefix` or continues it with a new segment
fn under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'))
}

/// Role required for `path`, if it is role-gated
pub fn required_role(path: &str) -> Option<Role> {
    ROLE_PREFIXES
        .iter()
        .find(|(prefix, _)| under(path, prefix))
        .map(|(_, role)| *role)
}

fn read_session(token: Option<&str>, now: i64, config: &AppConfig) -> Session {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Session::Missing;
    };

    let decoded = if config.security.verify_token_at_edge {
        auth::verify_jwt(token, &config.security.jwt_secret, now)
    } else {
        auth::decode_unverified(token, now)
    };

    match decoded {
        Ok(claims) => Session::Valid(claims),
        Err(JwtError::Expired) => Session::Expired,
        Err(e) => {
            tracing::debug!("Rejected session token: {}", e);
            Session::Invalid
        }
    }
}

/// Routing decision for one request. Pure: no I/O, no clock.
pub fn decide(path: &str, token: Option<&str>, now: i64, config: &AppConfig) -> Decision {
    if is_public(path) {
        return Decision::Pass;
    }

    let cookie_present = token.is_some_and(|t| !t.is_empty());
    let api = is_api(path);

    let claims = match read_session(token, now, config) {
        Session::Valid(claims) => claims,
        session => {
            let message = match session {
                Session::Invalid => "Invalid token",
                _ => "Unauthorized",
            };
            return if api {
                Decision::Reject {
                    status: StatusCode::UNAUTHORIZED,
                    message,
                    clear_cookie: cookie_present,
                }
            } else {
                Decision::Redirect {
                    location: LOGIN_PAGE,
                    clear_cookie: cookie_present,
                }
            };
        }
    };

    if path == "/" {
        return Decision::Redirect {
            location: claims.role.home_path(),
            clear_cookie: false,
        };
    }

    if let Some(required) = required_role(path) {
        if claims.role != required {
            tracing::debug!("Role {} refused on {} (requires {})", claims.role, path, required);
            return if api {
                Decision::Reject {
                    status: StatusCode::FORBIDDEN,
                    message: "Forbidden",
                    clear_cookie: false,
                }
            } else {
                Decision::Redirect {
                    location: LOGIN_PAGE,
                    clear_cookie: false,
                }
            };
        }
    }

    Decision::Forward(claims)
}

/// Axum middleware applying [`decide`] to every request
pub async fn gatekeeper(State(state): State<AppState>, jar: CookieJar, mut request: Request, next: Next) -> Response {
    strip_identity_headers(request.headers_mut());

    let path = request.uri().path().to_owned();
    let token = jar.get(cookie::SESSION_COOKIE).map(|c| c.value().to_owned());
    let now = Utc::now().timestamp();

    match decide(&path, token.as_deref(), now, &state.config) {
        Decision::Pass => next.run(request).await,
        Decision::Forward(claims) => {
            if let Err(e) = Identity::from(&claims).write_headers(request.headers_mut()) {
                tracing::warn!("Session for user {} cannot be forwarded: {}", claims.user_id, e);
                let err = ApiError::unauthorized("Invalid token");
                return (jar.add(cookie::cleared_session_cookie()), err).into_response();
            }
            next.run(request).await
        }
        Decision::Reject {
            status,
            message,
            clear_cookie,
        } => {
            let err = if status == StatusCode::FORBIDDEN {
                ApiError::forbidden(message)
            } else {
                ApiError::unauthorized(message)
            };
            if clear_cookie {
                (jar.add(cookie::cleared_session_cookie()), err).into_response()
            } else {
                err.into_response()
            }
        }
        Decision::Redirect {
            location,
            clear_cookie,
        } => {
            if clear_cookie {
                (jar.add(cookie::cleared_session_cookie()), Redirect::to(location)).into_response()
            } else {
                Redirect::to(location).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;

    const NOW: i64 = 1_760_000_000;

    fn config() -> AppConfig {
        AppConfig::development()
    }

    fn token(role: Role, exp: i64, secret: &str) -> String {
        let claims = Claims {
            user_id: 5,
            email: "someone@pfe.com".into(),
            role,
            name: "Someone".into(),
            exp,
            iat: NOW - 10,
        };
        generate_jwt(&claims, secret).unwrap()
    }

    fn valid(role: Role) -> String {
        token(role, NOW + 3600, &config().security.jwt_secret)
    }

    #[test]
    fn public_paths_pass_without_a_cookie() {
        for path in [
            "/login",
            "/login/reset",
            "/register",
            "/api/auth/login",
            "/api/auth/register",
            "/health",
            "/_next/static/app.js",
            "/static/logo.png",
            "/favicon.ico",
        ] {
            assert_eq!(decide(path, None, NOW, &config()), Decision::Pass, "{path}");
        }
    }

    #[test]
    fn missing_token_on_api_is_401_without_clearing() {
        assert_eq!(
            decide("/api/admin/users", None, NOW, &config()),
            Decision::Reject {
                status: StatusCode::UNAUTHORIZED,
                message: "Unauthorized",
                clear_cookie: false
            }
        );
    }

    #[test]
    fn malformed_token_clears_cookie() {
        assert_eq!(
            decide("/api/teams", Some("not-a-jwt"), NOW, &config()),
            Decision::Reject {
                status: StatusCode::UNAUTHORIZED,
                message: "Invalid token",
                clear_cookie: true
            }
        );
        assert_eq!(
            decide("/dashboard", Some("a.b"), NOW, &config()),
            Decision::Redirect {
                location: "/login",
                clear_cookie: true
            }
        );
    }

    #[test]
    fn expired_token_is_treated_as_missing() {
        let expired = token(Role::TeamLeader, NOW - 1, &config().security.jwt_secret);
        for path in ["/api/teams", "/dashboard", "/"] {
            let with_expired = decide(path, Some(&expired), NOW, &config());
            let without = decide(path, None, NOW, &config());
            match (with_expired, without) {
                (
                    Decision::Reject { status: a, message: m, .. },
                    Decision::Reject { status: b, message: n, .. },
                ) => assert_eq!((a, m), (b, n)),
                (Decision::Redirect { location: a, .. }, Decision::Redirect { location: b, .. }) => {
                    assert_eq!(a, b)
                }
                other => panic!("{path}: {other:?}"),
            }
        }
    }

    #[test]
    fn every_role_prefix_mismatch_is_denied() {
        let prefixes = [
            ("/dashboard/team", Role::TeamLeader),
            ("/coordinator/teams", Role::Coordinator),
            ("/admin/users", Role::SuperAdmin),
            ("/api/admin/stats", Role::SuperAdmin),
        ];

        for (path, owner) in prefixes {
            for role in Role::ALL {
                let decision = decide(path, Some(&valid(role)), NOW, &config());
                if role == owner {
                    assert!(matches!(decision, Decision::Forward(ref c) if c.role == role), "{path} {role}");
                } else if is_api(path) {
                    assert!(
                        matches!(decision, Decision::Reject { status: StatusCode::FORBIDDEN, .. }),
                        "{path} {role}"
                    );
                } else {
                    assert_eq!(
                        decision,
                        Decision::Redirect {
                            location: "/login",
                            clear_cookie: false
                        },
                        "{path} {role}"
                    );
                }
            }
        }
    }

    #[test]
    fn root_redirects_to_role_home() {
        assert_eq!(
            decide("/", None, NOW, &config()),
            Decision::Redirect {
                location: "/login",
                clear_cookie: false
            }
        );
        for role in Role::ALL {
            assert_eq!(
                decide("/", Some(&valid(role)), NOW, &config()),
                Decision::Redirect {
                    location: role.home_path(),
                    clear_cookie: false
                }
            );
        }
    }

    #[test]
    fn prefixes_match_whole_segments() {
        assert_eq!(required_role("/administrator"), None);
        assert_eq!(required_role("/admin"), Some(Role::SuperAdmin));
        assert_eq!(required_role("/api/admin/users"), Some(Role::SuperAdmin));
        assert_eq!(required_role("/api/teams"), None);
    }

    #[test]
    fn edge_verification_follows_config() {
        let forged = token(Role::SuperAdmin, NOW + 3600, "attacker-secret");

        let decoding = config();
        assert!(matches!(
            decide("/api/admin/users", Some(&forged), NOW, &decoding),
            Decision::Forward(_)
        ));

        let mut verifying = config();
        verifying.security.verify_token_at_edge = true;
        assert_eq!(
            decide("/api/admin/users", Some(&forged), NOW, &verifying),
            Decision::Reject {
                status: StatusCode::UNAUTHORIZED,
                message: "Invalid token",
                clear_cookie: true
            }
        );
    }
}

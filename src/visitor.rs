//! Visitor identity.
//!
//! Every browser gets a long-lived `ecg_visitor` cookie. Its value scopes the
//! key/value store and the in-memory quiz sessions, the way local storage is
//! scoped to a browser origin.

use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config;
use crate::session::generate_visitor_id;

pub const VISITOR_COOKIE_NAME: &str = "ecg_visitor";

/// The current visitor, available to any handler behind `ensure_visitor`.
#[derive(Clone, Debug)]
pub struct Visitor {
    pub id: String,
}

/// Ids are generated by `generate_visitor_id`; anything else is replaced.
fn is_valid_visitor_id(id: &str) -> bool {
    id.len() == 32 && id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

/// Middleware: attach a `Visitor` to the request, issuing a cookie on first visit.
pub async fn ensure_visitor(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let existing = jar
        .get(VISITOR_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|id| is_valid_visitor_id(id));

    if let Some(id) = existing {
        request.extensions_mut().insert(Visitor { id });
        return next.run(request).await;
    }

    let id = generate_visitor_id();
    tracing::debug!("New visitor {}", id);
    request.extensions_mut().insert(Visitor { id: id.clone() });
    let response = next.run(request).await;

    let cookie = Cookie::build((VISITOR_COOKIE_NAME, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(config::VISITOR_COOKIE_DAYS))
        .build();

    (jar.add(cookie), response).into_response()
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Visitor>().cloned().ok_or_else(|| {
            tracing::error!("Visitor missing from request; is ensure_visitor installed?");
            (StatusCode::INTERNAL_SERVER_ERROR, "Visitor unavailable").into_response()
        })
    }
}

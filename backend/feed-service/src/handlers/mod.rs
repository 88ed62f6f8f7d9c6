/// HTTP handlers
///
/// Thin glue over the feed operations. Session validation happens upstream;
/// the gateway forwards the authenticated viewer in the `X-User-Id` header.
use actix_web::{web, HttpRequest};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub mod comments;
pub mod feed;

/// Parse a path or header id, rejecting malformed values before any lookup.
pub(crate) fn parse_id(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::InvalidIdentifier(format!("{} is not a valid id", what)))
}

/// Viewer identity installed by the upstream gateway.
pub(crate) fn viewer_id(req: &HttpRequest) -> Result<Uuid> {
    let raw = req
        .headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::InvalidIdentifier("missing X-User-Id header".to_string()))?;
    parse_id(raw, "X-User-Id")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(feed::get_news_feed)
            .service(feed::get_single_post)
            .service(feed::get_user_feed)
            .service(feed::toggle_like)
            .service(comments::get_comments)
            .service(comments::get_child_comments),
    );
}

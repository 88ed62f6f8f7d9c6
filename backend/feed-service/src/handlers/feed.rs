use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::handlers::{parse_id, viewer_id};
use crate::services::FeedService;
use crate::store::PgRelationStore;

pub type AppState = web::Data<FeedService<PgRelationStore>>;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    pub like: bool,
}

#[get("/feed")]
pub async fn get_news_feed(
    req: HttpRequest,
    query: web::Query<PageQuery>,
    state: AppState,
) -> Result<HttpResponse> {
    let viewer = viewer_id(&req)?;
    debug!(%viewer, page = query.page, limit = query.limit, "news feed request");

    let feed = state.get_news_feed(viewer, query.page, query.limit).await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[get("/posts/{post_id}")]
pub async fn get_single_post(
    req: HttpRequest,
    path: web::Path<String>,
    state: AppState,
) -> Result<HttpResponse> {
    let viewer = viewer_id(&req)?;
    let post_id = parse_id(&path.into_inner(), "post_id")?;

    let post = state.get_single_post(post_id, viewer).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[get("/users/{user_id}/posts")]
pub async fn get_user_feed(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    state: AppState,
) -> Result<HttpResponse> {
    let viewer = viewer_id(&req)?;
    let target = parse_id(&path.into_inner(), "user_id")?;

    let feed = state
        .get_user_feed(target, viewer, query.page, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(feed))
}

#[post("/posts/{post_id}/like")]
pub async fn toggle_like(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<LikeRequest>,
    state: AppState,
) -> Result<HttpResponse> {
    let viewer = viewer_id(&req)?;
    let post_id = parse_id(&path.into_inner(), "post_id")?;

    let outcome = state.toggle_like(post_id, viewer, body.like).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

use actix_web::{get, web, HttpResponse};

use crate::error::Result;
use crate::handlers::feed::{AppState, PageQuery};
use crate::handlers::parse_id;

#[get("/posts/{post_id}/comments")]
pub async fn get_comments(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    state: AppState,
) -> Result<HttpResponse> {
    let post_id = parse_id(&path.into_inner(), "post_id")?;

    let page = state.get_comments(post_id, query.page, query.limit).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/comments/{comment_id}/replies")]
pub async fn get_child_comments(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    state: AppState,
) -> Result<HttpResponse> {
    let parent_id = parse_id(&path.into_inner(), "comment_id")?;

    let page = state
        .get_child_comments(parent_id, query.page, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

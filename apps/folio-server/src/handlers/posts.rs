//! Public post handlers.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use folio_shared::dto::{PageQuery, PostWithContentResponse, PostsPageResponse};

use super::{pagination_response, parse_post_id, post_response};
use crate::middleware::error::AppResult;
use crate::state::AppState;

const POSTS_PATH: &str = "/api/posts";

fn redirect_to_page(page: u64) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("{POSTS_PATH}?page={page}")))
        .finish()
}

/// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, POSTS_PATH))
        .finish()
}

/// GET /api/posts?page=N
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let requested = match query.page.as_deref().map(str::trim) {
        None | Some("") => 1,
        Some(raw) => match raw.parse::<i64>() {
            Ok(page) if page >= 1 => page,
            _ => return Ok(redirect_to_page(1)),
        },
    };

    let page = state
        .bounded(
            "getting paginated posts",
            state.posts.list_posts_paginated(requested),
        )
        .await?;

    let pagination = page.pagination;
    if pagination.total_posts > 0 && i64::try_from(pagination.current_page) != Ok(requested) {
        return Ok(redirect_to_page(pagination.current_page));
    }

    Ok(HttpResponse::Ok().json(PostsPageResponse {
        posts: page.posts.into_iter().map(post_response).collect(),
        pagination: pagination_response(pagination),
    }))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    let post = state
        .bounded("getting post", state.posts.get_post(id))
        .await?;
    let content = state
        .bounded("getting post content", state.content.get_content(&post.body))
        .await?;

    Ok(HttpResponse::Ok().json(PostWithContentResponse {
        post: post_response(post),
        content,
    }))
}

//! HTTP handlers and route configuration.

mod admin;
mod health;
mod posts;

use actix_web::web;
use folio_core::{PaginationInfo, Post};
use folio_shared::dto::{PaginationResponse, PostResponse};

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .route("/", web::get().to(posts::index))
    .service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/posts", web::get().to(posts::list_posts))
            .route("/posts/{id}", web::get().to(posts::get_post))
            // Admin routes
            .service(
                web::scope("/admin")
                    .route("/verify", web::post().to(admin::verify))
                    .route("/posts", web::get().to(admin::list_posts))
                    .route("/posts", web::post().to(admin::upload_post))
                    .route("/posts/{id}", web::get().to(admin::get_post))
                    .route("/posts/{id}", web::put().to(admin::update_post))
                    .route("/posts/{id}", web::delete().to(admin::delete_post)),
            ),
    );
}

fn parse_post_id(raw: &str) -> AppResult<i32> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid post id {raw:?}")))
}

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        description: post.description,
        body: post.body,
        author: post.author,
        created: post.created,
        edited: post.edited,
    }
}

fn pagination_response(info: PaginationInfo) -> PaginationResponse {
    PaginationResponse {
        current_page: info.current_page,
        total_pages: info.total_pages,
        total_posts: info.total_posts,
        has_next: info.has_next,
        has_prev: info.has_prev,
        next_page: info.next_page,
        prev_page: info.prev_page,
    }
}

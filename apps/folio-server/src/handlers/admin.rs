//! Admin handlers. Every route requires a verified admin token.

use actix_web::{HttpResponse, web};
use folio_core::{NewPost, PostUpdate};
use folio_shared::ApiResponse;
use folio_shared::dto::{AdminResponse, PostResponse, UpdatePostRequest, UploadPostRequest};

use super::{parse_post_id, post_response};
use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Author recorded on posts created through the admin API.
const ADMIN_AUTHOR: &str = "Admin";

fn require_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    Ok(())
}

/// POST /api/admin/verify
pub async fn verify(admin: AdminIdentity) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok_with_message(
        AdminResponse {
            uid: admin.uid,
            email: admin.email,
        },
        "Token is valid",
    ))
}

/// GET /api/admin/posts
pub async fn list_posts(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let posts = state
        .bounded("getting posts", state.posts.list_posts())
        .await?;

    let posts: Vec<PostResponse> = posts.into_iter().map(post_response).collect();
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/admin/posts/{id}
pub async fn get_post(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let post = state
        .bounded("getting post", state.posts.get_post(id))
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// PUT /api/admin/posts/{id}
pub async fn update_post(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;
    let req = body.into_inner();
    require_title(&req.title)?;

    state
        .bounded(
            "updating post",
            state
                .posts
                .update_post(id, PostUpdate::new(req.title, req.description, req.body)),
        )
        .await?;

    tracing::info!(admin = %admin.uid, post_id = id, "Admin updated post");

    let post = state
        .bounded("getting post", state.posts.get_post(id))
        .await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete_post(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_post_id(&path)?;

    state
        .bounded("deleting post", state.posts.delete_post(id))
        .await?;

    tracing::info!(admin = %admin.uid, post_id = id, "Admin deleted post");
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/admin/posts
///
/// Stores the HTML under `filename`, then points a new post (or the post
/// named by `post_id`) at it.
pub async fn upload_post(
    admin: AdminIdentity,
    state: web::Data<AppState>,
    body: web::Json<UploadPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    require_title(&req.title)?;
    if !req.filename.ends_with(".html") {
        return Err(AppError::BadRequest(
            "Only .html files are allowed".to_string(),
        ));
    }

    state
        .bounded(
            "saving post content",
            state.content.save_content(&req.filename, &req.html),
        )
        .await?;

    match req.post_id {
        Some(id) => {
            state
                .bounded(
                    "updating post",
                    state.posts.update_post(
                        id,
                        PostUpdate::new(req.title, req.excerpt, req.filename),
                    ),
                )
                .await?;
            let post = state
                .bounded("getting post", state.posts.get_post(id))
                .await?;

            tracing::info!(admin = %admin.uid, post_id = id, "Admin replaced post content");
            Ok(HttpResponse::Ok().json(post_response(post)))
        }
        None => {
            let post = state
                .bounded(
                    "creating post",
                    state.posts.create_post(NewPost::new(
                        req.title,
                        req.excerpt,
                        req.filename,
                        ADMIN_AUTHOR,
                    )),
                )
                .await?;

            tracing::info!(admin = %admin.uid, post_id = post.id, "Admin created post");
            Ok(HttpResponse::Created().json(post_response(post)))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test, web};
    use serde_json::json;

    use super::super::configure_routes;
    use super::super::test_support::{ADMIN_TOKEN, empty_state, seeded_state};
    use crate::middleware::auth::ADMIN_TOKEN_COOKIE;

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn bearer() -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
    }

    #[actix_web::test]
    async fn test_admin_routes_require_token() {
        let app = app!(seeded_state(1).await);

        let requests = [
            test::TestRequest::post().uri("/api/admin/verify"),
            test::TestRequest::get().uri("/api/admin/posts"),
            test::TestRequest::get().uri("/api/admin/posts/1"),
            test::TestRequest::delete().uri("/api/admin/posts/1"),
        ];
        for req in requests {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }

        let req = test::TestRequest::post()
            .uri("/api/admin/verify")
            .insert_header((header::AUTHORIZATION, "Bearer forged"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_verify_with_header_and_cookie() {
        let app = app!(empty_state());

        let req = test::TestRequest::post()
            .uri("/api/admin/verify")
            .insert_header(bearer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["uid"], "admin-uid");

        let req = test::TestRequest::post()
            .uri("/api/admin/verify")
            .cookie(Cookie::new(ADMIN_TOKEN_COOKIE, ADMIN_TOKEN))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_list_and_get() {
        let app = app!(seeded_state(3).await);

        let req = test::TestRequest::get()
            .uri("/api/admin/posts")
            .insert_header(bearer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["Post 3", "Post 2", "Post 1"]);

        let req = test::TestRequest::get()
            .uri("/api/admin/posts/2")
            .insert_header(bearer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["title"], "Post 2");
    }

    #[actix_web::test]
    async fn test_update_post() {
        let app = app!(seeded_state(1).await);

        let req = test::TestRequest::put()
            .uri("/api/admin/posts/1")
            .insert_header(bearer())
            .set_json(json!({"title": "Renamed", "description": "New", "body": ""}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["title"], "Renamed");
        assert_eq!(body["description"], "New");
        assert_eq!(body["body"], "post-1.html");

        let req = test::TestRequest::put()
            .uri("/api/admin/posts/1")
            .insert_header(bearer())
            .set_json(json!({"title": "  ", "description": "", "body": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/admin/posts/42")
            .insert_header(bearer())
            .set_json(json!({"title": "Ghost"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_post() {
        let app = app!(seeded_state(2).await);

        let req = test::TestRequest::delete()
            .uri("/api/admin/posts/1")
            .insert_header(bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::delete()
            .uri("/api/admin/posts/1")
            .insert_header(bearer())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_upload_creates_then_updates() {
        let app = app!(empty_state());

        let req = test::TestRequest::post()
            .uri("/api/admin/posts")
            .insert_header(bearer())
            .set_json(json!({
                "title": "Hello",
                "excerpt": "First post",
                "filename": "hello.html",
                "html": "<h1>Hello</h1>",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["author"], "Admin");
        assert_eq!(created["body"], "hello.html");

        let req = test::TestRequest::get().uri("/api/posts/1").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["content"], "<h1>Hello</h1>");

        let req = test::TestRequest::post()
            .uri("/api/admin/posts")
            .insert_header(bearer())
            .set_json(json!({
                "title": "Hello again",
                "excerpt": "Edited",
                "filename": "hello-v2.html",
                "html": "<h1>Hello again</h1>",
                "post_id": 1,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["title"], "Hello again");
        assert_eq!(updated["body"], "hello-v2.html");
    }

    #[actix_web::test]
    async fn test_upload_validation() {
        let app = app!(empty_state());

        let bad_requests = [
            json!({"title": "", "filename": "a.html", "html": "x"}),
            json!({"title": "T", "filename": "a.txt", "html": "x"}),
            json!({"title": "T", "filename": "../a.html", "html": "x"}),
            json!({"title": "T"}),
        ];
        for payload in bad_requests {
            let req = test::TestRequest::post()
                .uri("/api/admin/posts")
                .insert_header(bearer())
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");
        }

        let req = test::TestRequest::get()
            .uri("/api/admin/posts")
            .insert_header(bearer())
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().is_empty());
    }
}

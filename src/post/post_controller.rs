use crate::middleware::auth::authenticated_user;
use crate::post::post_model::{CreatePostRequest, PostAction, PostListQuery, UpdatePostRequest};
use crate::post::post_service::PostService;
use crate::utils::error::CustomError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

/// POST /posts
pub async fn create_post(
    req: HttpRequest,
    post_service: web::Data<PostService>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let author_id = authenticated_user(&req)?;
    let body = body.into_inner();

    let (Some(title), Some(text)) = (body.title, body.text) else {
        return Err(CustomError::BadRequestError("Invalid request".into()));
    };
    if title.trim().is_empty() {
        return Err(CustomError::BadRequestError("Invalid request".into()));
    }

    let post = post_service.create_post(author_id, title, text).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Post created successfully",
        "httpStatusCode": 201,
        "data": post
    })))
}

/// Listing of posts, newest first unless `sort` says otherwise
/// GET /posts?sort=hot|new|top&limit&page
pub async fn list_posts(
    post_service: web::Data<PostService>,
    query: web::Query<PostListQuery>,
) -> Result<HttpResponse, CustomError> {
    let posts = post_service.list_posts(&query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Posts fetched successfully",
        "httpStatusCode": 200,
        "count": posts.len(),
        "data": posts
    })))
}

/// GET /users/{user_id}/posts?sort&limit&page
pub async fn user_posts(
    post_service: web::Data<PostService>,
    path: web::Path<String>,
    query: web::Query<PostListQuery>,
) -> Result<HttpResponse, CustomError> {
    let posts = post_service.user_posts(&path.into_inner(), &query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Posts fetched successfully",
        "httpStatusCode": 200,
        "count": posts.len(),
        "data": posts
    })))
}

/// GET /posts/{post_id}
pub async fn get_post(
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let post = post_service.get_post(&post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post fetched successfully",
        "httpStatusCode": 200,
        "data": post
    })))
}

/// PATCH /posts/{post_id}
pub async fn update_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = authenticated_user(&req)?;
    let text = body
        .into_inner()
        .text
        .ok_or_else(|| CustomError::BadRequestError("Invalid request".into()))?;

    let post = post_service
        .update_post(&post_id.into_inner(), &user_id, &text)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Post updated successfully",
        "httpStatusCode": 200,
        "data": post
    })))
}

/// DELETE /posts/{post_id}
pub async fn delete_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let user_id = authenticated_user(&req)?;
    post_service
        .delete_post(&post_id.into_inner(), &user_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /posts/{post_id}/{action}
pub async fn post_action(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    let user_id = authenticated_user(&req)?;
    let (post_id, action) = path.into_inner();
    let action = PostAction::parse(&action)
        .ok_or_else(|| CustomError::BadRequestError("Invalid post action".into()))?;

    post_service.post_action(&post_id, &user_id, action).await?;

    Ok(HttpResponse::NoContent().finish())
}

use crate::comment::model::{
    CommentTreeQuery, CreateCommentRequest, MoreChildrenQuery, UpdateCommentRequest,
    UserCommentsQuery, VoteRequest,
};
use crate::comment::service::{CommentService, NewComment};
use crate::middleware::auth::authenticated_user;
use crate::utils::error::CustomError;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

/// Threaded comments of a post
/// GET /posts/{post_id}/comments?limit&depth&sort&comment_id
pub async fn comment_tree(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    query: web::Query<CommentTreeQuery>,
) -> Result<HttpResponse, CustomError> {
    let tree = comment_service
        .comment_tree(&path.into_inner(), &query)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "comments": tree.comments,
        "more_children": tree.more_children
    })))
}

/// Expand comments listed in a more-children marker
/// GET /comments/more?children=id1,id2&limit&depth&sort
pub async fn more_children(
    comment_service: web::Data<CommentService>,
    query: web::Query<MoreChildrenQuery>,
) -> Result<HttpResponse, CustomError> {
    let comments = comment_service
        .more_children(&query.children(), query.params())
        .await?;

    if comments.is_empty() {
        return Err(CustomError::NotFoundError("Comments not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "comments": comments
    })))
}

/// Create a comment on a post or a reply to a comment
/// POST /comments
pub async fn create_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    body: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let author_id = authenticated_user(&req)?;
    let body = body.into_inner();

    let (Some(parent), Some(parent_type), Some(text)) = (body.parent, body.parent_type, body.text)
    else {
        return Err(CustomError::BadRequestError(
            "Missing required parameter".to_string(),
        ));
    };
    if text.trim().is_empty() {
        return Err(CustomError::BadRequestError(
            "Comment text cannot be empty".to_string(),
        ));
    }

    let comment = comment_service
        .create_comment(
            author_id,
            NewComment {
                parent,
                parent_type,
                text,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Comment created successfully",
        "httpStatusCode": 201,
        "data": comment
    })))
}

/// GET /comments/{comment_id}
pub async fn get_comment(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let comment = comment_service.get_comment(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment retrieved successfully",
        "httpStatusCode": 200,
        "data": comment
    })))
}

/// Edit the text of a comment (author only)
/// PATCH /comments/{comment_id}
pub async fn update_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    body: web::Json<UpdateCommentRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = authenticated_user(&req)?;

    let text = body.into_inner().text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(CustomError::BadRequestError("Invalid request".to_string()));
    }

    let comment = comment_service
        .update_comment(&path.into_inner(), &user_id, &text)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comment updated successfully",
        "httpStatusCode": 200,
        "data": comment
    })))
}

/// DELETE /comments/{comment_id}
pub async fn delete_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let user_id = authenticated_user(&req)?;

    comment_service
        .delete_comment(&path.into_inner(), &user_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /comments/{comment_id}/vote
pub async fn vote_comment(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    body: web::Json<VoteRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = authenticated_user(&req)?;

    let votes = comment_service
        .vote(&path.into_inner(), &user_id, body.dir)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Vote recorded",
        "httpStatusCode": 200,
        "votes": votes
    })))
}

/// PATCH /comments/{comment_id}/{lock|unlock}
pub async fn comment_action(
    req: HttpRequest,
    comment_service: web::Data<CommentService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, CustomError> {
    let user_id = authenticated_user(&req)?;
    let (comment_id, action) = path.into_inner();

    let locked = match action.as_str() {
        "lock" => true,
        "unlock" => false,
        _ => {
            return Err(CustomError::BadRequestError(
                "Invalid comment action".to_string(),
            ));
        }
    };
    comment_service
        .set_locked(&comment_id, &user_id, locked)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Comments written by a user
/// GET /users/{user_id}/comments?limit&page&sort
pub async fn user_comments(
    comment_service: web::Data<CommentService>,
    path: web::Path<String>,
    query: web::Query<UserCommentsQuery>,
) -> Result<HttpResponse, CustomError> {
    let comments = comment_service
        .user_comments(&path.into_inner(), &query)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Comments retrieved successfully",
        "httpStatusCode": 200,
        "count": comments.len(),
        "data": comments
    })))
}

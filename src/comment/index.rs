use super::controller::{
    comment_action, create_comment, delete_comment, get_comment, more_children, update_comment,
    user_comments, vote_comment,
};
use crate::middleware::auth::verify_token;
use crate::post::post_controller::user_posts;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn comment_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/comments")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::post().to(create_comment))
            .route("/more", web::get().to(more_children))
            .route("/{comment_id}", web::get().to(get_comment))
            .route("/{comment_id}", web::patch().to(update_comment))
            .route("/{comment_id}", web::delete().to(delete_comment))
            .route("/{comment_id}/vote", web::post().to(vote_comment))
            .route("/{comment_id}/{action}", web::patch().to(comment_action)),
    );
    cfg.service(
        web::scope("/users")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/{user_id}/comments", web::get().to(user_comments))
            .route("/{user_id}/posts", web::get().to(user_posts)),
    );
}

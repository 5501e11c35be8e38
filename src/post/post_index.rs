use super::post_controller::{
    create_post, delete_post, get_post, list_posts, post_action, update_post,
};
use crate::comment::controller::comment_tree;
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::post().to(create_post))
            .route("", web::get().to(list_posts))
            .route("/{post_id}/comments", web::get().to(comment_tree))
            .route("/{post_id}", web::get().to(get_post))
            .route("/{post_id}", web::patch().to(update_post))
            .route("/{post_id}", web::delete().to(delete_post))
            .route("/{post_id}/{action}", web::patch().to(post_action)),
    );
}

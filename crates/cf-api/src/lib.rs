//! # cf-api
//!
//! The REST gateway for chainforum. Each route maps onto exactly one
//! contract operation run through the [`Gateway`](cf_contract::Gateway).

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod scheduler;

use actix_web::web;

pub use error::ApiError;
pub use handlers::AppState;
pub use scheduler::ElectionScheduler;

/// Registers every endpoint. Reads take query parameters; mutations take a
/// JSON body.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            // Single reads
            .route("/user", web::get().to(handlers::get_user))
            .route("/channel", web::get().to(handlers::get_community))
            .route("/post", web::get().to(handlers::get_post))
            .route("/comment", web::get().to(handlers::get_comment))
            .route("/community/name", web::get().to(handlers::get_community_name))
            .route("/communities", web::get().to(handlers::list_communities))
            // Feeds
            .route("/feed", web::get().to(handlers::get_user_feed))
            .route("/comment/feed", web::get().to(handlers::get_comment_feed))
            .route("/user_profile/posts", web::get().to(handlers::get_user_profile_posts))
            .route("/user_profile/comments", web::get().to(handlers::get_user_profile_comments))
            .route("/community/posts", web::get().to(handlers::get_community_posts))
            .route("/community/appealed", web::get().to(handlers::get_community_appealed))
            .route(
                "/community/appealed/comments",
                web::get().to(handlers::get_community_appealed_comments),
            )
            // Mutations
            .route("/create/user", web::post().to(handlers::create_user))
            .route("/create/channel", web::post().to(handlers::create_community))
            .route("/channel/join", web::post().to(handlers::join_community))
            .route("/channel/unjoin", web::post().to(handlers::unjoin_community))
            .route("/create/post", web::post().to(handlers::create_post))
            .route("/create/comment", web::post().to(handlers::create_comment))
            .route("/post/upvote", web::post().to(handlers::up_vote))
            .route("/post/downvote", web::post().to(handlers::down_vote))
            .route("/post/undo_upvote", web::post().to(handlers::undo_up_vote))
            .route("/post/undo_downvote", web::post().to(handlers::undo_down_vote))
            .route("/delete", web::post().to(handlers::delete_post))
            .route("/appeal", web::post().to(handlers::appeal_post))
            .route("/unappeal", web::post().to(handlers::un_appeal_post))
            .route("/hide", web::post().to(handlers::hide_post_moderator))
            .route("/show", web::post().to(handlers::show_post_moderator))
            .route("/moderator/select", web::post().to(handlers::select_moderator)),
    );
}

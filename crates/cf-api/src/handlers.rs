//! # cf-api Handlers
//!
//! Thin adapters between HTTP and the [`Gateway`]: decode the request, mint
//! IDs and timestamps for creates, call exactly one contract operation, and
//! encode its result as JSON.

use actix_web::{web, HttpResponse};
use cf_contract::Gateway;
use cf_core::ids::{format_timestamp, mint_id, COMMENT_PREFIX, COMMUNITY_PREFIX, POST_PREFIX};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::scheduler::ElectionScheduler;

/// State shared across all actix-web workers.
pub struct AppState {
    pub gateway: Gateway,
    pub scheduler: ElectionScheduler,
}

type ApiResult = Result<HttpResponse, ApiError>;

// Request shapes

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub creator: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub community_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub community_id: String,
    pub title: String,
    pub content: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub parent_id: String,
    pub content: String,
    pub author: String,
}

/// Body of every vote, delete, appeal and moderation call.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemActionRequest {
    pub item_id: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityRequest {
    pub community_id: String,
}

// Query shapes

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
    #[serde(default)]
    pub viewer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityQuery {
    pub community_id: String,
    #[serde(default)]
    pub viewer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub post_id: String,
    #[serde(default)]
    pub viewer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub comment_id: String,
    #[serde(default)]
    pub viewer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPageQuery {
    pub user_id: String,
    #[serde(default)]
    pub page_no: usize,
    #[serde(default)]
    pub viewer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFeedQuery {
    pub parent_id: String,
    #[serde(default)]
    pub page_no: usize,
    #[serde(default)]
    pub viewer: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPageQuery {
    pub community_id: String,
    #[serde(default)]
    pub page_no: usize,
    #[serde(default)]
    pub viewer: String,
}

fn changed(did_change: bool) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "changed": did_change }))
}

// Single reads

pub async fn get_user(data: web::Data<AppState>, q: web::Query<UserQuery>) -> ApiResult {
    let view = data.gateway.get_user(&q.user_id, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_community(data: web::Data<AppState>, q: web::Query<CommunityQuery>) -> ApiResult {
    let view = data.gateway.get_community(&q.community_id, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_post(data: web::Data<AppState>, q: web::Query<PostQuery>) -> ApiResult {
    let view = data.gateway.get_post(&q.post_id, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_comment(data: web::Data<AppState>, q: web::Query<CommentQuery>) -> ApiResult {
    let view = data.gateway.get_comment(&q.comment_id, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_community_name(data: web::Data<AppState>, q: web::Query<CommunityQuery>) -> ApiResult {
    let name = data.gateway.get_community_name(&q.community_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "id": &q.community_id, "name": name })))
}

pub async fn list_communities(data: web::Data<AppState>) -> ApiResult {
    Ok(HttpResponse::Ok().json(data.gateway.list_communities().await?))
}

// Feeds

pub async fn get_user_feed(data: web::Data<AppState>, q: web::Query<UserPageQuery>) -> ApiResult {
    let feed = data.gateway.get_user_feed(&q.user_id, q.page_no).await?;
    Ok(HttpResponse::Ok().json(feed))
}

pub async fn get_comment_feed(data: web::Data<AppState>, q: web::Query<CommentFeedQuery>) -> ApiResult {
    let feed = data.gateway.get_comment_feed(&q.parent_id, q.page_no, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(feed))
}

pub async fn get_user_profile_posts(data: web::Data<AppState>, q: web::Query<UserPageQuery>) -> ApiResult {
    let posts = data.gateway.get_user_profile_posts(&q.user_id, q.page_no, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_user_profile_comments(data: web::Data<AppState>, q: web::Query<UserPageQuery>) -> ApiResult {
    let comments = data.gateway.get_user_profile_comments(&q.user_id, q.page_no, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(comments))
}

pub async fn get_community_posts(data: web::Data<AppState>, q: web::Query<CommunityPageQuery>) -> ApiResult {
    let posts = data.gateway.get_community_posts(&q.community_id, q.page_no, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_community_appealed(data: web::Data<AppState>, q: web::Query<CommunityPageQuery>) -> ApiResult {
    let items = data.gateway.get_community_appealed(&q.community_id, q.page_no, &q.viewer).await?;
    Ok(HttpResponse::Ok().json(items))
}

pub async fn get_community_appealed_comments(
    data: web::Data<AppState>,
    q: web::Query<CommunityPageQuery>,
) -> ApiResult {
    let comments = data
        .gateway
        .get_community_appealed_comments(&q.community_id, q.page_no, &q.viewer)
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

// Mutations

pub async fn create_user(data: web::Data<AppState>, body: web::Json<CreateUserRequest>) -> ApiResult {
    let user = data.gateway.create_user(&body.user_id, &body.username, &body.email).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Mints the community ID and starts its election schedule.
pub async fn create_community(data: web::Data<AppState>, body: web::Json<CreateCommunityRequest>) -> ApiResult {
    let now = Utc::now();
    let id = mint_id(COMMUNITY_PREFIX, now);
    let community = data
        .gateway
        .create_community(&id, &format_timestamp(now), &body.name, &body.description, &body.creator)
        .await?;
    data.scheduler.schedule(&community.id);
    Ok(HttpResponse::Created().json(community))
}

pub async fn join_community(data: web::Data<AppState>, body: web::Json<MembershipRequest>) -> ApiResult {
    Ok(changed(data.gateway.join_community(&body.community_id, &body.user_id).await?))
}

pub async fn unjoin_community(data: web::Data<AppState>, body: web::Json<MembershipRequest>) -> ApiResult {
    Ok(changed(data.gateway.unjoin_community(&body.community_id, &body.user_id).await?))
}

pub async fn create_post(data: web::Data<AppState>, body: web::Json<CreatePostRequest>) -> ApiResult {
    let now = Utc::now();
    let id = mint_id(POST_PREFIX, now);
    let post = data
        .gateway
        .create_post(&id, &format_timestamp(now), &body.community_id, &body.title, &body.content, &body.author)
        .await?;
    Ok(HttpResponse::Created().json(post))
}

pub async fn create_comment(data: web::Data<AppState>, body: web::Json<CreateCommentRequest>) -> ApiResult {
    let now = Utc::now();
    let id = mint_id(COMMENT_PREFIX, now);
    let comment = data
        .gateway
        .create_comment(&id, &format_timestamp(now), &body.parent_id, &body.content, &body.author)
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

pub async fn up_vote(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    Ok(changed(data.gateway.up_vote(&body.item_id, &body.user_id).await?))
}

pub async fn down_vote(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    Ok(changed(data.gateway.down_vote(&body.item_id, &body.user_id).await?))
}

pub async fn undo_up_vote(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    Ok(changed(data.gateway.undo_up_vote(&body.item_id, &body.user_id).await?))
}

pub async fn undo_down_vote(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    Ok(changed(data.gateway.undo_down_vote(&body.item_id, &body.user_id).await?))
}

pub async fn delete_post(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    Ok(changed(data.gateway.delete_post(&body.item_id, &body.user_id).await?))
}

pub async fn appeal_post(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    Ok(changed(data.gateway.appeal_post(&body.item_id, &body.user_id).await?))
}

pub async fn un_appeal_post(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    Ok(changed(data.gateway.un_appeal_post(&body.item_id, &body.user_id).await?))
}

pub async fn hide_post_moderator(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    let tally = data.gateway.hide_post_moderator(&body.item_id, &body.user_id).await?;
    Ok(HttpResponse::Ok().json(tally))
}

pub async fn show_post_moderator(data: web::Data<AppState>, body: web::Json<ItemActionRequest>) -> ApiResult {
    let tally = data.gateway.show_post_moderator(&body.item_id, &body.user_id).await?;
    Ok(HttpResponse::Ok().json(tally))
}

pub async fn select_moderator(data: web::Data<AppState>, body: web::Json<CommunityRequest>) -> ApiResult {
    let moderators = data.gateway.select_moderator(&body.community_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "moderators": moderators })))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{test, App};
    use cf_ledger_memory::MemoryLedger;
    use serde_json::Value;

    use super::*;
    use crate::configure_routes;

    fn state() -> web::Data<AppState> {
        let gateway = Gateway::new(Arc::new(MemoryLedger::new()));
        let scheduler = ElectionScheduler::new(gateway.clone(), Duration::from_secs(600), Duration::from_secs(3600));
        web::Data::new(AppState { gateway, scheduler })
    }

    #[actix_web::test]
    async fn test_create_flow_mints_ids() {
        let data = state();
        let app = test::init_service(App::new().app_data(data.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/create/user")
            .set_json(json!({ "userId": "u1", "username": "alice", "email": "a@x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 201);

        let req = test::TestRequest::post()
            .uri("/create/channel")
            .set_json(json!({ "name": "rust", "description": "", "creator": "u1" }))
            .to_request();
        let community: Value = test::call_and_read_body_json(&app, req).await;
        let community_id = community["id"].as_str().unwrap().to_string();
        assert!(community_id.starts_with("co"));
        assert!(data.scheduler.is_scheduled(&community_id));

        let req = test::TestRequest::post()
            .uri("/create/post")
            .set_json(json!({ "communityId": &community_id, "title": "t", "content": "c", "author": "u1" }))
            .to_request();
        let post: Value = test::call_and_read_body_json(&app, req).await;
        let post_id = post["id"].as_str().unwrap().to_string();
        assert!(post_id.starts_with('p'));

        let req = test::TestRequest::post()
            .uri("/post/upvote")
            .set_json(json!({ "itemId": &post_id, "userId": "u1" }))
            .to_request();
        let vote: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(vote["changed"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/community/posts?communityId={}&pageNo=0&viewer=u1", community_id))
            .to_request();
        let posts: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(posts[0]["score"], 1);
        assert_eq!(posts[0]["hasUpvoted"], true);
        assert_eq!(posts[0]["authorName"], "alice");

        data.scheduler.shutdown();
    }

    #[actix_web::test]
    async fn test_errors_are_json_with_status() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/user?userId=nobody").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("nobody"));

        let req = test::TestRequest::post()
            .uri("/post/upvote")
            .set_json(json!({ "itemId": "nonsense", "userId": "u1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);
    }
}

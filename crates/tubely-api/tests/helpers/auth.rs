use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{api_path, TestApp};

/// A caller with a valid bearer token.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn register_test_user(app: &TestApp) -> TestUser {
    let user_id = Uuid::new_v4();
    TestUser {
        user_id,
        token: app.token_for(user_id),
    }
}

/// Create a draft video owned by `user` and return its id.
pub async fn create_draft(client: &TestServer, user: &TestUser, title: &str) -> Uuid {
    let response = client
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "title": title, "description": "test video" }))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    body["id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("created video has an id")
}

//! Session persistence under a sandboxed TASKDECK_HOME.
//!
//! The whole lifecycle runs in a single test because TASKDECK_HOME is
//! process-wide state.

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskdeck::api::ApiClient;
use taskdeck::config::Config;
use taskdeck::session::Session;

#[tokio::test]
async fn test_session_lifecycle_login_persist_reload_logout() {
    let home = TempDir::new().unwrap();
    std::env::set_var("TASKDECK_HOME", home.path());

    // Nothing persisted: startup is logged out
    assert!(Session::load().unwrap().is_none());

    // Login against a mock server and persist the issued token
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "T1" })),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(server.uri());
    let session = api.login("a@b.com", "x").await.unwrap();
    session.save().unwrap();

    let session_path = Config::session_path().unwrap();
    assert!(session_path.exists());
    assert!(session_path.starts_with(home.path()), "Sandboxed under TASKDECK_HOME");

    // A later startup finds the token
    let reloaded = Session::load().unwrap().expect("persisted session");
    assert_eq!(reloaded.token, "T1");
    assert_eq!(reloaded.bearer(), "Bearer T1");

    // Logout destroys it; a second logout is a no-op
    assert!(Session::clear().unwrap());
    assert!(!session_path.exists());
    assert!(Session::load().unwrap().is_none());
    assert!(!Session::clear().unwrap());

    std::env::remove_var("TASKDECK_HOME");
}

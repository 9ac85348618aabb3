// ============================
// crates/backend-lib/tests/app_flow.rs
// ============================
//! End-to-end tests that drive the router the way a browser would:
//! urlencoded form posts, session cookies, and redirects.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use feedback_backend_lib::{
    config::Settings,
    router::create_router,
    storage::FlatFileStorage,
    AppState,
};

const ALICE_FORM: &str =
    "username=alice01&password=secret1&email=alice%40example.com&first_name=Alice&last_name=Lidell";
const BOB_FORM: &str =
    "username=bob02&password=secret2&email=bob%40example.com&first_name=Bob&last_name=Builder";

/// Build an app backed by a temporary data directory. Keep the TempDir in
/// scope for the life of the test.
async fn setup() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let storage = FlatFileStorage::new(temp_dir.path()).unwrap();

    let mut settings = Settings::default();
    settings.data_dir = temp_dir.path().to_path_buf();

    let state = Arc::new(AppState::new(storage, settings));
    (create_router(state), temp_dir)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    form: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match form {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
    send(app, "GET", uri, cookie, None).await
}

async fn post(app: &Router, uri: &str, cookie: Option<&str>, form: &str) -> Response<Body> {
    send(app, "POST", uri, cookie, Some(form)).await
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without a Location header")
        .to_str()
        .unwrap()
}

/// The `name=value` pair of the session cookie set by a response.
fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response did not set a cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a user and hand back the logged-in session cookie.
async fn register(app: &Router, form: &str) -> String {
    let response = post(app, "/register", None, form).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response)
}

#[tokio::test]
async fn register_logs_in_and_redirects_to_profile() {
    let (app, _data) = setup().await;

    let response = post(&app, "/register", None, ALICE_FORM).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/users/alice01?notice=account-created");

    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("session="));

    // The fresh session really is Authenticated(alice01)
    let profile = get(&app, "/users/alice01", Some(&cookie)).await;
    assert_eq!(profile.status(), StatusCode::OK);
    let body = body_json(profile).await;
    assert_eq!(body["user"]["username"], "alice01");
    // The hash never leaves the server
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_rejects_duplicate_username_as_a_field_error() {
    let (app, _data) = setup().await;
    register(&app, ALICE_FORM).await;

    let response = post(&app, "/register", None, ALICE_FORM).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["fields"][0]["field"], "username");
    assert_eq!(body["error"]["fields"][0]["message"], "Username is already taken");
}

#[tokio::test]
async fn register_rejects_malformed_fields_inline() {
    let (app, _data) = setup().await;

    // Username too short, email malformed
    let response = post(
        &app,
        "/register",
        None,
        "username=ab&password=secret1&email=nope&first_name=A&last_name=L",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    let fields: Vec<&str> = body["error"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["username", "email"]);
}

#[tokio::test]
async fn login_failure_is_the_same_for_unknown_user_and_wrong_password() {
    let (app, _data) = setup().await;
    register(&app, ALICE_FORM).await;

    let wrong_password = post(
        &app,
        "/login",
        None,
        "username=alice01&password=wrong-password",
    )
    .await;
    let unknown_user = post(&app, "/login", None, "username=nobody99&password=secret1").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let first = body_json(wrong_password).await;
    let second = body_json(unknown_user).await;
    assert_eq!(first, second);
    assert_eq!(first["error"]["fields"][0]["message"], "Incorrect username or password");
}

#[tokio::test]
async fn login_with_the_right_password_reaches_the_profile() {
    let (app, _data) = setup().await;
    register(&app, ALICE_FORM).await;

    let response = post(&app, "/login", None, "username=alice01&password=secret1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/users/alice01?notice=welcome-back");

    let cookie = session_cookie(&response);
    let home = get(&app, "/home", Some(&cookie)).await;
    assert_eq!(home.status(), StatusCode::OK);
}

#[tokio::test]
async fn feedback_lifecycle_for_its_owner() {
    let (app, _data) = setup().await;
    let cookie = register(&app, ALICE_FORM).await;

    // Create
    let response = post(
        &app,
        "/users/alice01/feedback/add",
        Some(&cookie),
        "title=Hi&content=Hello",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/users/alice01");

    // The profile lists exactly that record
    let profile = body_json(get(&app, "/users/alice01", Some(&cookie)).await).await;
    let feedback = profile["feedback"].as_array().unwrap();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0]["title"], "Hi");
    assert_eq!(feedback[0]["content"], "Hello");
    assert_eq!(feedback[0]["username"], "alice01");
    let id = feedback[0]["id"].as_u64().unwrap();

    // It shows up on the shared home listing too
    let home = body_json(get(&app, "/home", Some(&cookie)).await).await;
    assert_eq!(home.as_array().unwrap().len(), 1);

    // Delete by id, then the profile is empty again
    let response = post(&app, &format!("/feedback/{id}/delete"), Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/users/alice01?notice=feedback-deleted");

    let profile = body_json(get(&app, "/users/alice01", Some(&cookie)).await).await;
    assert!(profile["feedback"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn update_rewrites_title_and_content() {
    let (app, _data) = setup().await;
    let cookie = register(&app, ALICE_FORM).await;
    post(
        &app,
        "/users/alice01/feedback/add",
        Some(&cookie),
        "title=Draft&content=First+cut",
    )
    .await;

    let profile = body_json(get(&app, "/users/alice01", Some(&cookie)).await).await;
    let id = profile["feedback"][0]["id"].as_u64().unwrap();

    // The edit page pre-populates with the current record
    let page = body_json(get(&app, &format!("/feedback/{id}/update"), Some(&cookie)).await).await;
    assert_eq!(page["title"], "Draft");

    let response = post(
        &app,
        &format!("/feedback/{id}/update"),
        Some(&cookie),
        "title=Final&content=Polished",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/users/alice01");

    let page = body_json(get(&app, &format!("/feedback/{id}/update"), Some(&cookie)).await).await;
    assert_eq!(page["title"], "Final");
    assert_eq!(page["content"], "Polished");
}

#[tokio::test]
async fn anonymous_requests_are_redirected_to_login() {
    let (app, _data) = setup().await;

    for uri in ["/home", "/users/alice01", "/logout"] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login?notice=login-required", "{uri}");
    }

    // The root just points at home
    let response = get(&app, "/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/home");
}

#[tokio::test]
async fn anonymous_feedback_delete_is_unauthorized() {
    let (app, _data) = setup().await;
    let cookie = register(&app, ALICE_FORM).await;
    post(
        &app,
        "/users/alice01/feedback/add",
        Some(&cookie),
        "title=Hi&content=Hello",
    )
    .await;

    let response = post(&app, "/feedback/1/delete", None, "").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cross_user_mutation_is_refused() {
    let (app, _data) = setup().await;
    let alice = register(&app, ALICE_FORM).await;
    post(
        &app,
        "/users/alice01/feedback/add",
        Some(&alice),
        "title=Hers&content=Private",
    )
    .await;
    let profile = body_json(get(&app, "/users/alice01", Some(&alice)).await).await;
    let id = profile["feedback"][0]["id"].as_u64().unwrap();

    let bob = register(&app, BOB_FORM).await;

    // Update attempt bounces to the owner's profile and changes nothing
    let response = post(
        &app,
        &format!("/feedback/{id}/update"),
        Some(&bob),
        "title=His&content=Defaced",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/users/alice01");

    let page = body_json(get(&app, &format!("/feedback/{id}/update"), Some(&alice)).await).await;
    assert_eq!(page["title"], "Hers");

    // Delete attempt bounces to login and the record survives
    let response = post(&app, &format!("/feedback/{id}/delete"), Some(&bob), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?notice=not-authorized");

    // Bob can neither view nor delete Alice's account
    let response = get(&app, "/users/alice01", Some(&bob)).await;
    assert_eq!(location(&response), "/login?notice=login-required");
    let response = post(&app, "/users/alice01/delete", Some(&bob), "").await;
    assert_eq!(location(&response), "/login?notice=login-required");

    let profile = body_json(get(&app, "/users/alice01", Some(&alice)).await).await;
    assert_eq!(profile["feedback"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_the_account_cascades_and_ends_the_session() {
    let (app, _data) = setup().await;
    let alice = register(&app, ALICE_FORM).await;
    for i in 0..3 {
        post(
            &app,
            "/users/alice01/feedback/add",
            Some(&alice),
            &format!("title=t{i}&content=c{i}"),
        )
        .await;
    }

    let response = post(&app, "/users/alice01/delete", Some(&alice), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?notice=account-deleted");
    // The session cookie is cleared
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.contains("Max-Age=0"));

    // The old session is gone server-side, not just in the cookie
    let response = get(&app, "/home", Some(&alice)).await;
    assert_eq!(location(&response), "/login?notice=login-required");

    // And the credentials no longer work
    let response = post(&app, "/login", None, "username=alice01&password=secret1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No orphaned feedback remains anywhere
    let bob = register(&app, BOB_FORM).await;
    let home = body_json(get(&app, "/home", Some(&bob)).await).await;
    assert!(home.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_feedback_ids_are_not_found() {
    let (app, _data) = setup().await;
    let cookie = register(&app, ALICE_FORM).await;

    let response = get(&app, "/feedback/999/update", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post(
        &app,
        "/feedback/999/update",
        Some(&cookie),
        "title=t&content=c",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post(&app, "/feedback/999/delete", Some(&cookie), "").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let (app, _data) = setup().await;
    let cookie = register(&app, ALICE_FORM).await;

    let response = get(&app, "/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?notice=goodbye");
    assert!(session_cookie(&response).ends_with("="));

    // The token itself was revoked, so replaying the old cookie fails
    let response = get(&app, "/home", Some(&cookie)).await;
    assert_eq!(location(&response), "/login?notice=login-required");
}

#[tokio::test]
async fn invalid_feedback_input_is_rejected_inline() {
    let (app, _data) = setup().await;
    let cookie = register(&app, ALICE_FORM).await;

    let response = post(
        &app,
        "/users/alice01/feedback/add",
        Some(&cookie),
        "title=&content=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VAL_001");
    assert_eq!(body["error"]["fields"].as_array().unwrap().len(), 2);
}

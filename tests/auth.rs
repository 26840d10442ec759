mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use pretty_assertions::assert_eq;
use std::sync::Arc;

use invoicedash::repository::InMemoryRepository;

fn signup_form() -> [(&'static str, &'static str); 3] {
    [
        ("name", "Jordan"),
        ("email", "integration@example.com"),
        ("password", "123456"),
    ]
}

#[test_log::test(actix_rt::test)]
async fn test_sign_up_sign_in_and_sign_out_flow() {
    let repo = Arc::new(InMemoryRepository::new());
    let app = common::app(common::state(repo.clone())).await;

    // Sign up starts a session right away.
    let req = test::TestRequest::post()
        .uri("/signup")
        .set_form(signup_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");
    let session = common::session_cookie(&resp).expect("sign up sets the session cookie");
    assert_eq!(session.http_only(), Some(true));
    assert_eq!(session.path(), Some("/"));
    assert_eq!(repo.user_count(), 1);

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(session.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Signed-in visitors are sent away from the login page.
    let req = test::TestRequest::get()
        .uri("/login")
        .cookie(session.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/dashboard");

    let req = test::TestRequest::post()
        .uri("/logout")
        .cookie(session)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    let removal = common::session_cookie(&resp).unwrap();
    assert_eq!(removal.value(), "");

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("email", "integration@example.com"), ("password", "123456")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(common::session_cookie(&resp).is_some());
}

#[actix_rt::test]
async fn test_duplicate_sign_up_is_rejected() {
    let repo = Arc::new(InMemoryRepository::new());
    let app = common::app(common::state(repo.clone())).await;

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_form(signup_form())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    let writes = repo.writes();

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_form(signup_form())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(common::session_cookie(&resp).is_none());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User with this email already exists.");
    assert_eq!(repo.writes(), writes);
}

#[actix_rt::test]
async fn test_wrong_password_sets_no_cookie() {
    let repo = Arc::new(InMemoryRepository::new());
    let app = common::app(common::state(repo)).await;

    let req = test::TestRequest::post()
        .uri("/signup")
        .set_form(signup_form())
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("email", "integration@example.com"), ("password", "wrong-password")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(common::session_cookie(&resp).is_none());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid email or password.");
    assert!(body.get("errors").is_none());
}

#[actix_rt::test]
async fn test_sign_in_with_missing_fields() {
    let app = common::app(common::state(Arc::new(InMemoryRepository::new()))).await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_form([("email", "not-an-email")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Missing fields. Failed to sign in.");
    assert_eq!(body["errors"]["email"][0], "Invalid email address.");
    assert_eq!(
        body["errors"]["password"][0],
        "Password must be at least 6 characters long."
    );
}

#[actix_rt::test]
async fn test_forged_session_cookie_is_ignored() {
    let app = common::app(common::state(Arc::new(InMemoryRepository::new()))).await;

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(actix_web::cookie::Cookie::new("session", "not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
}

#[actix_rt::test]
async fn test_expired_session_is_sent_to_login() {
    use actix_web::web;
    use chrono::Duration;
    use invoicedash::session::{SessionCodec, SessionCookies};
    use invoicedash::AppState;

    let state = web::Data::new(AppState::new(
        Arc::new(InMemoryRepository::new()),
        SessionCodec::new(common::SECRET, Duration::seconds(2)),
        SessionCookies::new(Duration::seconds(2), false),
        4,
    ));
    let token = state.codec.encode(uuid::Uuid::new_v4()).unwrap();
    let app = common::app(state).await;

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(actix_web::cookie::Cookie::new("session", token.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(3100)).await;

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .cookie(actix_web::cookie::Cookie::new("session", token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");
}

mod common;

use axum::http::StatusCode;
use serde_json::json;
use urlcut::domain::repositories::UrlRepository;

#[tokio::test]
async fn test_shorten_text_creates_link() {
    let (server, state, repo) = common::create_test_server();

    let response = server
        .post("/")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .text("https://example.com/some/long/path")
        .await;

    response.assert_status(StatusCode::CREATED);

    let short_url = response.text();
    let code = common::code_of(&short_url);
    assert_eq!(code.len(), 8);
    assert_eq!(
        repo.get_original_url(&code).await.unwrap(),
        "https://example.com/some/long/path"
    );
}

#[tokio::test]
async fn test_shorten_text_duplicate_returns_conflict_with_same_url() {
    let (server, state, _repo) = common::create_test_server();
    let auth = common::bearer(&state, "alice");

    let first = server
        .post("/")
        .add_header("Authorization", auth.clone())
        .text("https://example.com")
        .await;
    first.assert_status(StatusCode::CREATED);

    let second = server
        .post("/")
        .add_header("Authorization", auth)
        .text("https://example.com")
        .await;
    second.assert_status(StatusCode::CONFLICT);

    assert_eq!(first.text(), second.text());
}

#[tokio::test]
async fn test_shorten_text_rejects_invalid_url() {
    let (server, state, _repo) = common::create_test_server();

    let response = server
        .post("/")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .text("not a url")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shorten_json_success() {
    let (server, state, _repo) = common::create_test_server();

    let response = server
        .post("/api/shorten")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!({ "url": "http://ya.ru" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    let result = json["result"].as_str().unwrap();
    assert!(result.starts_with("http://localhost:8080/"));
}

#[tokio::test]
async fn test_shorten_json_conflict_returns_existing_result() {
    let (server, state, _repo) = common::create_test_server();

    let first = server
        .post("/api/shorten")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!({ "url": "http://ya.ru" }))
        .await;

    // A different owner still gets the existing link.
    let second = server
        .post("/api/shorten")
        .add_header("Authorization", common::bearer(&state, "bob"))
        .json(&json!({ "url": "http://ya.ru" }))
        .await;

    second.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        first.json::<serde_json::Value>()["result"],
        second.json::<serde_json::Value>()["result"]
    );
}

#[tokio::test]
async fn test_shorten_json_rejects_unsupported_scheme() {
    let (server, state, _repo) = common::create_test_server();

    let response = server
        .post("/api/shorten")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!({ "url": "ftp://example.com/file" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shorten_issues_token_to_new_client() {
    let (server, _state, _repo) = common::create_test_server();

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let cookie = response.header("set-cookie");
    assert!(cookie.to_str().unwrap().starts_with("token="));

    let authorization = response.header("authorization");
    let authorization = authorization.to_str().unwrap().to_string();
    assert!(authorization.starts_with("Bearer "));

    let listed = server
        .get("/api/user/urls")
        .add_header("Authorization", authorization)
        .await;

    listed.assert_status_ok();
    let items = listed.json::<serde_json::Value>();
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["original_url"], "https://example.com");
}

#[tokio::test]
async fn test_shorten_batch_success() {
    let (server, state, _repo) = common::create_test_server();

    let response = server
        .post("/api/shorten/batch")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!([
            { "correlation_id": "1", "original_url": "http://a.com" },
            { "correlation_id": "2", "original_url": "http://b.com" }
        ]))
        .await;

    response.assert_status(StatusCode::CREATED);

    let items = response.json::<serde_json::Value>();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["correlation_id"], "1");
    assert_eq!(items[1]["correlation_id"], "2");
    assert_ne!(items[0]["short_url"], items[1]["short_url"]);
}

#[tokio::test]
async fn test_shorten_batch_reuses_existing_codes() {
    let (server, state, _repo) = common::create_test_server();
    let auth = common::bearer(&state, "alice");

    let single = server
        .post("/api/shorten")
        .add_header("Authorization", auth.clone())
        .json(&json!({ "url": "http://a.com" }))
        .await;
    let existing = single.json::<serde_json::Value>()["result"].clone();

    let response = server
        .post("/api/shorten/batch")
        .add_header("Authorization", auth)
        .json(&json!([
            { "correlation_id": "x", "original_url": "http://a.com" },
            { "correlation_id": "y", "original_url": "http://new.com" }
        ]))
        .await;

    response.assert_status(StatusCode::CREATED);

    let items = response.json::<serde_json::Value>();
    assert_eq!(items[0]["short_url"], existing);
    assert_ne!(items[1]["short_url"], existing);
}

#[tokio::test]
async fn test_shorten_batch_empty_is_rejected() {
    let (server, state, _repo) = common::create_test_server();

    let response = server
        .post("/api/shorten/batch")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!([]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shorten_batch_invalid_item_fails_whole_batch() {
    let (server, state, repo) = common::create_test_server();

    let response = server
        .post("/api/shorten/batch")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!([
            { "correlation_id": "1", "original_url": "http://a.com" },
            { "correlation_id": "2", "original_url": "nope" }
        ]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(repo.get_short_url("http://a.com").await.unwrap(), None);
}

#[tokio::test]
async fn test_shorten_text_rejects_interior_newline() {
    let (server, state, repo) = common::create_test_server();

    let response = server
        .post("/")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .text("http://example.com/a\nb")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        repo.get_short_url("http://example.com/a\nb").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_shorten_json_rejects_interior_tab() {
    let (server, state, _repo) = common::create_test_server();

    let response = server
        .post("/api/shorten")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!({ "url": "http://example.com/a\tb" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_shortened_url_with_trailing_newline_redirects() {
    let (server, state, _repo) = common::create_test_server();

    let created = server
        .post("/api/shorten")
        .add_header("Authorization", common::bearer(&state, "alice"))
        .json(&json!({ "url": "  http://example.com/path\n" }))
        .await;
    created.assert_status(StatusCode::CREATED);

    let result = created.json::<serde_json::Value>()["result"]
        .as_str()
        .unwrap()
        .to_string();
    let code = common::code_of(&result);

    let response = server.get(&format!("/{code}")).await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "http://example.com/path");
}

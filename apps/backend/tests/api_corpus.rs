//! Corpus API tests.

mod common;

use axum::http::StatusCode;

use common::TestContext;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("OK");
}

/// Test listing a whole category.
#[tokio::test]
async fn test_list_vocabulary() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/corpus/vocabulary").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["category"], "vocabulary");
    assert!(body["unit"].is_null());
    assert_eq!(body["items"].as_array().unwrap().len(), 59);
    assert_eq!(body["items"][1]["english"], "near");
}

/// Test the unit query narrows the items.
#[tokio::test]
async fn test_list_single_unit() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/api/corpus/vocabulary")
        .add_query_param("unit", 1)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 6);
    assert!(items.iter().all(|item| item["unit"] == 1));
}

/// Test sentences keep their key words.
#[tokio::test]
async fn test_sentences_carry_key_words() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/api/corpus/sentences")
        .add_query_param("unit", 10)
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let sentence = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["english"] == "Only drink clean water!")
        .expect("unit 10 has the clean water sentence");
    assert_eq!(
        sentence["key_words"],
        serde_json::json!(["drink", "clean", "water"])
    );
}

#[tokio::test]
async fn test_units() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/corpus/phrases/units").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["category"], "phrases");
    assert_eq!(body["units"], serde_json::json!([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
}

/// Test an unknown category is not found.
#[tokio::test]
async fn test_unknown_category() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/api/corpus/grammar").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "not_found");
}

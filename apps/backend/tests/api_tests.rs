//! Test session API tests.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use common::fixtures;
use common::TestContext;

async fn create_test(server: &TestServer, body: &Value) -> Value {
    let response = server.post("/api/tests").json(body).await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn answer(server: &TestServer, id: &str, position: usize, answer: Value) -> Value {
    let response = server
        .put(&format!("/api/tests/{id}/answers/{position}"))
        .json(&json!({ "answer": answer }))
        .await;
    response.assert_status_ok();
    response.json()
}

/// Test defaults: ten multiple choice questions over every unit.
#[tokio::test]
async fn test_create_vocabulary_test_defaults() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &json!({ "category": "vocabulary" }),
    )
    .await;

    assert_eq!(body["category"], "vocabulary");
    assert_eq!(body["question_type"], "multiple_choice");
    assert_eq!(body["questions"].as_array().unwrap().len(), 10);
    assert_eq!(body["answered_count"], 0);
    assert_eq!(body["current_index"], 0);
    assert!(body["answers"].as_array().unwrap().iter().all(Value::is_null));

    for question in body["questions"].as_array().unwrap() {
        assert_eq!(question["type"], "multiple_choice");
        let options = question["options"].as_array().unwrap();
        assert_eq!(options.len(), 4);
        assert_eq!(
            options.iter().filter(|o| o["is_correct"] == true).count(),
            1
        );
    }
}

/// Test sentences default to fill-in-blank.
#[tokio::test]
async fn test_create_sentence_test_defaults_to_fill_in_blank() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(&server, &fixtures::create_test_request("sentences", &[], None)).await;

    assert_eq!(body["question_type"], "fill_in_blank");
    for question in body["questions"].as_array().unwrap() {
        assert_eq!(question["type"], "fill_in_blank");
        assert!(question["blanked_text"].as_str().unwrap().contains("______"));
    }
}

/// Test requested counts are clamped into the configured bounds.
#[tokio::test]
async fn test_create_clamps_count() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &fixtures::create_test_request("vocabulary", &[], Some(1)),
    )
    .await;
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);

    let body = create_test(
        &server,
        &fixtures::create_test_request("vocabulary", &[], Some(500)),
    )
    .await;
    assert_eq!(body["questions"].as_array().unwrap().len(), 50);
}

/// Test the unit filter limits the questions, and a short unit yields fewer.
#[tokio::test]
async fn test_create_single_unit() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &fixtures::create_test_request("vocabulary", &[1], Some(10)),
    )
    .await;

    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 6);
    assert!(questions.iter().all(|q| q["unit"] == 1));
}

#[tokio::test]
async fn test_create_with_no_items_is_unprocessable() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/tests")
        .json(&fixtures::create_test_request("vocabulary", &[99], None))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"], "unprocessable");
}

/// Test a fully correct run scores 100%.
#[tokio::test]
async fn test_answer_all_correct() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &fixtures::create_test_request("vocabulary", &[2], Some(5)),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();
    let questions = body["questions"].as_array().unwrap().clone();

    for (position, question) in questions.iter().enumerate() {
        let state = answer(&server, &id, position, json!(fixtures::correct_option(question))).await;
        assert_eq!(state["answered_count"], position + 1);
    }

    let response = server.get(&format!("/api/tests/{id}/score")).await;
    response.assert_status_ok();
    let score: Value = response.json();
    assert_eq!(score["correct_count"], 5);
    assert_eq!(score["total"], 5);
    assert_eq!(score["percentage"], 100);
    assert!(score["elapsed_seconds"].as_i64().unwrap() >= 0);

    let review = score["review"].as_array().unwrap();
    assert_eq!(review.len(), 5);
    for (position, entry) in review.iter().enumerate() {
        assert_eq!(entry["position"], position);
        assert_eq!(entry["is_correct"], true);
        assert_eq!(entry["user_answer"], entry["correct_answer"]);
    }

    let response = server.post(&format!("/api/tests/{id}/retest")).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

/// Test a retest keeps only the missed questions.
#[tokio::test]
async fn test_retest_mistakes() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &fixtures::create_test_request("vocabulary", &[2], Some(5)),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();
    let questions = body["questions"].as_array().unwrap().clone();

    let wrong = fixtures::wrong_option(&questions[0]).expect("unit 2 yields distractors");
    answer(&server, &id, 0, json!(wrong)).await;
    for (position, question) in questions.iter().enumerate().skip(1) {
        answer(&server, &id, position, json!(fixtures::correct_option(question))).await;
    }

    let score: Value = server.get(&format!("/api/tests/{id}/score")).await.json();
    assert_eq!(score["correct_count"], 4);
    assert_eq!(score["percentage"], 80);
    assert_eq!(score["review"][0]["is_correct"], false);

    let response = server.post(&format!("/api/tests/{id}/retest")).await;
    response.assert_status_ok();
    let retest: Value = response.json();
    assert_eq!(retest["questions"], json!([questions[0].clone()]));
    assert_eq!(retest["answers"], json!([null]));
    assert_eq!(retest["answered_count"], 0);
}

/// Test sentence ordering accepts the original token order.
#[tokio::test]
async fn test_sentence_order() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &json!({
            "category": "sentences",
            "units": [10],
            "question_type": "sentence_order",
        }),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();
    let questions = body["questions"].as_array().unwrap().clone();
    assert_eq!(questions.len(), 2);

    answer(&server, &id, 0, questions[0]["original_tokens"].clone()).await;
    let mut reversed: Vec<Value> = questions[1]["original_tokens"].as_array().unwrap().clone();
    reversed.reverse();
    answer(&server, &id, 1, Value::Array(reversed)).await;

    let score: Value = server.get(&format!("/api/tests/{id}/score")).await.json();
    assert_eq!(score["correct_count"], 1);
    assert_eq!(score["percentage"], 50);
}

/// Test invalid answers are rejected with the right status.
#[tokio::test]
async fn test_invalid_answers() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &fixtures::create_test_request("vocabulary", &[], Some(5)),
    )
    .await;
    let id = body["id"].as_str().unwrap();

    let response = server
        .put(&format!("/api/tests/{id}/answers/0"))
        .json(&json!({ "answer": ["near"] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .put(&format!("/api/tests/{id}/answers/0"))
        .json(&json!({ "answer": 7 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .put(&format!("/api/tests/{id}/answers/99"))
        .json(&json!({ "answer": 0 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restart_clears_answers() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &fixtures::create_test_request("phrases", &[], Some(5)),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();
    let questions = body["questions"].clone();

    answer(&server, &id, 0, json!(0)).await;

    let response = server.post(&format!("/api/tests/{id}/restart")).await;
    response.assert_status_ok();
    let state: Value = response.json();
    assert_eq!(state["questions"], questions);
    assert_eq!(state["answered_count"], 0);
    assert!(state["answers"].as_array().unwrap().iter().all(Value::is_null));
}

#[tokio::test]
async fn test_get_and_delete() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let body = create_test(
        &server,
        &fixtures::create_test_request("vocabulary", &[], Some(5)),
    )
    .await;
    let id = body["id"].as_str().unwrap();

    let response = server.get(&format!("/api/tests/{id}")).await;
    response.assert_status_ok();
    let state: Value = response.json();
    assert_eq!(state["questions"], body["questions"]);

    server
        .delete(&format!("/api/tests/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/tests/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .get("/api/tests/00000000-0000-0000-0000-000000000000/score")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

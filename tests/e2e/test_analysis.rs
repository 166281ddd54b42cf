use crate::e2e::helpers;

use helpers::fixtures::VALID_API_KEY;
use helpers::mock_vision::completion;
use helpers::{TestContext, TEST_DEMO_KEY};
use homework_checker_backend::domain::settings::Language;
use homework_checker_backend::infrastructure::repositories::InMemoryStore;
use hyper::StatusCode;
use serde_json::json;
use std::sync::Arc;
use test_context::test_context;

const TINY_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_analyze_with_demo_key_and_meter_the_call(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-key-source", "demo")
        .assert_header("x-usage-remaining", "9");

    let body = response.body.as_ref().unwrap();
    assert_eq!(body["key_source"], "demo");
    assert_eq!(body["remaining_calls"], 9);
    assert_eq!(body["total_char_count"], 4);
    assert_eq!(body["full_transcription"], "我爱学习");
    assert_eq!(body["errors"][0]["wrong_char"], "爰");
    assert_eq!(body["errors"][0]["suggested_char"], "爱");
    assert_eq!(body["errors"][0]["error_type"], "STROKE");

    assert_eq!(ctx.vision_api.keys_used(), vec![TEST_DEMO_KEY.to_string()]);
    let counters = ctx.fixtures.counters(user_id).await.unwrap();
    assert_eq!(counters.free_calls_consumed, 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_send_image_and_prompt_to_the_model(ctx: &TestContext) {
    let (_, token) = ctx.new_user();

    ctx.client
        .post_with_auth(
            "/api/analyze",
            &json!({ "image_data": TINY_PNG, "language": "en-US" }),
            &token,
        )
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let requests = ctx.vision_api.requests();
    assert_eq!(requests.len(), 1);
    let body = &requests[0].body;
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["stream"], false);

    let content = &body["messages"][0]["content"];
    assert_eq!(content[0]["type"], "image_url");
    assert_eq!(content[0]["image_url"]["url"], TINY_PNG);
    assert_eq!(content[1]["type"], "text");
    assert!(content[1]["text"]
        .as_str()
        .unwrap()
        .contains(r#""response_language": "en-US""#));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_default_to_saved_language(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();
    ctx.fixtures.save_language(user_id, Language::EnUs).await.unwrap();

    ctx.client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let requests = ctx.vision_api.requests();
    let prompt = requests[0].body["messages"][0]["content"][1]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("Write context and quality_issues in en-US."));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_when_free_calls_are_exhausted(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();
    ctx.fixtures.set_free_calls_consumed(user_id, 10).await.unwrap();

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::PAYMENT_REQUIRED)
        .assert_error_message("free calls exhausted");
    assert_eq!(ctx.vision_api.hits(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_meter_calls_made_with_a_request_key(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();
    ctx.fixtures.set_free_calls_consumed(user_id, 10).await.unwrap();

    let response = ctx
        .client
        .post_with_auth(
            "/api/analyze",
            &json!({ "image_data": TINY_PNG, "custom_api_key": VALID_API_KEY }),
            &token,
        )
        .await
        .unwrap();

    response
        .assert_status(StatusCode::OK)
        .assert_header("x-key-source", "explicit")
        .assert_header("x-usage-remaining", "-1");

    assert_eq!(ctx.vision_api.keys_used(), vec![VALID_API_KEY.to_string()]);
    let counters = ctx.fixtures.counters(user_id).await.unwrap();
    assert_eq!(counters.free_calls_consumed, 10);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_prefer_saved_key_over_demo_key(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();
    ctx.fixtures.save_api_key(user_id, VALID_API_KEY).await.unwrap();

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap()["key_source"], "saved");
    assert_eq!(ctx.vision_api.keys_used(), vec![VALID_API_KEY.to_string()]);
    assert_eq!(
        ctx.fixtures.counters(user_id).await.unwrap().free_calls_consumed,
        0
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_retry_rate_limits_and_server_errors(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();
    ctx.vision_api.push_response(429, json!({ "error": "rate limited" }));
    ctx.vision_api.push_response(503, json!({ "error": "busy" }));

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(ctx.vision_api.hits(), 3);
    // One successful analysis is one metered call, whatever the retries
    assert_eq!(
        ctx.fixtures.counters(user_id).await.unwrap().free_calls_consumed,
        1
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_fail_after_exhausting_retries(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();
    for _ in 0..4 {
        ctx.vision_api.push_response(503, json!({ "error": "down" }));
    }

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("unavailable");
    // First attempt plus three retries
    assert_eq!(ctx.vision_api.hits(), 4);
    assert_eq!(
        ctx.fixtures.counters(user_id).await.unwrap().free_calls_consumed,
        0
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_retry_rejected_keys(ctx: &TestContext) {
    let (_, token) = ctx.new_user();
    ctx.vision_api.push_response(401, json!({ "error": "bad key" }));

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("rejected the API key");
    assert_eq!(ctx.vision_api.hits(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_unparseable_replies(ctx: &TestContext) {
    let (user_id, token) = ctx.new_user();
    ctx.vision_api
        .push_response(200, completion("Sorry, I cannot read this image."));

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response
        .assert_status(StatusCode::BAD_GATEWAY)
        .assert_error_message("could not be parsed");
    assert_eq!(
        ctx.fixtures.counters(user_id).await.unwrap().free_calls_consumed,
        0
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_empty_and_non_image_payloads(ctx: &TestContext) {
    let (_, token) = ctx.new_user();

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": "" }), &token)
        .await
        .unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("Image data cannot be empty");

    let response = ctx
        .client
        .post_with_auth(
            "/api/analyze",
            &json!({ "image_data": "data:text/plain;base64,aGVsbG8=" }),
            &token,
        )
        .await
        .unwrap();
    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_error_message("unsupported content type");

    assert_eq!(ctx.vision_api.hits(), 0);
}

#[tokio::test]
async fn it_should_report_not_configured_without_a_demo_key() {
    let ctx = TestContext::start(Arc::new(InMemoryStore::new()), |config| {
        config.demo_api_key = None;
    })
    .await;
    let (_, token) = ctx.new_user();

    let response = ctx
        .client
        .post_with_auth("/api/analyze", &json!({ "image_data": TINY_PNG }), &token)
        .await
        .unwrap();

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(ctx.vision_api.hits(), 0);
}

#[tokio::test]
async fn it_should_require_authentication_to_analyze() {
    let ctx = TestContext::start(Arc::new(InMemoryStore::new()), |_| {}).await;

    let response = ctx
        .client
        .post("/api/analyze", &json!({ "image_data": TINY_PNG }))
        .await
        .unwrap();

    response.assert_status(StatusCode::UNAUTHORIZED);
}

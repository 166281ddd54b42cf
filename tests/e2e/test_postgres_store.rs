use crate::e2e::helpers;

use helpers::postgres::PostgresTestContext;
use homework_checker_backend::infrastructure::db::ensure_schema;
use homework_checker_backend::infrastructure::repositories::{Namespace, Store};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;
use uuid::Uuid;

#[test_context(PostgresTestContext)]
#[tokio::test]
async fn it_should_prepare_the_schema_more_than_once(ctx: &PostgresTestContext) {
    ensure_schema(&ctx.pool).await.unwrap();
    ensure_schema(&ctx.pool).await.unwrap();

    ctx.store.ping().await.unwrap();
}

#[test_context(PostgresTestContext)]
#[tokio::test]
async fn it_should_return_none_for_missing_keys(ctx: &PostgresTestContext) {
    let value = ctx.store.get(Namespace::Usage, Uuid::new_v4()).await.unwrap();
    assert!(value.is_none());
}

#[test_context(PostgresTestContext)]
#[tokio::test]
async fn it_should_upsert_values(ctx: &PostgresTestContext) {
    let user_id = Uuid::new_v4();

    ctx.store
        .set(Namespace::PurchasedCalls, user_id, "50".to_string())
        .await
        .unwrap();
    ctx.store
        .set(Namespace::PurchasedCalls, user_id, "250".to_string())
        .await
        .unwrap();

    let value = ctx.store.get(Namespace::PurchasedCalls, user_id).await.unwrap();
    assert_eq!(value.as_deref(), Some("250"));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_entries WHERE key = $1")
        .bind(format!("purchased_calls_{}", user_id))
        .fetch_one(ctx.pool.as_ref())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[test_context(PostgresTestContext)]
#[tokio::test]
async fn it_should_keep_namespaces_and_users_apart(ctx: &PostgresTestContext) {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    ctx.store
        .set(Namespace::Usage, alice, "3".to_string())
        .await
        .unwrap();
    ctx.store
        .set(Namespace::PurchasedCalls, alice, "50".to_string())
        .await
        .unwrap();

    assert_eq!(
        ctx.store.get(Namespace::Usage, alice).await.unwrap().as_deref(),
        Some("3")
    );
    assert_eq!(
        ctx.store
            .get(Namespace::PurchasedCalls, alice)
            .await
            .unwrap()
            .as_deref(),
        Some("50")
    );
    assert!(ctx.store.get(Namespace::Usage, bob).await.unwrap().is_none());
}

#[test_context(PostgresTestContext)]
#[tokio::test]
async fn it_should_persist_purchases_through_the_api(ctx: &PostgresTestContext) {
    let (user_id, token) = ctx.app.new_user();

    ctx.app
        .client
        .post_with_auth(
            "/api/payments",
            &json!({ "plan_id": "basic", "method": "alipay" }),
            &token,
        )
        .await
        .unwrap()
        .assert_status(StatusCode::CREATED);

    let purchased = ctx
        .store
        .get(Namespace::PurchasedCalls, user_id)
        .await
        .unwrap();
    assert_eq!(purchased.as_deref(), Some("50"));

    let response = ctx
        .app
        .client
        .get_with_auth("/api/usage", &token)
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["purchased_calls"], json!(50));
}

#[test_context(PostgresTestContext)]
#[tokio::test]
async fn it_should_report_the_database_as_ready(ctx: &PostgresTestContext) {
    let response = ctx.app.client.get("/health/ready").await.unwrap();

    response.assert_status(StatusCode::OK);
    let body = response.body.as_ref().unwrap();
    assert_eq!(body["store"], json!("connected"));
}

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    server::app(engine, db)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates a group with three members; returns the group id and the member
/// ids in input order.
async fn seed_group(app: &Router) -> (String, Vec<String>) {
    let (status, group) = request(
        app,
        "POST",
        "/groups",
        Some(json!({ "name": "Trip", "description": "Weekend away" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_str().unwrap().to_string();

    let (status, added) = request(
        app,
        "POST",
        &format!("/groups/{group_id}/members"),
        Some(json!({
            "members": [
                { "name": "Alice", "email": "alice@example.com" },
                { "name": "Bob", "email": "bob@example.com" },
                { "name": "Carol", "email": "carol@example.com" },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let members = added["members_added"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["member_id"].as_str().unwrap().to_string())
        .collect();

    (group_id, members)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let (status, body) = request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn expense_flow_produces_balances_and_transfers() {
    let app = test_app().await;
    let (group_id, members) = seed_group(&app).await;

    let (status, expense) = request(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some(json!({
            "description": "Dinner",
            "amount_minor": 10000,
            "paid_by": members[0],
            "split_type": "EQUAL",
            "splits": [
                { "member_id": members[0] },
                { "member_id": members[1] },
                { "member_id": members[2] },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["paid_by"]["name"], "Alice");
    let split_amounts: Vec<i64> = expense["splits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["amount_minor"].as_i64().unwrap())
        .collect();
    assert_eq!(split_amounts, vec![3334, 3333, 3333]);

    let (status, balance) =
        request(&app, "GET", &format!("/groups/{group_id}/balance"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance["group_name"], "Trip");

    let alice = balance["members"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == "Alice")
        .unwrap();
    assert_eq!(alice["balance_minor"], 6666);

    let transfers = balance["suggested_transfers"].as_array().unwrap();
    assert_eq!(transfers.len(), 2);
    for transfer in transfers {
        assert_eq!(transfer["to"]["name"], "Alice");
        assert_eq!(transfer["amount_minor"], 3333);
    }
}

#[tokio::test]
async fn settlement_above_balance_is_unprocessable() {
    let app = test_app().await;
    let (group_id, members) = seed_group(&app).await;

    request(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some(json!({
            "description": "Dinner",
            "amount_minor": 10000,
            "paid_by": members[0],
            "split_type": "EQUAL",
            "splits": [
                { "member_id": members[0] },
                { "member_id": members[1] },
                { "member_id": members[2] },
            ]
        })),
    )
    .await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/groups/{group_id}/settlements"),
        Some(json!({
            "from_member_id": members[1],
            "to_member_id": members[0],
            "amount_minor": 5000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "settlement_exceeds_balance");
    assert_eq!(body["error"]["details"]["requested_minor"], 5000);
    assert_eq!(body["error"]["details"]["available_minor"], 3333);

    let (status, recorded) = request(
        &app,
        "POST",
        &format!("/groups/{group_id}/settlements"),
        Some(json!({
            "from_member_id": members[1],
            "to_member_id": members[0],
            "amount_minor": 3333,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recorded["from"]["name"], "Bob");
    assert_eq!(recorded["to"]["name"], "Alice");
}

#[tokio::test]
async fn split_mismatch_is_unprocessable() {
    let app = test_app().await;
    let (group_id, members) = seed_group(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some(json!({
            "description": "Groceries",
            "amount_minor": 10000,
            "paid_by": members[0],
            "split_type": "EXACT",
            "splits": [
                { "member_id": members[0], "amount_minor": 6000 },
                { "member_id": members[1], "amount_minor": 3000 },
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "split_mismatch");
    assert_eq!(body["error"]["details"]["expected"], 10000);
    assert_eq!(body["error"]["details"]["actual"], 9000);
}

#[tokio::test]
async fn duplicate_member_name_conflicts() {
    let app = test_app().await;
    let (group_id, _) = seed_group(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/groups/{group_id}/members"),
        Some(json!({
            "members": [{ "name": "alice", "email": "alice2@example.com" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");
}

#[tokio::test]
async fn unknown_group_is_not_found() {
    let app = test_app().await;

    let (status, body) = request(
        &app,
        "GET",
        "/groups/00000000-0000-0000-0000-000000000000/balance",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn expense_delete_returns_no_content() {
    let app = test_app().await;
    let (group_id, members) = seed_group(&app).await;

    let (_, expense) = request(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some(json!({
            "description": "Taxi",
            "amount_minor": 1200,
            "paid_by": members[0],
            "split_type": "EQUAL",
            "splits": [
                { "member_id": members[0] },
                { "member_id": members[1] },
            ]
        })),
    )
    .await;
    let expense_id = expense["id"].as_str().unwrap();

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/groups/{group_id}/expenses/{expense_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/groups/{group_id}/expenses/{expense_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

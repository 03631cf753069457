use actix_web::http::StatusCode;
use serde_json::Value;

use super::helpers::{credit_user, get, new_db, post_json};

#[actix_web::test]
async fn empty_balance() {
    let db = new_db().await;
    let (status, body) = get(&db, Some(1), "/api/user/balance").await;
    assert_eq!(status, StatusCode::OK);
    let balance: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(balance["current"].as_f64(), Some(0.0));
    assert_eq!(balance["withdrawn"].as_f64(), Some(0.0));
}

#[actix_web::test]
async fn withdraw_points() {
    let db = new_db().await;
    credit_user(&db, 1, "12345678903", "500").await;

    let (status, body) =
        post_json(&db, 1, "/api/user/balance/withdraw", r#"{"order":"2377225624","sum":751}"#).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED, "{body}");

    let (status, body) =
        post_json(&db, 1, "/api/user/balance/withdraw", r#"{"order":"2377225624","sum":120.5}"#).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let withdrawal: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(withdrawal["order"], "2377225624");
    assert_eq!(withdrawal["sum"].as_f64(), Some(120.5));

    let (status, body) = get(&db, Some(1), "/api/user/balance").await;
    assert_eq!(status, StatusCode::OK);
    let balance: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(balance["current"].as_f64(), Some(379.5));
    assert_eq!(balance["withdrawn"].as_f64(), Some(120.5));
}

#[actix_web::test]
async fn invalid_withdrawals() {
    let db = new_db().await;
    credit_user(&db, 1, "12345678903", "500").await;
    let (status, _) = post_json(&db, 1, "/api/user/balance/withdraw", r#"{"order":"1234","sum":10}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = post_json(&db, 1, "/api/user/balance/withdraw", r#"{"order":"2377225624","sum":0}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = post_json(&db, 1, "/api/user/balance/withdraw", r#"{"order":"2377225624"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = get(&db, Some(1), "/api/user/balance").await;
    let balance: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(balance["current"].as_f64(), Some(500.0));
}

#[actix_web::test]
async fn list_withdrawals() {
    let db = new_db().await;
    let (status, _) = get(&db, Some(3), "/api/user/withdrawals").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    credit_user(&db, 3, "12345678903", "100").await;
    post_json(&db, 3, "/api/user/balance/withdraw", r#"{"order":"18","sum":10}"#).await;
    post_json(&db, 3, "/api/user/balance/withdraw", r#"{"order":"26","sum":"20.25"}"#).await;

    let (status, body) = get(&db, Some(3), "/api/user/withdrawals").await;
    assert_eq!(status, StatusCode::OK);
    let withdrawals: Value = serde_json::from_str(&body).unwrap();
    let withdrawals = withdrawals.as_array().unwrap();
    assert_eq!(withdrawals.len(), 2);
    assert_eq!(withdrawals[0]["order"], "26");
    assert_eq!(withdrawals[0]["sum"].as_f64(), Some(20.25));
    assert_eq!(withdrawals[1]["order"], "18");
    assert!(withdrawals[1]["processed_at"].is_string());
}

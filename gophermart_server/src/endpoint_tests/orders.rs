use actix_web::http::StatusCode;
use gophermart_engine::{
    db_types::{OrderId, OrderStatusType},
    OrderManagement,
};
use serde_json::Value;

use super::helpers::{credit_user, get, new_db, post};

#[actix_web::test]
async fn health_check() {
    let db = new_db().await;
    let (status, _) = get(&db, None, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn requests_without_a_user_are_unauthorized() {
    let db = new_db().await;
    let (status, body) = get(&db, None, "/api/user/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("X-User-Id"));
    let (status, _) = post(&db, None, "/api/user/orders", "79927398713").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn submit_orders() {
    let db = new_db().await;
    let (status, _) = post(&db, Some(1), "/api/user/orders", "79927398713").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = post(&db, Some(1), "/api/user/orders", "79927398713").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(&db, Some(2), "/api/user/orders", "79927398713").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = post(&db, Some(1), "/api/user/orders", "79927398710").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = post(&db, Some(1), "/api/user/orders", "").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let order = db.fetch_order_by_order_id(&OrderId::from("79927398713")).await.unwrap().unwrap();
    assert_eq!(order.user_id, 1);
    assert_eq!(order.status, OrderStatusType::New);
}

#[actix_web::test]
async fn no_orders_is_no_content() {
    let db = new_db().await;
    let (status, body) = get(&db, Some(1), "/api/user/orders").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn list_orders() {
    let db = new_db().await;
    credit_user(&db, 1, "12345678903", "729.98").await;
    post(&db, Some(1), "/api/user/orders", "79927398713").await;
    post(&db, Some(2), "/api/user/orders", "4561261212345467").await;

    let (status, body) = get(&db, Some(1), "/api/user/orders").await;
    assert_eq!(status, StatusCode::OK);
    let orders: Value = serde_json::from_str(&body).unwrap();
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["number"], "79927398713");
    assert_eq!(orders[0]["status"], "NEW");
    assert!(orders[0].get("accrual").is_none());
    assert_eq!(orders[1]["number"], "12345678903");
    assert_eq!(orders[1]["status"], "PROCESSED");
    assert_eq!(orders[1]["accrual"].as_f64(), Some(729.98));
    assert!(orders[1]["uploaded_at"].as_str().unwrap().contains('T'));
}

#![allow(dead_code)]
pub mod mocks;

use gophermart_engine::{
    db_types::{Money, NewOrder, OrderId, OrderStatusType},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    InsertOrderResult,
    OrderManagement,
    SqliteDatabase,
};

pub async fn new_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await
}

/// Takes an order through the whole lifecycle so that `user_id` ends up with `points` more in their balance.
pub async fn credit_user(db: &SqliteDatabase, user_id: i64, order_id: &str, points: Money) {
    let order_id = OrderId::from(order_id);
    let result = db.insert_order(NewOrder::new(order_id.clone(), user_id)).await.unwrap();
    assert!(matches!(result, InsertOrderResult::Inserted(_)));
    let claimed = db.update_order_status(&order_id, OrderStatusType::New, OrderStatusType::Processing).await.unwrap();
    assert!(claimed);
    db.add_accrual(&order_id, points).await.unwrap();
}

pub fn points(s: &str) -> Money {
    s.parse().unwrap()
}

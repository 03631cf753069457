mod support;

use gophermart_engine::{
    db_types::{OrderId, OrderStatusType},
    helpers::OrderNumberError,
    AcceptOrderResult,
    OrderFlowApi,
    OrderFlowError,
};
use support::new_db;

#[tokio::test]
async fn accept_new_order() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db);
    let result = api.accept_order(1, OrderId::from("79927398713")).await.unwrap();
    let AcceptOrderResult::Accepted(order) = result else { panic!("Expected a new order, got {result:?}") };
    assert_eq!(order.order_id.as_str(), "79927398713");
    assert_eq!(order.user_id, 1);
    assert_eq!(order.status, OrderStatusType::New);
    assert!(order.accrual.is_none());
}

#[tokio::test]
async fn resubmitting_own_order_is_idempotent() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db);
    let first = api.accept_order(1, OrderId::from("12345678903")).await.unwrap();
    let second = api.accept_order(1, OrderId::from("12345678903")).await.unwrap();
    let (AcceptOrderResult::Accepted(a), AcceptOrderResult::AlreadyAccepted(b)) = (first, second) else {
        panic!("Expected Accepted then AlreadyAccepted");
    };
    assert_eq!(a, b);
    assert_eq!(api.orders_for_user(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn order_belonging_to_someone_else_is_a_conflict() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db);
    api.accept_order(1, OrderId::from("4561261212345467")).await.unwrap();
    let err = api.accept_order(2, OrderId::from("4561261212345467")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::OrderOwnedByAnotherUser(ref id) if id.as_str() == "4561261212345467"));
    assert!(api.orders_for_user(2).await.unwrap().is_empty());
    let order = api.order_by_id(&OrderId::from("4561261212345467")).await.unwrap().unwrap();
    assert_eq!(order.user_id, 1);
}

#[tokio::test]
async fn invalid_order_numbers_are_rejected() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db);
    let err = api.accept_order(1, OrderId::from("79927398710")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidOrderNumber(OrderNumberError::InvalidChecksum(_))));
    let err = api.accept_order(1, OrderId::from("7992-7398713")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidOrderNumber(OrderNumberError::NotNumeric(_))));
    let err = api.accept_order(1, OrderId::from("")).await.unwrap_err();
    assert!(matches!(err, OrderFlowError::InvalidOrderNumber(OrderNumberError::Empty)));
    assert!(api.orders_for_user(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn orders_are_listed_newest_first() {
    let db = new_db().await;
    let api = OrderFlowApi::new(db);
    for id in ["18", "26", "34"] {
        api.accept_order(7, OrderId::from(id)).await.unwrap();
    }
    api.accept_order(8, OrderId::from("42")).await.unwrap();
    let orders = api.orders_for_user(7).await.unwrap();
    let ids = orders.iter().map(|o| o.order_id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["34", "26", "18"]);
    assert!(orders.iter().all(|o| o.user_id == 7));
}

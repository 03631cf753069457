use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    App,
};
use gophermart_engine::{
    db_types::{Money, NewOrder, OrderId, OrderStatusType},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    BalanceApi,
    OrderFlowApi,
    OrderManagement,
    SqliteDatabase,
};
use log::debug;

use crate::{auth::USER_ID_HEADER, routes::health, server::api_scope};

pub async fn new_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    prepare_test_env(&random_db_path()).await
}

pub async fn send(db: &SqliteDatabase, req: TestRequest) -> (StatusCode, String) {
    let app = App::new()
        .app_data(web::Data::new(OrderFlowApi::new(db.clone())))
        .app_data(web::Data::new(BalanceApi::new(db.clone())))
        .service(health)
        .service(api_scope::<SqliteDatabase>());
    let service = test::init_service(app).await;
    debug!("Making request");
    let res: ServiceResponse = service.call(req.to_request()).await.expect("Request failed");
    let status = res.status();
    let body = res.into_body().try_into_bytes().map(|b| String::from_utf8_lossy(&b).into_owned()).unwrap_or_default();
    (status, body)
}

pub async fn get(db: &SqliteDatabase, user: Option<i64>, path: &str) -> (StatusCode, String) {
    let mut req = TestRequest::get().uri(path);
    if let Some(id) = user {
        req = req.insert_header((USER_ID_HEADER, id.to_string()));
    }
    send(db, req).await
}

pub async fn post(db: &SqliteDatabase, user: Option<i64>, path: &str, body: &str) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path).set_payload(body.to_string());
    if let Some(id) = user {
        req = req.insert_header((USER_ID_HEADER, id.to_string()));
    }
    send(db, req).await
}

pub async fn post_json(db: &SqliteDatabase, user: i64, path: &str, body: &str) -> (StatusCode, String) {
    let req = TestRequest::post()
        .uri(path)
        .insert_header((USER_ID_HEADER, user.to_string()))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    send(db, req).await
}

/// Submits and settles an order, crediting the user with `points`.
pub async fn credit_user(db: &SqliteDatabase, user_id: i64, order_id: &str, points: &str) {
    let order_id = OrderId::from(order_id);
    db.insert_order(NewOrder::new(order_id.clone(), user_id)).await.unwrap();
    db.update_order_status(&order_id, OrderStatusType::New, OrderStatusType::Processing).await.unwrap();
    db.add_accrual(&order_id, points.parse::<Money>().unwrap()).await.unwrap();
}

use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use gophermart_engine::{
    accrual::{HttpAccrualClient, RateLimiter},
    BalanceApi,
    OrderFlowApi,
    SqliteDatabase,
};
use log::*;
use tokio_util::sync::CancellationToken;

use crate::{
    accrual_worker::start_accrual_worker,
    config::ServerConfig,
    errors::ServerError,
    routes::{health, MyBalanceRoute, MyOrdersRoute, MyWithdrawalsRoute, SubmitOrderRoute, WithdrawRoute},
};

/// Opens the database, starts the accrual worker and serves the API until the server is shut down. Once the server
/// exits, the worker is stopped and the database is closed.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.db_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let limiter = Arc::new(RateLimiter::unlimited());
    let client = HttpAccrualClient::new(&config.accrual.address, config.accrual.request_timeout, limiter)
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let shutdown = CancellationToken::new();
    let worker = start_accrual_worker(db.clone(), client, &config.accrual, shutdown.clone());
    let srv = create_server_instance(&config, db.clone())?;
    info!("🚀️ Listening on {}", config.run_address);
    let result = srv.await;
    info!("🚀️ Server stopped. Waiting for the accrual worker to finish");
    shutdown.cancel();
    match worker.await {
        Ok(cycles) => info!("🚀️ Accrual worker finished after {cycles} cycles"),
        Err(e) => error!("🚀️ Accrual worker did not shut down cleanly. {e}"),
    }
    db.close().await;
    result.map_err(ServerError::from)
}

pub fn create_server_instance(config: &ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let balance_api = BalanceApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gophermart::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(balance_api))
            .service(health)
            .service(api_scope::<SqliteDatabase>())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(config.run_address.as_str())?
    .run();
    Ok(srv)
}

/// The `/api` routes, generic over the storage backend.
pub fn api_scope<B>() -> actix_web::Scope
where B: gophermart_engine::LedgerDatabase + 'static {
    web::scope("/api")
        .service(SubmitOrderRoute::<B>::new())
        .service(MyOrdersRoute::<B>::new())
        .service(MyBalanceRoute::<B>::new())
        .service(WithdrawRoute::<B>::new())
        .service(MyWithdrawalsRoute::<B>::new())
}

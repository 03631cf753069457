//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any database or network work must be awaited, never blocked on.
use actix_web::{get, web, HttpResponse, Responder};
use gophermart_engine::{
    db_types::OrderId,
    AcceptOrderResult,
    BalanceApi,
    BalanceManagement,
    OrderFlowApi,
    OrderManagement,
};
use log::*;

use crate::{
    auth::UserId,
    data_objects::{BalanceResponse, OrderResponse, WithdrawalRequest, WithdrawalResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(submit_order => Post "/user/orders" impl OrderManagement);
/// Route handler for order submission
///
/// The request body is the bare order number, as plain text. Responds with
/// * `202 Accepted` if the order is new and has been queued for reconciliation,
/// * `200 OK` if the user submitted this order before,
/// * `409 Conflict` if another user submitted this order,
/// * `422 Unprocessable Entity` if the order number is not valid.
pub async fn submit_order<B: OrderManagement>(
    user: UserId,
    body: String,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST order '{body}' for user {}", user.0);
    match api.accept_order(user.0, OrderId::from(body)).await? {
        AcceptOrderResult::Accepted(_) => Ok(HttpResponse::Accepted().finish()),
        AcceptOrderResult::AlreadyAccepted(_) => Ok(HttpResponse::Ok().finish()),
    }
}

route!(my_orders => Get "/user/orders" impl OrderManagement);
/// Route handler for the user's order history, most recent first. Responds with `204 No Content` if there are none.
pub async fn my_orders<B: OrderManagement>(
    user: UserId,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders for user {}", user.0);
    let orders = api.orders_for_user(user.0).await?;
    if orders.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let orders = orders.into_iter().map(OrderResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Balance  ----------------------------------------------------
route!(my_balance => Get "/user/balance" impl BalanceManagement);
pub async fn my_balance<B: BalanceManagement>(
    user: UserId,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET balance for user {}", user.0);
    let balance = api.user_balance(user.0).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse::from(balance)))
}

route!(withdraw => Post "/user/balance/withdraw" impl BalanceManagement);
/// Route handler for withdrawals
///
/// Expects a JSON body `{"order": "<receipt number>", "sum": <points>}`. Responds with
/// * `200 OK` and the withdrawal record on success,
/// * `402 Payment Required` if the balance is too low,
/// * `422 Unprocessable Entity` if the sum is not positive or the receipt number is not a valid order number.
pub async fn withdraw<B: BalanceManagement>(
    user: UserId,
    body: web::Json<WithdrawalRequest>,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let WithdrawalRequest { order, sum } = body.into_inner();
    debug!("💻️ POST withdrawal of {sum} for order '{order}' by user {}", user.0);
    let withdrawal = api.withdraw(user.0, OrderId::from(order), sum).await?;
    Ok(HttpResponse::Ok().json(WithdrawalResponse::from(withdrawal)))
}

route!(my_withdrawals => Get "/user/withdrawals" impl BalanceManagement);
/// Route handler for the user's withdrawals, most recent first. Responds with `204 No Content` if there are none.
pub async fn my_withdrawals<B: BalanceManagement>(
    user: UserId,
    api: web::Data<BalanceApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET withdrawals for user {}", user.0);
    let withdrawals = api.withdrawals(user.0).await?;
    if withdrawals.is_empty() {
        return Ok(HttpResponse::NoContent().finish());
    }
    let withdrawals = withdrawals.into_iter().map(WithdrawalResponse::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(withdrawals))
}

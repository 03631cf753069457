//! User identification.
//!
//! Registration, login and token handling happen in front of this service. Requests reach it with the authenticated
//! user's id in the `X-User-Id` header.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use log::debug;

use crate::errors::ServerError;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// The id of the user making the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

impl UserId {
    fn from_request_headers(req: &HttpRequest) -> Result<Self, ServerError> {
        let value = req
            .headers()
            .get(USER_ID_HEADER)
            .ok_or_else(|| ServerError::AuthenticationError(format!("{USER_ID_HEADER} header is missing")))?;
        value.to_str().ok().and_then(|s| s.trim().parse::<i64>().ok()).map(Self).ok_or_else(|| {
            debug!("💻️ Invalid {USER_ID_HEADER} header: {value:?}");
            ServerError::AuthenticationError(format!("{USER_ID_HEADER} header is not a valid user id"))
        })
    }
}

impl FromRequest for UserId {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_request_headers(req))
    }
}

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use gophermart_engine::{OrderFlowError, WithdrawalError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(String),
    #[error("Invalid order number. {0}")]
    InvalidOrderNumber(String),
    #[error("Order conflict. {0}")]
    OrderConflict(String),
    #[error("Invalid withdrawal. {0}")]
    InvalidWithdrawal(String),
    #[error("Insufficient balance. {0}")]
    InsufficientBalance(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OrderConflict(_) => StatusCode::CONFLICT,
            Self::InvalidWithdrawal(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InsufficientBalance(_) => StatusCode::PAYMENT_REQUIRED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidOrderNumber(e) => Self::InvalidOrderNumber(e.to_string()),
            OrderFlowError::OrderOwnedByAnotherUser(_) => Self::OrderConflict(e.to_string()),
            OrderFlowError::DatabaseError(e) => {
                error!("💻️ Order flow database error: {e}");
                Self::BackendError(format!("Database error: {e}"))
            },
        }
    }
}

impl From<WithdrawalError> for ServerError {
    fn from(e: WithdrawalError) -> Self {
        match e {
            WithdrawalError::InvalidSum(_) | WithdrawalError::InvalidOrder(_) => Self::InvalidWithdrawal(e.to_string()),
            WithdrawalError::NotEnoughBalance { .. } => Self::InsufficientBalance(e.to_string()),
            WithdrawalError::InternalError(e) => {
                error!("💻️ Balance database error: {e}");
                Self::BackendError(e)
            },
        }
    }
}

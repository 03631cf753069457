mod order_number;
mod retry_hint;

pub use order_number::{validate_order_number, OrderNumberError};
pub use retry_hint::extract_requests_per_minute;

use std::fmt::Display;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use crate::db_types::{Money, OrderId};

/// The status of an order as reported by the accrual service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatus {
    /// The order is known, but the calculation has not started.
    Registered,
    /// The order will never earn points.
    Invalid,
    /// The calculation is in progress.
    Processing,
    /// The calculation is complete.
    Processed,
    /// The service answered with a status we do not recognise.
    Unknown,
}

impl AccrualStatus {
    /// Matches the status case-insensitively. Anything unrecognised is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "registered" => Self::Registered,
            "invalid" => Self::Invalid,
            "processing" => Self::Processing,
            "processed" => Self::Processed,
            other => {
                warn!("🛰️ Accrual service sent an unrecognised order status: '{other}'");
                Self::Unknown
            },
        }
    }
}

impl Display for AccrualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registered => write!(f, "REGISTERED"),
            Self::Invalid => write!(f, "INVALID"),
            Self::Processing => write!(f, "PROCESSING"),
            Self::Processed => write!(f, "PROCESSED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl<'de> Deserialize<'de> for AccrualStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// The body of a successful `GET /api/orders/{number}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualResponse {
    pub order: OrderId,
    pub status: AccrualStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Money>,
}

use std::{fmt::Display, iter::Sum, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::op;

//--------------------------------------        Money        ---------------------------------------------------------
/// Number of decimal places that the ledger stores.
pub const MONEY_SCALE: u32 = 6;
const MICROS_PER_POINT: i64 = 1_000_000;
/// Number of decimal places used when presenting amounts to users.
pub const DISPLAY_SCALE: u32 = 2;

/// A fixed-point amount of loyalty points, stored as a whole number of micro-points.
///
/// All ledger arithmetic happens on the integer representation, so sums are exact. Conversions from and to
/// [`Decimal`] happen at the edges of the system (the accrual service responses and withdrawal requests coming in,
/// balances going out).
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |a, b| a + b)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a points amount: {0}")]
pub struct MoneyConversionError(pub String);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub fn from_points(points: i64) -> Self {
        Self(points * MICROS_PER_POINT)
    }

    pub fn micros(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The exact decimal value of this amount.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, MONEY_SCALE)
    }

    /// The value presented to users: rounded to two places using banker's rounding.
    pub fn rounded(&self) -> Decimal {
        self.to_decimal().round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointNearestEven)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyConversionError;

    /// Values with more than six decimal places are rounded half-to-even.
    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        value
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
            .checked_mul(Decimal::from(MICROS_PER_POINT))
            .and_then(|d| d.to_i64())
            .map(Self)
            .ok_or_else(|| MoneyConversionError(format!("{value} is out of range")))
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.to_decimal()
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = Decimal::from_str_exact(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|e| MoneyConversionError(format!("'{s}' is not a decimal number. {e}")))?;
        Self::try_from(value)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.rounded().to_f64() {
            Some(v) => serializer.serialize_f64(v),
            None => Err(serde::ser::Error::custom(format!("{} cannot be serialized", self.0))),
        }
    }
}

/// Accepts a JSON number or a numeric string. The number is parsed from its textual form, so no precision is lost to
/// binary floating point on the way in.
impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => n.to_string().parse().map_err(de::Error::custom),
            serde_json::Value::String(s) => s.parse().map_err(de::Error::custom),
            v => Err(de::Error::custom(format!("expected a number, got {v}"))),
        }
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The order number as supplied by the customer. Order numbers are numeric strings, but are never treated as machine
/// integers, since they can be arbitrarily long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle of an order. Legal transitions are
/// `New -> Processing -> Invalid | Processed`, and `Processing -> New` when the accrual service has no final answer
/// yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been submitted and is waiting to be reconciled.
    New,
    /// The order has been claimed by the reconciler and an accrual request is in flight.
    Processing,
    /// The accrual service rejected the order. Terminal.
    Invalid,
    /// The accrual service has calculated the reward for this order. Terminal.
    Processed,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "New"),
            OrderStatusType::Processing => write!(f, "Processing"),
            OrderStatusType::Invalid => write!(f, "Invalid"),
            OrderStatusType::Processed => write!(f, "Processed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(Self::New),
            "Processing" => Ok(Self::Processing),
            "Invalid" => Ok(Self::Invalid),
            "Processed" => Ok(Self::Processed),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: i64,
    pub status: OrderStatusType,
    /// Only set once the order is `Processed`.
    pub accrual: Option<Money>,
    pub uploaded_at: DateTime<Utc>,
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub user_id: i64,
    pub uploaded_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(order_id: OrderId, user_id: i64) -> Self {
        Self { order_id, user_id, uploaded_at: Utc::now() }
    }
}

//--------------------------------------     UserBalance       ---------------------------------------------------------
/// A user's balance. Both values are derived from the transaction ledger every time they are requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow, Serialize)]
pub struct UserBalance {
    /// The sum of all credits and debits.
    pub current: Money,
    /// The sum of all debits, as a positive number.
    pub withdrawn: Money,
}

//--------------------------------------      Withdrawal       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    /// A free-form receipt number. It must be a valid order number, but need not refer to a submitted order.
    pub order_id: OrderId,
    pub sum: Money,
}

impl NewWithdrawal {
    pub fn new(order_id: OrderId, sum: Money) -> Self {
        Self { order_id, sum }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Withdrawal {
    pub order_id: OrderId,
    /// The amount withdrawn, as a positive number.
    pub sum: Money,
    pub processed_at: DateTime<Utc>,
}

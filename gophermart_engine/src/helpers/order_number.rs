use thiserror::Error;

use crate::db_types::OrderId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("The order number is empty")]
    Empty,
    #[error("The order number '{0}' is not a non-negative integer")]
    NotNumeric(String),
    #[error("The order number '{0}' has an invalid checksum")]
    InvalidChecksum(String),
}

/// Checks that an order number is made up of decimal digits only and that it passes the Luhn checksum.
///
/// The check works on the digit string, so there is no limit on the length of an order number.
pub fn validate_order_number(order_id: &OrderId) -> Result<(), OrderNumberError> {
    let s = order_id.as_str();
    if s.is_empty() {
        return Err(OrderNumberError::Empty);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(OrderNumberError::NotNumeric(s.to_string()));
    }
    if !luhn_is_valid(s) {
        return Err(OrderNumberError::InvalidChecksum(s.to_string()));
    }
    Ok(())
}

/// Mod-10 check: starting from the rightmost digit, every second digit is doubled (subtracting 9 when the result
/// exceeds 9), and the total must be a multiple of 10. The input must be ASCII digits.
fn luhn_is_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let d = d * 2;
                if d > 9 {
                    d - 9
                } else {
                    d
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

#[cfg(test)]
mod test {
    use super::*;

    fn check(s: &str) -> Result<(), OrderNumberError> {
        validate_order_number(&OrderId::from(s))
    }

    #[test]
    fn valid_order_numbers() {
        for s in ["0", "18", "79927398713", "4561261212345467", "12345678903", "2377225624", "9278923470"] {
            assert_eq!(check(s), Ok(()), "{s} should be valid");
        }
    }

    #[test]
    fn longer_than_u64() {
        // 30 digits, still a valid checksum
        assert_eq!(check("123456789012345678901234567891"), Ok(()));
        assert!(matches!(check("123456789012345678901234567890"), Err(OrderNumberError::InvalidChecksum(_))));
    }

    #[test]
    fn flipped_last_digit_is_invalid() {
        for s in ["79927398713", "4561261212345467", "12345678903"] {
            let (head, last) = s.split_at(s.len() - 1);
            let last = last.parse::<u8>().unwrap();
            let flipped = format!("{head}{}", (last + 1) % 10);
            assert!(matches!(check(&flipped), Err(OrderNumberError::InvalidChecksum(_))), "{flipped} should fail");
        }
    }

    #[test]
    fn malformed_order_numbers() {
        assert_eq!(check(""), Err(OrderNumberError::Empty));
        assert_eq!(check("1234"), Err(OrderNumberError::InvalidChecksum("1234".into())));
        for s in ["-18", "+18", " 18", "18 ", "1a8", "abc", "79927398713\n"] {
            assert_eq!(check(s), Err(OrderNumberError::NotNumeric(s.into())), "{s:?} should not be numeric");
        }
    }
}

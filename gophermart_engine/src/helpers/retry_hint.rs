use regex::Regex;

/// Extracts the request budget from the body of a `429 Too Many Requests` response.
///
/// The accrual service replies with free text such as "No more than 10 requests per minute allowed". The first run
/// of digits in the body is taken as the number of requests per minute. Returns `None` when there are no digits, or
/// the number does not fit in a `u32`.
pub fn extract_requests_per_minute(body: &str) -> Option<u32> {
    let digits = Regex::new(r"[0-9]+").ok()?;
    digits.find(body).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn find_request_limits() {
        assert_eq!(extract_requests_per_minute(""), None);
        assert_eq!(extract_requests_per_minute("Too many requests"), None);
        assert_eq!(extract_requests_per_minute("No more than 5 requests per minute"), Some(5));
        assert_eq!(extract_requests_per_minute("No more than 60 requests per minute allowed, try in 30s"), Some(60));
        assert_eq!(extract_requests_per_minute("120"), Some(120));
        assert_eq!(extract_requests_per_minute("limit: 99999999999999999999"), None);
    }
}

use crate::constants::{YEAR_ROUTE_DIGITS, YEAR_ROUTE_PREFIX};
use crate::types::Year;

/// Parse a URL hash of the form `#/an/2011` into its year.
/// Anything else (including a missing `#`) yields `None`.
pub fn parse_year_route(hash: &str) -> Option<Year> {
    let digits = hash.strip_prefix(YEAR_ROUTE_PREFIX)?;
    if digits.len() != YEAR_ROUTE_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Build the hash fragment selecting `year`.
pub fn year_route(year: Year) -> String {
    format!("{YEAR_ROUTE_PREFIX}{year:04}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_route() {
        assert_eq!(parse_year_route("#/an/2011"), Some(2011));
        assert_eq!(parse_year_route("#/an/1930"), Some(1930));
    }

    #[test]
    fn test_parse_rejects_other_hashes() {
        assert_eq!(parse_year_route(""), None);
        assert_eq!(parse_year_route("#"), None);
        assert_eq!(parse_year_route("#/an/"), None);
        assert_eq!(parse_year_route("#/an/201"), None);
        assert_eq!(parse_year_route("#/an/20111"), None);
        assert_eq!(parse_year_route("#/an/20a1"), None);
        assert_eq!(parse_year_route("/an/2011"), None);
        assert_eq!(parse_year_route("#/year/2011"), None);
    }

    #[test]
    fn test_route_roundtrip() {
        assert_eq!(year_route(2002), "#/an/2002");
        assert_eq!(parse_year_route(&year_route(1956)), Some(1956));
    }
}

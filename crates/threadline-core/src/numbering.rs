//! Human-readable entity numbers (`EMP1718000000000042`).
//!
//! The backend keys rows by numeric id; the business number shown to staff is
//! generated on the client when a create form opens:
//! `<PREFIX><unix millis><3 random digits>`.

use chrono::{DateTime, Utc};
use rand::Rng;

pub const PRODUCT: &str = "PRD";
pub const EMPLOYEE: &str = "EMP";
pub const CUSTOMER: &str = "CUS";
pub const ORDER: &str = "ORD";
pub const SUPPLIER: &str = "SUP";
pub const SUPPLIER_PAYMENT: &str = "SPY";
pub const DELIVERY_PROVIDER: &str = "DLP";
pub const TRACKING: &str = "TRK";

/// Deterministic form of [`next_number`] for a given clock and generator.
pub fn generate_number<R: Rng + ?Sized>(prefix: &str, now: DateTime<Utc>, rng: &mut R) -> String {
    format!(
        "{}{}{:03}",
        prefix,
        now.timestamp_millis(),
        rng.random_range(0..1000)
    )
}

/// A fresh number for `prefix` using the current time and thread RNG.
pub fn next_number(prefix: &str) -> String {
    generate_number(prefix, Utc::now(), &mut rand::rng())
}

/// Keeps a caller-supplied number, or generates one when it is blank.
pub fn ensure_number(current: &str, prefix: &str) -> String {
    let current = current.trim();
    if current.is_empty() {
        next_number(prefix)
    } else {
        current.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_number_shape() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let number = generate_number(EMPLOYEE, now, &mut rng);

        assert!(number.starts_with("EMP1700000000123"));
        assert_eq!(number.len(), "EMP".len() + 13 + 3);
        assert!(number[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_ensure_number_keeps_existing() {
        assert_eq!(ensure_number(" TRK42 ", TRACKING), "TRK42");
        assert!(ensure_number("", TRACKING).starts_with(TRACKING));
    }
}

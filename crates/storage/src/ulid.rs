//! ULID generation and timestamp decoding.
//!
//! A ULID is a 48-bit millisecond timestamp followed by 80 random bits,
//! written as 26 Crockford base32 characters, so sorting the strings sorts
//! by creation time.

use rand::Rng;
use ulid::Ulid;

/// Generate a ULID for the current wall-clock time.
pub fn generate() -> String {
    Ulid::new().to_string()
}

/// Generate a ULID for `timestamp_ms` using randomness from `rng`.
pub fn generate_at<R: Rng + ?Sized>(timestamp_ms: u64, rng: &mut R) -> String {
    Ulid::from_parts(timestamp_ms, rng.gen::<u128>()).to_string()
}

/// Millisecond timestamp carried in the first ten characters of `ulid`.
///
/// Returns `None` if the string is not a well-formed ULID.
pub fn timestamp_ms(ulid: &str) -> Option<u64> {
    Ulid::from_string(ulid).ok().map(|u| u.timestamp_ms())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

    #[test]
    fn generated_ulid_has_26_crockford_chars() {
        let id = generate();
        assert_eq!(id.len(), 26);
        assert!(id.bytes().all(|b| CROCKFORD.contains(&b)));
        assert!(timestamp_ms(&id).is_some());
    }

    #[test]
    fn timestamp_round_trips_through_generation() {
        let mut rng = StdRng::seed_from_u64(7);
        let id = generate_at(1_700_000_000_123, &mut rng);
        assert_eq!(timestamp_ms(&id), Some(1_700_000_000_123));
    }

    #[test]
    fn later_timestamps_sort_after_earlier_ones() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = generate_at(1_000, &mut rng);
        let b = generate_at(1_001, &mut rng);
        assert!(a < b, "{a} should sort before {b}");
    }

    #[test]
    fn known_ulid_decodes() {
        assert_eq!(
            timestamp_ms("01ARZ3NDEKTSV4RRFFQ69G5FAV"),
            Some(1_469_922_850_259)
        );
    }

    #[test]
    fn malformed_ulids_are_rejected() {
        assert_eq!(timestamp_ms(""), None);
        assert_eq!(timestamp_ms("01ARZ3NDEK"), None);
        // 'U' is not in the Crockford alphabet.
        assert_eq!(timestamp_ms("01ARZ3NDEKTSV4RRFFQ69G5FAU"), None);
    }
}

//! Notice identifiers: `NOTICE-<timestamp>-<random>`.
//!
//! The timestamp is milliseconds since the Unix epoch in base 36, the random
//! part is five base-36 characters, and the whole id is upper-cased. The id is
//! also the notice's file name, so this shape must stay stable for existing
//! notices to keep resolving.

use chrono::Utc;
use rand::Rng;

pub const PREFIX: &str = "NOTICE";
pub const RANDOM_LEN: usize = 5;

const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn generate() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    generate_with(millis, &mut rand::thread_rng())
}

pub fn generate_with<R: Rng>(millis: u64, rng: &mut R) -> String {
    let random: String = (0..RANDOM_LEN)
        .map(|_| DIGITS[rng.gen_range(0..DIGITS.len())] as char)
        .collect();
    format!("{}-{}-{}", PREFIX, to_base36(millis), random)
}

pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// True when `s` has the `NOTICE-[0-9A-Z]+-[0-9A-Z]{5}` shape.
pub fn is_notice_id(s: &str) -> bool {
    let mut parts = s.splitn(3, '-');
    let (Some(prefix), Some(stamp), Some(random)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let base36 = |p: &str| p.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
    prefix == PREFIX
        && !stamp.is_empty()
        && base36(stamp)
        && random.len() == RANDOM_LEN
        && base36(random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn base36_rendering() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        // 2024-01-01T00:00:00Z
        assert_eq!(to_base36(1_704_067_200_000), "LQU5M2O0");
    }

    #[test]
    fn generated_ids_have_the_notice_shape() {
        for _ in 0..200 {
            let id = generate();
            assert!(is_notice_id(&id), "bad id: {}", id);
            assert_eq!(id, id.to_uppercase());
        }
    }

    #[test]
    fn same_millisecond_still_differs() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = generate_with(1_704_067_200_000, &mut rng);
        let b = generate_with(1_704_067_200_000, &mut rng);
        assert_ne!(a, b);
        assert!(a.starts_with("NOTICE-LQU5M2O0-"));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!(!is_notice_id("NOTICE-ABC-1234"));
        assert!(!is_notice_id("NOTICE--12345"));
        assert!(!is_notice_id("notice-abc-12345"));
        assert!(!is_notice_id("NOTE-ABC-12345"));
        assert!(!is_notice_id("NOTICE-ABC-12345-X"));
    }
}

//! Room codes and reconnect pacing.

use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::{debug, instrument};

/// Length of a room code.
pub const ROOM_CODE_LEN: usize = 5;

/// Characters used when generating codes; look-alikes (I, O, 0, 1) are left out.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a fresh room code.
#[instrument(skip(rng))]
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let code: String = (0..ROOM_CODE_LEN)
        .filter_map(|_| ROOM_CODE_ALPHABET.choose(rng).map(|b| *b as char))
        .collect();
    debug!(%code, "Generated room code");
    code
}

/// Returns true for five ASCII letters or digits, in either case.
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Trims and upper-cases a typed code, rejecting anything invalid.
pub fn normalize_room_code(code: &str) -> Option<String> {
    let code = code.trim();
    is_valid_room_code(code).then(|| code.to_ascii_uppercase())
}

/// Bounded exponential backoff: `base * 2^(attempt - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max_attempts: u32,
}

impl Backoff {
    /// Creates a backoff policy.
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self { base, max_attempts }
    }

    /// Number of attempts before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the one-based `attempt`, or `None` once attempts run out.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1)?;
        self.base.checked_mul(factor)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000), 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_generated_codes_use_the_alphabet() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..200 {
            let code = generate_room_code(&mut rng);
            assert_eq!(code.len(), ROOM_CODE_LEN);
            assert!(code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
            assert!(is_valid_room_code(&code));
        }
    }

    #[test]
    fn test_validation() {
        assert!(is_valid_room_code("AB3D9"));
        assert!(is_valid_room_code("ab3d9"));
        assert!(!is_valid_room_code("AB3D"));
        assert!(!is_valid_room_code("AB3D9X"));
        assert!(!is_valid_room_code("AB-D9"));
        assert!(!is_valid_room_code("ÄB3D9"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_room_code("  xk7pq\n"), Some("XK7PQ".to_string()));
        assert_eq!(normalize_room_code("xk7"), None);
    }

    #[test]
    fn test_backoff_doubles_then_stops() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(0), None);
        assert_eq!(backoff.delay(1), Some(Duration::from_secs(2)));
        assert_eq!(backoff.delay(2), Some(Duration::from_secs(4)));
        assert_eq!(backoff.delay(3), Some(Duration::from_secs(8)));
        assert_eq!(backoff.delay(4), None);
    }
}

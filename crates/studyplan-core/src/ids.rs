//! Task id minting.
//!
//! Ids follow the persisted wire format `task_<epochMs>_<9-char base36>`,
//! e.g. `task_1741957200000_k3f9x0q2m`. The epoch-millisecond component makes
//! ids roughly sortable by creation time; the random base36 suffix
//! disambiguates ids minted within the same millisecond.

use rand::Rng;

/// Length of the random base36 suffix.
const SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Mint a fresh task id: `task_<epochMs>_<9-char base36 random>`.
#[must_use]
pub fn mint_task_id() -> String {
    mint_task_id_at(chrono::Utc::now().timestamp_millis())
}

/// Mint a task id with an explicit epoch-millisecond component.
///
/// Exposed so import collision handling and tests can control the
/// timestamp half while keeping the random suffix.
#[must_use]
pub fn mint_task_id_at(epoch_ms: i64) -> String {
    let mut rng = rand::rng();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        let idx = rng.random_range(0..BASE36.len());
        suffix.push(BASE36[idx] as char);
    }
    format!("task_{epoch_ms}_{suffix}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn minted_id_matches_wire_format() {
        let re = Regex::new(r"^task_\d+_[a-z0-9]{9}$").unwrap();
        let id = mint_task_id();
        assert!(re.is_match(&id), "unexpected id shape: {id}");
    }

    #[test]
    fn explicit_timestamp_is_embedded() {
        let id = mint_task_id_at(1_741_957_200_000);
        assert!(id.starts_with("task_1741957200000_"));
    }

    #[test]
    fn consecutive_ids_differ() {
        // Same millisecond is likely here; the suffix must still disambiguate.
        let a = mint_task_id_at(42);
        let b = mint_task_id_at(42);
        assert_ne!(a, b);
    }

    #[test]
    fn suffix_alphabet_is_lowercase_base36() {
        let id = mint_task_id_at(0);
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    proptest::proptest! {
        #[test]
        fn any_timestamp_yields_wire_format(epoch_ms in 0i64..=4_102_444_800_000) {
            let re = Regex::new(r"^task_\d+_[a-z0-9]{9}$").unwrap();
            proptest::prop_assert!(re.is_match(&mint_task_id_at(epoch_ms)));
        }
    }
}

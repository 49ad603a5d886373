use std::{
    sync::{
        OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Returns a process-unique, monotonically increasing identifier.
///
/// This avoids collisions that can happen with "timestamp only" IDs when multiple IDs are
/// generated in the same instant.
pub fn rand_id() -> u64 {
    static COUNTER: OnceLock<AtomicU64> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU64::new(now_nanos()));
    counter.fetch_add(1, Ordering::Relaxed)
}

// SplitMix64 finalizer; enough mixing to decorrelate sequential ids.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Draw a map seed uniformly from `[0, span)`.
pub fn rand_seed(span: f64) -> f64 {
    let bits = splitmix64(rand_id());
    // The top 53 bits fill an f64 mantissa exactly, giving a uniform
    // value in [0, 1).
    let unit = (bits >> 11) as f64 / (1u64 << 53) as f64;
    unit * span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = rand_id();
        let b = rand_id();
        assert!(b > a);
    }

    #[test]
    fn seeds_stay_in_span() {
        for _ in 0..1000 {
            let seed = rand_seed(1e9);
            assert!((0.0..1e9).contains(&seed));
        }
    }

    #[test]
    fn consecutive_seeds_differ() {
        assert_ne!(rand_seed(1e9), rand_seed(1e9));
    }
}

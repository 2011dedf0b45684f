//! Property-based tests for backoff delays.

use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::policy::RetryPolicy;

fn policy_strategy() -> impl Strategy<Value = RetryPolicy> {
    (1u32..10, 0u64..5_000, 0u64..120_000, 1u32..5).prop_map(
        |(max_attempts, base_ms, max_ms, multiplier)| {
            RetryPolicy::new(
                max_attempts,
                Duration::from_millis(base_ms),
                Duration::from_millis(max_ms),
                multiplier,
            )
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A jittered delay never exceeds the cap plus ten percent.
    #[test]
    fn prop_delay_bounded_by_cap(
        policy in policy_strategy(),
        attempt in 1u32..64,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let delay = policy.delay_with_jitter(attempt, &mut rng);
        let ceiling = policy.max_delay + policy.max_delay / 10;
        prop_assert!(delay <= ceiling, "{delay:?} exceeds {ceiling:?}");
    }

    /// The pre-jitter delay never shrinks as attempts grow.
    #[test]
    fn prop_delay_non_decreasing(policy in policy_strategy(), attempt in 1u32..63) {
        prop_assert!(policy.backoff_delay(attempt) <= policy.backoff_delay(attempt + 1));
    }

    /// Jitter only ever adds to the computed delay.
    #[test]
    fn prop_jitter_never_subtracts(
        policy in policy_strategy(),
        attempt in 1u32..64,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert!(policy.delay_with_jitter(attempt, &mut rng) >= policy.backoff_delay(attempt));
    }
}

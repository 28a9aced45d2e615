use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chainbeacon_types::Round;

/// `current_round = ((now - genesis_time) / period) + 1` (spec §4.4.1).
/// Returns the genesis sentinel if `now` precedes genesis. Period math is
/// done in milliseconds so sub-second periods (which `ChainInfo` permits)
/// don't truncate to zero and divide by zero.
pub fn current_round(genesis_time: u64, period: Duration, now: SystemTime) -> Round {
    let now_ms = now.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
    let genesis_ms = genesis_time.saturating_mul(1000);
    let period_ms = period.as_millis() as u64;
    if now_ms < genesis_ms || period_ms == 0 {
        return Round::GENESIS_SENTINEL;
    }
    let elapsed_ms = now_ms - genesis_ms;
    Round(elapsed_ms / period_ms + 1)
}

/// Wall-clock deadline `t_r = genesis_time + (r-1) * period` at which round
/// `r` is due (spec §4.4.1).
pub fn round_deadline(genesis_time: u64, period: Duration, round: Round) -> SystemTime {
    let period_ms = period.as_millis() as u64;
    let offset_ms = period_ms.saturating_mul(round.0.saturating_sub(1));
    let genesis_ms = genesis_time.saturating_mul(1000);
    UNIX_EPOCH + Duration::from_millis(genesis_ms.saturating_add(offset_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_round_at_exact_boundary() {
        let genesis = 1_000;
        let period = Duration::from_secs(30);
        let now = UNIX_EPOCH + Duration::from_secs(1_000 + 60);
        assert_eq!(current_round(genesis, period, now), Round(3));
    }

    #[test]
    fn before_genesis_is_sentinel() {
        let now = UNIX_EPOCH + Duration::from_secs(10);
        assert_eq!(current_round(1_000, Duration::from_secs(30), now), Round::GENESIS_SENTINEL);
    }

    #[test]
    fn deadline_round_trips_with_current_round() {
        let genesis = 1_000;
        let period = Duration::from_secs(30);
        let r = Round(5);
        let deadline = round_deadline(genesis, period, r);
        assert_eq!(current_round(genesis, period, deadline), r);
    }

    #[test]
    fn sub_second_period_does_not_panic() {
        let genesis = 1_000;
        let period = Duration::from_millis(500);
        let now = UNIX_EPOCH + Duration::from_millis(1_000 * 1_000 + 1_250);
        assert_eq!(current_round(genesis, period, now), Round(3));
    }
}

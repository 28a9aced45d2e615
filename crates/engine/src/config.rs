use std::time::Duration;

/// Ambient tunables for the round protocol (spec §4.4.2/§4.4.3 name the
/// defaults below; `EngineConfig` itself is supplemented so they're not
/// hardcoded constants).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// How long a round's partial-collection window stays open.
    pub round_window: Duration,
    /// How many rounds ahead of `current_round + 1` a partial may be
    /// buffered before it is discarded outright.
    pub max_future: u64,
    /// How many distinct peers catch-up will try before giving up on a
    /// single missing round.
    pub catch_up_retries: u32,
}

impl EngineConfig {
    /// `round_window = 2 * period`, per spec §4.4.2 step 4.
    pub fn for_period(period: Duration) -> Self {
        EngineConfig {
            round_window: period * 2,
            max_future: 1,
            catch_up_retries: 3,
        }
    }
}

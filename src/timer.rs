// src/timer.rs

use serde::{Deserialize, Serialize};

use crate::types::{amount_str, Amount, Timestamp};

/// Cooldown-gated keeper reward.
///
/// The window opens when the timer is started (curve creation) and after
/// every paid incentive. Allocation never waits on it; it only decides
/// whether the caller is rewarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveTimer {
    pub last_paid_at: Timestamp,
    #[serde(with = "amount_str")]
    pub incentive_amount: Amount,
    pub duration: u64,
}

impl IncentiveTimer {
    pub fn start(now: Timestamp, incentive_amount: Amount, duration: u64) -> Self {
        Self {
            last_paid_at: now,
            incentive_amount,
            duration,
        }
    }

    #[inline]
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.last_paid_at)
    }

    #[inline]
    pub fn is_time_ended(&self, now: Timestamp) -> bool {
        self.elapsed(now) >= self.duration
    }

    pub fn remaining_time(&self, now: Timestamp) -> u64 {
        self.duration.saturating_sub(self.elapsed(now))
    }

    pub(crate) fn restart(&mut self, now: Timestamp) {
        self.last_paid_at = now;
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::CodecCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

/// Immutable view of one stream's counters and timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: CodecCounters,
    pub label_ratio: f64,
    pub rows_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &CodecCounters, timer: &TelemetryTimer) -> Self {
        let elapsed = timer.elapsed();
        let rows = counters.rows_encoded + counters.rows_decoded;

        let rows_per_sec = if elapsed.as_secs_f64() > 0.0 {
            rows as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            label_ratio: counters.label_ratio(),
            rows_per_sec,
            elapsed,
            stage_times: timer.stages().clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Internal consistency: ratios bounded, stage time within elapsed.
    pub fn sanity_check(&self) -> bool {
        (0.0..=1.0).contains(&self.label_ratio) && self.total_stage_time() <= self.elapsed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

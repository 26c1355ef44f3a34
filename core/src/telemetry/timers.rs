//! Stage timers for the read and write paths.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Splitting a table into row-bounded chunks.
    Chunk,
    Encode,
    Decode,
    /// Pulling one message off the inbound byte stream.
    Read,
    /// Copying encoded bytes into the outbound sink.
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Chunk  => "chunk",
            Stage::Encode => "encode",
            Stage::Decode => "decode",
            Stage::Read   => "read",
            Stage::Write  => "write",
        };
        f.write_str(name)
    }
}

/// Wall time charged to each stage, keyed in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageTimes(BTreeMap<Stage, Duration>);

impl StageTimes {
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        *self.0.entry(stage).or_default() += dur;
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.0.get(&stage).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.0.values().sum()
    }

    /// True when every listed stage was charged.
    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|s| self.0.contains_key(s))
    }
}

/// Stream lifetime plus per-stage accounting for one reader or encoder.
#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    started: Instant,
    finished: Option<Instant>,
    stages: StageTimes,
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            finished: None,
            stages: StageTimes::default(),
        }
    }

    /// Freeze `elapsed`; later calls keep the first end time.
    pub fn finish(&mut self) {
        self.finished.get_or_insert_with(Instant::now);
    }

    pub fn record(&mut self, stage: Stage, dur: Duration) {
        self.stages.add(stage, dur);
    }

    /// Run `f`, charging its wall time to `stage`.
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let t = Instant::now();
        let out = f();
        self.record(stage, t.elapsed());
        out
    }

    pub fn stages(&self) -> &StageTimes {
        &self.stages
    }

    pub fn elapsed(&self) -> Duration {
        match self.finished {
            Some(end) => end.duration_since(self.started),
            None => self.started.elapsed(),
        }
    }
}

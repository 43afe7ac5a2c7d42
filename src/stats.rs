use serde::{Deserialize, Serialize};

/// Weight of the previous average when folding in a new sample.
const SMOOTHING: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Counter {
    pub raw: u64,
    pub accumulated: f64,
}

impl Counter {
    #[inline]
    pub fn inc(&mut self) {
        self.raw += 1;
    }

    fn update(&mut self) {
        self.accumulated = SMOOTHING * self.accumulated + (1.0 - SMOOTHING) * self.raw as f64;
        self.raw = 0;
    }
}

/// Accesses performed by the CPU since the last `update`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryStats {
    pub chip_reads: Counter,
    pub chip_writes: Counter,
    pub slow_reads: Counter,
    pub slow_writes: Counter,
    pub fast_reads: Counter,
    pub fast_writes: Counter,
    pub kick_reads: Counter,
    pub kick_writes: Counter,
    pub unmapped_reads: Counter,
    pub unmapped_writes: Counter,
    pub bus_waits: Counter,
}

impl MemoryStats {
    pub fn clear(&mut self) {
        *self = MemoryStats::default();
    }

    pub fn update(&mut self) {
        for counter in self.counters_mut() {
            counter.update();
        }
    }

    fn counters_mut(&mut self) -> [&mut Counter; 11] {
        [
            &mut self.chip_reads,
            &mut self.chip_writes,
            &mut self.slow_reads,
            &mut self.slow_writes,
            &mut self.fast_reads,
            &mut self.fast_writes,
            &mut self.kick_reads,
            &mut self.kick_writes,
            &mut self.unmapped_reads,
            &mut self.unmapped_writes,
            &mut self.bus_waits,
        ]
    }
}

//! Scripted collaborators for tracker and controller tests.

use super::connections::ConnectionSource;
use super::counters::CounterSource;
use super::types::NetCounters;
use crate::error_handling::types::InspectionError;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Hands out a fixed sequence of readings, then repeats the last one.
pub struct ScriptedCounters {
    readings: Mutex<VecDeque<Result<NetCounters, InspectionError>>>,
    last: Mutex<Result<NetCounters, InspectionError>>,
}

impl ScriptedCounters {
    pub fn new(readings: Vec<Result<NetCounters, InspectionError>>) -> Self {
        Self {
            readings: Mutex::new(readings.into()),
            last: Mutex::new(Ok(NetCounters::default())),
        }
    }

    pub fn from_pairs(pairs: &[(u64, u64)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(sent, recv)| Ok(NetCounters::new(*sent, *recv)))
                .collect(),
        )
    }
}

impl CounterSource for ScriptedCounters {
    fn counters(&self) -> Result<NetCounters, InspectionError> {
        let mut readings = self.readings.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = readings.pop_front() {
            *last = next;
        }
        last.clone()
    }
}

/// Always answers with the same connection-count outcome.
pub struct FixedConnections(pub Result<usize, InspectionError>);

impl ConnectionSource for FixedConnections {
    fn connections(&self, _pid: u32) -> Result<usize, InspectionError> {
        self.0.clone()
    }
}

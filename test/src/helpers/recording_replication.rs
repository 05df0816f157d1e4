use std::collections::HashMap;

use sightline_server::ReplicationSink;
use sightline_shared::SendPeriod;

use crate::TestEntity;

/// Replication sink which keeps every call and the resulting period of
/// every pair, and counts calls that did not change anything
#[derive(Default)]
pub struct RecordingReplication {
    calls: Vec<(TestEntity, TestEntity, SendPeriod)>,
    current: HashMap<(TestEntity, TestEntity), SendPeriod>,
    redundant_calls: usize,
}

impl RecordingReplication {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[(TestEntity, TestEntity, SendPeriod)] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<(TestEntity, TestEntity, SendPeriod)> {
        std::mem::take(&mut self.calls)
    }

    pub fn calls_for(&self, observer: &TestEntity, observable: &TestEntity) -> Vec<SendPeriod> {
        self.calls
            .iter()
            .filter(|(call_observer, call_observable, _)| {
                call_observer == observer && call_observable == observable
            })
            .map(|(_, _, period)| *period)
            .collect()
    }

    /// Period the replication layer currently holds for the pair
    pub fn period(&self, observer: &TestEntity, observable: &TestEntity) -> SendPeriod {
        self.current
            .get(&(*observer, *observable))
            .copied()
            .unwrap_or(SendPeriod::NEVER)
    }

    /// Pairs with a nonzero period involving the observer
    pub fn active_pairs_of(&self, observer: &TestEntity) -> Vec<TestEntity> {
        let mut pairs: Vec<TestEntity> = self
            .current
            .keys()
            .filter(|(pair_observer, _)| pair_observer == observer)
            .map(|(_, observable)| *observable)
            .collect();
        pairs.sort();
        pairs
    }

    pub fn active_pair_count(&self) -> usize {
        self.current.len()
    }

    pub fn redundant_calls(&self) -> usize {
        self.redundant_calls
    }
}

impl ReplicationSink<TestEntity> for RecordingReplication {
    fn set_send_period(&mut self, observer: &TestEntity, observable: &TestEntity, period: SendPeriod) {
        if self.period(observer, observable) == period {
            self.redundant_calls += 1;
        }
        self.calls.push((*observer, *observable, period));
        if period.is_never() {
            self.current.remove(&(*observer, *observable));
        } else {
            self.current.insert((*observer, *observable), period);
        }
    }
}

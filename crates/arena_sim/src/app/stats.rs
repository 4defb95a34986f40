use arena_ai::{AiStateCounts, CycleOutcome, SpawnError};

use super::arena::ShellStepReport;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimStatsSnapshot {
    pub elapsed_seconds: f64,
    pub ticks: u32,
    pub live_agents: usize,
    pub states: AiStateCounts,
    pub spawned: u32,
    pub spawn_failures: u32,
    pub at_capacity: u32,
    pub shots_fired: u64,
    pub target_hits: u32,
    pub shells_retired: u32,
}

/// Running totals over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimTotals {
    pub ticks: u64,
    pub spawned: u32,
    pub spawn_failures: u32,
    pub target_hits: u32,
}

/// Collects per-interval counters on simulated time and hands out a snapshot
/// once the interval has elapsed.
#[derive(Debug)]
pub(crate) struct StatsAccumulator {
    interval_start: f64,
    interval_seconds: f64,
    ticks: u32,
    spawned: u32,
    spawn_failures: u32,
    at_capacity: u32,
    target_hits: u32,
    shells_retired: u32,
    shots_at_interval_start: u64,
    totals: SimTotals,
}

impl StatsAccumulator {
    pub(crate) fn new(interval_seconds: f64) -> Self {
        Self {
            interval_start: 0.0,
            interval_seconds,
            ticks: 0,
            spawned: 0,
            spawn_failures: 0,
            at_capacity: 0,
            target_hits: 0,
            shells_retired: 0,
            shots_at_interval_start: 0,
            totals: SimTotals::default(),
        }
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
        self.totals.ticks = self.totals.ticks.saturating_add(1);
    }

    pub(crate) fn record_cycle(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Spawned(_) => {
                self.spawned = self.spawned.saturating_add(1);
                self.totals.spawned = self.totals.spawned.saturating_add(1);
            }
            CycleOutcome::AtCapacity => {
                self.at_capacity = self.at_capacity.saturating_add(1);
            }
            CycleOutcome::Skipped(SpawnError::NoValidPositionFound { .. })
            | CycleOutcome::Skipped(SpawnError::MissingCollaborator(_)) => {
                self.spawn_failures = self.spawn_failures.saturating_add(1);
                self.totals.spawn_failures = self.totals.spawn_failures.saturating_add(1);
            }
        }
    }

    pub(crate) fn record_shells(&mut self, report: &ShellStepReport) {
        let retired = report
            .expired
            .saturating_add(report.blocked)
            .saturating_add(report.target_hits);
        self.shells_retired = self.shells_retired.saturating_add(retired);
        self.target_hits = self.target_hits.saturating_add(report.target_hits);
        self.totals.target_hits = self.totals.target_hits.saturating_add(report.target_hits);
    }

    pub(crate) fn totals(&self) -> SimTotals {
        self.totals
    }

    /// `shots_fired_total` is the world's lifetime shot count; the snapshot
    /// reports the difference since the previous snapshot.
    pub(crate) fn maybe_snapshot(
        &mut self,
        now_seconds: f64,
        live_agents: usize,
        states: AiStateCounts,
        shots_fired_total: u64,
    ) -> Option<SimStatsSnapshot> {
        let elapsed = now_seconds - self.interval_start;
        if elapsed < self.interval_seconds {
            return None;
        }

        let snapshot = SimStatsSnapshot {
            elapsed_seconds: now_seconds,
            ticks: self.ticks,
            live_agents,
            states,
            spawned: self.spawned,
            spawn_failures: self.spawn_failures,
            at_capacity: self.at_capacity,
            shots_fired: shots_fired_total.saturating_sub(self.shots_at_interval_start),
            target_hits: self.target_hits,
            shells_retired: self.shells_retired,
        };

        self.interval_start = now_seconds;
        self.ticks = 0;
        self.spawned = 0;
        self.spawn_failures = 0;
        self.at_capacity = 0;
        self.target_hits = 0;
        self.shells_retired = 0;
        self.shots_at_interval_start = shots_fired_total;

        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use arena_ai::{AiState, EntityId};

    use super::*;

    #[test]
    fn snapshot_waits_for_interval() {
        let mut accumulator = StatsAccumulator::new(5.0);
        accumulator.record_tick();
        assert!(accumulator
            .maybe_snapshot(4.9, 0, AiStateCounts::default(), 0)
            .is_none());
        assert!(accumulator
            .maybe_snapshot(5.0, 0, AiStateCounts::default(), 0)
            .is_some());
    }

    #[test]
    fn snapshot_computes_expected_values() {
        let mut accumulator = StatsAccumulator::new(1.0);
        accumulator.record_tick();
        accumulator.record_tick();
        accumulator.record_cycle(&CycleOutcome::Spawned(EntityId(4)));
        accumulator.record_cycle(&CycleOutcome::AtCapacity);
        accumulator.record_cycle(&CycleOutcome::Skipped(
            SpawnError::NoValidPositionFound { attempts: 50 },
        ));
        accumulator.record_shells(&ShellStepReport {
            expired: 1,
            blocked: 0,
            target_hits: 2,
        });
        let mut states = AiStateCounts::default();
        states.record(AiState::Chasing);

        let snapshot = accumulator
            .maybe_snapshot(1.0, 1, states, 7)
            .expect("snapshot should be emitted");
        assert_eq!(snapshot.ticks, 2);
        assert_eq!(snapshot.live_agents, 1);
        assert_eq!(snapshot.states.chasing, 1);
        assert_eq!(snapshot.spawned, 1);
        assert_eq!(snapshot.at_capacity, 1);
        assert_eq!(snapshot.spawn_failures, 1);
        assert_eq!(snapshot.shots_fired, 7);
        assert_eq!(snapshot.target_hits, 2);
        assert_eq!(snapshot.shells_retired, 3);
    }

    #[test]
    fn snapshot_resets_interval_counters_but_not_totals() {
        let mut accumulator = StatsAccumulator::new(1.0);
        accumulator.record_tick();
        accumulator.record_cycle(&CycleOutcome::Spawned(EntityId(1)));
        accumulator
            .maybe_snapshot(1.0, 1, AiStateCounts::default(), 3)
            .expect("first snapshot");

        accumulator.record_tick();
        let second = accumulator
            .maybe_snapshot(2.0, 1, AiStateCounts::default(), 5)
            .expect("second snapshot");
        assert_eq!(second.ticks, 1);
        assert_eq!(second.spawned, 0);
        assert_eq!(second.shots_fired, 2);

        let totals = accumulator.totals();
        assert_eq!(totals.ticks, 2);
        assert_eq!(totals.spawned, 1);
    }
}

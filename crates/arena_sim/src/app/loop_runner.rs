use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use arena_ai::{ConfigError, SpawnDirector};
use thiserror::Error;
use tracing::{error, info};

use super::arena::ArenaWorld;
use super::bootstrap::AppWiring;
use super::digest::replay_digest;
use super::scenario::Scenario;
use super::stats::{SimStatsSnapshot, SimTotals, StatsAccumulator};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to read scenario '{path}': {source}")]
    ReadScenario {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse scenario at {at}: {source}")]
    ParseScenario {
        at: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid scenario: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("invalid scenario: {field} {reason}")]
    InvalidScenario {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSummary {
    pub totals: SimTotals,
    pub live_agents: usize,
    pub shots_fired: u64,
    pub digest: String,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match run_simulation(&app.scenario) {
        Ok(summary) => {
            println!("{}", summary.digest);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "simulation_failed");
            ExitCode::FAILURE
        }
    }
}

/// Runs the scenario on a fixed step until its duration has elapsed. Each
/// tick runs the director first, then every controller, then the shells.
pub fn run_simulation(scenario: &Scenario) -> Result<SimSummary, SimError> {
    scenario.validate()?;

    let mut world = ArenaWorld::from_scenario(scenario);
    let mut director = SpawnDirector::new(scenario.director.clone())?;
    let ticks_per_second = scenario.ticks_per_second.max(1);
    let fixed_dt_seconds = 1.0 / ticks_per_second as f32;
    let total_ticks = total_ticks(scenario.duration_seconds, ticks_per_second);
    let mut stats = StatsAccumulator::new(f64::from(scenario.stats_interval_seconds));

    info!(
        ticks_per_second,
        total_ticks,
        max_agents = scenario.director.max_agents,
        spawn_interval_seconds = scenario.director.spawn_interval_seconds,
        seed = scenario.director.seed,
        targets = scenario.targets.len(),
        obstacles = scenario.obstacles.len(),
        "simulation_started"
    );

    for _ in 0..total_ticks {
        if let Some(outcome) = director.advance(fixed_dt_seconds, &mut world) {
            stats.record_cycle(&outcome);
        }
        world.tick_agents(fixed_dt_seconds);
        let shell_report = world.advance_shells(fixed_dt_seconds);
        stats.record_shells(&shell_report);
        stats.record_tick();

        if let Some(snapshot) = stats.maybe_snapshot(
            director.elapsed_seconds(),
            director.live_agent_count(&world),
            world.state_counts(),
            world.shells_fired(),
        ) {
            log_snapshot(&snapshot);
        }
    }

    let summary = SimSummary {
        totals: stats.totals(),
        live_agents: director.live_agent_count(&world),
        shots_fired: world.shells_fired(),
        digest: replay_digest(&world),
    };
    info!(
        ticks = summary.totals.ticks,
        spawned = summary.totals.spawned,
        spawn_failures = summary.totals.spawn_failures,
        target_hits = summary.totals.target_hits,
        live_agents = summary.live_agents,
        shots_fired = summary.shots_fired,
        fire_cues = world.fire_cues(),
        agents_in_world = world.agent_count(),
        digest = summary.digest.as_str(),
        "simulation_finished"
    );
    director.clear_all(&mut world);
    Ok(summary)
}

fn total_ticks(duration_seconds: f32, ticks_per_second: u32) -> u64 {
    let ticks = (f64::from(duration_seconds) * f64::from(ticks_per_second)).round();
    if ticks.is_finite() && ticks > 0.0 {
        ticks as u64
    } else {
        0
    }
}

fn log_snapshot(snapshot: &SimStatsSnapshot) {
    info!(
        elapsed_seconds = snapshot.elapsed_seconds,
        ticks = snapshot.ticks,
        live_agents = snapshot.live_agents,
        patrolling = snapshot.states.patrolling,
        chasing = snapshot.states.chasing,
        attacking = snapshot.states.attacking,
        spawned = snapshot.spawned,
        spawn_failures = snapshot.spawn_failures,
        at_capacity = snapshot.at_capacity,
        shots_fired = snapshot.shots_fired,
        target_hits = snapshot.target_hits,
        shells_retired = snapshot.shells_retired,
        "sim_stats"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_scenario(seed: u64, duration_seconds: f32) -> Scenario {
        let mut scenario = Scenario {
            duration_seconds,
            ..Scenario::default()
        };
        scenario.director.seed = Some(seed);
        scenario
    }

    #[test]
    fn total_ticks_rounds_duration() {
        assert_eq!(total_ticks(1.0, 60), 60);
        assert_eq!(total_ticks(0.51, 2), 1);
        assert_eq!(total_ticks(0.0, 60), 0);
        assert_eq!(total_ticks(f32::INFINITY, 60), 0);
    }

    #[test]
    fn spawns_on_the_director_interval() {
        let summary = run_simulation(&short_scenario(3, 35.0)).expect("run");
        assert_eq!(summary.totals.ticks, 2_100);
        assert!(summary.totals.spawned >= 1 && summary.totals.spawned <= 3);
        assert_eq!(
            summary.totals.spawned + summary.totals.spawn_failures,
            3,
            "one cycle at each of 10 s, 20 s and 30 s"
        );
        assert_eq!(summary.live_agents, summary.totals.spawned as usize);
    }

    #[test]
    fn no_cycle_before_first_interval() {
        let summary = run_simulation(&short_scenario(3, 9.5)).expect("run");
        assert_eq!(summary.totals.spawned, 0);
        assert_eq!(summary.live_agents, 0);
        assert_eq!(summary.shots_fired, 0);
    }

    #[test]
    fn same_seed_same_digest() {
        let first = run_simulation(&short_scenario(11, 45.0)).expect("first run");
        let second = run_simulation(&short_scenario(11, 45.0)).expect("second run");
        assert_eq!(first, second);
    }

    #[test]
    fn different_seed_different_digest() {
        let first = run_simulation(&short_scenario(11, 25.0)).expect("first run");
        let second = run_simulation(&short_scenario(12, 25.0)).expect("second run");
        assert!(first.totals.spawned > 0 && second.totals.spawned > 0);
        assert_ne!(first.digest, second.digest);
    }

    #[test]
    fn roster_cap_holds_over_a_long_run() {
        let mut scenario = short_scenario(5, 20.0);
        scenario.director.max_agents = 2;
        scenario.director.spawn_interval_seconds = 1.0;
        let summary = run_simulation(&scenario).expect("run");
        assert_eq!(summary.totals.spawned, 2);
        assert_eq!(summary.live_agents, 2);
    }

    #[test]
    fn agents_engage_a_nearby_target() {
        let mut scenario = short_scenario(8, 40.0);
        scenario.director.spawn_interval_seconds = 1.0;
        scenario.director.placement.min_player_distance = 0.0;
        scenario.director.arena.half_extent_x = 6.0;
        scenario.director.arena.half_extent_z = 6.0;
        scenario.director.max_agents = 1;
        scenario.obstacles.clear();
        let summary = run_simulation(&scenario).expect("run");
        assert_eq!(summary.totals.spawned, 1);
        assert!(summary.shots_fired > 0);
    }

    #[test]
    fn invalid_scenario_is_rejected_before_running() {
        let mut scenario = Scenario::default();
        scenario.director.jitter.fire_rate = 1.5;
        assert!(matches!(
            run_simulation(&scenario),
            Err(SimError::InvalidConfig(ConfigError::JitterOutOfRange { .. }))
        ));
    }
}

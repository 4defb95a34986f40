use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::loop_runner::SimError;
use super::scenario::{load_scenario, Scenario};

pub const SCENARIO_ENV_VAR: &str = "ARENA_SIM_SCENARIO";

pub(crate) struct AppWiring {
    pub(crate) scenario: Scenario,
}

pub(crate) fn build_app() -> Result<AppWiring, SimError> {
    init_tracing();
    info!("=== Arena Sim Startup ===");

    let scenario = match pick_scenario_path(env::args_os().nth(1), read_scenario_env_var()) {
        Some(path) => {
            info!(path = %path.display(), "loading_scenario");
            load_scenario(&path)?
        }
        None => {
            info!("using_builtin_scenario");
            Scenario::default()
        }
    };

    Ok(AppWiring { scenario })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// The first CLI argument wins over the environment variable.
fn pick_scenario_path(arg: Option<OsString>, env_value: Option<String>) -> Option<PathBuf> {
    if let Some(arg) = arg.filter(|arg| !arg.is_empty()) {
        return Some(PathBuf::from(arg));
    }
    env_value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn read_scenario_env_var() -> Option<String> {
    match env::var(SCENARIO_ENV_VAR) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = SCENARIO_ENV_VAR,
                error = %err,
                "unable to read scenario env var; using built-in scenario"
            );
            None
        }
    }
}

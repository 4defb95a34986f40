pub(crate) mod arena;
pub(crate) mod bootstrap;
pub(crate) mod digest;
pub(crate) mod loop_runner;
pub(crate) mod scenario;
pub(crate) mod stats;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;

//! Log filter flags and subscriber installation.

use std::env;

use clap::Args;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Crate targets whose events the default filter enables.
const OUR_CRATES: &[&str] = &[
    "farm_planner",
    "farm_planner_world",
    "farm_planner_persistence",
    "farm_planner_system_planner",
];

/// Logging controls shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct LogArgs {
    /// Set a single log level for the planner crates (error|warn|info|debug|trace)
    #[arg(long, global = true)]
    pub(crate) log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides --log-level),
    /// e.g. "farm_planner_world=debug"
    #[arg(long, global = true)]
    pub(crate) log_filter: Option<String>,
}

impl LogArgs {
    /// Installs a stderr subscriber filtered according to the flags.
    pub(crate) fn init(&self) {
        let spec = compute_spec(
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
            env::var("RUST_LOG").ok(),
        );
        let _ = registry()
            .with(EnvFilter::new(spec))
            .with(fmt::layer().without_time().with_writer(std::io::stderr))
            .try_init();
    }
}

fn level_spec_for(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    OUR_CRATES
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filter precedence: `--log-filter`, `--log-level`, `RUST_LOG`, then
/// crate-scoped `info`.
fn compute_spec(log_level: Option<&str>, log_filter: Option<&str>, env: Option<String>) -> String {
    if let Some(spec) = log_filter {
        return spec.to_owned();
    }
    if let Some(level) = log_level {
        return level_spec_for(level);
    }
    env.unwrap_or_else(|| level_spec_for("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let spec = compute_spec(Some("debug"), Some("farm_planner_world=trace"), None);
        assert_eq!(spec, "farm_planner_world=trace");
    }

    #[test]
    fn level_applies_to_every_planner_crate() {
        let spec = compute_spec(Some("DEBUG"), None, Some("warn".to_owned()));
        assert!(spec.contains("farm_planner_world=debug"));
        assert!(spec.contains("farm_planner_persistence=debug"));
        assert_eq!(spec.split(',').count(), OUR_CRATES.len());
    }

    #[test]
    fn environment_beats_default() {
        assert_eq!(compute_spec(None, None, Some("warn".to_owned())), "warn");
        assert!(compute_spec(None, None, None).starts_with("farm_planner=info"));
    }
}

use tracing_subscriber::{fmt, EnvFilter};

const WORKSPACE_TARGETS: &[&str] = &["api", "collector", "common", "normalizer"];

/// Level for everything outside the workspace (hyper, reqwest, rustls...).
const DEPENDENCY_LEVEL: &str = "warn";

/// Filter directives used when `RUST_LOG` is unset: workspace crates log at
/// `level`, dependencies only at warn.
pub fn default_directives(level: &str) -> String {
    std::iter::once(DEPENDENCY_LEVEL.to_string())
        .chain(
            WORKSPACE_TARGETS
                .iter()
                .map(|target| format!("{target}={level}")),
        )
        .collect::<Vec<_>>()
        .join(",")
}

/// Installs the stderr fmt subscriber. `RUST_LOG` replaces the default directives.
pub fn init_logging(default_level: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

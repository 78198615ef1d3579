use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "VEIL_LOG";

/// Install the global subscriber on stderr. Library crates log through `log`; the
/// subscriber picks those records up as well.
pub fn init_logging(default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))
}

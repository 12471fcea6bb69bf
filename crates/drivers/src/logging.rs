use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str =
    "image_manager=warn,image_manager_application=warn,image_manager_adapters=warn";
const VERBOSE_FILTER: &str =
    "image_manager=debug,image_manager_application=debug,image_manager_adapters=debug";

/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// overrides the built-in filter.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

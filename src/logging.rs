use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count: warnings by default, then info, debug,
/// trace for this crate.
pub fn directive_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "marketplace_e2e=warn",
        1 => "marketplace_e2e=info",
        2 => "marketplace_e2e=debug",
        _ => "marketplace_e2e=trace",
    }
}

/// Install the global subscriber. `RUST_LOG`, when set, wins over `-v`.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive_for(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

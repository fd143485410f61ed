const DEFAULT_LOG_FILTER: &str = "warn";

pub fn init(verbose: bool) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.is_empty() => filter,
        _ if verbose => "photoreel=debug".to_string(),
        _ => DEFAULT_LOG_FILTER.to_string(),
    };
    pretty_env_logger::formatted_builder()
        .parse_filters(&filter)
        .init();
    log::debug!("log filter: {filter}");
}

#[cfg(test)]
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

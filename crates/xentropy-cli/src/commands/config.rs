use xentropy_core::XEntropyConfig;

use crate::GlobalArgs;

pub fn run(args: &GlobalArgs) {
    let config = match super::build_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let report = config_json(&config);
    println!(
        "{}",
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| report.to_string())
    );

    if let Err(e) = config.validate() {
        eprintln!("\n⚠ {e}");
        std::process::exit(1);
    }
}

fn config_json(config: &XEntropyConfig) -> serde_json::Value {
    serde_json::json!({
        "api_key": config.api_key.to_string(),
        "endpoint": config.endpoint,
        "query": config.query,
        "domains": config.domains,
        "max_results": config.max_results,
        "entropy_bits": config.entropy_bits,
        "target_bytes": config.target_bytes(),
        "rate_limit_ms": config.retry.delay.as_millis() as u64,
        "max_attempts": config.retry.max_attempts,
        "deadline_secs": config.retry.deadline.map(|d| d.as_secs()),
        "request_timeout_secs": config.request_timeout.as_secs(),
    })
}

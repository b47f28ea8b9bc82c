pub mod config;
pub mod generate;
pub mod server;

use std::time::Duration;

use xentropy_core::{ApiKey, XEntropy, XEntropyConfig};

use crate::GlobalArgs;

/// Environment config with command-line overrides applied. Not validated.
pub fn build_config(args: &GlobalArgs) -> Result<XEntropyConfig, String> {
    let mut config = XEntropyConfig::from_env().map_err(|e| e.to_string())?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut XEntropyConfig, args: &GlobalArgs) {
    if let Some(ref key) = args.api_key {
        config.api_key = ApiKey::new(key.clone());
    }
    if let Some(ref endpoint) = args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(ms) = args.rate_limit_ms {
        config.retry.delay = Duration::from_millis(ms);
    }
    if let Some(secs) = args.deadline_secs {
        config.retry.deadline = (secs > 0).then(|| Duration::from_secs(secs));
    }
    if let Some(n) = args.max_attempts {
        config.retry.max_attempts = Some(n);
    }
}

/// Build a validated engine, or print the problem and exit.
pub fn make_engine(args: &GlobalArgs) -> XEntropy {
    let engine = build_config(args).and_then(|config| XEntropy::new(config).map_err(|e| e.to_string()));
    match engine {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

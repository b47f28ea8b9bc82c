use xentropy_core::{Draw, XEntropyError};

use crate::GlobalArgs;

pub fn run(args: &GlobalArgs, min: i64, max: i64, count: u64, json: bool) {
    // Fail on a bad range before building a client or touching the network.
    if min > max {
        exit_with(XEntropyError::InvalidRange { min, max });
    }

    let engine = super::make_engine(args);

    for _ in 0..count {
        match engine.generate_detailed(min, max) {
            Ok(draw) if json => println!("{}", draw_json(&draw)),
            Ok(draw) => println!("{}", draw.value),
            Err(e) => exit_with(e),
        }
    }
}

fn draw_json(draw: &Draw) -> serde_json::Value {
    serde_json::json!({
        "value": draw.value,
        "min": draw.min,
        "max": draw.max,
        "attempts": draw.attempts,
        "events": draw.events,
        "fallback_chunks": draw.fallback_chunks,
        "degraded": draw.degraded(),
    })
}

fn exit_with(e: XEntropyError) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1);
}

use crate::GlobalArgs;

pub fn run(args: &GlobalArgs, host: &str, port: u16) {
    let engine = super::make_engine(args);

    let base = format!("http://{host}:{port}");
    let delay = engine.config().retry.delay;

    println!("🎲 XEntropy Server v{}", xentropy_core::VERSION);
    println!("   {base}");
    println!("   search endpoint: {}", engine.config().endpoint);
    println!("   request spacing: {} ms", delay.as_millis());
    println!();
    println!("   Endpoints:");
    println!("     GET /                 API index (try: curl {base})");
    println!("     GET /api/v1/random    Random integer in min..=max");
    println!("     GET /health           Health check");
    println!();
    println!("   Query params for /api/v1/random:");
    println!("     min=N                 Lower bound, inclusive (default: 1)");
    println!("     max=N                 Upper bound, inclusive (default: 100)");
    println!();
    println!("   Examples:");
    println!("     curl '{base}/api/v1/random?min=1&max=6'");
    println!("     curl {base}/health");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(xentropy_server::run_server(engine, host, port)) {
        eprintln!("Error: server failed: {e}");
        std::process::exit(1);
    }
}

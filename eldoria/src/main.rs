//! Eldoria, a small turn-based RPG played over stdin/stdout.
//!
//! ```bash
//! cargo run -p eldoria
//! cargo run -p eldoria -- --load
//! ```
//!
//! Configuration comes from `ELDORIA_*` environment variables (a `.env`
//! file is honoured). Diagnostics go to stderr and are filtered with
//! `RUST_LOG`.

mod headless;

use eldoria_core::GameConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eldoria=info,eldoria_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let mut config = GameConfig::from_env();
    if let Some(seed) = arg_value(&args, "--seed").and_then(|s| s.parse().ok()) {
        config = config.with_seed(seed);
    }
    if let Some(path) = arg_value(&args, "--save-file") {
        config = config.with_save_path(path);
    }
    let load = args.iter().any(|a| a == "--load");

    headless::run_headless(config, load).await?;
    Ok(())
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_help() {
    println!("Eldoria - a turn-based RPG");
    println!();
    println!("USAGE:");
    println!("    eldoria [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --load              Continue from the save file");
    println!("    --seed <N>          Seed the random number generator");
    println!("    --save-file <PATH>  Use a different save file (default: rpg_save.json)");
    println!("    -h, --help          Print this help");
    println!();
    println!("ENVIRONMENT:");
    println!("    ELDORIA_SEED, ELDORIA_SAVE_PATH,");
    println!("    ELDORIA_ENCOUNTER_CHANCE, ELDORIA_FLEE_CHANCE");
    println!("    RUST_LOG            Log filter for diagnostics on stderr");
}

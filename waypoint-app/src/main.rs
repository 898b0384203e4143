use anyhow::Result;
use clap::Parser;
use waypoint_agent::Navigator;
use waypoint_common::observability::{init_logging, LogConfig};
use waypoint_config::WaypointConfigLoader;
use waypoint_drivers::waypoint_browser::{SessionConfig, StealthSession};
use waypoint_llm::ensure_llm_ready;

#[derive(Parser)]
#[command(name = "waypoint", about = "Plan and execute browser tasks from natural language")]
struct Args {
    /// Instruction to plan and execute
    instruction: String,

    /// Path to the configuration file
    #[arg(long, default_value = "waypoint.yaml")]
    config: std::path::PathBuf,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first (env wins), then logging.
    let mut cfg = WaypointConfigLoader::new().with_file(&args.config).load()?;
    if args.headed {
        cfg.browser.headless = false;
    }

    init_logging(LogConfig {
        emit_stderr: true,
        ..LogConfig::default()
    })?;

    let llm = ensure_llm_ready(&cfg.llm).await?;
    let session = StealthSession::new(SessionConfig::from_config(&cfg));
    let mut navigator = Navigator::new(llm, session);

    let result = navigator.run(&args.instruction).await;
    println!("{result}");

    Ok(())
}

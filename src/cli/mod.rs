use anyhow::Result;
use clap::Parser;
use dbdiff::api::{compare, CompareOptions};
use dbdiff::script::SafetyLevel;
use dbdiff::util::sanitize_url;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dbdiff")]
#[command(version)]
#[command(about = "Compare two database schemas and print the SQL that reconciles them", long_about = None)]
struct Cli {
    /// Source database (postgres://, mysql:// or json:<path>)
    #[arg(short, long, env = "DBDIFF_SOURCE")]
    source: String,

    /// Destination database (postgres://, mysql:// or json:<path>)
    #[arg(short, long, env = "DBDIFF_DESTINATION")]
    destination: String,

    /// Riskiest statements left uncommented
    #[arg(short, long, value_enum, default_value_t = SafetyLevel::Safe, env = "DBDIFF_LEVEL")]
    level: SafetyLevel,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dbdiff=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    info!("Starting comparison");
    info!("Source: {}", sanitize_url(&cli.source));
    info!("Destination: {}", sanitize_url(&cli.destination));
    info!("Level: {}", cli.level);

    let options = CompareOptions::new(cli.source, cli.destination).with_level(cli.level);
    let result = compare(options).await?;

    if !result.sql.is_empty() {
        println!("{}", result.sql);
    }

    Ok(())
}

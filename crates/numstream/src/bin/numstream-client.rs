//! numstream client: fetches a number stream and verifies its checksum.
//!
//! In test mode the stream is deliberately broken halfway and resumed on a
//! second connection.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use numstream::core::limits::{clamp_count, MAX_COUNT};
use numstream::{
    run_split_stream_with, run_standard_with, ClientId, SplitStreamParams, DEFAULT_PORT,
};

/// numstream client - fetch and verify a number stream
#[derive(Parser, Debug)]
#[command(name = "numstream-client")]
#[command(version, about, long_about = None)]
struct Args {
    /// Port of the server to connect to
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Host of the server to connect to
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Number of messages to receive; 0 picks a random count between 1 and 65535
    #[arg(long, default_value_t = 0)]
    num_messages: u32,

    /// Break the stream halfway and resume it on a second connection
    #[arg(long)]
    test_mode: bool,

    /// Client UUID (test mode only)
    #[arg(long)]
    test_uuid: Option<String>,

    /// Seed for the server's generator (test mode only)
    #[arg(long, default_value_t = 1)]
    test_seed: u32,

    /// Expected checksum of the full sequence (test mode only)
    #[arg(long)]
    test_checksum: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(args).await {
        Ok(checksum) => {
            println!("SUCCESS: checksum={checksum}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("FAILURE: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<String> {
    let addr = format!("{}:{}", args.host, args.port);
    let count = match args.num_messages {
        0 => rand::thread_rng().gen_range(1..=MAX_COUNT),
        n => clamp_count(n),
    };

    if !args.test_mode {
        let run = run_standard_with(addr.as_str(), count, |number| println!("{number}"))
            .await
            .context("error getting numbers")?;
        return Ok(run.checksum);
    }

    let client_id: ClientId = args
        .test_uuid
        .as_deref()
        .context("--test-uuid is required in test mode")?
        .parse()
        .context("unable to parse provided UUID")?;

    let mut params = SplitStreamParams::new(client_id, count, args.test_seed);
    if let Some(checksum) = args.test_checksum {
        params = params.with_expected_checksum(checksum);
    }

    let run =
        run_split_stream_with(addr.as_str(), params, |number| println!("{number}")).await?;
    Ok(run.checksum)
}

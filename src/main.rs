use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use beaches_twin::ask::{fallback_message, AskClient};
use beaches_twin::dashboard::run_dashboard;
use beaches_twin::export::{export_json, write_summary};
use beaches_twin::logging::{self, LogSink};
use beaches_twin::population::{generate, generate_par};
use beaches_twin::{ConfigError, TwinParams};

#[derive(Parser, Debug)]
#[command(name = "beaches_twin")]
#[command(about = "Synthetic population dashboard for Toronto's Beaches (FSA M4E & M4L)")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of residents (default: 250, or the config file's value)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from the small preset (25 residents, 3 sample cards)
    #[arg(long, conflicts_with = "config")]
    small: bool,

    /// Generate residents in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the statistics to stdout instead of opening the dashboard
    #[arg(long)]
    summary: bool,

    /// Export the dataset to a JSON file (e.g., "residents.json")
    #[arg(long)]
    export_json: Option<PathBuf>,

    /// Ask one question about the data and print the answer
    #[arg(long)]
    ask: Option<String>,

    /// Write logs to this file (the dashboard otherwise logs nothing)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

/// Config file or preset, then command-line overrides, then validation.
fn session_params(args: &Args) -> Result<TwinParams, ConfigError> {
    let mut params = match &args.config {
        Some(path) => TwinParams::load(path)?,
        None if args.small => TwinParams::small(),
        None => TwinParams::default(),
    };
    if let Some(count) = args.count {
        params.resident_count = count;
    }
    params.parallel |= args.parallel;
    params.ask = params.ask.with_env_key();
    params.validate()?;
    Ok(params)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let interactive = !args.summary && args.ask.is_none();
    let sink = match (&args.log_file, interactive) {
        (Some(path), _) => LogSink::File(path),
        (None, true) => LogSink::Off,
        (None, false) => LogSink::Stderr,
    };
    logging::init(sink, args.verbose).map_err(|e| e as Box<dyn Error>)?;

    let params = session_params(&args)?;

    let seed = args.seed.unwrap_or_else(|| rand::random());
    tracing::info!(
        seed,
        count = params.resident_count,
        parallel = params.parallel,
        "generating residents"
    );

    let residents = if params.parallel {
        generate_par(params.resident_count, &params.vocabulary, seed)
    } else {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate(params.resident_count, &params.vocabulary, &mut rng)
    };

    if let Some(path) = &args.export_json {
        export_json(&residents, seed, params.parallel, path)?;
        println!("Exported {} residents to {}", residents.len(), path.display());
    }

    if args.summary {
        println!("Seed: {}", seed);
        write_summary(&mut io::stdout().lock(), &residents, params.sample_size)?;
    }

    if let Some(question) = &args.ask {
        let client = AskClient::new(params.ask.clone())?;
        match client.ask(&residents, question) {
            Ok(answer) => println!("{}", answer),
            Err(e) => println!("{}", fallback_message(&e)),
        }
    }

    if interactive {
        run_dashboard(residents, seed, &params)?;
    }

    Ok(())
}

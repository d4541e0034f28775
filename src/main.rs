use clap::Parser;
use pgn_sieve::{
    CompressionMode, DEFAULT_EVAL_MARKER, DEFAULT_MAX_RATING, DEFAULT_SOURCE, ExtractConfig,
    FilterCriteria,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pgn-sieve", version)]
#[command(about = "Stream a Lichess PGN dump and extract low-rated games with engine evals")]
struct Cli {
    /// Archive URL or local path (glob patterns allowed for local files)
    #[arg(long, env = "SIEVE_SOURCE", default_value = DEFAULT_SOURCE)]
    source: String,

    /// Output PGN file, written incrementally as matches are found
    #[arg(long, short, env = "SIEVE_OUTPUT", default_value = "filtered_games.pgn")]
    output: PathBuf,

    /// Exclusive upper bound applied to both players' ratings
    #[arg(long, default_value_t = DEFAULT_MAX_RATING)]
    max_rating: u32,

    /// Keep games that carry no engine evaluation annotations
    #[arg(long)]
    no_require_eval: bool,

    /// Regex that detects an evaluation annotation in the movetext
    #[arg(long, default_value = DEFAULT_EVAL_MARKER)]
    eval_marker: String,

    /// Compression framing ('plain' or 'zstd'); inferred from the address
    /// suffix when omitted
    #[arg(long)]
    compression: Option<String>,

    /// Stop after this many matched games
    #[arg(long)]
    max_games: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let criteria = FilterCriteria::new(cli.max_rating, !cli.no_require_eval, &cli.eval_marker)
        .map_err(|e| anyhow::anyhow!("invalid --eval-marker regex: {e}"))?;
    let compression = cli
        .compression
        .as_deref()
        .map(CompressionMode::parse)
        .transpose()?;

    let config = ExtractConfig {
        source: cli.source,
        output: cli.output,
        criteria,
        compression,
        max_games: cli.max_games,
    };

    let stats = pgn_sieve::run(&config)?;
    println!("{}", stats.to_json());
    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use investor_rfm::data::aggregate::Aggregation;
use investor_rfm::{CascadeMode, DashboardState, PipelineConfig, TokenMatch};

/// Filter an investor dataset, summarise it by segment and write the
/// Segment, Investor and RFM campaign extracts.
#[derive(Debug, Parser)]
#[command(name = "investor-rfm", version, about)]
struct Cli {
    /// Investor table (.csv, .json or .parquet)
    input: PathBuf,

    /// JSON pipeline config; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preferred industry token (repeatable)
    #[arg(long = "industry")]
    industries: Vec<String>,

    /// HQ global region (repeatable)
    #[arg(long = "region")]
    regions: Vec<String>,

    /// HQ country/territory (repeatable)
    #[arg(long = "country")]
    countries: Vec<String>,

    /// HQ state/province (repeatable)
    #[arg(long = "state")]
    states: Vec<String>,

    /// First day to keep, YYYY-MM-DD (defaults to the earliest date)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last day to keep, YYYY-MM-DD (defaults to the latest date)
    #[arg(long)]
    end: Option<NaiveDate>,

    #[arg(long, value_enum)]
    token_match: Option<TokenMatch>,

    #[arg(long, value_enum)]
    cascade: Option<CascadeMode>,

    /// Directory receiving the CSV extracts
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Print the available filter options instead of exporting
    #[arg(long)]
    list_options: bool,
}

fn print_aggregation(title: &str, agg: &Aggregation) {
    println!("{title}");
    for row in &agg.rows {
        let key: Vec<String> = row.key.iter().map(|k| k.to_string()).collect();
        match row.sum {
            Some(sum) => println!("  {:<40} {:>6} {:>14.2}", key.join(" / "), row.count, sum),
            None => println!("  {:<40} {:>6}", key.join(" / "), row.count),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(mode) = cli.token_match {
        config.token_match = mode;
    }
    if let Some(mode) = cli.cascade {
        config.cascade = mode;
    }

    let mut state = DashboardState::load(&cli.input, config)?;
    state.selection.industries = cli.industries;
    state.selection.regions = cli.regions;
    state.selection.countries = cli.countries;
    state.selection.states = cli.states;
    state.selection.start = cli.start;
    state.selection.end = cli.end;

    let view = state.recompute().context("recomputing dashboard view")?;

    if cli.list_options {
        let opts = &view.outcome.options;
        for (name, values) in [
            ("Preferred Industry", &opts.industries),
            ("HQ Global Region", &opts.regions),
            ("HQ Country/Territory", &opts.countries),
            ("HQ State/Province", &opts.states),
        ] {
            let labels: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            println!("{name}: {}", labels.join(" | "));
        }
        return Ok(());
    }

    println!(
        "{} of {} investors match ({:?} to {:?})",
        view.filtered().len(),
        state.store().len(),
        view.outcome.range.start,
        view.outcome.range.end
    );
    print_aggregation("# of Investors by Segment", &view.segments);
    if let Some(investment) = &view.investment {
        print_aggregation("Last Investment Size by Segment", investment);
    }
    if !view.invalid_rfm_rows.is_empty() {
        log::warn!("RFM rows with invalid scores: {:?}", view.invalid_rfm_rows);
    }

    for path in view.export(&cli.out)? {
        println!("wrote {}", path.display());
    }
    Ok(())
}

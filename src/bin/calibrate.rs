use std::env;
use std::path::PathBuf;

use anyhow::bail;
use chrono::{Local, NaiveDate};
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use nhl_picks::backtest::{simulate, SimulationConfig};
use nhl_picks::calibration::{by_market, calibrate, DEFAULT_BINS};
use nhl_picks::config::Config;
use nhl_picks::data::SlateInput;
use nhl_picks::file::ReadJsonFile;
use nhl_picks::print::{tabulate_calibration, tabulate_summaries};
use nhl_picks::project;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// slate file to project and replay
    slate: PathBuf,

    /// configuration file
    #[clap(short = 'c', long, default_value = "config/picks.json")]
    config: PathBuf,

    /// number of simulated days
    #[clap(short = 'd', long, default_value = "60")]
    days: u32,

    /// random seed
    #[clap(short = 's', long, default_value = "7")]
    seed: u64,

    /// number of quantile buckets
    #[clap(short = 'b', long, default_value_t = DEFAULT_BINS)]
    bins: usize,

    /// last simulated date (YYYY-MM-DD); today if omitted
    #[clap(short = 'e', long)]
    end: Option<NaiveDate>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.days == 0 {
            bail!("at least one day must be simulated");
        }
        if self.bins == 0 {
            bail!("at least one bucket is required");
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let config = Config::read_json_file(&args.config)?;
    let slate = SlateInput::read_json_file(&args.slate)?;
    let projections = project::run(slate, &config)?;

    let observations = simulate(
        &projections,
        &SimulationConfig {
            days: args.days,
            seed: args.seed,
            end: args.end.unwrap_or_else(|| Local::now().date_naive()),
        },
    );
    info!("simulated {} observations over {} days", observations.len(), args.days);

    let overall = calibrate(&observations, args.bins);
    info!("all markets:\n{}", Console::default().render(&tabulate_calibration(&overall)));

    let markets = by_market(&observations, args.bins);
    for (market, calibration) in &markets {
        info!("{market}:\n{}", Console::default().render(&tabulate_calibration(calibration)));
    }

    let summaries: Vec<_> = markets
        .iter()
        .filter_map(|(market, calibration)| calibration.summary.as_ref().map(|summary| (*market, summary)))
        .collect();
    info!("summary:\n{}", Console::default().render(&tabulate_summaries(&summaries)));
    Ok(())
}

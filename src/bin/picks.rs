use std::env;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use nhl_picks::config::Config;
use nhl_picks::data::SlateInput;
use nhl_picks::file::{write_json, ReadJsonFile};
use nhl_picks::print::{tabulate_errors, tabulate_first_goal, tabulate_points, tabulate_shots, top_by};
use nhl_picks::project;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// slate file (players, lineups, team rates, goalies and opponents)
    slate: PathBuf,

    /// configuration file
    #[clap(short = 'c', long, default_value = "config/picks.json")]
    config: PathBuf,

    /// number of picks to show per market
    #[clap(short = 't', long, default_value = "10")]
    top: usize,

    /// write all projections to this JSON file
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        if self.top == 0 {
            bail!("at least one pick must be shown");
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
    info!(
        "loaded {} players, {} team rates and {} goalies",
        slate.players.len(),
        slate.team_rates.len(),
        slate.goalies.len()
    );

    let projections = project::run(slate, &config)?;

    let shots = top_by(&projections.shots, args.top, |row| row.prob_over);
    info!("shots on goal:\n{}", Console::default().render(&tabulate_shots(&shots)));

    let points = top_by(&projections.points, args.top, |row| row.prob_1p);
    info!("points:\n{}", Console::default().render(&tabulate_points(&points)));

    let first_goal = top_by(&projections.first_goal, args.top, |row| row.prob);
    info!("first goal:\n{}", Console::default().render(&tabulate_first_goal(&first_goal)));

    if !projections.errors.is_empty() {
        warn!(
            "{} records excluded:\n{}",
            projections.errors.len(),
            Console::default().render(&tabulate_errors(&projections.errors))
        );
    }

    if let Some(output) = &args.output {
        write_json(output, &projections)?;
        info!("projections written to {}", output.display());
    }
    Ok(())
}

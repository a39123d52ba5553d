//! Console tables.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::calibration::{Calibration, Summary};
use crate::error::RecordError;
use crate::market::Market;
use crate::project::first_goal::FirstGoalProjection;
use crate::project::points::PointProjection;
use crate::project::shots::ShotProjection;

/// The `top` rows with the highest `key`, in descending order.
pub fn top_by<T>(rows: &[T], top: usize, key: impl Fn(&T) -> f64) -> Vec<&T> {
    let mut sorted: Vec<_> = rows.iter().collect();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.truncate(top);
    sorted
}

fn text_col() -> Col {
    Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Left))
}

fn number_col() -> Col {
    Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right))
}

fn header(cells: &[&str]) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        cells.iter().map(|&cell| cell.into()).collect(),
    )
}

fn format_odds(odds: f64) -> String {
    if odds.is_finite() {
        format!("{odds:.2}")
    } else {
        "-".into()
    }
}

pub fn tabulate_shots(rows: &[&ShotProjection]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            text_col(),
            text_col(),
            text_col(),
            number_col(),
            number_col(),
            number_col(),
            number_col(),
        ])
        .with_row(header(&["Player", "Team", "Opp", "Mean", "Line", "P(over)", "Fair"]));
    for row in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                row.player_id.clone().into(),
                row.team.clone().into(),
                row.opponent.clone().into(),
                format!("{:.2}", row.mean).into(),
                format!("{}", row.over).into(),
                format!("{:.3}", row.prob_over).into(),
                format_odds(row.fair_odds_over).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_points(rows: &[&PointProjection]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            text_col(),
            text_col(),
            text_col(),
            number_col(),
            number_col(),
            Col::new(Styles::default().with(Separator(true)).with(MinWidth(8)).with(HAlign::Right)),
            number_col(),
            number_col(),
            number_col(),
            number_col(),
        ])
        .with_row(header(&[
            "Player", "Team", "Opp", "Goals", "Assists", "Mean", "P(1+)", "Fair", "P(2+)", "Fair",
        ]));
    for row in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                row.player_id.clone().into(),
                row.team.clone().into(),
                row.opponent.clone().into(),
                format!("{:.3}", row.mean_goals).into(),
                format!("{:.3}", row.mean_assists).into(),
                format!("{:.3}", row.mean).into(),
                format!("{:.3}", row.prob_1p).into(),
                format_odds(row.fair_odds_1p).into(),
                format!("{:.3}", row.prob_2p).into(),
                format_odds(row.fair_odds_2p).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_first_goal(rows: &[&FirstGoalProjection]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            text_col(),
            text_col(),
            text_col(),
            number_col(),
            number_col(),
            number_col(),
            number_col(),
        ])
        .with_row(header(&["Player", "Team", "Opp", "P(team)", "Share", "P(first)", "Fair"]));
    for row in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                row.player_id.clone().into(),
                row.team.clone().into(),
                row.opponent.clone().into(),
                format!("{:.3}", row.team_prob).into(),
                format!("{:.3}", row.share).into(),
                format!("{:.4}", row.prob).into(),
                format_odds(row.fair_odds).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_calibration(calibration: &Calibration) -> Table {
    let mut table = Table::default()
        .with_cols(vec![number_col(), number_col(), number_col(), number_col(), number_col()])
        .with_row(header(&["Lower", "Upper", "Mean pred", "Hit rate", "Samples"]));
    for bucket in &calibration.buckets {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{:.4}", bucket.lower).into(),
                format!("{:.4}", bucket.upper).into(),
                format!("{:.4}", bucket.mean_pred).into(),
                format!("{:.4}", bucket.hit_rate).into(),
                format!("{}", bucket.samples).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_summaries(summaries: &[(Market, &Summary)]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            text_col(),
            number_col(),
            number_col(),
            number_col(),
            number_col(),
            number_col(),
        ])
        .with_row(header(&["Market", "Samples", "Brier", "Log loss", "Hit rate", "Mean pred"]));
    for (market, summary) in summaries {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                market.to_string().into(),
                format!("{}", summary.samples).into(),
                format!("{:.4}", summary.brier).into(),
                format!("{:.4}", summary.log_loss).into(),
                format!("{:.4}", summary.hit_rate).into(),
                format!("{:.4}", summary.mean_pred).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_errors(errors: &[RecordError]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![Col::new(Styles::default().with(MinWidth(40)).with(HAlign::Left))])
        .with_row(header(&["Excluded"]));
    for error in errors {
        table.push_row(Row::new(Styles::default(), vec![error.to_string().into()]));
    }
    table
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the harvest fleet decision core.
//!
//! Each stdin line carries one JSON turn snapshot and is answered by exactly
//! one JSON orders line on stdout. Logs go to stderr so they never interleave
//! with the protocol.

mod tuning;
mod wire;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use harvest_fleet_core::TurnOrders;
use harvest_fleet_system_scheduler::TurnScheduler;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "harvest-fleet")]
#[command(about = "Decide fleet orders for each turn snapshot read from stdin")]
struct Args {
    /// Optional TOML file overriding the default tuning.
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Entry point for the harvest fleet command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let tuning = tuning::load(args.tuning.as_deref())?;
    info!(?tuning, "tuning loaded");

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(stdin.lock(), stdout.lock(), TurnScheduler::new(tuning))
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .with_context(|| format!("invalid log filter `{default_filter}`"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn run(input: impl BufRead, mut output: impl Write, mut scheduler: TurnScheduler) -> Result<()> {
    let mut last_turn = 0;

    for line in input.lines() {
        let line = line.context("failed to read snapshot line from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let orders = match decide(&mut scheduler, &line) {
            Ok(orders) => orders,
            Err(reason) => {
                let turn = wire::turn_hint(&line).unwrap_or(last_turn + 1);
                let reason = format!("{reason:#}");
                error!(turn, %reason, "answering with empty orders");
                TurnOrders::empty(turn)
            }
        };
        last_turn = orders.turn;

        let encoded = wire::encode_orders(&orders)?;
        writeln!(output, "{encoded}").context("failed to write orders to stdout")?;
        output.flush().context("failed to flush stdout")?;
    }

    info!(last_turn, "input closed");
    Ok(())
}

fn decide(scheduler: &mut TurnScheduler, line: &str) -> Result<TurnOrders> {
    let snapshot = wire::decode_snapshot(line)?;
    let orders = scheduler
        .run_turn(&snapshot)
        .with_context(|| format!("rejected snapshot for turn {}", snapshot.turn))?;
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harvest_fleet_core::Tuning;

    fn run_lines(lines: &str) -> Vec<String> {
        let mut output = Vec::new();
        run(
            lines.as_bytes(),
            &mut output,
            TurnScheduler::new(Tuning::default()),
        )
        .expect("run succeeds");
        String::from_utf8(output)
            .expect("utf8 output")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn every_snapshot_line_gets_one_orders_line() {
        let snapshot = r#"{"turn":1,"total_turns":400,"funds":1000,"production_cost":1000,"max_cargo":1000,"home_base":{"column":0,"row":0},"columns":3,"rows":3,"resources":[0,0,0,0,0,0,0,0,0],"units":[]}"#;
        let input = format!("{snapshot}\n\n{snapshot}\n");

        let lines = run_lines(&input);

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"turn":1,"commands":[{"kind":"produce_unit"}]}"#
        );
    }

    #[test]
    fn bad_lines_are_answered_with_empty_orders() {
        let out_of_bounds = r#"{"turn":4,"total_turns":400,"funds":0,"production_cost":1000,"max_cargo":1000,"home_base":{"column":7,"row":0},"columns":3,"rows":3,"resources":[0,0,0,0,0,0,0,0,0],"units":[]}"#;
        let input = format!("{out_of_bounds}\ngarbage\n");

        let lines = run_lines(&input);

        assert_eq!(
            lines,
            vec![
                r#"{"turn":4,"commands":[]}"#.to_owned(),
                r#"{"turn":5,"commands":[]}"#.to_owned(),
            ]
        );
    }
}

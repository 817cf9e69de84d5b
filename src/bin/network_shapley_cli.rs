//! Command-line front end: reads the three CSV tables, runs the pipeline,
//! and prints the resulting Shapley values as a table (or JSON with
//! `--json`).

use clap::Parser;
use network_shapley::{DemandMatrix, NetworkShapleyBuilder, PrivateLinks, PublicLinks};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::process::ExitCode;
use tabled::{Table, settings::Style};

#[derive(Debug, Parser)]
#[command(name = "network-shapley-cli", about = "Attribute network value to operators via Shapley values")]
struct Args {
    /// CSV of privately-owned links
    #[arg(long)]
    private_links: PathBuf,

    /// CSV of public (shared underlay) links
    #[arg(long)]
    public_links: PathBuf,

    /// CSV of traffic demand between cities
    #[arg(long)]
    demand: PathBuf,

    /// Assumed per-operator uptime, in [0, 1]
    #[arg(long, default_value = "1.0")]
    operator_uptime: Decimal,

    /// Extra cost multiplier applied to public links when mixed with private ones
    #[arg(long, default_value = "5.0")]
    hybrid_penalty: Decimal,

    /// Scales every demand row's traffic before solving
    #[arg(long, default_value = "1.0")]
    demand_multiplier: Decimal,

    /// Print results as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let private_links = match PrivateLinks::from_csv(&args.private_links) {
        Ok(links) => links,
        Err(e) => {
            eprintln!("failed to read {}: {e}", args.private_links.display());
            return ExitCode::FAILURE;
        }
    };
    let public_links = match PublicLinks::from_csv(&args.public_links) {
        Ok(links) => links,
        Err(e) => {
            eprintln!("failed to read {}: {e}", args.public_links.display());
            return ExitCode::FAILURE;
        }
    };
    let demand = match DemandMatrix::from_csv(&args.demand) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("failed to read {}: {e}", args.demand.display());
            return ExitCode::FAILURE;
        }
    };

    let engine = match NetworkShapleyBuilder::new(private_links, public_links, demand)
        .operator_uptime(args.operator_uptime.max(dec!(0)))
        .hybrid_penalty(args.hybrid_penalty)
        .demand_multiplier(args.demand_multiplier)
        .build()
    {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match engine.compute() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("computation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to serialize result: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        let table = Table::new(result)
            .with(Style::psql().remove_horizontals())
            .to_string();
        println!("{table}");
    }

    ExitCode::SUCCESS
}

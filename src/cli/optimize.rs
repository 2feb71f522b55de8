use std::{fs::File, path::PathBuf};

use clap::Parser;
use serde::Serialize;

use crate::{
    cli::InputArgs,
    core::{
        optimizer::{Optimum, StrategyName},
        runner::{Finish, Outcome, RaceRunner},
    },
    prelude::*,
    tables::build_days_table,
};

#[derive(Parser)]
pub struct OptimizeArgs {
    #[clap(flatten)]
    pub inputs: InputArgs,

    /// Search strategy, overrides the race file.
    #[clap(long, env = "SUNRACER_STRATEGY")]
    pub strategy: Option<StrategyName>,

    /// Write the result as JSON to this file.
    #[clap(long)]
    pub report: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    strategy: StrategyName,
    optimum: Optimum,
    finish: &'a Finish,
}

#[instrument(skip_all)]
pub fn optimize(args: &OptimizeArgs) -> Result {
    let inputs = args.inputs.load()?;
    let strategy = args.strategy.unwrap_or(inputs.config.optimizer.strategy);
    let runner = RaceRunner::builder()
        .vehicle(&inputs.config.vehicle)
        .route(&inputs.route)
        .weather(&inputs.weather)
        .schedule(&inputs.config.days)
        .build();

    let optimum = strategy
        .into_optimizer(inputs.config.optimizer.domain)
        .optimize(&runner)?
        .context("no feasible speed found, try lowering the minimum speed")?;
    info!(
        %strategy,
        speed = %optimum.speed,
        kmh = optimum.speed.as_kilometres_per_hour(),
        race_time = %optimum.race_time,
        "optimized",
    );

    // Replay the best speed for the daily breakdown:
    let Outcome::Finished(finish) = runner.run(optimum.speed)? else {
        bail!("the optimum at {} did not finish on replay", optimum.speed);
    };
    println!("{}", build_days_table(&finish.days, &inputs.config.vehicle.battery));

    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("failed to create `{}`", path.display()))?;
        serde_json::to_writer_pretty(file, &Report { strategy, optimum, finish: &finish })?;
        info!(path = %path.display(), "saved the report");
    }
    Ok(())
}

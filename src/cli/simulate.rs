use clap::Parser;

use crate::{
    cli::InputArgs,
    core::runner::{Outcome, RaceRunner},
    prelude::*,
    quantity::mechanics::MetresPerSecond,
    tables::build_days_table,
};

#[derive(Parser)]
pub struct SimulateArgs {
    #[clap(flatten)]
    pub inputs: InputArgs,

    /// Constant cruising speed in metres per second.
    #[clap(long)]
    pub speed: MetresPerSecond,
}

#[instrument(skip_all, fields(speed = %args.speed))]
pub fn simulate(args: &SimulateArgs) -> Result {
    let inputs = args.inputs.load()?;
    let outcome = RaceRunner::builder()
        .vehicle(&inputs.config.vehicle)
        .route(&inputs.route)
        .weather(&inputs.weather)
        .schedule(&inputs.config.days)
        .build()
        .run(args.speed)?;

    match outcome {
        Outcome::Finished(finish) => {
            info!(race_time = %finish.race_time, hours = finish.race_time.as_hours(), "finished");
            println!("{}", build_days_table(&finish.days, &inputs.config.vehicle.battery));
        }
        Outcome::DidNotFinish(retirement) => {
            warn!(
                reason = %retirement.reason,
                day = retirement.day,
                distance = %retirement.distance,
                "did not finish",
            );
        }
    }
    Ok(())
}

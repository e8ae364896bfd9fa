pub mod battery;
mod compare;
mod scenario;
mod simulate;
mod sweep;

use clap::{Parser, Subcommand};

pub use self::{
    compare::{CompareArgs, compare},
    simulate::{SimulateArgs, simulate},
    sweep::{SweepArgs, sweep},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Simulate a single strategy and show the savings by month.
    #[clap(name = "simulate")]
    Simulate(Box<SimulateArgs>),

    /// Simulate several strategies on the same data side by side.
    #[clap(name = "compare")]
    Compare(Box<CompareArgs>),

    /// Find out how the savings change with the battery size.
    #[clap(name = "sweep")]
    Sweep(Box<SweepArgs>),
}

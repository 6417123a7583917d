use std::path::PathBuf;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use pimcharz::{
    charz::MonteCarlo,
    config::{ArrayArgs, ArrayConfig},
    report,
    simulate::command_by_name,
    sweep::{Sweep, SweepArgs},
    PimResult,
};

fn main_result() -> PimResult<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.level())
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    match args.command {
        Command::Run(array_args) => run(array_args),
        Command::Sweep(sweep_args) => sweep(sweep_args),
        Command::Table { report_dir, output } => {
            let output = output.unwrap_or_else(|| report_dir.join("table.csv"));
            report::dump_table(&report_dir, &output)?;
            Ok(())
        }
    }
}

fn run(args: ArrayArgs) -> PimResult<()> {
    let config = ArrayConfig::load(args)?;
    let command = command_by_name(&config.simulator)?;
    let debug = config.debug;
    let mut monte_carlo = MonteCarlo::new(config, command)?;

    if debug {
        let table = monte_carlo.calibrate()?;
        print!("{}", table);
    } else {
        let report = monte_carlo.run()?;
        print!("{}", report);
    }

    Ok(())
}

fn sweep(args: SweepArgs) -> PimResult<()> {
    let sweep = Sweep::try_from(args)?;
    let configs = sweep.generate()?;
    info!("{} configs ready", configs.len());
    Ok(())
}

fn main() {
    if let Err(e) = main_result() {
        eprint!("Err: {}\n", e);
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(name = "pimcharz")]
#[command(about = "Monte-Carlo characterization of SRAM PIM arrays", long_about = None)]
struct Args {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate an array and report the dot-product mape
    Run(ArrayArgs),

    /// Write the sweep configs consumed by `run --extra_args`
    Sweep(SweepArgs),

    /// Aggregate `.rpt` files into a csv table
    Table {
        #[arg(long = "report_dir", default_value = "report")]
        report_dir: PathBuf,

        /// Defaults to `<report_dir>/table.csv`
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl Args {
    pub fn level(&self) -> Level {
        if self.verbose { Level::DEBUG } else { Level::INFO }
    }
}

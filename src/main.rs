use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};
use sigsched::{
    os::{PlatformConfig, DEFAULT_TIME_UNIT_MS},
    scheduler::{IndexOrderScheduler, RoundRobinScheduler, ShortestRemainingScheduler},
    sim::{bernoulli_jobs, loader, GenerateConfig},
    JobSpec, Scheduler, Sim,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sigsched", version, about = "Preemptive scheduler driving real processes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the jobs of a specification file
    Run(RunArgs),
    /// Print a random job specification
    Generate(GenerateArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    IndexOrder,
    RoundRobin,
    Shortest,
}

#[derive(Args)]
struct RunArgs {
    /// Job specification: `<name> <workload> <creation_quantum>` per line
    spec: PathBuf,

    #[arg(long, value_enum, default_value_t = Policy::IndexOrder)]
    policy: Policy,

    /// Length of one quantum, and of one workload unit
    #[arg(
        long,
        env = "SIGSCHED_TIME_UNIT_MS",
        default_value_t = DEFAULT_TIME_UNIT_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    time_unit_ms: u64,

    /// Workload program [default: `workload` next to this executable]
    #[arg(long, env = "SIGSCHED_WORKLOAD")]
    workload: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value_t = 20)]
    quanta: u64,
    #[arg(long, default_value_t = 0.3)]
    p_arrival: f64,
    #[arg(long, default_value_t = 0.3)]
    p_short: f64,
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    short: u64,
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u64).range(1..))]
    long: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not errors
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Generate(args) => {
            generate(args);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let jobs = loader::load_file(&args.spec)?;

    let config = PlatformConfig {
        workload: args.workload.unwrap_or_else(PlatformConfig::default_workload),
        time_unit: Duration::from_millis(args.time_unit_ms),
    };
    ensure!(
        config.workload.is_file(),
        "workload program {} not found",
        config.workload.display()
    );

    match args.policy {
        Policy::IndexOrder => simulate::<IndexOrderScheduler>(jobs, &config),
        Policy::RoundRobin => simulate::<RoundRobinScheduler>(jobs, &config),
        Policy::Shortest => simulate::<ShortestRemainingScheduler>(jobs, &config),
    }
}

fn simulate<S: Scheduler>(jobs: Vec<JobSpec>, config: &PlatformConfig) -> Result<()> {
    let mut sim = Sim::<S>::new(jobs, config).context("failed to set up the scheduler")?;

    info!("Ready to start");
    let report = sim.run().context("simulation aborted")?;

    println!("\nExecution complete.");
    print!("{report}");
    Ok(())
}

fn generate(args: GenerateArgs) {
    let config = GenerateConfig {
        quanta: args.quanta,
        p_arrival: args.p_arrival,
        p_short: args.p_short,
        short_workload: args.short,
        long_workload: args.long,
        seed: args.seed,
    };
    print!("{}", loader::format(&bernoulli_jobs(&config)));
}

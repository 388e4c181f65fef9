use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{ReportFormat, Settings, MAX_ITERATIONS};
use crate::interpreter::{ConsoleSink, Declaration, OutputSink, Val};
use crate::scenarios::{run_scenario, run_scenario_with, Scenario, ScenarioRun};

#[derive(Parser)]
#[command(name = "loopscope")]
#[command(about = "Loopscope - how for-loop closures capture their variables", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one scenario and print what it logged
    Run {
        /// Which loop body to run
        #[arg(short = 's', long = "scenario", value_enum)]
        scenario: Option<Scenario>,

        /// Declaration keyword of the loop variable
        #[arg(short = 'd', long = "declaration", value_enum)]
        declaration: Option<Declaration>,

        /// Loop bound `n` in `i < n`
        #[arg(short = 'n', long = "iterations", value_parser = iterations_parser())]
        iterations: Option<u32>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Print each value as soon as it is logged
        #[arg(long, conflicts_with = "json")]
        stream: bool,
    },

    /// Run a scenario with both `var` and `let` and print them side by side
    Compare {
        #[arg(short = 's', long = "scenario", value_enum)]
        scenario: Option<Scenario>,

        #[arg(short = 'n', long = "iterations", value_parser = iterations_parser())]
        iterations: Option<u32>,
    },

    /// Print the effective configuration as TOML
    Config,
}

pub fn run_cli() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&settings.log_level);

    match cli.command {
        Commands::Run {
            scenario,
            declaration,
            iterations,
            json,
            stream,
        } => {
            let scenario = scenario.unwrap_or(settings.scenario);
            let declaration = declaration.unwrap_or(settings.declaration);
            let iterations = iterations.unwrap_or(settings.iterations);
            // Streamed lines would corrupt a JSON report
            let format = match (json, stream) {
                (true, _) => ReportFormat::Json,
                (false, true) => ReportFormat::Text,
                (false, false) => settings.report_format,
            };

            let echo: Option<Rc<dyn OutputSink>> = if stream {
                Some(Rc::new(ConsoleSink))
            } else {
                None
            };
            let run = run_scenario_with(scenario, declaration, iterations, echo)
                .with_context(|| format!("Scenario {scenario:?} failed"))?;

            match format {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
                ReportFormat::Text => print_run(&run),
            }
        }

        Commands::Compare {
            scenario,
            iterations,
        } => {
            let scenario = scenario.unwrap_or(settings.scenario);
            let iterations = iterations.unwrap_or(settings.iterations);

            for declaration in [Declaration::Var, Declaration::Let] {
                let run = run_scenario(scenario, declaration, iterations)
                    .with_context(|| format!("Scenario {scenario:?} failed with {declaration}"))?;
                println!(
                    "for ({declaration} i ...): {}",
                    format_values(&run.outputs)
                );
            }
        }

        Commands::Config => {
            let rendered = settings
                .to_toml()
                .context("Failed to render configuration")?;
            print!("{rendered}");
        }
    }

    Ok(())
}

/// `-n` accepts the same range as the `iterations` setting
fn iterations_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(0..=i64::from(MAX_ITERATIONS))
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Already initialized when embedded in a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_run(run: &ScenarioRun) {
    let report = &run.report;
    println!("scenario:     {:?}", run.scenario);
    println!(
        "declaration:  {} ({})",
        report.declaration, report.strategy
    );
    println!("iterations:   {}", report.iterations);
    println!(
        "outputs:      {} ({} synchronous, {} deferred)",
        format_values(&run.outputs),
        run.synchronous_outputs,
        run.outputs.len() - run.synchronous_outputs
    );
    println!(
        "scopes:       loop={} iteration={} block={}",
        report.scopes.loop_scopes, report.scopes.iteration_scopes, report.scopes.block_scopes
    );
    println!("tasks:        {}", report.tasks_scheduled);
    for failure in &run.deferred_failures {
        println!("deferred error: {failure}");
    }
}

fn format_values(values: &[Val]) -> String {
    if values.is_empty() {
        return "(none)".to_string();
    }
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

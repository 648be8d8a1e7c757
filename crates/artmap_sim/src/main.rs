use std::path::PathBuf;

use anyhow::Result;
use artmap_core::{ActivationMode, Verbosity};
use artmap_sim::{Experiment, SimConfig, TestCase};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "artmap-sim")]
#[command(about = "ARTMAP scenario harness: learn a 2D region under supervision and score predictions")]
struct Cli {
    /// TOML configuration; built-in circle experiment when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Map field logging detail (also raises the log level)
    #[arg(long, global = true, value_enum)]
    verbosity: Option<Verbosity>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train and evaluate
    Run {
        #[arg(long, value_enum)]
        case: Option<TestCase>,
        /// Total samples (training + evaluation)
        #[arg(long)]
        samples: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Activation rule of the input network
        #[arg(long, value_enum)]
        activation: Option<ActivationMode>,
        /// Write every prediction to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Save the trained networks and map field here
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    ShowConfig {
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: Verbosity) -> Result<()> {
    let level = match verbosity {
        Verbosity::Quiet => tracing::Level::INFO,
        Verbosity::Decisions => tracing::Level::DEBUG,
        Verbosity::Full => tracing::Level::TRACE,
    };
    // try_init also routes the core crate's `log` records into tracing
    tracing_subscriber::fmt()
        .with_max_level(level)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}

fn load_config(cli: &Cli) -> Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(verbosity) = cli.verbosity {
        config.map.verbosity = verbosity;
    }
    Ok(config)
}

fn run(mut config: SimConfig, command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            case,
            samples,
            seed,
            activation,
            csv,
            save_dir,
        } => {
            if let Some(case) = case {
                config.scenario.case = case;
            }
            if let Some(samples) = samples {
                config.scenario.samples = samples;
            }
            if let Some(seed) = seed {
                config.scenario.seed = seed;
            }
            if let Some(activation) = activation {
                config.input.activation = activation;
            }
            if csv.is_some() {
                config.output.csv = csv;
            }
            if save_dir.is_some() {
                config.output.save_dir = save_dir;
            }

            let experiment = Experiment::new(config);
            let outcome = experiment.run()?;
            let r = &outcome.report;

            info!(
                trained = r.trained,
                evaluated = r.evaluated,
                input_prototypes = r.input_prototypes,
                supervisor_prototypes = r.supervisor_prototypes,
                map_nodes = r.map_nodes,
                "model size"
            );
            info!(
                correct = r.correct,
                incorrect = r.incorrect,
                withheld = r.withheld,
                accuracy = %format!("{:.2}%", r.accuracy() * 100.0),
                "evaluation"
            );

            let output = &experiment.config().output;
            if let Some(path) = &output.csv {
                outcome.write_csv(path)?;
                info!(path = %path.display(), "predictions written");
            }
            if let Some(dir) = &output.save_dir {
                outcome.save_models(dir)?;
                info!(dir = %dir.display(), "models saved");
            }
            Ok(())
        }
        Commands::ShowConfig { output } => {
            match output {
                Some(path) => config.save(&path)?,
                None => print!("{}", config.to_toml()?),
            }
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let result = init_tracing(cli.verbosity.unwrap_or_default())
        .and_then(|()| load_config(&cli))
        .and_then(|config| run(config, cli.command));

    if let Err(e) = result {
        error!(error = %format!("{e:#}"), "Fatal Error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_subscriber_is_reported() {
        // the first call may lose to another test's global subscriber
        let _ = init_tracing(Verbosity::Quiet);
        let err = init_tracing(Verbosity::Full).unwrap_err();
        assert!(err.to_string().starts_with("installing tracing subscriber"));
    }
}

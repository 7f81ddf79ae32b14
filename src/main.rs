use clap::{Parser, Subcommand};
use log;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::PathBuf;

use rusty_syn::core::config::SimulationConfig;
use rusty_syn::core::synapse::Receptor;
use rusty_syn::core::trace::{SimulationOutput, TraceKind};
use rusty_syn::error::SynError;
use rusty_syn::simulator::comparison::{Comparison, SCORE_DECIMALS};
use rusty_syn::simulator::replay::ReplaySimulator;
use rusty_syn::utils::round_to;

#[derive(Parser, Debug)]
#[command(name = "rusty_syn", about = "Stimulus generation and fidelity scoring of synapse models")]
struct Args {
    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
    /// A file where to write the log, in addition to the standard error
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the stimulation spike train of a run
    Stim {
        /// The mean input firing rate (in Hz)
        #[arg(long, default_value = "10.0")]
        freq: f64,
        /// The recovery time constant (in seconds)
        #[arg(long, default_value = "0.035")]
        tau_ahp: f64,
        /// The simulated time (in ms)
        #[arg(long, default_value = "20000.0")]
        sim_time: f64,
        /// The seed of the input process
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Write the spike train to this file instead of the standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score a simulation output against a reference output
    Score {
        /// The reference output
        #[arg(long)]
        reference: PathBuf,
        /// The output to score
        #[arg(long)]
        test: PathBuf,
        /// The trace to compare, one of: t, v, g, i, osp
        #[arg(long, default_value = "g")]
        trace: TraceKind,
    },
    /// Compare the synapse models from recorded outputs
    Compare {
        /// The directory holding one output file per model, e.g., LUTsyn_AMPA.json
        #[arg(long)]
        traces: PathBuf,
        /// The stimulation configuration (defaults to 20 s at 10 Hz)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Restrict the comparison to one receptor family, AMPA or NMDA
        #[arg(long)]
        receptor: Option<Receptor>,
        /// Write the report to this file instead of the standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool, log_file: Option<&PathBuf>) -> Result<(), SynError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let stderr = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .target(Target::Stderr)
        .build();
    let mut config = Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut root = Root::builder().appender("stderr");

    if let Some(path) = log_file {
        let logfile = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new("{d} {l} - {m}\n")))
            .build(path)
            .map_err(|e| SynError::IOError(e.to_string()))?;
        config = config.appender(Appender::builder().build("logfile", Box::new(logfile)));
        root = root.appender("logfile");
    }

    let config = config
        .build(root.build(level))
        .map_err(|e| SynError::IOError(e.to_string()))?;
    log4rs::init_config(config).map_err(|e| SynError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), SynError> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_file.as_ref())?;
    log::debug!("{:?}", args);

    match args.command {
        Command::Stim {
            freq,
            tau_ahp,
            sim_time,
            seed,
            output,
        } => {
            let config = SimulationConfig {
                sim_time,
                freq,
                tau_ahp,
                seed,
            };
            let spike_train = config.generator()?.generate();
            log::info!(
                "Spike train generation: done! {} entries over {} ms",
                spike_train.len(),
                sim_time
            );

            match output {
                Some(path) => {
                    spike_train.save_to(&path)?;
                    log::info!("Spike train saved to {}", path.display());
                }
                None => println!(
                    "{}",
                    serde_json::to_string_pretty(&spike_train)
                        .map_err(|e| SynError::IOError(e.to_string()))?
                ),
            }
        }
        Command::Score {
            reference,
            test,
            trace,
        } => {
            let reference = SimulationOutput::load_from(&reference)?;
            let test = SimulationOutput::load_from(&test)?;
            let score = test.nrmse_against(&reference, trace)?;
            println!("{}", round_to(score, SCORE_DECIMALS));
        }
        Command::Compare {
            traces,
            config,
            receptor,
            output,
        } => {
            let config = match config {
                Some(path) => SimulationConfig::load_from(path)?,
                None => SimulationConfig::default(),
            };
            let receptors = match receptor {
                Some(receptor) => vec![receptor],
                None => Receptor::ALL.to_vec(),
            };

            let mut simulator = ReplaySimulator::build(&traces)?;
            let report = Comparison::build(config)?.compare(&mut simulator, &receptors)?;
            for receptor_report in report.receptors.iter() {
                for score in receptor_report.scores.iter() {
                    log::info!(
                        "{} vs {} ({}): NRMSE {}",
                        score.model,
                        receptor_report.reference,
                        receptor_report.trace,
                        score.nrmse
                    );
                }
            }

            match output {
                Some(path) => {
                    report.save_to(&path)?;
                    log::info!("Report saved to {}", path.display());
                }
                None => println!(
                    "{}",
                    serde_json::to_string_pretty(&report)
                        .map_err(|e| SynError::IOError(e.to_string()))?
                ),
            }
        }
    }
    Ok(())
}

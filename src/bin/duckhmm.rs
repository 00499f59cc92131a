use clap::{Parser, Subcommand};
use duckhmm::hmm::{fit_from_seed, HmmModel, TrainParams};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, about, version)]
struct Opts {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fit a model to an emission sequence with Baum-Welch
    Fit {
        /// Number of hidden states
        #[clap(short = 'N', default_value_t = 6)]
        n_states: usize,
        /// Number of emission symbols
        #[clap(short = 'M', default_value_t = 9)]
        n_emissions: usize,
        /// Maximum number of re-estimations
        #[clap(long, default_value_t = 100)]
        max_iter: usize,
        /// Stop when the log-likelihood improves by less than this
        #[clap(long, default_value_t = 1e-6)]
        tolerance: f64,
        /// Seed of the initial model
        #[clap(short, long, default_value_t = 0)]
        seed: u64,
        /// Output model JSON filename. Printed to stdout if not specified
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// Emission sequence
        emissions: Vec<usize>,
    },
    /// Predict the next emission of a sequence
    Predict {
        /// Model JSON filename
        #[clap(short, long)]
        model: PathBuf,
        /// Emission sequence
        emissions: Vec<usize>,
    },
    /// Log-likelihood of a sequence
    Likelihood {
        /// Model JSON filename
        #[clap(short, long)]
        model: PathBuf,
        /// Emission sequence
        emissions: Vec<usize>,
    },
    /// Sample an emission sequence from a model
    Sample {
        /// Model JSON filename
        #[clap(short, long)]
        model: PathBuf,
        /// Length of the sequence
        #[clap(short, long)]
        length: usize,
        #[clap(short, long, default_value_t = 0)]
        seed: u64,
    },
}

fn load_model(path: &Path) -> duckhmm::Result<HmmModel> {
    let file = std::fs::File::open(path)?;
    let model: HmmModel = serde_json::from_reader(std::io::BufReader::new(file))?;
    model.validate()?;
    Ok(model)
}

fn run(opts: &Opts) -> duckhmm::Result<()> {
    match &opts.command {
        Commands::Fit {
            n_states,
            n_emissions,
            max_iter,
            tolerance,
            seed,
            output,
            emissions,
        } => {
            let params = TrainParams::new(*max_iter, *tolerance);
            info!("fit {} n_emissions={}", params, emissions.len());
            let r = fit_from_seed(*n_states, *n_emissions, *seed, emissions, &params)?;
            info!(
                "n_iter={} converged={} ll={}",
                r.n_iter,
                r.converged,
                r.log_likelihood()
            );
            match output {
                Some(output) => {
                    let file = std::fs::File::create(output)?;
                    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &r.model)?;
                }
                None => println!("{}", serde_json::to_string_pretty(&r.model)?),
            }
        }
        Commands::Predict { model, emissions } => {
            let model = load_model(model)?;
            let p = model.predict_next(emissions)?;
            println!("emission={}\tconfidence={}", p.emission, p.confidence);
        }
        Commands::Likelihood { model, emissions } => {
            let model = load_model(model)?;
            let p = model.forward_likelihood(emissions)?;
            println!("{}", p.to_log_value());
        }
        Commands::Sample {
            model,
            length,
            seed,
        } => {
            let model = load_model(model)?;
            let h = model.sample(*length, *seed);
            let line: Vec<String> = h.emissions.iter().map(|e| e.to_string()).collect();
            println!("{}", line.join(" "));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let opts: Opts = Opts::parse();
    info!("started_at={}", chrono::Local::now());
    info!("opts={:?}", opts);
    if let Err(e) = run(&opts) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    info!("finished_at={}", chrono::Local::now());
}

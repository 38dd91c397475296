use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use titanic_predictor::config;
use titanic_predictor::model::ModelCache;
use titanic_predictor::predict::{self, AGE_RANGE, FARE_RANGE, PassengerQuery};

#[derive(Parser)]
#[command(name = "titanic-predictor", version, about = "Titanic survival predictor")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to a config file (default: <config dir>/titanic-predictor/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the prediction page (default)
    #[cfg(feature = "server")]
    Serve,
    /// Check whether a server is answering on the configured address
    #[cfg(feature = "server")]
    Status,
    /// Predict a single passenger and print the result
    Predict {
        /// Passenger class
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        pclass: u8,
        /// male or female
        #[arg(long)]
        sex: String,
        /// Age in years (0-100)
        #[arg(long, value_parser = parse_age)]
        age: f64,
        /// Fare in British Pounds (0-600)
        #[arg(long, value_parser = parse_fare)]
        fare: f64,
        /// Port of embarkation: S, C or Q
        #[arg(long)]
        embarked: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        #[cfg(feature = "server")]
        None | Some(Command::Serve) => titanic_predictor::server::serve(&config)?,
        #[cfg(feature = "server")]
        Some(Command::Status) => titanic_predictor::server::status(&config)?,
        #[cfg(not(feature = "server"))]
        None => anyhow::bail!("built without the server feature; use `predict`"),
        Some(Command::Predict {
            pclass,
            sex,
            age,
            fare,
            embarked,
        }) => {
            let query = PassengerQuery {
                pclass,
                sex,
                age,
                fare,
                embarked,
            };
            run_prediction(&config, &query)?;
        }
    }

    Ok(())
}

fn run_prediction(config: &config::Config, query: &PassengerQuery) -> Result<()> {
    let cache = ModelCache::new(&config.model.path, config.model.sha256.clone());
    let model = cache.get_or_load()?;
    let prediction = predict::predict(model.as_ref(), query)?;

    println!("{}", prediction.verdict());
    println!("  Survival Probability:     {}", prediction.survival_percent());
    println!("  Non-Survival Probability: {}", prediction.non_survival_percent());
    Ok(())
}

fn parse_age(s: &str) -> Result<f64, String> {
    parse_bounded(s, *AGE_RANGE.start(), *AGE_RANGE.end())
}

fn parse_fare(s: &str) -> Result<f64, String> {
    parse_bounded(s, *FARE_RANGE.start(), *FARE_RANGE.end())
}

fn parse_bounded(s: &str, min: f64, max: f64) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between {min} and {max}"))
    }
}

//! Command-line interface
//!
//! Thin harness over the library: train, cross-validate, compare, predict,
//! list. Every domain error is printed as a message; the process never
//! panics on user data.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::data;
use crate::error::Result;
use crate::models::ModelKind;
use crate::store::{ModelStore, DEFAULT_STORE_DIR};
use crate::training::{Evaluator, Trainer};

fn step_ok(msg: &str) {
    println!("  {} {}", "\u{2713}".green(), msg);
}

#[derive(Parser)]
#[command(name = "cardioml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heart-disease risk classification: train, evaluate, predict")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model on a CSV dataset and report held-out metrics
    Train {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Model name, e.g. "Logistic Regression" or logistic_regression
        #[arg(short, long, default_value = "Logistic Regression")]
        model: String,

        /// Persist the fitted bundle after training
        #[arg(long)]
        save: bool,

        /// Model storage directory
        #[arg(long, default_value = DEFAULT_STORE_DIR)]
        store_dir: PathBuf,
    },

    /// Run 5-fold cross-validation for one model
    CrossValidate {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Model name
        #[arg(short, long)]
        model: String,
    },

    /// Cross-validate every registered model and report one line each
    Compare {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Predict the risk label for one feature vector
    Predict {
        /// Model name
        #[arg(short, long)]
        model: String,

        /// The 16 feature values in schema order, comma-separated
        #[arg(short, long, value_delimiter = ',')]
        values: Vec<String>,

        /// Model storage directory
        #[arg(long, default_value = DEFAULT_STORE_DIR)]
        store_dir: PathBuf,
    },

    /// List saved models
    List {
        /// Model storage directory
        #[arg(long, default_value = DEFAULT_STORE_DIR)]
        store_dir: PathBuf,
    },
}

pub fn cmd_train(data: &PathBuf, model: &str, save: bool, store_dir: &PathBuf) -> Result<()> {
    let kind = ModelKind::from_name(model)?;
    let df = data::load_csv(data)?;
    step_ok(&format!("loaded {} rows from {}", df.height(), data.display()));

    let outcome = Trainer::new().train(&df, kind)?;
    println!("\n{}\n", outcome.report);

    if save {
        let store = ModelStore::open(store_dir)?;
        let path = store.save(&outcome.bundle)?;
        step_ok(&format!("saved to {}", path.display()));
    }

    Ok(())
}

pub fn cmd_cross_validate(data: &PathBuf, model: &str) -> Result<()> {
    let kind = ModelKind::from_name(model)?;
    let df = data::load_csv(data)?;

    let score = Evaluator::new().cross_validate(&df, kind)?;
    println!("{score}");
    Ok(())
}

pub fn cmd_compare(data: &PathBuf) -> Result<()> {
    let df = data::load_csv(data)?;
    let report = Evaluator::new().cross_validate_all(&df)?;
    println!("{report}");
    Ok(())
}

pub fn cmd_predict(model: &str, values: &[String], store_dir: &PathBuf) -> Result<()> {
    let kind = ModelKind::from_name(model)?;
    let store = ModelStore::open(store_dir)?;
    let assessment = crate::inference::Predictor::new(store).predict(kind, values)?;
    println!("Prediction Result: {assessment}");
    Ok(())
}

pub fn cmd_list(store_dir: &PathBuf) -> Result<()> {
    let store = ModelStore::open(store_dir)?;
    let entries = store.list()?;
    if entries.is_empty() {
        println!("no saved models in {}", store_dir.display());
        return Ok(());
    }
    for entry in entries {
        println!(
            "  {}  {}  {}",
            entry.name.bold(),
            entry.path.dimmed(),
            entry.saved_at.dimmed()
        );
    }
    Ok(())
}

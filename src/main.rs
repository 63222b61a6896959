//! cardioml command-line entry point

use clap::Parser;

use cardioml::cli::{
    cmd_compare, cmd_cross_validate, cmd_list, cmd_predict, cmd_train, Cli, Commands,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardioml=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Train {
            data,
            model,
            save,
            store_dir,
        } => cmd_train(data, model, *save, store_dir),
        Commands::CrossValidate { data, model } => cmd_cross_validate(data, model),
        Commands::Compare { data } => cmd_compare(data),
        Commands::Predict {
            model,
            values,
            store_dir,
        } => cmd_predict(model, values, store_dir),
        Commands::List { store_dir } => cmd_list(store_dir),
    };

    // Domain errors surface as a message and a non-zero exit, never a panic.
    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    Ok(())
}

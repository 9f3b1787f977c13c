use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use credence_serve::server::serve;
use credence_serve::settings::Settings;
use credence_serve::train::{load_train_config, run_training};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CREDENCE_LOG", "error,credence=info"))
        .init();

    let matches = Command::new("credence")
        .version(clap::crate_version!())
        .about("Credence - credit approval feature pipelines and prediction service")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve a trained pipeline over HTTP")
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .help("Path to the pipeline JSON. Defaults to MODEL_DIR/MODEL_FILENAME.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port to listen on. Overrides PORT.")
                        .value_parser(clap::value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new("train")
                .about("Fit the column transformer and classifier from a CSV file")
                .arg(
                    Arg::new("config")
                        .help("Path to training configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .help("Path to the training CSV, including the target column")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Where to write the trained pipeline. Defaults to MODEL_DIR/MODEL_FILENAME.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("settings").about("Print the resolved settings"))
        .get_matches();

    let settings = Settings::from_env();
    match matches.subcommand() {
        Some(("serve", sub_m)) => handle_serve(sub_m, settings),
        Some(("train", sub_m)) => handle_train(sub_m, &settings),
        Some(("settings", _)) => {
            settings.print_settings();
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_serve(matches: &ArgMatches, mut settings: Settings) -> Result<()> {
    if let Some(port) = matches.get_one::<u16>("port") {
        settings.port = *port;
    }
    let model_path = matches
        .get_one::<PathBuf>("model")
        .cloned()
        .unwrap_or_else(|| settings.model_path());
    log::info!("[Credence::Serve] Serving pipeline {:?}", model_path);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(serve(settings, &model_path))
}

fn handle_train(matches: &ArgMatches, settings: &Settings) -> Result<()> {
    let config_path = matches.get_one::<PathBuf>("config");
    let data_path = matches
        .get_one::<PathBuf>("data")
        .context("--data is required")?;
    let output = matches.get_one::<PathBuf>("output");

    let config = load_train_config(config_path.map(PathBuf::as_path))?;
    if config_path.is_none() {
        eprintln!("[Credence::Train] No config file provided; using defaults.");
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&config).unwrap_or_default()
        );
    }
    log::info!("[Credence::Train] Training from data: {:?}", data_path);

    match run_training(&config, data_path, output.map(PathBuf::as_path), settings) {
        Ok(summary) => {
            eprintln!(
                "[Credence::Train] Wrote {} ({} train rows, {} validation rows, {} features)",
                summary.model_path.display(),
                summary.train_rows,
                summary.validation_rows,
                summary.final_features.len()
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

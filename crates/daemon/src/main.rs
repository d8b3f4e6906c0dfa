use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use brainwave_daemon::{api, config, UploadedFile};
use clap::{Arg, ArgAction, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brainwave_daemon=info,pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Argument Parsing ---
    let matches = Command::new("eeg_analyze")
        .about("Analyze a BrainVision EEG recording (.eeg + .vhdr) into brain wave band powers")
        .arg(
            Arg::new("files")
                .num_args(1..)
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Uploaded files; the .eeg data file and its .vhdr header"),
        )
        .arg(
            Arg::new("label")
                .long("label")
                .short('l')
                .help("Subject label passed to the renderer"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("config.json")
                .help("Service configuration file; defaults apply when it is missing"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .action(ArgAction::SetTrue)
                .help("Pretty-print the JSON response"),
        )
        .get_matches();

    let config_path = matches
        .get_one::<PathBuf>("config")
        .map(PathBuf::as_path)
        .unwrap_or_else(|| Path::new("config.json"));
    let config = config::load_config(config_path)?;

    let files = matches
        .get_many::<PathBuf>("files")
        .into_iter()
        .flatten()
        .map(PathBuf::as_path)
        .map(|path| read_upload(path, config.max_upload_bytes))
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::info!("Brain wave analysis starting with {} file(s)", files.len());
    let label = matches.get_one::<String>("label").map(String::as_str);
    let response = api::handle_analyze(&config, &files, label);

    let json = if matches.get_flag("pretty") {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", json);

    Ok(if response.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Read at most `max_bytes + 1` bytes, enough for the handler to see that a
/// file is oversized without holding all of it.
fn read_upload(path: &Path, max_bytes: usize) -> anyhow::Result<UploadedFile> {
    let file = File::open(path).with_context(|| format!("Could not open '{}'", path.display()))?;
    let mut bytes = Vec::new();
    file.take(max_bytes as u64 + 1)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Could not read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedFile::new(filename, bytes))
}

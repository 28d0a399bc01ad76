//! Main entry point for the pkgproto CLI app

use pkgproto::cli::{self, Commands};
use pkgproto::fsx::OsMetadata;
use pkgproto::meta::Defaults;
use pkgproto::record::Record;
use pkgproto::{scan, ProtoError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run_app() {
        if e.downcast_ref::<clap::Error>().is_none() {
            eprintln!("Error: {}", e);
        }
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;

    match &command {
        Commands::Check { file, json } => check_file(file, *json),
        Commands::Gen {
            inputs,
            recursive,
            class,
            part,
        } => {
            let defaults = Defaults {
                install_class: class.clone(),
                part: part.clone(),
            };
            let records = scan::scan_paths(&OsMetadata, inputs, *recursive, &defaults)?;
            for record in records {
                println!("{record}");
            }
            Ok(())
        }
    }
}

/// Parse every entry line of `path`, reporting failures to stderr.
///
/// Blank lines and `#` comments are skipped; everything else must be a
/// parseable entry, including `!` command lines, which are reported as
/// unsupported. Fails if any line was rejected.
fn check_file(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::open(path).map_err(|e| ProtoError::io(e, path))?;
    let reader = BufReader::new(file);

    let mut seen = 0usize;
    let mut bad = 0usize;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ProtoError::io(e, path))?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        seen += 1;
        match Record::from_line(line) {
            Ok(record) => {
                if json {
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
            Err(e) => {
                bad += 1;
                eprintln!("{}:{}: {}", path.display(), idx + 1, e);
            }
        }
    }

    if bad > 0 {
        return Err(format!("{bad} of {seen} entries failed to parse").into());
    }
    if !json {
        println!("{seen} entries OK");
    }
    Ok(())
}

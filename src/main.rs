// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Halimede-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Halimede and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Halimede CLI entrypoint.
//!
//! By default this loads the given file or project folder (or starts empty)
//! and runs the interactive TUI. Connection credentials, layout, and deploy
//! history persist in the config folder (`.halimede/` inside the workspace
//! unless overridden with `--config`).

use std::error::Error;
use std::path::PathBuf;

const WELCOME_DOCUMENT: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    <title>Your HTML Document</title>\n</head>\n<body>\n    <h1>Hello, World!</h1>\n    <p>Start editing your HTML here...</p>\n</body>\n</html>\n";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<file-or-folder>] [--config <dir>] [--durable-writes]\n\nLoads the given HTML file or project folder into the editor; with no path a\nwelcome document is opened.\n\n--config <dir> overrides the config folder (default: ./.halimede).\n--durable-writes opts into slower, best-effort durable persistence\n(fsync/sync where supported)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    path: Option<String>,
    config_dir: Option<String>,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.config_dir = Some(dir);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.path.is_some() {
                    return Err(());
                }
                options.path = Some(arg);
            }
        }
    }

    Ok(options)
}

fn build_workspace(path: Option<&str>) -> Result<halimede::model::Workspace, Box<dyn Error>> {
    let mut workspace = halimede::model::Workspace::new();
    match path {
        Some(path) => {
            let path = PathBuf::from(path);
            let report = if path.is_dir() {
                halimede::ingest::ingest_dir(&path)?
            } else {
                halimede::ingest::ingest_files(std::slice::from_ref(&path))?
            };
            for rejection in &report.rejected {
                eprintln!("halimede: skipped {rejection}");
            }
            halimede::ingest::apply_report(&mut workspace, &report);
        }
        None => {
            workspace.open_document(
                "untitled.html",
                "untitled.html",
                halimede::model::FileKind::Html,
                WELCOME_DOCUMENT,
            );
        }
    }
    Ok(workspace)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "halimede".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let workspace = build_workspace(options.path.as_deref())?;

        let config_dir = options
            .config_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".halimede"));
        let config = if options.durable_writes {
            halimede::store::ConfigFolder::new(config_dir)
                .with_durability(halimede::store::WriteDurability::Durable)
        } else {
            halimede::store::ConfigFolder::new(config_dir)
        };

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let handle = runtime.handle().clone();

        runtime.block_on(async move {
            let tui_join = tokio::task::spawn_blocking(move || {
                halimede::tui::run_with_workspace(workspace, config, Some(handle))
                    .map_err(|err| err.to_string())
            })
            .await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
            })?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("halimede: {err}");
        std::process::exit(1);
    }
}

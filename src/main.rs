mod app;
mod state;
mod ui;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use app::MocapViewerApp;
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use eframe::egui;
use rusty_mocap::config::AnalysisConfig;
use rusty_mocap::data::clean::clean_folder;
use rusty_mocap::data::ColumnMap;
use rusty_mocap::error::classify;
use rusty_mocap::experiment::{date_folders, list_stored, next_experiment_path};
use rusty_mocap::pipeline;
use state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve and plot motion-capture experiment logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Analysis configuration JSON (defaults to the built-in figures)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Root of the dated experiment folders
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    base_dir: Option<PathBuf>,

    /// Staging folder for raw Test_<n>.txt logs
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    inbox_dir: Option<PathBuf>,

    /// Analyse this file instead of resolving the latest one
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    file: Option<PathBuf>,

    /// Seconds to skip at the start of the recording
    #[arg(long, global = true)]
    offset: Option<f64>,

    /// Move a waiting inbox file into today's folder before resolving
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    intake: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive viewer (default)
    View,
    /// Print the experiment that would be analysed
    Resolve,
    /// List the experiments held in HDF5 stores under the base directory
    List,
    /// Run the analysis headless and write the rendered panels as JSON
    Export {
        /// Output path (`-` for stdout)
        #[arg(short, long, default_value = "analysis.json", value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },
    /// Print the path for the next experiment recorded today
    Next {
        #[arg(long, default_value = "csv")]
        extension: String,
    },
    /// Rename/drop columns of every CSV in a folder into `cleaned_data/`
    Clean {
        /// Folder to clean (defaults to the latest date folder)
        #[arg(value_hint = ValueHint::DirPath)]
        folder: Option<PathBuf>,

        /// Column map JSON (`{"rename": {...}, "drop": [...]}`)
        #[arg(long, value_hint = ValueHint::FilePath)]
        map: Option<PathBuf>,
    },
    /// Print the effective configuration as JSON
    Config,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = base_dir.clone();
        }
        if let Some(inbox_dir) = &self.inbox_dir {
            config.inbox_dir = Some(inbox_dir.clone());
        }
        if let Some(offset) = self.offset {
            config.start_time_offset_sec = offset;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run_cli(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match classify(&e) {
                Some(kind) => eprintln!("Error ({kind}): {e:#}"),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let config = cli.analysis_config()?;
    let today = chrono::Local::now().date_naive();
    log::debug!("Resolving relative to {today}");

    match cli.command.unwrap_or(Command::View) {
        Command::View => view(config, today, cli.intake, cli.file),
        Command::Resolve => {
            match cli.file {
                Some(file) => println!("{}", file.display()),
                None => println!("{}", pipeline::locate(&config, today, cli.intake)?),
            }
            Ok(())
        }
        Command::List => {
            let experiments = list_stored(&config.base_dir);
            if experiments.is_empty() {
                println!("No stored experiments under {}", config.base_dir.display());
            }
            for exp in experiments {
                let store = exp.file.file_name().unwrap_or_default().to_string_lossy();
                let recorded = exp
                    .timestamp
                    .map_or_else(|| "N/A".to_string(), |t| t.to_string());
                println!(
                    "{store}  {}  {recorded}  {} samples  {}",
                    exp.group,
                    exp.samples.map_or_else(|| "?".to_string(), |n| n.to_string()),
                    exp.wave_function.as_deref().unwrap_or("unknown"),
                );
                if let Some(description) = &exp.description {
                    println!("    {description}");
                }
            }
            Ok(())
        }
        Command::Export { output } => {
            let run = pipeline::run(&config, today, cli.intake, cli.file.as_deref())?;
            let json = run.to_json()?;
            if output.as_os_str() == "-" {
                println!("{json}");
            } else {
                fs::write(&output, json)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                log::info!("Wrote {}", output.display());
            }
            Ok(())
        }
        Command::Next { extension } => {
            let path = next_experiment_path(&config.base_dir, today, &extension)?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Clean { folder, map } => {
            let map = match map {
                Some(path) => {
                    let content = fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    serde_json::from_str::<ColumnMap>(&content)
                        .with_context(|| format!("Failed to parse {}", path.display()))?
                }
                None => ColumnMap::rig_default(),
            };
            let folder = match folder {
                Some(folder) => folder,
                None => date_folders(&config.base_dir, today)?
                    .into_iter()
                    .next()
                    .map(|f| f.path)
                    .ok_or_else(|| {
                        anyhow!("No date folders under {}", config.base_dir.display())
                    })?,
            };
            let report = clean_folder(&folder, &map)?;
            for path in &report.written {
                println!("{}", path.display());
            }
            if report.failed.is_empty() {
                Ok(())
            } else {
                Err(anyhow!(
                    "{} of {} files failed to clean",
                    report.failed.len(),
                    report.failed.len() + report.written.len()
                ))
            }
        }
        Command::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn view(
    config: AnalysisConfig,
    today: NaiveDate,
    intake: bool,
    file: Option<PathBuf>,
) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    let state = AppState::new(config, today, intake, file);
    eframe::run_native(
        "Rusty Mocap – Experiment Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(MocapViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("Viewer failed: {e}"))
}

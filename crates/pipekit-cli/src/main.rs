//! pipekit CLI - batch tools for piping documents
//!
//! Reads a JSON document snapshot, runs one tool against it and optionally
//! writes the document back.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pipekit::connect::{PipeEndPrepPreferences, PreferenceSet};
use pipekit::math::Point3;
use pipekit::model::{
    classify, Document, ElementId, LogNotifier, ParameterStore, PipingModel, ViewId,
};
use pipekit::{Session, Settings};

#[derive(Parser)]
#[command(name = "pipekit")]
#[command(about = "End-prep text, pipe lines and dimensions for piping documents", long_about = None)]
struct Cli {
    /// Settings file
    #[arg(long, global = true, default_value = "pipekit.toml")]
    settings: PathBuf,

    /// Saved end-prep preferences (JSON)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about a document
    Info {
        /// Path to the document
        file: PathBuf,
    },
    /// Compute end-prep text for pipes
    EndPrep {
        /// Path to the document
        file: PathBuf,
        /// Only this pipe
        #[arg(long)]
        pipe: Option<i64>,
        /// Overwrite non-blank values
        #[arg(long)]
        force: bool,
        /// Save the document afterwards
        #[arg(long)]
        write: bool,
    },
    /// Print the pipe line around a pipe
    PipeLine {
        /// Path to the document
        file: PathBuf,
        /// Seed pipe
        #[arg(long)]
        pipe: i64,
        /// Only elements visible in this view
        #[arg(long)]
        view: Option<i64>,
        /// Stop at elements that do not run straight through
        #[arg(long)]
        linear_only: bool,
        /// Print element ids as JSON
        #[arg(long)]
        json: bool,
    },
    /// Dimension the pipe line around a pipe
    Dimension {
        /// Path to the document
        file: PathBuf,
        /// Seed pipe
        #[arg(long)]
        pipe: i64,
        /// View to dimension in
        #[arg(long)]
        view: i64,
        /// Placement point of the overall dimension, `x,y,z`
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: Point3,
        /// Stop at elements that do not run straight through
        #[arg(long)]
        linear_only: bool,
        /// Save the document afterwards
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = Settings::load_or_default(&cli.settings)
        .with_context(|| format!("loading {}", cli.settings.display()))?;
    let saved = match &cli.prefs {
        Some(path) => load_preferences(path)?,
        None => Vec::new(),
    };
    let mut session = Session::new(settings);

    match cli.command {
        Commands::Info { file } => {
            let doc = load_document(&file)?;
            session.reload(&doc, &saved, None);
            show_info(&file, &doc, &session);
        }
        Commands::EndPrep {
            file,
            pipe,
            force,
            write,
        } => {
            let mut doc = load_document(&file)?;
            session.reload(&doc, &saved, None);
            update_end_preps(&session, &mut doc, pipe.map(ElementId), force)?;
            if write {
                save_document(&file, &doc)?;
            }
        }
        Commands::PipeLine {
            file,
            pipe,
            view,
            linear_only,
            json,
        } => {
            let doc = load_document(&file)?;
            session.reload(&doc, &saved, None);
            let view = match view {
                Some(id) => Some(
                    doc.view(ViewId(id))
                        .with_context(|| format!("view {} not found", id))?,
                ),
                None => None,
            };
            let line =
                session.select_pipe_line(&doc, &LogNotifier, ElementId(pipe), view, linear_only)?;
            if json {
                println!("{}", serde_json::to_string(line.elements())?);
            } else {
                for id in line.iter() {
                    let name = doc.element(id).map_or("?", |e| e.name.as_str());
                    let marker = if id == line.seed() { "*" } else { " " };
                    println!("{} {} {}", marker, id, name);
                }
            }
        }
        Commands::Dimension {
            file,
            pipe,
            view,
            at,
            linear_only,
            write,
        } => {
            let mut doc = load_document(&file)?;
            session.reload(&doc, &saved, None);
            let report = session.dimension_pipe_line(
                &mut doc,
                &LogNotifier,
                ElementId(pipe),
                ViewId(view),
                at,
                linear_only,
            )?;
            match report.primary {
                Some(id) => println!("Overall dimension: {}", id.0),
                None => println!("Overall dimension: not created"),
            }
            if report.secondary_enabled {
                println!("Sub-dimensions: {}", report.secondary.len());
            } else {
                println!("Sub-dimensions: disabled (run not parallel to view)");
            }
            for failure in &report.failures {
                println!("  element {}: {}", failure.element, failure.message);
            }
            if write {
                save_document(&file, &doc)?;
            }
        }
    }

    Ok(())
}

fn parse_point(s: &str) -> Result<Point3, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{}: {}", p.trim(), e)))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {} value(s)", parts.len())),
    }
}

fn load_document(path: &Path) -> Result<Document> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc = Document::from_json(&json).with_context(|| format!("parsing {}", path.display()))?;
    log::debug!("loaded {} element(s) from {}", doc.elements.len(), path.display());
    Ok(doc)
}

fn save_document(path: &Path, doc: &Document) -> Result<()> {
    fs::write(path, doc.to_json()?).with_context(|| format!("writing {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

fn load_preferences(path: &Path) -> Result<Vec<PipeEndPrepPreferences>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let set = PreferenceSet::from_json(&json)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(set.entries().to_vec())
}

fn update_end_preps(
    session: &Session,
    doc: &mut Document,
    pipe: Option<ElementId>,
    force: bool,
) -> Result<()> {
    let updater = session.end_prep_updater()?;
    let force = force || session.settings().end_prep.force_update;
    let pipes = match pipe {
        Some(id) => {
            if !doc.element(id).is_some_and(classify::is_pipe) {
                bail!("element {} is not a pipe", id);
            }
            vec![id]
        }
        None => doc
            .elements
            .values()
            .filter(|e| classify::is_pipe(e))
            .map(|e| e.id)
            .collect(),
    };

    let summary = updater.update_pipes(doc, &LogNotifier, &pipes, force)?;
    for id in &pipes {
        let value = doc
            .text_parameter(*id, updater.parameter())
            .unwrap_or_else(|| "-".to_string());
        println!("  {}: {}", id, value);
    }
    println!(
        "{} written, {} unchanged, {} kept, {} without parameter, {} failed",
        summary.written, summary.unchanged, summary.kept, summary.missing, summary.failed
    );
    Ok(())
}

fn show_info(file: &Path, doc: &Document, session: &Session) {
    println!("pipekit document: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Elements: {}", doc.elements.len());
    println!("  Views: {}", doc.views.len());
    println!("  Dimension types: {}", doc.dimension_types.len());
    println!("  Dimensions: {}", doc.dimensions.len());

    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    for element in doc.elements.values() {
        *categories.entry(format!("{:?}", element.category)).or_default() += 1;
    }
    if !categories.is_empty() {
        println!("\nCategories:");
        for (category, count) in &categories {
            println!("  {}: {}", category, count);
        }
    }

    let prefs = session.preferences();
    if !prefs.is_empty() {
        println!("\nEnd-prep preferences:");
        for entry in prefs.entries() {
            println!(
                "  {} ({}): bell {}, spigot {}",
                entry.pipe_type_name,
                entry.pipe_type_id,
                entry.bell_end_prep,
                entry.spigot_end_prep
            );
        }
    }
}

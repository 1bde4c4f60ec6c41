use std::cell::RefCell;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use schema_builder::seed::{SeedFormat, load_seed};
use schema_builder::ui::outline::render_outline;
use schema_builder::ui::preview_diff::render_diff;
use schema_builder::{BuilderConfig, ChildrenPolicy, FieldEdit, FormState};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const DIFF_CONTEXT: usize = 3;

#[derive(Debug, Parser)]
#[command(
    name = "schema-builder",
    about = "Describe a JSON document field by field and print its shape"
)]
struct Args {
    /// YAML file with builder settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Initial fields (JSON when the extension is .json, YAML otherwise).
    #[arg(long)]
    seed: Option<PathBuf>,
    /// List of edits to apply, in the same formats as --seed.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Inline edit applied after the script: add[:PARENT], remove:PATH,
    /// rename:PATH=KEY, retype:PATH=TYPE.
    #[arg(long = "edit", value_name = "EDIT")]
    edits: Vec<FieldEdit>,
    /// Spaces per indentation level in the preview, 0 for compact output.
    #[arg(long)]
    indent: Option<usize>,
    /// Keep children hidden instead of dropping them when a field stops being nested.
    #[arg(long)]
    retain_children: bool,
    /// Print the field rows before the preview.
    #[arg(long)]
    outline: bool,
    /// Print how the preview changed after every edit.
    #[arg(long)]
    diff: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match args.config.as_deref() {
        Some(path) => BuilderConfig::load(path)?,
        None => BuilderConfig::default(),
    };
    if let Some(indent) = args.indent {
        config.preview_indent = indent;
    }
    if args.retain_children {
        config.children_policy = ChildrenPolicy::Retain;
    }
    debug!(?config, "builder configured");

    let initial = args.seed.as_deref().map(load_seed).transpose()?;
    if let Some(fields) = initial.as_ref() {
        info!(fields = fields.len(), "seed loaded");
    }
    let mut state = FormState::new(initial, &config)?;

    let mut edits = match args.script.as_deref() {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };
    edits.extend(args.edits);

    let history = Rc::new(RefCell::new(vec![state.preview_json().to_string()]));
    let sink = Rc::clone(&history);
    state.subscribe(move |update| sink.borrow_mut().push(update.json.to_string()));

    let mut out = io::stdout().lock();
    for edit in &edits {
        let outcome = state.apply(edit).inspect_err(|err| {
            warn!(%edit, error = %err, "edit rejected");
        })?;
        if !outcome.is_applied() {
            warn!(%edit, "edit addressed no field");
            continue;
        }
        debug!(%edit, revision = state.revision(), "edit applied");

        if args.diff {
            let history = history.borrow();
            if let [.., before, after] = history.as_slice() {
                writeln!(out, "# {edit}")?;
                write!(out, "{}", render_diff(before, after, DIFF_CONTEXT))?;
            }
        }
    }

    if args.outline {
        writeln!(out, "{}", render_outline(state.fields()))?;
    }
    writeln!(out, "{}", state.preview_json())?;
    Ok(())
}

fn load_script(path: &Path) -> Result<Vec<FieldEdit>, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    let edits: Vec<FieldEdit> = match SeedFormat::from_path(path) {
        SeedFormat::Json => serde_json::from_str(raw.as_str())?,
        SeedFormat::Yaml => serde_yaml::from_str(raw.as_str())?,
    };
    info!(edits = edits.len(), path = %path.display(), "script loaded");
    Ok(edits)
}

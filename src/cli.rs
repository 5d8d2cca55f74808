use crate::config::{Config, load_config};
use crate::layout::{apply_auto_layout_with_rng, can_auto_layout};
use crate::layout_dump::write_view_dump;
use crate::model::{import_configuration, migrate_layout, reconcile_workflow};
use crate::validation::validate_configuration;
use crate::workflow::{UIWorkflowData, WorkflowConfiguration};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wfc", version, about = "Workflow canvas tools: reconcile, auto-layout and inspect workflow documents")]
pub struct Args {
    /// Input file (workflow or bare configuration JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// What to do with the input
    #[arg(short = 'm', long = "mode", value_enum, default_value = "view")]
    pub mode: Mode,

    /// Config file (JSON or JSON5) with layout/history overrides
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Seed for auto-layout jitter, for reproducible output
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Run auto-layout when importing a bare configuration
    #[arg(long = "import-layout", default_value_t = false)]
    pub import_layout: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Layout,
    Reconcile,
    Validate,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())
        .with_context(|| "Failed to load config file")?;

    let input = read_input(args.input.as_deref())?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };
    let workflow = load_workflow(&input, &config, args.import_layout, &mut rng)?;

    match args.mode {
        Mode::View => write_view_dump(args.output.as_deref(), &workflow)?,
        Mode::Reconcile => {
            let reconciled = reconcile_workflow(&migrate_layout(&workflow));
            write_workflow(args.output.as_deref(), &reconciled)?;
        }
        Mode::Layout => {
            if !can_auto_layout(&workflow) {
                return Err(anyhow::anyhow!("Workflow has no states to lay out"));
            }
            let laid_out = apply_auto_layout_with_rng(&workflow, &config.layout, &mut rng);
            write_workflow(args.output.as_deref(), &laid_out)?;
        }
        Mode::Validate => {
            let issues = validate_configuration(&workflow.configuration);
            if !issues.is_empty() {
                for issue in &issues {
                    eprintln!("- {issue}");
                }
                return Err(anyhow::anyhow!(
                    "{} validation issue(s) found",
                    issues.len()
                ));
            }
            tracing::info!(states = workflow.configuration.states.len(), "configuration is valid");
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("workflow_canvas=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

/// Accepts a full workflow document or a bare configuration. A bare
/// configuration is imported with a fresh layout.
fn load_workflow(
    input: &str,
    config: &Config,
    import_layout: bool,
    rng: &mut StdRng,
) -> Result<UIWorkflowData> {
    let raw: serde_json::Value = serde_json::from_str(input).context("Input is not valid JSON")?;
    if raw.get("configuration").is_some() {
        let workflow: UIWorkflowData =
            serde_json::from_value(raw).context("Input is not a valid workflow document")?;
        return Ok(workflow);
    }

    let configuration: WorkflowConfiguration =
        serde_json::from_value(raw).context("Input is not a valid workflow configuration")?;
    let imported = import_configuration(configuration);
    if import_layout && can_auto_layout(&imported) {
        return Ok(apply_auto_layout_with_rng(&imported, &config.layout, rng));
    }
    Ok(imported)
}

fn write_workflow(path: Option<&Path>, workflow: &UIWorkflowData) -> Result<()> {
    let json = serde_json::to_string_pretty(workflow)?;
    match path {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{
        "name": "tickets",
        "initialState": "open",
        "states": {
            "open": {"transitions": [{"name": "close", "next": "closed", "manual": true}]},
            "closed": {"transitions": []}
        }
    }"#;

    #[test]
    fn bare_configuration_is_imported() {
        let mut rng = StdRng::seed_from_u64(1);
        let wf = load_workflow(BARE, &Config::default(), false, &mut rng).unwrap();
        assert_eq!(wf.configuration.name, "tickets");
        assert_eq!(wf.layout.states.len(), 2);
    }

    #[test]
    fn workflow_document_round_trips() {
        let mut rng = StdRng::seed_from_u64(1);
        let wf = load_workflow(BARE, &Config::default(), false, &mut rng).unwrap();
        let text = serde_json::to_string(&wf).unwrap();
        let again = load_workflow(&text, &Config::default(), false, &mut rng).unwrap();
        assert_eq!(again, wf);
    }

    #[test]
    fn rejects_non_json_input() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(load_workflow("states:", &Config::default(), false, &mut rng).is_err());
    }

    #[test]
    fn parses_mode_flags() {
        let args = Args::parse_from(["wfc", "-i", "in.json", "-m", "layout", "--seed", "4"]);
        assert_eq!(args.mode, Mode::Layout);
        assert_eq!(args.seed, Some(4));
        assert!(!args.import_layout);
    }
}

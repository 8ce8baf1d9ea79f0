//! CLI command definitions and dispatch.

pub mod generate;
pub mod graph;
pub mod init;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use scorpion_common::config::{ProjectConfig, load_config};
use scorpion_compose::graph::ComponentGraph;

/// Scorpion — compile Score workloads into a Pulumi Go program.
#[derive(Parser, Debug)]
#[command(name = "scorpion", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Change to this directory before doing anything else.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialise a project directory or change its workload profile.
    Init(init::InitArgs),
    /// Add or update a Score workload and regenerate the program.
    Generate(generate::GenerateArgs),
    /// Show the provisioning order of the project's components.
    Plan(plan::PlanArgs),
    /// Print the component graph in Graphviz DOT format.
    Graph(graph::GraphArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the directory cannot be entered or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    if let Some(dir) = &cli.dir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    }
    let dir = Path::new(".");
    match cli.command {
        Command::Init(args) => init::execute(dir, &args),
        Command::Generate(args) => generate::execute(dir, &args),
        Command::Plan(args) => plan::execute(dir, &args),
        Command::Graph(args) => graph::execute(dir, &args),
    }
}

/// Loads the project in `dir` and builds its component graph.
///
/// # Errors
///
/// Returns an error if the project is missing or invalid, or the graph cannot be built.
pub fn load_project_graph(dir: &Path) -> anyhow::Result<(ProjectConfig, ComponentGraph)> {
    let (config, found) = load_config(dir)?;
    if !found {
        anyhow::bail!("no project found in {}, run `scorpion init` first", dir.display());
    }
    let graph = build_graph(&config)?;
    Ok((config, graph))
}

/// Validates the component entries of `config` and builds its graph.
///
/// # Errors
///
/// Returns an error if a component entry is invalid or the graph cannot be built.
pub fn build_graph(config: &ProjectConfig) -> anyhow::Result<ComponentGraph> {
    config.validate_components()?;
    Ok(scorpion_compose::build_from_config(config)?)
}

//! `scorpion graph` — Print the component graph as Graphviz DOT.

use std::path::Path;

use clap::Args;

/// Arguments for the `graph` command.
#[derive(Args, Debug)]
pub struct GraphArgs {}

/// Executes the `graph` command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or its graph cannot be built.
pub fn execute(dir: &Path, _args: &GraphArgs) -> anyhow::Result<()> {
    let (_, graph) = super::load_project_graph(dir)?;
    print!("{}", graph.to_dot());
    Ok(())
}

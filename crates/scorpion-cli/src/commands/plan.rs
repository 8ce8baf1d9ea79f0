//! `scorpion plan` — Display the provisioning order of the project's components.

use std::fmt::Write as _;
use std::path::Path;

use clap::Args;

use scorpion_compose::graph::ComponentGraph;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or its graph has a cycle.
pub fn execute(dir: &Path, _args: &PlanArgs) -> anyhow::Result<()> {
    let (_, graph) = super::load_project_graph(dir)?;
    print!("{}", render_plan(&graph)?);
    Ok(())
}

/// Formats the components of `graph` in provisioning order.
///
/// # Errors
///
/// Returns an error if the graph has a cycle.
pub fn render_plan(graph: &ComponentGraph) -> anyhow::Result<String> {
    let order = graph.dependency_order()?;
    let mut out = String::from("Provisioning Plan\n\n");
    for id in &order {
        let Some(node) = graph.nodes.get(id) else {
            continue;
        };
        let _ = writeln!(out, "  + {} ({id})", node.name);
        let _ = writeln!(
            out,
            "      component: {}.{}({})",
            node.package, node.constructor, node.args_type
        );
        if let Some(deps) = graph.dependencies_of(id) {
            for (alias, target) in deps {
                let target_name = graph
                    .nodes
                    .get(target)
                    .map_or(target.as_str(), |n| n.name.as_str());
                let _ = writeln!(out, "      {alias} -> {target_name}");
            }
        }
    }
    let _ = writeln!(out, "\n  {} component(s) will be provisioned.", order.len());
    Ok(out)
}

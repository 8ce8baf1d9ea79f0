//! Construction of the component graph from a list of workloads.
//!
//! Each workload contributes one workload node and one node per resource
//! alias. Resources with an `id` share a node across workloads; their
//! parameters must agree once resolved.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use scorpion_common::config::ProjectConfig;
use scorpion_common::error::{Result, ScorpionError};
use scorpion_common::types::{ComponentId, LocalAlias};
use scorpion_common::workload::Workload;

use crate::component::{ComponentDescriptor, ComponentLibrary};
use crate::graph::{ComponentGraph, ComponentInstance};
use crate::ident::{component_id, resource_path, workload_path};
use crate::normalize::workload_params;
use crate::resolver::{Scope, collect_dependencies};

/// Builds the graph for a project configuration.
///
/// # Errors
///
/// Returns an error if the component library does not compile or the graph
/// cannot be built.
pub fn build_from_config(config: &ProjectConfig) -> Result<ComponentGraph> {
    let library = ComponentLibrary::new(&config.resource_components)?;
    let default = ComponentDescriptor::from(&config.default_workload_component);
    build_component_graph(&config.workloads, &default, &library)
}

/// Builds the component graph for `workloads`, processed in order.
///
/// Every workload node uses `default`; resource nodes use the first matching
/// entry of `library`.
///
/// # Errors
///
/// Returns an error for an invalid or duplicate workload name, a resource
/// with no matching library entry, an unresolvable reference, conflicting
/// declarations of a shared resource, or two nodes sharing an identifier.
pub fn build_component_graph(
    workloads: &[Workload],
    default: &ComponentDescriptor,
    library: &ComponentLibrary,
) -> Result<ComponentGraph> {
    tracing::info!(
        workloads = workloads.len(),
        library = library.len(),
        "building component graph"
    );
    let mut graph = ComponentGraph::new();
    let mut seen = BTreeSet::new();
    let mut workload_ids = BTreeSet::new();

    for workload in workloads {
        let name = workload.name()?;
        if !seen.insert(name) {
            return Err(ScorpionError::Conflict {
                kind: "workload",
                id: name.to_string(),
                what: "declarations",
            });
        }
        add_workload(&mut graph, &mut workload_ids, workload, name, default, library)?;
    }

    tracing::info!(
        nodes = graph.nodes.len(),
        edges = graph.dependencies.values().map(BTreeMap::len).sum::<usize>(),
        "component graph built"
    );
    Ok(graph)
}

fn add_workload(
    graph: &mut ComponentGraph,
    workload_ids: &mut BTreeSet<ComponentId>,
    workload: &Workload,
    name: &str,
    default: &ComponentDescriptor,
    library: &ComponentLibrary,
) -> Result<()> {
    let path = workload_path(name);
    let workload_id = component_id(&path);

    let aliases: BTreeMap<LocalAlias, ComponentId> = workload
        .resources
        .iter()
        .map(|(alias, resource)| {
            (
                LocalAlias::new(alias.as_str()),
                component_id(&resource_path(name, alias, resource)),
            )
        })
        .collect();
    let scope = Scope::new(Some(&workload.metadata), &aliases);
    let mut workload_deps = BTreeMap::new();

    for (alias, resource) in &workload.resources {
        let identity = resource_path(name, alias, resource);
        let resource_id = component_id(&identity);
        if workload_ids.contains(&resource_id) {
            return Err(identity_conflict("resource", identity));
        }

        let node = match graph.nodes.entry(resource_id.clone()) {
            Entry::Occupied(entry) if entry.get().name != identity => {
                return Err(identity_conflict("resource", identity));
            }
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let descriptor = library.lookup(
                    &resource.resource_type,
                    resource.class_or_default(),
                    &identity,
                )?;
                tracing::debug!(
                    node = %resource_id,
                    name = %identity,
                    package = %descriptor.package,
                    "adding resource node"
                );
                entry.insert(ComponentInstance::new(descriptor, identity.as_str()))
            }
        };

        if let Some(params) = &resource.params {
            let (resolved, _) = collect_dependencies(params, &scope)?;
            match &node.params {
                Some(existing) if *existing != resolved => {
                    return Err(ScorpionError::Conflict {
                        kind: "resource",
                        id: identity,
                        what: "parameters",
                    });
                }
                Some(_) => {}
                None => {
                    node.params = Some(resolved);
                    node.params_defined_by = Some(workload_id.clone());
                }
            }
        }

        if let Some(params) = &node.params {
            let (_, deps) = collect_dependencies(params, &scope)?;
            if !deps.is_empty() {
                let existing = graph.dependencies.entry(resource_id.clone()).or_default();
                merge_edges(existing, deps, &identity)?;
            }
        }

        tracing::debug!(from = %workload_id, alias = %alias, to = %resource_id, "adding edge");
        let _ = workload_deps.insert(LocalAlias::new(alias.as_str()), resource_id);
    }

    let params = workload_params(workload)?;
    let _ = collect_dependencies(&params, &scope)?;
    let mut node = ComponentInstance::new(default, path.as_str());
    node.params = Some(params);
    node.params_defined_by = Some(workload_id.clone());
    tracing::debug!(node = %workload_id, name = %path, "adding workload node");
    match graph.nodes.entry(workload_id.clone()) {
        Entry::Occupied(_) => return Err(identity_conflict("workload", path)),
        Entry::Vacant(entry) => {
            let _ = entry.insert(node);
        }
    }
    let _ = workload_ids.insert(workload_id.clone());
    if !workload_deps.is_empty() {
        let _ = graph.dependencies.insert(workload_id, workload_deps);
    }
    Ok(())
}

/// A node identifier claimed by two different nodes.
fn identity_conflict(kind: &'static str, id: String) -> ScorpionError {
    ScorpionError::Conflict {
        kind,
        id,
        what: "identity",
    }
}

fn merge_edges(
    existing: &mut BTreeMap<LocalAlias, ComponentId>,
    incoming: BTreeMap<LocalAlias, ComponentId>,
    identity: &str,
) -> Result<()> {
    for (alias, target) in incoming {
        match existing.entry(alias) {
            Entry::Occupied(entry) if *entry.get() != target => {
                return Err(ScorpionError::Conflict {
                    kind: "resource",
                    id: identity.to_string(),
                    what: "dependencies",
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                let _ = entry.insert(target);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use scorpion_common::value::{Value, ValueMap};
    use scorpion_common::workload::{Container, Resource};

    use super::*;

    fn workload(name: &str, resources: &[(&str, Resource)]) -> Workload {
        let mut w = Workload::default();
        let _ = w.metadata.insert("name".into(), Value::from(name));
        w.resources = resources
            .iter()
            .map(|(alias, r)| ((*alias).to_string(), r.clone()))
            .collect();
        w
    }

    fn resource(resource_type: &str, id: Option<&str>, params: Option<ValueMap>) -> Resource {
        Resource {
            resource_type: resource_type.into(),
            id: id.map(Into::into),
            params,
            ..Resource::default()
        }
    }

    fn params(entries: &[(&str, &str)]) -> ValueMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::from(*v)))
            .collect()
    }

    fn library() -> ComponentLibrary {
        use scorpion_common::config::{ComponentEntry, ResourceComponentEntry};
        ComponentLibrary::new(&[ResourceComponentEntry {
            component: ComponentEntry {
                package: "example.com/echo".into(),
                constructor_func: "NewEcho".into(),
                args_struct: "EchoArgs".into(),
            },
            resource_type: "thing".into(),
            ..ResourceComponentEntry::default()
        }])
        .expect("library")
    }

    fn build(workloads: &[Workload]) -> Result<ComponentGraph> {
        build_component_graph(workloads, &ComponentDescriptor::default(), &library())
    }

    #[test]
    fn empty_project_is_empty_graph() {
        let g = build(&[]).expect("build");
        assert!(g.nodes.is_empty());
        assert!(g.dependencies.is_empty());
    }

    #[test]
    fn workload_without_resources_has_no_edges() {
        let g = build(&[workload("foo", &[])]).expect("build");
        let id = ComponentId::new("workloadFoo6d39e786");
        assert_eq!(g.nodes[&id].name, "workload.foo");
        assert_eq!(g.nodes[&id].params_defined_by.as_ref(), Some(&id));
        assert!(g.dependencies.is_empty());
    }

    #[test]
    fn duplicate_workload_names_conflict() {
        let err = build(&[workload("foo", &[]), workload("foo", &[])]).expect_err("duplicate");
        assert!(matches!(err, ScorpionError::Conflict { kind: "workload", .. }));
    }

    #[test]
    fn resource_reference_creates_one_edge() {
        let w = workload(
            "foo",
            &[
                ("a", resource("thing", None, Some(params(&[("p", "${resources.b.x}")])))),
                ("b", resource("thing", None, None)),
            ],
        );
        let g = build(&[w]).expect("build");
        let a = component_id("workload.foo.a");
        let b = component_id("workload.foo.b");
        let deps = g.dependencies_of(&a).expect("a has deps");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps.get(&LocalAlias::new("b")), Some(&b));
        assert!(g.dependencies_of(&b).is_none());
    }

    #[test]
    fn metadata_reference_creates_no_edge() {
        let w = workload(
            "foo",
            &[("a", resource("thing", None, Some(params(&[("n", "${metadata.name}")]))))],
        );
        let g = build(&[w]).expect("build");
        let a = component_id("workload.foo.a");
        assert!(g.dependencies_of(&a).is_none());
        assert_eq!(
            g.nodes[&a].params.as_ref().expect("params")["n"],
            Value::from("foo")
        );
    }

    #[test]
    fn shared_resource_with_equal_params_merges() {
        let shared = || resource("thing", Some("db"), Some(params(&[("size", "small")])));
        let g = build(&[
            workload("foo", &[("db", shared())]),
            workload("bar", &[("database", shared())]),
        ])
        .expect("build");
        let db = component_id("shared.db");
        assert_eq!(g.nodes.len(), 3);
        assert_eq!(
            g.nodes[&db].params_defined_by,
            Some(component_id("workload.foo"))
        );
    }

    #[test]
    fn shared_resource_params_are_compared_after_resolution() {
        let shared =
            || resource("thing", Some("db"), Some(params(&[("owner", "${metadata.team}")])));
        let mut foo = workload("foo", &[("db", shared())]);
        let _ = foo.metadata.insert("team".into(), Value::from("core"));
        let mut bar = workload("bar", &[("db", shared())]);
        let _ = bar.metadata.insert("team".into(), Value::from("edge"));
        let err = build(&[foo, bar]).expect_err("conflict");
        let msg = err.to_string();
        assert!(
            msg.contains("duplicate resource \"shared.db\" with conflicting parameters"),
            "got: {msg}"
        );
    }

    #[test]
    fn params_supplied_once_are_kept() {
        let g = build(&[
            workload("foo", &[("db", resource("thing", Some("db"), None))]),
            workload("bar", &[("db", resource("thing", Some("db"), Some(params(&[("k", "v")]))))]),
        ])
        .expect("build");
        let db = &g.nodes[&component_id("shared.db")];
        assert_eq!(db.params_defined_by, Some(component_id("workload.bar")));
    }

    #[test]
    fn disagreeing_edges_conflict() {
        let shared = resource("thing", Some("s"), Some(params(&[("u", "${resources.dep.x}")])));
        let foo = workload(
            "foo",
            &[("s", shared.clone()), ("dep", resource("thing", None, None))],
        );
        let bar = workload("bar", &[("s", shared), ("dep", resource("thing", None, None))]);
        let err = build(&[foo, bar]).expect_err("conflicting edges");
        assert!(matches!(err, ScorpionError::Conflict { what: "dependencies", .. }));
    }

    #[test]
    fn unknown_alias_is_a_reference_error() {
        let w = workload(
            "foo",
            &[("a", resource("thing", None, Some(params(&[("p", "${resources.nope}")]))))],
        );
        let err = build(&[w]).expect_err("unknown alias");
        assert!(matches!(err, ScorpionError::Reference { .. }));
    }

    #[test]
    fn workload_colliding_with_earlier_resource_conflicts() {
        let foo = workload(
            "foo",
            &[("a", resource("thing", None, Some(params(&[("size", "10")]))))],
        );
        let err = build(&[foo, workload("foo.a", &[])]).expect_err("same identifier");
        assert!(
            matches!(
                err,
                ScorpionError::Conflict { kind: "workload", what: "identity", ref id }
                    if id == "workload.foo.a"
            ),
            "got: {err}"
        );
    }

    #[test]
    fn resource_colliding_with_earlier_workload_conflicts() {
        let foo = workload("foo", &[("a", resource("thing", None, None))]);
        let err = build(&[workload("foo.a", &[]), foo]).expect_err("same identifier");
        assert!(
            matches!(
                err,
                ScorpionError::Conflict { kind: "resource", what: "identity", ref id }
                    if id == "workload.foo.a"
            ),
            "got: {err}"
        );
    }

    #[test]
    fn container_reference_to_undeclared_alias_fails_the_build() {
        let mut w = workload("foo", &[]);
        let mut variables = BTreeMap::new();
        let _ = variables.insert("DB_HOST".to_string(), "${resources.db.host}".to_string());
        let _ = w.containers.insert(
            "main".into(),
            Container {
                image: "nginx".into(),
                variables: Some(variables),
                ..Container::default()
            },
        );
        let err = build(&[w]).expect_err("unknown alias");
        let msg = err.to_string();
        assert!(msg.contains("unknown resource alias 'db'"), "got: {msg}");
        assert!(msg.contains("containers.main.variables.DB_HOST"), "got: {msg}");
    }

    #[test]
    fn unmatched_resource_type_is_a_lookup_error() {
        let w = workload("foo", &[("a", resource("postgres", None, None))]);
        let err = build(&[w]).expect_err("no match");
        assert!(matches!(err, ScorpionError::Lookup { ref id, .. } if id == "workload.foo.a"));
    }

    #[test]
    fn building_twice_is_identical() {
        let make = || {
            vec![
                workload(
                    "foo",
                    &[
                        ("a", resource("thing", None, Some(params(&[("p", "${resources.b.x}")])))),
                        ("b", resource("thing", Some("thing"), None)),
                    ],
                ),
                workload("bar", &[("b", resource("thing", Some("thing"), None))]),
            ]
        };
        let first = build(&make()).expect("first");
        let second = build(&make()).expect("second");
        assert_eq!(first, second);
        assert_eq!(
            first.dependency_order().expect("order"),
            second.dependency_order().expect("order")
        );
    }
}

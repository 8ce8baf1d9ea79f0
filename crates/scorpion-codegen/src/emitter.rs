//! Translation of a component graph into a Pulumi Go program.
//!
//! Nodes are emitted in dependency order. Each becomes a constructor call
//! whose argument struct is built from the node's parameter tree, followed
//! by an error check and a debug log line.

use std::collections::{BTreeMap, BTreeSet};

use scorpion_common::constants::{GENERATED_PACKAGE, PULUMI_PACKAGE};
use scorpion_common::error::{Result, ScorpionError};
use scorpion_common::types::{ComponentId, LocalAlias};
use scorpion_common::value::{Value, ValueMap};
use scorpion_compose::graph::{ComponentGraph, ComponentInstance};
use scorpion_compose::ident::{is_exported_identifier, to_field_name};
use scorpion_compose::resolver::{
    Interpolation, OutputRef, Scope, TemplateArg, at_path, interpolate,
};

use crate::go::{Block, Expr, File, FuncDecl, Param, Stmt, render_file};

/// Builds and renders the program for `graph`.
///
/// # Errors
///
/// Returns an error if the graph has a cycle, an edge targets a missing node,
/// or a parameter cannot be translated.
pub fn generate_program(graph: &ComponentGraph) -> Result<String> {
    let file = build_program(graph)?;
    Ok(render_file(&file))
}

/// Builds the program's syntax tree for `graph`.
///
/// # Errors
///
/// Returns an error if the graph has a cycle, an edge targets a missing node,
/// or a parameter cannot be translated.
pub fn build_program(graph: &ComponentGraph) -> Result<File> {
    tracing::info!(nodes = graph.nodes.len(), "emitting program");
    let mut body = Block::new();
    graph.visit_in_dependency_order(|id| {
        let node = graph
            .nodes
            .get(id)
            .ok_or_else(|| ScorpionError::MissingNode { id: id.to_string() })?;
        tracing::debug!(node = %id, name = %node.name, "emitting node");
        body.extend(node_statements(graph, id, node)?);
        Ok(())
    })?;
    body.push(Stmt::Return(vec![Expr::Nil]));

    let run = Expr::qual(PULUMI_PACKAGE, "Run").call(vec![Expr::Func {
        params: vec![Param {
            name: "ctx".into(),
            ty: Expr::unary("*", Expr::qual(PULUMI_PACKAGE, "Context")),
        }],
        result: Some(Box::new(Expr::ident("error"))),
        body,
    }]);

    Ok(File {
        package: GENERATED_PACKAGE.to_string(),
        funcs: vec![FuncDecl {
            name: "main".into(),
            params: vec![],
            result: None,
            body: vec![Stmt::Expr(run)],
        }],
    })
}

fn node_statements(
    graph: &ComponentGraph,
    id: &ComponentId,
    node: &ComponentInstance,
) -> Result<Block> {
    let no_deps = BTreeMap::new();
    let aliases: &BTreeMap<LocalAlias, ComponentId> = graph.dependencies_of(id).unwrap_or(&no_deps);
    let metadata = node
        .params_defined_by
        .as_ref()
        .and_then(|owner| graph.nodes.get(owner))
        .and_then(|owner| owner.params.as_ref())
        .and_then(|params| params.get("metadata"))
        .and_then(Value::as_map);
    let scope = Scope::new(metadata, aliases);

    let fields = match &node.params {
        Some(params) => struct_fields(params, &scope)?,
        None => Vec::new(),
    };
    let args = Expr::unary("&", Expr::qual(&node.package, &node.args_type).dict(fields));
    let constructor = Expr::qual(&node.package, &node.constructor).call(vec![
        Expr::ident("ctx"),
        Expr::string(&node.name),
        args,
    ]);
    let log = Expr::ident("ctx").dot("Log").dot("Debug").call(vec![
        Expr::string("provisioned"),
        Expr::unary(
            "&",
            Expr::qual(PULUMI_PACKAGE, "LogArgs")
                .dict(vec![(Expr::ident("Resource"), Expr::ident(id.as_str()))]),
        ),
    ]);

    Ok(vec![
        Stmt::Define {
            names: vec![id.to_string(), "err".into()],
            value: constructor,
        },
        Stmt::If {
            cond: Expr::ident("err").binary("!=", Expr::Nil),
            body: vec![Stmt::Return(vec![Expr::ident("err")])],
        },
        Stmt::Assign {
            target: Expr::ident("_"),
            value: log,
        },
        Stmt::Blank,
    ])
}

/// Converts top-level parameters into argument struct fields.
fn struct_fields(params: &ValueMap, scope: &Scope<'_>) -> Result<Vec<(Expr, Expr)>> {
    let mut seen = BTreeSet::new();
    let mut fields = Vec::with_capacity(params.len());
    for (key, value) in params {
        let field = exported_name(key, key)?;
        if !seen.insert(field.clone()) {
            return Err(ScorpionError::shape(
                key.as_str(),
                format!("parameter name converts to the field {field} more than once"),
            ));
        }
        fields.push((Expr::ident(field), translate(key, value, scope)?));
    }
    Ok(fields)
}

fn exported_name(path: &str, raw: &str) -> Result<String> {
    let name = to_field_name(raw);
    if is_exported_identifier(&name) {
        Ok(name)
    } else {
        Err(ScorpionError::shape(
            path,
            format!("'{raw}' does not convert to an exported Go identifier"),
        ))
    }
}

fn pulumi(name: &str) -> Expr {
    Expr::qual(PULUMI_PACKAGE, name)
}

/// Translates a parameter value, interpreting placeholders in strings.
fn translate(path: &str, value: &Value, scope: &Scope<'_>) -> Result<Expr> {
    match value {
        Value::String(s) => match interpolate(s, scope).map_err(|e| at_path(e, path))? {
            Interpolation::Literal(text) => Ok(pulumi("String").call(vec![Expr::Str(text)])),
            Interpolation::Value(v) => translate_literal(path, &v),
            Interpolation::Output(output) => accessor(path, &output),
            Interpolation::Template { format, args } => {
                let mut call_args = vec![Expr::Str(format)];
                for arg in args {
                    call_args.push(match arg {
                        TemplateArg::Value(v) => go_literal(path, &v)?,
                        TemplateArg::Output(output) => accessor(path, &output)?,
                    });
                }
                Ok(pulumi("Sprintf").call(call_args))
            }
        },
        Value::List(items) => Ok(pulumi("Array").list(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| translate(&format!("{path}[{i}]"), item, scope))
                .collect::<Result<_>>()?,
        )),
        Value::Map(map) => Ok(pulumi("Map").dict(
            map.iter()
                .map(|(k, v)| {
                    let value = translate(&format!("{path}.{k}"), v, scope)?;
                    Ok::<_, ScorpionError>((Expr::string(k), value))
                })
                .collect::<Result<_>>()?,
        )),
        scalar => translate_scalar(path, scalar),
    }
}

/// Translates an already-resolved value; strings are taken verbatim.
fn translate_literal(path: &str, value: &Value) -> Result<Expr> {
    match value {
        Value::String(s) => Ok(pulumi("String").call(vec![Expr::string(s)])),
        Value::List(items) => Ok(pulumi("Array").list(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| translate_literal(&format!("{path}[{i}]"), item))
                .collect::<Result<_>>()?,
        )),
        Value::Map(map) => Ok(pulumi("Map").dict(
            map.iter()
                .map(|(k, v)| {
                    let value = translate_literal(&format!("{path}.{k}"), v)?;
                    Ok::<_, ScorpionError>((Expr::string(k), value))
                })
                .collect::<Result<_>>()?,
        )),
        scalar => translate_scalar(path, scalar),
    }
}

fn translate_scalar(path: &str, value: &Value) -> Result<Expr> {
    Ok(match value {
        Value::Null => Expr::Nil,
        Value::Bool(b) => pulumi("Bool").call(vec![Expr::Bool(*b)]),
        Value::Int(i) => pulumi("Int").call(vec![Expr::Int(*i)]),
        Value::Float(f) => pulumi("Float64").call(vec![float(path, *f)?]),
        Value::String(s) => pulumi("String").call(vec![Expr::string(s)]),
        Value::List(_) | Value::Map(_) => go_literal(path, value)?,
    })
}

/// A plain Go literal for a template argument; composites become JSON text.
fn go_literal(path: &str, value: &Value) -> Result<Expr> {
    Ok(match value {
        Value::Null => Expr::Nil,
        Value::Bool(b) => Expr::Bool(*b),
        Value::Int(i) => Expr::Int(*i),
        Value::Float(f) => float(path, *f)?,
        Value::String(s) => Expr::string(s),
        Value::List(_) | Value::Map(_) => Expr::Str(value.to_json_text(path)?),
    })
}

fn float(path: &str, f: f64) -> Result<Expr> {
    if f.is_finite() {
        Ok(Expr::Float(f))
    } else {
        Err(ScorpionError::shape(path, format!("float {f} has no Go literal")))
    }
}

/// `node.Field.Field...` for a dependency output.
fn accessor(path: &str, output: &OutputRef) -> Result<Expr> {
    output
        .fields
        .iter()
        .try_fold(Expr::ident(output.node.as_str()), |expr, field| {
            Ok(expr.dot(exported_name(path, field)?))
        })
}

//! Deterministic Go source printer.
//!
//! Imports are collected from every qualified name in the file, sorted by
//! path and given an alias derived from the last meaningful path element.
//! Keyed composite literals with two or more entries are printed one entry
//! per line; list literals and smaller keyed literals stay inline.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use super::ast::{Block, Expr, File, FuncDecl, Param, Stmt};

/// Identifiers an import alias must never shadow.
const RESERVED: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var", "ctx", "err", "main", "nil", "true",
    "false",
];

/// Renders a complete Go source file.
#[must_use]
pub fn render_file(file: &File) -> String {
    let aliases = assign_aliases(&file.packages());
    let printer = Printer { aliases: &aliases };

    let mut out = format!("package {}\n\n", file.package);
    match aliases.len() {
        0 => {}
        1 => {
            for (path, alias) in &aliases {
                let _ = writeln!(out, "import {alias} {}\n", quote(path));
            }
        }
        _ => {
            out.push_str("import (\n");
            for (path, alias) in &aliases {
                let _ = writeln!(out, "\t{alias} {}", quote(path));
            }
            out.push_str(")\n\n");
        }
    }

    let funcs: Vec<String> = file.funcs.iter().map(|f| printer.func_decl(f)).collect();
    out.push_str(&funcs.join("\n"));
    out
}

/// Maps each import path to a unique alias, in path order.
#[must_use]
pub fn assign_aliases(packages: &BTreeSet<&str>) -> BTreeMap<String, String> {
    let mut taken: BTreeSet<String> = RESERVED.iter().map(|s| (*s).to_string()).collect();
    let mut aliases = BTreeMap::new();
    for path in packages {
        let base = guess_alias(path);
        let mut alias = base.clone();
        let mut n = 1;
        while taken.contains(&alias) {
            alias = format!("{base}{n}");
            n += 1;
        }
        let _ = taken.insert(alias.clone());
        let _ = aliases.insert((*path).to_string(), alias);
    }
    aliases
}

fn is_version_element(element: &str) -> bool {
    element.len() > 1
        && element.starts_with('v')
        && element[1..].chars().all(|c| c.is_ascii_digit())
}

/// Derives an import alias from the last non-version element of `path`.
#[must_use]
pub fn guess_alias(path: &str) -> String {
    let elements: Vec<&str> = path.split('/').filter(|e| !e.is_empty()).collect();
    let mut element = elements.last().copied().unwrap_or_default();
    if is_version_element(element) && elements.len() > 1 {
        element = elements[elements.len() - 2];
    }
    let element = element.strip_prefix("go-").unwrap_or(element);
    let element = element.strip_suffix("-go").unwrap_or(element);
    let mut alias: String = element
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if !alias.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        alias.insert_str(0, "pkg");
    }
    alias
}

/// Quotes `s` as a Go interpreted string literal.
#[must_use]
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{0b}' => out.push_str("\\v"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn tabs(n: usize) -> String {
    "\t".repeat(n)
}

struct Printer<'a> {
    aliases: &'a BTreeMap<String, String>,
}

impl Printer<'_> {
    fn func_decl(&self, func: &FuncDecl) -> String {
        let mut out = format!("func {}({})", func.name, self.params(&func.params));
        if let Some(result) = &func.result {
            let _ = write!(out, " {}", self.expr(result, 0));
        }
        out.push_str(" {\n");
        self.block(&func.body, 1, &mut out);
        out.push_str("}\n");
        out
    }

    fn params(&self, params: &[Param]) -> String {
        params
            .iter()
            .map(|p| format!("{} {}", p.name, self.expr(&p.ty, 0)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn block(&self, block: &Block, indent: usize, out: &mut String) {
        for stmt in block {
            self.stmt(stmt, indent, out);
        }
    }

    fn stmt(&self, stmt: &Stmt, indent: usize, out: &mut String) {
        if matches!(stmt, Stmt::Blank) {
            out.push('\n');
            return;
        }
        out.push_str(&tabs(indent));
        match stmt {
            Stmt::Define { names, value } => {
                let _ = write!(out, "{} := {}", names.join(", "), self.expr(value, indent));
            }
            Stmt::Assign { target, value } => {
                let _ = write!(
                    out,
                    "{} = {}",
                    self.expr(target, indent),
                    self.expr(value, indent)
                );
            }
            Stmt::If { cond, body } => {
                let _ = writeln!(out, "if {} {{", self.expr(cond, indent));
                self.block(body, indent + 1, out);
                out.push_str(&tabs(indent));
                out.push('}');
            }
            Stmt::Return(values) => {
                out.push_str("return");
                if !values.is_empty() {
                    out.push(' ');
                    out.push_str(&self.exprs(values, indent));
                }
            }
            Stmt::Expr(e) => out.push_str(&self.expr(e, indent)),
            Stmt::Blank => {}
        }
        out.push('\n');
    }

    fn exprs(&self, exprs: &[Expr], indent: usize) -> String {
        exprs
            .iter()
            .map(|e| self.expr(e, indent))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expr(&self, expr: &Expr, indent: usize) -> String {
        match expr {
            Expr::Ident(name) => name.clone(),
            Expr::Qual { package, name } => {
                let alias = self.aliases.get(package).map_or(package.as_str(), String::as_str);
                format!("{alias}.{name}")
            }
            Expr::Nil => "nil".to_string(),
            Expr::Bool(b) => b.to_string(),
            Expr::Int(i) => i.to_string(),
            Expr::Float(f) => format!("{f:?}"),
            Expr::Str(s) => quote(s),
            Expr::Selector { base, field } => format!("{}.{field}", self.expr(base, indent)),
            Expr::Call { func, args } => {
                format!("{}({})", self.expr(func, indent), self.exprs(args, indent))
            }
            Expr::List { ty, items } => {
                format!("{}{{{}}}", self.expr(ty, indent), self.exprs(items, indent))
            }
            Expr::Dict { ty, entries } => self.dict(ty, entries, indent),
            Expr::Unary { op, operand } => format!("{op}{}", self.expr(operand, indent)),
            Expr::Binary { lhs, op, rhs } => {
                format!("{} {op} {}", self.expr(lhs, indent), self.expr(rhs, indent))
            }
            Expr::Func {
                params,
                result,
                body,
            } => {
                let mut out = format!("func({})", self.params(params));
                if let Some(result) = result {
                    let _ = write!(out, " {}", self.expr(result, indent));
                }
                out.push_str(" {\n");
                self.block(body, indent + 1, &mut out);
                out.push_str(&tabs(indent));
                out.push('}');
                out
            }
        }
    }

    fn dict(&self, ty: &Expr, entries: &[(Expr, Expr)], indent: usize) -> String {
        let ty = self.expr(ty, indent);
        if entries.len() < 2 {
            let body = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", self.expr(k, indent), self.expr(v, indent)))
                .collect::<Vec<_>>()
                .join(", ");
            return format!("{ty}{{{body}}}");
        }
        let mut rendered: Vec<(String, String)> = entries
            .iter()
            .map(|(k, v)| (self.expr(k, indent + 1), self.expr(v, indent + 1)))
            .collect();
        rendered.sort_by(|a, b| a.0.cmp(&b.0));
        let mut out = format!("{ty}{{\n");
        for (k, v) in rendered {
            let _ = writeln!(out, "{}{k}: {v},", tabs(indent + 1));
        }
        out.push_str(&tabs(indent));
        out.push('}');
        out
    }
}

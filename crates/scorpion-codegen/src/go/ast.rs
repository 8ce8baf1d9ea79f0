//! Go syntax tree.
//!
//! Package-qualified names carry the full import path; the printer decides
//! the local alias for each path.

use std::collections::BTreeSet;

/// A Go expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A local identifier.
    Ident(String),
    /// A name exported by another package.
    Qual {
        /// Import path of the package.
        package: String,
        /// Exported name.
        name: String,
    },
    /// `nil`.
    Nil,
    /// `true` or `false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// Interpreted string literal.
    Str(String),
    /// `base.field`.
    Selector {
        /// Expression the field is selected from.
        base: Box<Expr>,
        /// Field name.
        field: String,
    },
    /// `func(args...)`.
    Call {
        /// Callee.
        func: Box<Expr>,
        /// Arguments in order.
        args: Vec<Expr>,
    },
    /// `Type{a, b}`.
    List {
        /// Composite type.
        ty: Box<Expr>,
        /// Elements in order.
        items: Vec<Expr>,
    },
    /// `Type{k: v, ...}`; entries are printed sorted by rendered key.
    Dict {
        /// Composite type.
        ty: Box<Expr>,
        /// Keyed entries.
        entries: Vec<(Expr, Expr)>,
    },
    /// Prefix operator such as `&` or `*`.
    Unary {
        /// Operator text.
        op: &'static str,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Infix operator such as `!=`.
    Binary {
        /// Left operand.
        lhs: Box<Expr>,
        /// Operator text.
        op: &'static str,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Function literal.
    Func {
        /// Parameters.
        params: Vec<Param>,
        /// Result type, if any.
        result: Option<Box<Expr>>,
        /// Body statements.
        body: Block,
    },
}

/// A statement list.
pub type Block = Vec<Stmt>;

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: Expr,
}

/// A Go statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `a, b := value`.
    Define {
        /// Names being declared.
        names: Vec<String>,
        /// Right-hand side.
        value: Expr,
    },
    /// `target = value`.
    Assign {
        /// Left-hand side.
        target: Expr,
        /// Right-hand side.
        value: Expr,
    },
    /// `if cond { ... }`.
    If {
        /// Condition.
        cond: Expr,
        /// Statements run when the condition holds.
        body: Block,
    },
    /// `return a, b`.
    Return(Vec<Expr>),
    /// An expression evaluated for its effect.
    Expr(Expr),
    /// An empty line.
    Blank,
}

/// A top-level function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    /// Function name.
    pub name: String,
    /// Parameters.
    pub params: Vec<Param>,
    /// Result type, if any.
    pub result: Option<Expr>,
    /// Body statements.
    pub body: Block,
}

/// A Go source file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Package clause name.
    pub package: String,
    /// Function declarations in order.
    pub funcs: Vec<FuncDecl>,
}

impl Expr {
    /// Creates a local identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// Creates a package-qualified name.
    pub fn qual(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Qual {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Creates a string literal.
    pub fn string(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// Selects `field` from `self`.
    #[must_use]
    pub fn dot(self, field: impl Into<String>) -> Self {
        Self::Selector {
            base: Box::new(self),
            field: field.into(),
        }
    }

    /// Calls `self` with `args`.
    #[must_use]
    pub fn call(self, args: Vec<Self>) -> Self {
        Self::Call {
            func: Box::new(self),
            args,
        }
    }

    /// Builds a list composite literal of type `self`.
    #[must_use]
    pub fn list(self, items: Vec<Self>) -> Self {
        Self::List {
            ty: Box::new(self),
            items,
        }
    }

    /// Builds a keyed composite literal of type `self`.
    #[must_use]
    pub fn dict(self, entries: Vec<(Self, Self)>) -> Self {
        Self::Dict {
            ty: Box::new(self),
            entries,
        }
    }

    /// Applies a prefix operator.
    #[must_use]
    pub fn unary(op: &'static str, operand: Self) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Applies an infix operator.
    #[must_use]
    pub fn binary(self, op: &'static str, rhs: Self) -> Self {
        Self::Binary {
            lhs: Box::new(self),
            op,
            rhs: Box::new(rhs),
        }
    }

    pub(crate) fn collect_packages<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::Qual { package, .. } => {
                let _ = out.insert(package);
            }
            Self::Selector { base, .. } => base.collect_packages(out),
            Self::Call { func, args } => {
                func.collect_packages(out);
                args.iter().for_each(|a| a.collect_packages(out));
            }
            Self::List { ty, items } => {
                ty.collect_packages(out);
                items.iter().for_each(|i| i.collect_packages(out));
            }
            Self::Dict { ty, entries } => {
                ty.collect_packages(out);
                for (k, v) in entries {
                    k.collect_packages(out);
                    v.collect_packages(out);
                }
            }
            Self::Unary { operand, .. } => operand.collect_packages(out),
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_packages(out);
                rhs.collect_packages(out);
            }
            Self::Func {
                params,
                result,
                body,
            } => {
                params.iter().for_each(|p| p.ty.collect_packages(out));
                if let Some(r) = result {
                    r.collect_packages(out);
                }
                collect_block_packages(body, out);
            }
            Self::Ident(_)
            | Self::Nil
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Str(_) => {}
        }
    }
}

pub(crate) fn collect_block_packages<'a>(block: &'a [Stmt], out: &mut BTreeSet<&'a str>) {
    for stmt in block {
        match stmt {
            Stmt::Define { value, .. } | Stmt::Expr(value) => value.collect_packages(out),
            Stmt::Assign { target, value } => {
                target.collect_packages(out);
                value.collect_packages(out);
            }
            Stmt::If { cond, body } => {
                cond.collect_packages(out);
                collect_block_packages(body, out);
            }
            Stmt::Return(values) => values.iter().for_each(|v| v.collect_packages(out)),
            Stmt::Blank => {}
        }
    }
}

impl File {
    /// Import paths referenced anywhere in the file, sorted.
    #[must_use]
    pub fn packages(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        for func in &self.funcs {
            func.params.iter().for_each(|p| p.ty.collect_packages(&mut out));
            if let Some(r) = &func.result {
                r.collect_packages(&mut out);
            }
            collect_block_packages(&func.body, &mut out);
        }
        out
    }
}

//! Go source generation.
//!
//! [`ast`] models just enough of Go for provisioning programs; [`render`]
//! prints it the way `gofmt` would lay it out.

pub mod ast;
pub mod render;

pub use ast::{Block, Expr, File, FuncDecl, Param, Stmt};
pub use render::render_file;

//! # Clove Path Language - Syntax Tree
//!
//! This module defines the tokens and syntax tree of the clove path language,
//! a small notation for addressing one value nested inside another.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - Syntax tree nodes produced by the parser
//!
//! ## Quick Start
//!
//! ```text
//! $.users[0]['display.name']
//! ```
//!
//! Starting from the root, take field `users`, its first element, and the
//! field literally named `display.name`.
//!
//! ## Grammar
//!
//! ```text
//! query      := first (selector | index)*
//! first      := ROOT | bare_string | '.' bare_string | index | ε
//! selector   := '.' bare_string
//! index      := '[' (STRING | INT) ']'
//! ```
//!
//! ### Bracket Access
//!
//! Inside brackets a quoted string is a field name and a number is an index:
//!
//! - `["a.b"]` / `['a.b']` → field `a.b`
//! - `[3]` → element 3
//!
//! Quoted strings only know two escapes: `\\` and the closing quote itself.
//!
//! ### Leading Root
//!
//! The `$` marker is optional; `$.a` and `a` address the same value. It is
//! kept in the tree so the path renders back the way it was written.
pub mod nodes;
pub mod tokens;

pub use nodes::Node;
pub use tokens::{Token, TokenKind};

pub mod ast;
#[cfg(feature = "json")]
pub mod convert;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod query;
pub mod value;

pub use ast::{Node, Token, TokenKind};
#[cfg(feature = "json")]
pub use convert::{from_json, to_json};
pub use error::{Error, Result};
pub use evaluator::{ExtractFn, Handle, Hook, Step};
pub use lexer::{Lexer, Position};
pub use options::{FieldNameGetter, InlinePredicate, Options};
pub use parser::{ParseError, ParseErrors, Parser};
pub use query::{build_query, parse_reader, parse_str, Query};
pub use value::{
    Describe, Field, IndexLookup, KeyLookup, KeyLookupContext, LookupContext, Map, Object, Record,
    Value,
};

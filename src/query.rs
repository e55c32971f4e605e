use std::{fmt, io::Read, str::FromStr, sync::Arc};

use crate::{
    ast::Node,
    error::{Error, Result},
    evaluator::{Handle, Step},
    lexer::Lexer,
    options::Options,
    parser::Parser,
    value::Value,
};

/// A compiled path: a sequence of steps plus the options they run with.
///
/// Queries are values. [`Query::key`] and [`Query::index`] return a new
/// query and leave the receiver untouched, so one query can be extended in
/// several directions. A query holds no per-call state and can be shared
/// between threads.
///
/// # Examples
///
/// ```
/// use clove_path::{Map, Query, Value};
///
/// let base = Query::default().root().key("servers");
/// let first = base.index(0).key("host");
/// let second = base.index(1).key("host");
///
/// assert_eq!(base.to_string(), "$.servers");
/// assert_eq!(first.to_string(), "$.servers[0].host");
/// assert_eq!(second.to_string(), "$.servers[1].host");
///
/// let doc = Value::from(Map::new().with(
///     "servers",
///     vec![Map::new().with("host", "a"), Map::new().with("host", "b")],
/// ));
/// assert_eq!(second.extract(&doc).unwrap(), Value::from("b"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    steps: Vec<Step>,
    options: Arc<Options>,
    root: bool,
}

impl Query {
    pub fn new(options: Options) -> Self {
        Query {
            steps: Vec::new(),
            options: Arc::new(options),
            root: false,
        }
    }

    /// Render with a leading `$`. Extraction is unaffected.
    pub fn root(&self) -> Query {
        Query {
            root: true,
            ..self.clone()
        }
    }

    pub fn key(&self, key: impl Into<String>) -> Query {
        self.append(Step::Key(key.into()))
    }

    pub fn index(&self, index: usize) -> Query {
        self.append(Step::Index(index))
    }

    pub fn append(&self, step: Step) -> Query {
        self.append_all([step])
    }

    pub fn append_all(&self, steps: impl IntoIterator<Item = Step>) -> Query {
        let mut query = self.clone();
        query.steps.extend(steps);
        query
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn has_root(&self) -> bool {
        self.root
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Extract the value this query addresses inside `target`.
    ///
    /// An empty query returns `target` itself. The error of a failed step
    /// names the whole query, not just the failing step.
    pub fn extract(&self, target: &Value) -> Result<Value> {
        let mut handle = Handle::new(target.clone());

        for step in &self.steps {
            tracing::trace!(step = %step, "extracting");
            handle = match step.extract_with_hooks(handle, &self.options) {
                Some(found) if found.is_restricted() => {
                    tracing::debug!(path = %self, step = %step, "value is not accessible");
                    return Err(Error::AccessDenied {
                        path: self.to_string(),
                    });
                }
                Some(found) => found,
                None => {
                    tracing::debug!(path = %self, step = %step, "value not found");
                    return Err(Error::NotFound {
                        path: self.to_string(),
                    });
                }
            };
        }

        Ok(handle.into_value().unwrap_or(Value::Null))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root {
            f.write_str("$")?;
        }
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_str(s, Options::default())
    }
}

/// Parse a path string into a query that runs with `options`.
///
/// # Examples
///
/// ```
/// use clove_path::{parse_str, Map, Options, Value};
///
/// let query = parse_str("$.Maps[0].key", Options::new().case_insensitive()).unwrap();
/// let doc = Value::from(Map::new().with("maps", vec![Map::new().with("KEY", "value")]));
/// assert_eq!(query.extract(&doc).unwrap(), Value::from("value"));
/// ```
pub fn parse_str(s: &str, options: Options) -> Result<Query> {
    let node = Parser::new(Lexer::new(s)).parse()?;
    let query = Query::new(options);
    Ok(match node {
        Some(node) => build_query(query, &node),
        None => query,
    })
}

/// Read a path from `reader` and parse it like [`parse_str`].
pub fn parse_reader(mut reader: impl Read, options: Options) -> Result<Query> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    parse_str(&buffer, options)
}

/// Append one step per node of `node`'s chain to `query`, root first.
pub fn build_query(mut query: Query, node: &Node) -> Query {
    let mut chain = Vec::new();
    let mut current = Some(node);
    while let Some(node) = current {
        chain.push(node);
        current = node.parent();
    }

    for node in chain.into_iter().rev() {
        match node {
            Node::Root { .. } => query.root = true,
            Node::Selector { name, .. } => query.steps.push(Step::Key(name.clone())),
            Node::Index { index, .. } => query.steps.push(Step::Index(*index)),
        }
    }
    query
}

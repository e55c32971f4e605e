use std::{borrow::Cow, fmt, sync::Arc};

/// A dynamically-shaped value that paths are evaluated against.
///
/// Besides the JSON-like scalars and sequences, a value can be a record with
/// field metadata (names, tags, visibility), an optional/pointer layer, or an
/// opaque [`Object`] that answers lookups itself.
///
/// Compound payloads are reference counted, so cloning a value is cheap and
/// extraction never copies the data it walks through.
///
/// # Examples
///
/// ```
/// use clove_path::{Field, Map, Record, Value};
///
/// let user = Record::new("User")
///     .field(Field::new("Name", "alice").tag("json", "name,omitempty"))
///     .field(Field::new("password", "hunter2").unexported());
///
/// let doc = Value::from(
///     Map::new()
///         .with("users", vec![Value::record(user)])
///         .with("count", 1),
/// );
/// assert_eq!(doc.type_name(), "map");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Explicit null, a successful extraction result
    Null,

    /// true or false
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit float
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Ordered, integer-indexed sequence
    Array(Arc<Vec<Value>>),

    /// Key/value pairs; keys are matched by their string form
    Map(Arc<Map>),

    /// Named fields with metadata
    Record(Arc<Record>),

    /// Optional or boxed value, `None` is a null pointer
    ///
    /// Extraction looks through any number of pointer layers.
    Pointer(Option<Arc<Value>>),

    /// Value that provides its own lookups
    Object(Arc<dyn Object>),
}

impl Value {
    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(Arc::new(items.into_iter().collect()))
    }

    pub fn map(map: Map) -> Self {
        Value::Map(Arc::new(map))
    }

    pub fn record(record: Record) -> Self {
        Value::Record(Arc::new(record))
    }

    pub fn pointer(value: impl Into<Value>) -> Self {
        Value::Pointer(Some(Arc::new(value.into())))
    }

    pub fn null_pointer() -> Self {
        Value::Pointer(None)
    }

    pub fn object(object: impl Object + 'static) -> Self {
        Value::Object(Arc::new(object))
    }

    /// Build a record value from a host type that describes itself.
    pub fn describe<T: Describe + ?Sized>(value: &T) -> Self {
        Value::record(value.describe())
    }

    /// The string a map key is compared by.
    ///
    /// Only scalars have one; other keys never match a name.
    pub fn key_string(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Integer(n) => Some(Cow::Owned(n.to_string())),
            Value::Float(n) => Some(Cow::Owned(n.to_string())),
            Value::Boolean(b) => Some(Cow::Owned(b.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Pointer(None))
    }

    /// Human-readable type name, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Record(_) => "record",
            Value::Pointer(_) => "pointer",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (Record(a), Record(b)) => a == b,
            (Pointer(a), Pointer(b)) => a == b,
            // objects are opaque, only identity is comparable
            (Object(a), Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        Value::Pointer(value.map(|v| Arc::new(v.into())))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::map(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::record(record)
    }
}

/// Map-like value: entries in insertion order.
///
/// Keys may be any value; lookups compare a key's [`Value::key_string`]
/// against the requested name, first match wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(Value, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Map::insert`].
    pub fn with(mut self, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an entry, replacing the value of an equal key in place.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Record-like value: an ordered list of named fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Vec<Field>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Record {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// A record field and the metadata extraction looks at.
///
/// Fields are exported and not embedded unless marked otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    tags: Vec<(String, String)>,
    exported: bool,
    embedded: bool,
    value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Field {
            name: name.into(),
            tags: Vec::new(),
            exported: true,
            embedded: false,
            value: value.into(),
        }
    }

    /// Attach an annotation such as `tag("json", "full_name,omitempty")`.
    ///
    /// The part before the first comma is an alternate name, the rest are
    /// options; the `inline` option flattens the field into its record.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Mark the field as not accessible to callers.
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Mark the field as embedded; its contents are searched as if they
    /// belonged to the enclosing record.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of the first tag with the given key.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Host types that can present themselves as a [`Record`].
pub trait Describe {
    fn describe(&self) -> Record;
}

/// Per-call information handed to [`KeyLookupContext`] implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupContext {
    case_insensitive: bool,
}

impl LookupContext {
    pub fn new(case_insensitive: bool) -> Self {
        LookupContext { case_insensitive }
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Compare two names, case-folding both sides when the lookup is
    /// case-insensitive.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.chars()
                .flat_map(char::to_lowercase)
                .eq(b.chars().flat_map(char::to_lowercase))
        } else {
            a == b
        }
    }
}

/// Key lookup that is told how the query wants names compared.
pub trait KeyLookupContext {
    fn lookup_key_with(&self, cx: &LookupContext, key: &str) -> Option<Value>;
}

/// Key lookup without any query context.
pub trait KeyLookup {
    fn lookup_key(&self, key: &str) -> Option<Value>;
}

/// Positional lookup.
pub trait IndexLookup {
    fn lookup_index(&self, index: usize) -> Option<Value>;
}

/// An opaque value that answers lookups itself.
///
/// Each capability that is provided replaces the built-in lookup of that
/// kind entirely. A context-aware key lookup takes precedence over a plain
/// one. An object providing neither kind of lookup is never matched.
///
/// # Examples
///
/// ```
/// use clove_path::{KeyLookup, Object, Query, Value};
///
/// #[derive(Debug)]
/// struct Env;
///
/// impl KeyLookup for Env {
///     fn lookup_key(&self, key: &str) -> Option<Value> {
///         (key == "HOME").then(|| Value::from("/root"))
///     }
/// }
///
/// impl Object for Env {
///     fn as_key_lookup(&self) -> Option<&dyn KeyLookup> {
///         Some(self)
///     }
/// }
///
/// let home = Query::default().key("HOME").extract(&Value::object(Env)).unwrap();
/// assert_eq!(home, Value::from("/root"));
/// ```
pub trait Object: fmt::Debug + Send + Sync {
    fn as_key_lookup_context(&self) -> Option<&dyn KeyLookupContext> {
        None
    }

    fn as_key_lookup(&self) -> Option<&dyn KeyLookup> {
        None
    }

    fn as_index_lookup(&self) -> Option<&dyn IndexLookup> {
        None
    }
}

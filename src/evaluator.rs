use std::{fmt, sync::Arc};

use crate::{
    options::Options,
    value::{Field, Record, Value},
};

/// One extraction function: a handle in, the extracted handle out, or
/// `None` when nothing was found.
pub type ExtractFn = Arc<dyn Fn(Handle) -> Option<Handle> + Send + Sync>;

/// Wraps an extraction function, see [`Options::hook`].
pub type Hook = Arc<dyn Fn(ExtractFn) -> ExtractFn + Send + Sync>;

/// The engine's reference to a value during extraction.
///
/// A handle may be invalid (it refers to nothing) and may be restricted: the
/// value was reached through an unexported field. Restriction is inherited
/// by everything reached from a restricted value.
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    value: Option<Value>,
    restricted: bool,
}

impl Handle {
    pub fn new(value: Value) -> Self {
        Handle {
            value: Some(value),
            restricted: false,
        }
    }

    pub fn invalid() -> Self {
        Handle {
            value: None,
            restricted: false,
        }
    }

    /// A handle to a value the caller may not access.
    pub fn restricted(value: Value) -> Self {
        Handle {
            value: Some(value),
            restricted: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    /// Whether the handle refers to a value that may not be handed out.
    pub fn is_restricted(&self) -> bool {
        self.restricted && self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    fn child(&self, value: Value, restricted: bool) -> Handle {
        Handle {
            value: Some(value),
            restricted: self.restricted || restricted,
        }
    }

    /// Look through pointer layers. A null pointer gives an invalid handle.
    pub fn follow_pointers(self) -> Handle {
        let mut value = self.value;
        while let Some(Value::Pointer(pointer)) = value {
            value = pointer.map(Arc::unwrap_or_clone);
        }
        Handle {
            value,
            restricted: self.restricted,
        }
    }
}

impl From<Value> for Handle {
    fn from(value: Value) -> Self {
        Handle::new(value)
    }
}

/// One step of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Map key or record field by name
    Key(String),

    /// Sequence element by position
    Index(usize),
}

impl Step {
    /// Apply this step alone, without any hooks.
    pub fn extract(&self, handle: Handle, options: &Arc<Options>) -> Option<Handle> {
        match self {
            Step::Key(key) => extract_key(key, handle, options),
            Step::Index(index) => extract_index(*index, handle),
        }
    }

    /// Apply this step wrapped by every hook in `options`.
    pub fn extract_with_hooks(&self, handle: Handle, options: &Arc<Options>) -> Option<Handle> {
        let extract = options.wrap(self.base(options));
        extract(handle)
    }

    fn base(&self, options: &Arc<Options>) -> ExtractFn {
        let step = self.clone();
        let options = Arc::clone(options);
        Arc::new(move |handle| step.extract(handle, &options))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Key(key) if needs_quotes(key) => {
                f.write_str("['")?;
                for ch in key.chars() {
                    if ch == '\\' || ch == '\'' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", ch)?;
                }
                f.write_str("']")
            }
            Step::Key(key) => write!(f, ".{}", key),
            Step::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Names that would not scan back to themselves in `.name` form.
fn needs_quotes(key: &str) -> bool {
    key.is_empty()
        || key.starts_with(']')
        || key.contains(['[', '.', '\\', '\''])
}

fn extract_key(key: &str, handle: Handle, options: &Arc<Options>) -> Option<Handle> {
    let handle = handle.follow_pointers();
    match handle.value()? {
        Value::Object(object) => {
            let found = match object.as_key_lookup_context() {
                Some(lookup) => lookup.lookup_key_with(&options.lookup_context(), key),
                None => object.as_key_lookup()?.lookup_key(key),
            };
            found.map(|v| handle.child(v, false))
        }
        Value::Map(map) => {
            let cx = options.lookup_context();
            map.iter()
                .find(|(k, _)| k.key_string().is_some_and(|k| cx.matches(&k, key)))
                .map(|(_, v)| handle.child(v.clone(), false))
        }
        Value::Record(record) => extract_field(key, &handle, record, options),
        _ => None,
    }
}

/// Search a record: direct fields first, then inline fields.
///
/// The first accessible match wins. A restricted match is only returned
/// when nothing accessible turns up; the last one seen is kept.
fn extract_field(
    key: &str,
    handle: &Handle,
    record: &Record,
    options: &Arc<Options>,
) -> Option<Handle> {
    let cx = options.lookup_context();
    let mut fallback = None;
    let mut inlines = Vec::new();

    for field in record.fields() {
        let (names, inline) = field_names(field, options);
        if inline {
            inlines.push(field);
            continue;
        }
        if names.iter().any(|name| cx.matches(name, key)) {
            let found = handle.child(field.value().clone(), !field.is_exported());
            if !found.is_restricted() {
                return Some(found);
            }
            fallback = Some(found);
        }
    }

    if !inlines.is_empty() {
        let step = Step::Key(key.to_string());
        for field in inlines {
            // an embedded field's own visibility does not hide its contents
            let restricted = !field.is_exported() && !field.is_embedded();
            let inner = handle.child(field.value().clone(), restricted);
            if let Some(found) = step.extract_with_hooks(inner, options) {
                if !found.is_restricted() {
                    return Some(found);
                }
                fallback = Some(found);
            }
        }
    }

    if fallback.is_some() {
        tracing::trace!(key, record = record.type_name(), "only a restricted field matched");
    }
    fallback
}

/// Candidate names of a field, in matching order, and whether it is inline.
fn field_names(field: &Field, options: &Options) -> (Vec<String>, bool) {
    let mut names = Vec::new();
    let mut inline = field.is_embedded() || options.is_inline(field);

    for tag in options.tags() {
        let Some(value) = field.tag_value(tag).filter(|v| !v.is_empty()) else {
            continue;
        };
        let (name, flags) = value.split_once(',').unwrap_or((value, ""));
        if !name.is_empty() {
            names.push(name.to_string());
        }
        if flags.split(',').any(|flag| flag == "inline") {
            inline = true;
        }
    }

    names.push(options.field_name(field));
    (names, inline)
}

fn extract_index(index: usize, handle: Handle) -> Option<Handle> {
    let handle = handle.follow_pointers();
    match handle.value()? {
        Value::Object(object) => object
            .as_index_lookup()?
            .lookup_index(index)
            .map(|item| handle.child(item, false)),
        Value::Array(items) => items.get(index).map(|item| handle.child(item.clone(), false)),
        _ => None,
    }
}

//! Query configuration.
//!
//! Options are fixed when a [`Query`](crate::Query) is created and shared by
//! every query derived from it.

use std::{fmt, sync::Arc};

use crate::{
    evaluator::{ExtractFn, Hook},
    value::{Field, LookupContext},
};

/// Decides whether a record field is searched as part of its parent.
pub type InlinePredicate = Arc<dyn Fn(&Field) -> bool + Send + Sync>;

/// Derives the default name of a record field.
pub type FieldNameGetter = Arc<dyn Fn(&Field) -> String + Send + Sync>;

/// Builder for the settings that change how a query matches values.
///
/// # Examples
///
/// ```
/// use clove_path::{Options, Query};
///
/// let options = Options::new()
///     .case_insensitive()
///     .extract_by_tag("json")
///     .extract_by_tag("yaml");
/// let query = Query::new(options).key("fullName");
/// assert_eq!(query.to_string(), ".fullName");
/// ```
#[derive(Clone, Default)]
pub struct Options {
    pub(crate) case_insensitive: bool,
    pub(crate) tags: Vec<String>,
    pub(crate) hooks: Vec<Hook>,
    pub(crate) inline_predicates: Vec<InlinePredicate>,
    pub(crate) field_name_getter: Option<FieldNameGetter>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match map keys and field names ignoring case.
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Also match record fields by the name in their `key` tag.
    ///
    /// Tags are consulted in the order they were added, before the field's
    /// own name.
    pub fn extract_by_tag(mut self, key: impl Into<String>) -> Self {
        self.tags.push(key.into());
        self
    }

    /// Replace the default field name (the declared name) with `getter`.
    pub fn field_name_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Field) -> String + Send + Sync + 'static,
    {
        self.field_name_getter = Some(Arc::new(getter));
        self
    }

    /// Treat fields for which `predicate` holds as inline.
    pub fn inline_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Field) -> bool + Send + Sync + 'static,
    {
        self.inline_predicates.push(Arc::new(predicate));
        self
    }

    /// Wrap every extraction step with `hook`.
    ///
    /// A hook receives the next extraction function and returns the one to
    /// use instead. The first hook added is the outermost wrapper.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use clove_path::{Handle, Options, Query, Value};
    ///
    /// // answer every lookup that would fail with a default
    /// let options = Options::new().hook(|next| {
    ///     Arc::new(move |handle: Handle| {
    ///         next(handle).or_else(|| Some(Handle::new(Value::from("n/a"))))
    ///     })
    /// });
    /// let value = Query::new(options).key("missing").extract(&Value::Null).unwrap();
    /// assert_eq!(value, Value::from("n/a"));
    /// ```
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(ExtractFn) -> ExtractFn + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub(crate) fn lookup_context(&self) -> LookupContext {
        LookupContext::new(self.case_insensitive)
    }

    /// Wrap `base` with every hook, first hook outermost.
    pub(crate) fn wrap(&self, base: ExtractFn) -> ExtractFn {
        self.hooks.iter().rev().fold(base, |next, hook| hook(next))
    }

    pub(crate) fn field_name(&self, field: &Field) -> String {
        match &self.field_name_getter {
            Some(getter) => getter(field),
            None => field.name().to_string(),
        }
    }

    pub(crate) fn is_inline(&self, field: &Field) -> bool {
        self.inline_predicates.iter().any(|predicate| predicate(field))
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("case_insensitive", &self.case_insensitive)
            .field("tags", &self.tags)
            .field("hooks", &self.hooks.len())
            .field("inline_predicates", &self.inline_predicates.len())
            .field("field_name_getter", &self.field_name_getter.is_some())
            .finish()
    }
}

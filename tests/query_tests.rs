// tests/query_tests.rs

use std::sync::Arc;

use clove_path::{
    Describe, Error, ExtractFn, Field, Handle, IndexLookup, KeyLookup, KeyLookupContext,
    LookupContext, Map, Object, Options, Query, Record, Value,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Answers every key with the same value.
#[derive(Debug)]
struct Constant(Option<Value>);

impl KeyLookup for Constant {
    fn lookup_key(&self, _key: &str) -> Option<Value> {
        self.0.clone()
    }
}

impl Object for Constant {
    fn as_key_lookup(&self) -> Option<&dyn KeyLookup> {
        Some(self)
    }
}

/// Ordered pairs that honour the query's case sensitivity.
#[derive(Debug)]
struct Pairs(Vec<(String, Value)>);

impl KeyLookupContext for Pairs {
    fn lookup_key_with(&self, cx: &LookupContext, key: &str) -> Option<Value> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .or_else(|| self.0.iter().find(|(k, _)| cx.matches(k, key)))
            .map(|(_, v)| v.clone())
    }
}

// a plain lookup is also provided but must never be consulted
impl KeyLookup for Pairs {
    fn lookup_key(&self, _key: &str) -> Option<Value> {
        Some(Value::from("plain"))
    }
}

impl Object for Pairs {
    fn as_key_lookup_context(&self) -> Option<&dyn KeyLookupContext> {
        Some(self)
    }

    fn as_key_lookup(&self) -> Option<&dyn KeyLookup> {
        Some(self)
    }
}

fn pairs(entries: &[(&str, &str)]) -> Value {
    Value::object(Pairs(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect(),
    ))
}

/// `n, n-1, ..., 1`
#[derive(Debug)]
struct Countdown(i64);

impl IndexLookup for Countdown {
    fn lookup_index(&self, index: usize) -> Option<Value> {
        let index = i64::try_from(index).ok()?;
        (index < self.0).then(|| Value::from(self.0 - index))
    }
}

impl Object for Countdown {
    fn as_index_lookup(&self) -> Option<&dyn IndexLookup> {
        Some(self)
    }
}

struct Tagged<'a> {
    foo_bar: &'a str,
    s: &'a str,
    m: Map,
    inline: Map,
    state: &'a str,
}

impl Default for Tagged<'_> {
    fn default() -> Self {
        Tagged {
            foo_bar: "",
            s: "",
            m: Map::new(),
            inline: Map::new(),
            state: "",
        }
    }
}

impl Tagged<'_> {
    fn value(self) -> Value {
        let anonymous = Record::new("AnonymousField").field(Field::new("S", self.s));
        Value::record(
            Record::new("Tagged")
                .field(
                    Field::new("FooBar", self.foo_bar)
                        .tag("json", "foo_bar")
                        .tag("yaml", "fooBar,omitempty"),
                )
                .field(Field::new("AnonymousField", anonymous).embedded())
                .field(Field::new("M", self.m).tag("json", ",inline"))
                .field(Field::new("Inline", self.inline))
                .field(Field::new("state", Record::new("")).unexported())
                .field(Field::new("State", self.state).tag("json", "state")),
        )
    }
}

fn extract(query: &Query, target: Value) -> Value {
    query
        .extract(&target)
        .unwrap_or_else(|e| panic!("{}: {}", query, e))
}

fn not_found(query: &Query, target: Value) -> bool {
    matches!(query.extract(&target), Err(Error::NotFound { .. }))
}

fn tags() -> Options {
    Options::new().extract_by_tag("json").extract_by_tag("yaml")
}

// ============================================================================
// Key
// ============================================================================

#[test]
fn test_map_key() {
    let q = Query::default().key("key");
    assert_eq!(extract(&q, Map::new().with("key", "value").into()), Value::from("value"));
}

#[test]
fn test_map_key_case_insensitive() {
    let q = Query::new(Options::new().case_insensitive()).key("KEY");
    assert_eq!(extract(&q, Map::new().with("key", "value").into()), Value::from("value"));
}

#[test]
fn test_map_key_case_sensitive_by_default() {
    let q = Query::default().key("key");
    assert!(not_found(&q, Map::new().with("Key", "case sensitive").into()));
}

#[test]
fn test_map_with_mixed_keys() {
    let map = Map::new().with(0, 0).with("key", 1);
    assert_eq!(extract(&Query::default().key("key"), map.clone().into()), Value::from(1));
    assert_eq!(extract(&Query::default().key("0"), map.into()), Value::from(0));
}

#[test]
fn test_record_field() {
    let record = Record::new("Request").field(Field::new("Method", "GET"));
    let q = Query::default().key("Method");
    assert_eq!(extract(&q, record.clone().into()), Value::from("GET"));

    let q = Query::new(Options::new().case_insensitive()).key("method");
    assert_eq!(extract(&q, record.clone().into()), Value::from("GET"));

    assert!(not_found(&Query::default().key("method"), record.into()));
}

#[test]
fn test_record_pointer() {
    let record = Record::new("Request").field(Field::new("Method", "GET"));
    let q = Query::default().key("Method");
    assert_eq!(
        extract(&q, Value::pointer(Value::pointer(record))),
        Value::from("GET")
    );
}

#[test]
fn test_null_pointer_is_not_found() {
    assert!(not_found(&Query::default().key("a"), Value::null_pointer()));
    assert!(not_found(&Query::default().key("a"), Value::Null));
}

#[test]
fn test_embedded_field_contents() {
    let target = Tagged { s: "aaa", ..Default::default() }.value();
    let q = Query::new(Options::new().case_insensitive()).key("S");
    assert_eq!(extract(&q, target.clone()), Value::from("aaa"));

    // case sensitive
    assert!(not_found(&Query::default().key("s"), target));
}

#[test]
fn test_inline_field_is_not_matched_by_its_own_name() {
    let target = Tagged { s: "aaa", ..Default::default() }.value();
    assert!(not_found(&Query::default().key("AnonymousField"), target));
}

#[test]
fn test_tag_names() {
    let target = || Tagged { foo_bar: "xxx", ..Default::default() }.value();
    assert_eq!(extract(&Query::new(tags()).key("foo_bar"), target()), Value::from("xxx"));
    assert_eq!(extract(&Query::new(tags()).key("fooBar"), target()), Value::from("xxx"));
    assert_eq!(extract(&Query::new(tags()).key("FooBar"), target()), Value::from("xxx"));
    assert!(not_found(&Query::new(tags()).key("FOO_BAR"), target()));
    assert_eq!(
        extract(&Query::new(tags().case_insensitive()).key("FOO_BAR"), target()),
        Value::from("xxx")
    );
}

#[test]
fn test_tags_are_ignored_unless_configured() {
    let target = Tagged { foo_bar: "xxx", ..Default::default() }.value();
    assert!(not_found(&Query::default().key("foo_bar"), target));
}

#[test]
fn test_tag_order_precedence() {
    // `json` names the first field, `yaml` the second one the same way
    let record = Record::new("T")
        .field(Field::new("A", "from json").tag("json", "name"))
        .field(Field::new("B", "from yaml").tag("yaml", "name"));
    let q = Query::new(tags()).key("name");
    assert_eq!(extract(&q, record.clone().into()), Value::from("from json"));

    // when one field carries both, either name reaches it
    let record = Record::new("T").field(
        Field::new("Declared", "v")
            .tag("yaml", "yamlName")
            .tag("json", "jsonName"),
    );
    let q = Query::new(tags());
    assert_eq!(extract(&q.key("jsonName"), record.clone().into()), Value::from("v"));
    assert_eq!(extract(&q.key("yamlName"), record.into()), Value::from("v"));
}

#[test]
fn test_tag_option_inline() {
    let target = || {
        Tagged {
            m: Map::new().with("aaa", "xxx"),
            ..Default::default()
        }
        .value()
    };
    assert_eq!(extract(&Query::new(tags()).key("aaa"), target()), Value::from("xxx"));
    assert!(not_found(&Query::new(tags()).key("AAA"), target()));
    // the inline option lives in the json tag
    assert!(not_found(
        &Query::new(Options::new().extract_by_tag("yaml")).key("aaa"),
        target()
    ));
}

#[test]
fn test_inline_predicate() {
    let target = || {
        Tagged {
            m: Map::new().with("aaa", "xxx"),
            inline: Map::new().with("aaa", "yyy"),
            ..Default::default()
        }
        .value()
    };
    let options = Options::new().inline_when(|field| field.name() == "Inline");
    assert_eq!(extract(&Query::new(options).key("aaa"), target()), Value::from("yyy"));
    assert!(not_found(&Query::default().key("aaa"), target()));
}

#[test]
fn test_direct_field_wins_over_inline() {
    let record = Record::new("T")
        .field(Field::new("Inner", Map::new().with("name", "inner")).embedded())
        .field(Field::new("name", "outer"));
    assert_eq!(extract(&Query::default().key("name"), record.into()), Value::from("outer"));
}

#[test]
fn test_first_inline_match_wins() {
    let record = Record::new("T")
        .field(Field::new("A", Map::new().with("k", "a")).embedded())
        .field(Field::new("B", Map::new().with("k", "b")).embedded());
    assert_eq!(extract(&Query::default().key("k"), record.into()), Value::from("a"));
}

#[test]
fn test_accessible_field_wins_over_unexported() {
    let target = Tagged { state: "ready", ..Default::default() }.value();
    let q = Query::new(Options::new().extract_by_tag("json")).key("state");
    assert_eq!(extract(&q, target), Value::from("ready"));
}

#[test]
fn test_unexported_field_is_access_denied() {
    let target = Tagged { state: "ready", ..Default::default() }.value();
    let err = Query::default().root().key("state").extract(&target).unwrap_err();
    assert!(matches!(&err, Error::AccessDenied { path } if path == "$.state"));
    assert_eq!(err.to_string(), r#""$.state" is not accessible"#);
}

#[test]
fn test_unexported_inline_match_is_a_fallback() {
    let hidden = || {
        Field::new("hidden", Map::new().with("k", "secret"))
            .tag("json", ",inline")
            .unexported()
    };
    let record = Record::new("T")
        .field(hidden())
        .field(Field::new("Open", Map::new().with("k", "open")).embedded());
    let q = Query::new(Options::new().extract_by_tag("json")).key("k");
    assert_eq!(extract(&q, record.into()), Value::from("open"));

    let record = Record::new("T").field(hidden());
    assert!(matches!(
        q.extract(&record.into()),
        Err(Error::AccessDenied { .. })
    ));
}

#[test]
fn test_unexported_inline_object_is_access_denied() {
    let record = Record::new("T").field(
        Field::new("hidden", Value::object(Constant(Some(Value::from(1)))))
            .tag("json", ",inline")
            .unexported(),
    );
    let q = Query::new(Options::new().extract_by_tag("json")).key("k");
    assert!(matches!(
        q.extract(&record.into()),
        Err(Error::AccessDenied { path }) if path == ".k"
    ));

    // nothing found behind the hidden object is still not found
    let record = Record::new("T").field(
        Field::new("hidden", Value::object(Constant(None)))
            .tag("json", ",inline")
            .unexported(),
    );
    assert!(not_found(&q, record.into()));
}

#[test]
fn test_field_name_getter() {
    let person = Record::new("Person")
        .field(Field::new("Name", "Alice").tag("json", "name,omitempty"));
    let options = Options::new().field_name_getter(|field| {
        field
            .tag_value("json")
            .and_then(|tag| tag.split(',').next())
            .unwrap_or(field.name())
            .to_string()
    });
    let q = Query::new(options).key("name");
    assert_eq!(extract(&q, person.clone().into()), Value::from("Alice"));

    let q = q.options().clone();
    assert!(not_found(&Query::new(q).key("Name"), person.into()));
}

struct Account {
    id: i64,
    owner: String,
    token: String,
}

impl Describe for Account {
    fn describe(&self) -> Record {
        Record::new("Account")
            .field(Field::new("ID", self.id).tag("json", "id"))
            .field(Field::new("Owner", self.owner.as_str()).tag("json", "owner"))
            .field(Field::new("token", self.token.as_str()).unexported())
    }
}

#[test]
fn test_described_host_type() {
    let account = Account {
        id: 7,
        owner: "alice".to_string(),
        token: "t0k3n".to_string(),
    };
    let doc = || Value::from(Map::new().with("accounts", vec![Value::describe(&account)]));
    let q = Query::new(Options::new().extract_by_tag("json")).key("accounts").index(0);
    assert_eq!(extract(&q.key("id"), doc()), Value::from(7));
    assert_eq!(extract(&q.key("Owner"), doc()), Value::from("alice"));
    assert!(matches!(
        q.key("token").extract(&doc()),
        Err(Error::AccessDenied { path }) if path == ".accounts[0].token"
    ));
}

// ============================================================================
// Capabilities
// ============================================================================

#[test]
fn test_key_lookup() {
    let q = Query::default().key("key");
    assert_eq!(
        extract(&q, Value::object(Constant(Some(Value::from("value"))))),
        Value::from("value")
    );
    assert!(not_found(&q, Value::object(Constant(None))));
}

#[test]
fn test_key_lookup_behind_pointer() {
    let q = Query::default().key("key");
    let target = Value::pointer(Value::object(Constant(Some(Value::from(1)))));
    assert_eq!(extract(&q, target), Value::from(1));
}

#[test]
fn test_key_lookup_context_receives_case_sensitivity() {
    let target = || pairs(&[("KEY", "value")]);
    let q = Query::new(Options::new().case_insensitive()).key("key");
    assert_eq!(extract(&q, target()), Value::from("value"));
    assert!(not_found(&Query::default().key("key"), target()));
}

#[test]
fn test_index_lookup() {
    let target = || Value::object(Countdown(3));
    assert_eq!(extract(&Query::default().index(0), target()), Value::from(3));
    assert_eq!(extract(&Query::default().index(2), target()), Value::from(1));
    assert!(not_found(&Query::default().index(3), target()));
    assert!(not_found(&Query::default().key("a"), target()));
}

// ============================================================================
// Index
// ============================================================================

#[test]
fn test_index() {
    let target = || Value::from(vec!["a", "b"]);
    assert_eq!(extract(&Query::default().index(1), target()), Value::from("b"));
    assert!(not_found(&Query::default().index(2), target()));
}

#[test]
fn test_index_through_pointer() {
    let target = Value::pointer(Value::from(vec![1, 2]));
    assert_eq!(extract(&Query::default().index(0), target), Value::from(1));
}

#[test]
fn test_index_on_non_sequence() {
    assert!(not_found(&Query::default().index(0), Map::new().with("0", "x").into()));
    assert!(not_found(&Query::default().index(0), Value::from("abc")));
    assert!(not_found(&Query::default().index(0), Value::null_pointer()));
}

// ============================================================================
// Query
// ============================================================================

#[test]
fn test_empty_query_returns_target() {
    assert_eq!(extract(&Query::default(), Value::from("value")), Value::from("value"));
    assert_eq!(extract(&Query::default(), Value::Null), Value::Null);
}

#[test]
fn test_explicit_null_is_a_value() {
    let target = || Value::from(Map::new().with("a", Value::Null).with("b", Value::null_pointer()));
    assert_eq!(extract(&Query::default().key("a"), target()), Value::Null);
    assert_eq!(extract(&Query::default().key("b"), target()), Value::null_pointer());
}

#[test]
fn test_complex() {
    let heap = vec![
        Value::object(Constant(Some(Value::from("80%")))),
        Value::object(Constant(Some(Value::from("100%")))),
    ];
    let debug = Record::new("debug").field(Field::new("Prof", Map::new().with("heap", heap)));
    let q = Query::default().key("Prof").key("heap").index(1).key("sum%");
    assert_eq!(extract(&q, Value::pointer(debug)), Value::from("100%"));
}

#[test]
fn test_root_only_changes_rendering() {
    let q = Query::default().root().key("foo");
    assert_eq!(q.to_string(), "$.foo");
    assert_eq!(extract(&q, Map::new().with("foo", "aaa").into()), Value::from("aaa"));
}

#[test]
fn test_not_found_names_whole_path() {
    let q = Query::default().root().key("a").key("b").index(0);
    let err = q.extract(&Map::new().with("x", 1).into()).unwrap_err();
    assert_eq!(err.path(), Some("$.a.b[0]"));
    assert_eq!(err.to_string(), r#""$.a.b[0]" not found"#);
}

// ============================================================================
// Hooks
// ============================================================================

#[test]
fn test_hooks_compose_outermost_first() {
    let options = Options::new()
        .hook(|next: ExtractFn| -> ExtractFn {
            Arc::new(move |handle: Handle| {
                let found = next(handle)?;
                let prefixed = found
                    .value()
                    .and_then(Value::as_str)
                    .map(|s| format!("aaa{}", s));
                Some(prefixed.map(|s| Handle::new(Value::from(s))).unwrap_or(found))
            })
        })
        .hook(|_next: ExtractFn| -> ExtractFn {
            Arc::new(|_handle: Handle| Some(Handle::new(Value::from("bbb"))))
        });
    assert_eq!(extract(&Query::new(options).index(0), Value::Null), Value::from("aaabbb"));
}

#[test]
fn test_hook_can_reject() {
    let options = Options::new().hook(|next: ExtractFn| -> ExtractFn {
        Arc::new(move |handle: Handle| {
            let _ = next(handle);
            None
        })
    });
    let q = Query::new(options).index(0);
    assert!(not_found(&q, Value::from(vec!["a"])));
}

#[test]
fn test_hook_can_deny_access() {
    let options = Options::new().hook(|next: ExtractFn| -> ExtractFn {
        Arc::new(move |handle: Handle| {
            next(handle)
                .and_then(Handle::into_value)
                .map(Handle::restricted)
        })
    });
    let q = Query::new(options).key("a");
    assert!(matches!(
        q.extract(&Map::new().with("a", 1).into()),
        Err(Error::AccessDenied { .. })
    ));
}

#[test]
fn test_hook_runs_for_inline_fields() {
    // present maps as objects whose values are doubled
    let double = |next: ExtractFn| -> ExtractFn {
        Arc::new(move |handle: Handle| {
            if let Some(Value::Map(map)) = handle.value() {
                let doubled = map
                    .iter()
                    .filter_map(|(k, v)| {
                        Some((k.as_str()?.to_string(), Value::from(format!("{0}{0}", v.as_str()?))))
                    })
                    .collect();
                if let Some(found) = next(Handle::new(Value::object(Pairs(doubled)))) {
                    return Some(found);
                }
            }
            next(handle)
        })
    };
    let target = Tagged {
        m: Map::new().with("aaa", "xxx"),
        ..Default::default()
    }
    .value();
    let q = Query::new(tags().hook(double)).key("aaa");
    assert_eq!(extract(&q, target), Value::from("xxxxxx"));
}

#[test]
fn test_hook_replaces_field_naming() {
    // expose records as maps keyed by upper-cased json names
    let options = Options::new().hook(|next: ExtractFn| -> ExtractFn {
        Arc::new(move |handle: Handle| {
            let handle = handle.follow_pointers();
            if let Some(Value::Record(record)) = handle.value() {
                let map: Map = record
                    .fields()
                    .iter()
                    .filter(|field| field.is_exported())
                    .filter_map(|field| {
                        let name = field.tag_value("json")?.split(',').next()?;
                        (!name.is_empty()).then(|| (name.to_uppercase(), field.value().clone()))
                    })
                    .collect();
                return next(Handle::new(map.into()));
            }
            next(handle)
        })
    });
    let target = Value::pointer(Tagged { foo_bar: "aaa", ..Default::default() }.value());
    assert_eq!(extract(&Query::new(options).key("FOO_BAR"), target), Value::from("aaa"));
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn test_branches_share_nothing() {
    let base = Query::default().key("a");
    let left = base.key("b");
    let right = base.index(0);
    assert_eq!(base.to_string(), ".a");
    assert_eq!(left.to_string(), ".a.b");
    assert_eq!(right.to_string(), ".a[0]");
}

#[test]
fn test_concurrent_extraction() {
    let query = Query::new(Options::new().case_insensitive()).key("ITEMS").index(1);
    std::thread::scope(|scope| {
        for n in 0..4 {
            let query = &query;
            scope.spawn(move || {
                let doc = Value::from(Map::new().with("items", vec![n, n + 10]));
                assert_eq!(query.extract(&doc).unwrap(), Value::from(n + 10));
            });
        }
    });
}

use std::collections::BTreeMap;

/// A typed, build-declared parameter value.
///
/// Mirrors the scalar kinds a build author can bind from the CLI or
/// environment: strings, flags, non-nullable integers, nullable integers
/// (their own variant rather than `Int` wrapped in `Option`, since a
/// declared-but-unset nullable integer is a distinct, representable state
/// from a plain integer that happens to be absent), and enum-typed values
/// constrained to a fixed set of allowed strings.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Str(String),
    Bool(bool),
    Int(i64),
    NullableInt(Option<i64>),
    Enum(String),
}

impl ParameterValue {
    /// Truthiness used by the requirement validator: non-empty strings,
    /// `true`, non-zero integers, a present non-zero nullable integer, and
    /// any bound enum value are "satisfied".
    pub fn is_satisfied(&self) -> bool {
        match self {
            ParameterValue::Str(s) => !s.is_empty(),
            ParameterValue::Bool(b) => *b,
            ParameterValue::Int(i) => *i != 0,
            ParameterValue::NullableInt(i) => matches!(i, Some(n) if *n != 0),
            ParameterValue::Enum(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Str(s) => Some(s),
            ParameterValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// `Some(Some(n))` for a bound non-null value, `Some(None)` for a bound
    /// null, `None` if this isn't a `NullableInt` at all.
    pub fn as_nullable_int(&self) -> Option<Option<i64>> {
        match self {
            ParameterValue::NullableInt(i) => Some(*i),
            _ => None,
        }
    }
}

/// The scalar type a declared parameter binds as, so the CLI/config layer
/// can parse raw text into the right `ParameterValue` variant instead of
/// every parameter silently becoming a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Str,
    Bool,
    Int,
    /// Parses as `Int`, except empty text (or `null`/`none`, case-insensitive)
    /// binds to an explicit absent value instead of failing to parse.
    NullableInt,
    /// Raw text must case-insensitively match one of the given values;
    /// the bound `ParameterValue::Enum` carries the matching allowed
    /// spelling, not the raw text, so actions see a canonical value.
    Enum(Vec<String>),
}

/// A build's declaration of one parameter it understands: its name, the
/// kind of value it expects, and help text for `--help` output. Distinct
/// from `Requirement` — a parameter can be declared without any target
/// requiring it, and a `Requirement` names a parameter by string without
/// needing to know its kind.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub help: String,
}

impl ParameterKind {
    /// Parses `raw` according to this kind. `Bool` accepts `true`/`false`
    /// case-insensitively; `Int`/`NullableInt` accept anything
    /// `str::parse::<i64>` does; `NullableInt` additionally accepts empty
    /// text or `null`/`none` (case-insensitive) as an explicit absence;
    /// `Enum` accepts any of its allowed values, case-insensitively.
    pub fn parse(&self, raw: &str) -> Option<ParameterValue> {
        let trimmed = raw.trim();
        match self {
            ParameterKind::Str => Some(ParameterValue::Str(raw.to_string())),
            ParameterKind::Bool => trimmed.to_ascii_lowercase().parse::<bool>().ok().map(ParameterValue::Bool),
            ParameterKind::Int => trimmed.parse::<i64>().ok().map(ParameterValue::Int),
            ParameterKind::NullableInt => {
                if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed.eq_ignore_ascii_case("none") {
                    Some(ParameterValue::NullableInt(None))
                } else {
                    trimmed.parse::<i64>().ok().map(|n| ParameterValue::NullableInt(Some(n)))
                }
            }
            ParameterKind::Enum(allowed) => allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(trimmed))
                .map(|matched| ParameterValue::Enum(matched.clone())),
        }
    }
}

/// Build-level parameter storage, keyed by declared parameter name.
///
/// Parameters are bound once before planning (CLI, then environment
/// fallback) and read by requirements and actions; the engine never writes
/// to this table once a run starts.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    /// A requirement naming `name` is satisfied iff the value is present and
    /// truthy; an unbound parameter is never satisfied.
    pub fn is_satisfied(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(ParameterValue::is_satisfied)
    }
}

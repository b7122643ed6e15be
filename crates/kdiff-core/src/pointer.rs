//! JSON Pointer (RFC 6901) resolution and the structural primitives that
//! patch operations are built from.
//!
//! Notes:
//! - `test` is a predicate and never fails: an absent path is simply `false`.
//! - Every mutating primitive requires the parent container to exist. Nothing
//!   here creates intermediate containers.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    #[error("invalid JSON pointer '{0}': must be empty or start with '/'")]
    Syntax(String),
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("cannot remove the document root")]
    RemoveRoot,
    #[error("cannot move '{from}' into its own child '{path}'")]
    MoveIntoChild { from: String, path: String },
}

/// A parsed JSON Pointer: unescaped reference tokens, root first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Pointer {
    tokens: Vec<String>,
}

impl Pointer {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer, unescaping `~1` to `/` and then `~0` to `~`.
    pub fn parse(s: &str) -> Result<Self, PointerError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| PointerError::Syntax(s.to_string()))?;

        let tokens = rest
            .split('/')
            .map(|t| t.replace("~1", "/").replace("~0", "~"))
            .collect();
        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when `self` addresses a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Pointer) -> bool {
        self.tokens.len() < other.tokens.len() && other.tokens.starts_with(&self.tokens)
    }

    fn split_last(&self) -> Option<(Pointer, &str)> {
        let (last, parent) = self.tokens.split_last()?;
        Some((
            Pointer {
                tokens: parent.to_vec(),
            },
            last.as_str(),
        ))
    }

    pub fn get<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        let mut current = doc;
        for token in &self.tokens {
            current = match current {
                Value::Object(map) => map.get(token)?,
                Value::Array(items) => items.get(parse_index(token)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn get_mut<'a>(&self, doc: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = doc;
        for token in &self.tokens {
            current = match current {
                Value::Object(map) => map.get_mut(token)?,
                Value::Array(items) => items.get_mut(parse_index(token)?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    fn not_found(&self) -> PointerError {
        PointerError::PathNotFound(self.to_string())
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pointer::parse(s)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", token.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

/// Array index per RFC 6901: decimal digits, no leading zeros.
fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    token.parse().ok()
}

/// True when `path` resolves in `doc` to a value deep-equal to `expected`.
///
/// Absent paths, type mismatches and malformed pointers all yield `false`.
pub fn test(doc: &Value, path: &str, expected: &Value) -> bool {
    Pointer::parse(path)
        .ok()
        .and_then(|p| p.get(doc).map(|found| found == expected))
        .unwrap_or(false)
}

/// Insert `value` at `path`, overwriting a mapping key or shifting sequence
/// elements. `-` appends to a sequence.
pub fn add(doc: &mut Value, path: &Pointer, value: Value) -> Result<(), PointerError> {
    let Some((parent, last)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };

    match parent.get_mut(doc) {
        Some(Value::Object(map)) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Some(Value::Array(items)) => {
            if last == "-" {
                items.push(value);
                return Ok(());
            }
            match parse_index(last) {
                Some(idx) if idx <= items.len() => {
                    items.insert(idx, value);
                    Ok(())
                }
                _ => Err(path.not_found()),
            }
        }
        _ => Err(path.not_found()),
    }
}

/// Remove and return the value at `path`.
pub fn remove(doc: &mut Value, path: &Pointer) -> Result<Value, PointerError> {
    let (parent, last) = path.split_last().ok_or(PointerError::RemoveRoot)?;

    match parent.get_mut(doc) {
        Some(Value::Object(map)) => map.remove(last).ok_or_else(|| path.not_found()),
        Some(Value::Array(items)) => match parse_index(last) {
            Some(idx) if idx < items.len() => Ok(items.remove(idx)),
            _ => Err(path.not_found()),
        },
        _ => Err(path.not_found()),
    }
}

/// Overwrite the existing value at `path`, returning the previous value.
pub fn replace(doc: &mut Value, path: &Pointer, value: Value) -> Result<Value, PointerError> {
    let slot = path.get_mut(doc).ok_or_else(|| path.not_found())?;
    Ok(std::mem::replace(slot, value))
}

/// Move the value at `from` to `path`.
///
/// The destination's parent container must already exist. On error the
/// document may be left half-moved; callers treat that as fatal.
pub fn move_value(doc: &mut Value, from: &Pointer, path: &Pointer) -> Result<(), PointerError> {
    if from.is_ancestor_of(path) {
        return Err(PointerError::MoveIntoChild {
            from: from.to_string(),
            path: path.to_string(),
        });
    }
    if from == path {
        return from.get(doc).map(|_| ()).ok_or_else(|| from.not_found());
    }

    let value = remove(doc, from)?;
    add(doc, path, value)
}

//! Host-native and caller-native values.

/// The caller's data model.
///
/// Objects keep insertion order, so a marshalled dictionary lists its keys
/// in the order the host enumerated them.
pub type Value = serde_json::Value;

/// A handle to a host function, as produced by `function("name")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncRef {
    name: String,
}

impl FuncRef {
    /// Creates a reference to the host function `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The function name the host resolved.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A value as the structured host binding hands it out.
///
/// The host owns these; the shim only reads them.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// A dictionary, entries in host enumeration order.
    Dictionary(Vec<(String, HostValue)>),
    /// A list.
    List(Vec<HostValue>),
    /// A function reference.
    Function(FuncRef),
    /// A host string, still undecoded.
    Bytes(Vec<u8>),
    /// A value the caller can use as is (numbers, decoded text, null, booleans).
    Native(Value),
}

impl HostValue {
    /// Returns the host string bytes, or the UTF-8 bytes of a native string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            Self::Native(Value::String(text)) => Some(text.as_bytes()),
            _ => None,
        }
    }

    /// Interprets the value the way the host's `if` would: numbers are
    /// truthy when non-zero and strings are parsed as numbers.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Native(Value::Bool(b)) => *b,
            Self::Native(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Self::Native(Value::String(text)) => leading_int(text.as_bytes()) != 0,
            Self::Bytes(bytes) => leading_int(bytes) != 0,
            _ => false,
        }
    }

    /// Returns `true` for an empty host or native string.
    pub fn is_empty_string(&self) -> bool {
        self.as_bytes().is_some_and(<[u8]>::is_empty)
    }
}

impl From<Value> for HostValue {
    fn from(value: Value) -> Self {
        Self::Native(value)
    }
}

impl From<&str> for HostValue {
    fn from(text: &str) -> Self {
        Self::Native(Value::String(text.to_string()))
    }
}

impl From<String> for HostValue {
    fn from(text: String) -> Self {
        Self::Native(Value::String(text))
    }
}

impl From<i64> for HostValue {
    fn from(n: i64) -> Self {
        Self::Native(Value::from(n))
    }
}

impl From<Vec<u8>> for HostValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Vim's string-to-number rule: optional sign, then leading decimal digits;
/// anything else yields zero.
fn leading_int(bytes: &[u8]) -> i64 {
    let (negative, digits) = match bytes {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, bytes),
    };
    let n = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
        });
    if negative { -n } else { n }
}

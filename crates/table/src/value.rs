//! Scalar cell values and their element kinds.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Element kind of a column. NULL is representable in every kind; a column
/// holding nothing but NULLs reports [`Kind::Null`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Float,
    Bool,
    Str,
    Null,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Int => "int64",
            Kind::Float => "float64",
            Kind::Bool => "bool",
            Kind::Str => "string",
            Kind::Null => "null",
        };
        f.write_str(s)
    }
}

/// A single cell. `Float` never holds NaN — constructors normalize NaN to
/// `Null`, which keeps equality and hashing total.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Wrap a float, mapping NaN to `Null`.
    pub fn float(f: f64) -> Value {
        if f.is_nan() {
            Value::Null
        } else {
            Value::Float(f)
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::Str(_) => Kind::Str,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Total ordering used for sort keys and group keys.
    ///
    /// NULL orders after every non-null value (ascending), mixed numeric
    /// kinds compare numerically, and otherwise values are ranked
    /// numeric < bool < string.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        use Value::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Null, _) => Ordering::Greater,
            (_, Null) => Ordering::Less,
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Bool(a), Bool(b)) => a.cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Int(_) | Value::Float(_) => 0,
            Value::Bool(_) => 1,
            Value::Str(_) => 2,
            Value::Null => 3,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Value::from(*f),
            Value::Bool(b) => serde_json::Value::from(*b),
            Value::Str(s) => serde_json::Value::from(s.clone()),
        }
    }
}

/// Join/group key wrapper giving `Value` hash-consistent equality.
///
/// `Int(2)` and `Float(2.0)` are the same key (CSV inference may type the
/// two sides of a join differently), and NULL keys equal each other.
#[derive(Debug, Clone)]
pub struct KeyValue(pub Value);

impl KeyValue {
    fn canonical(&self) -> (u8, u64) {
        match &self.0 {
            Value::Null => (0, 0),
            Value::Int(i) => (1, *i as u64),
            Value::Float(f) => {
                // Integral floats collapse onto the int representation.
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    (1, (*f as i64) as u64)
                } else {
                    let f = if *f == 0.0 { 0.0 } else { *f };
                    (2, f.to_bits())
                }
            }
            Value::Bool(b) => (3, *b as u64),
            Value::Str(_) => (4, 0),
        }
    }
}

impl PartialEq for KeyValue {
    fn eq(&self, other: &KeyValue) -> bool {
        match (&self.0, &other.0) {
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => self.canonical() == other.canonical(),
        }
    }
}

impl Eq for KeyValue {}

impl Hash for KeyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if let Value::Str(s) = &self.0 {
            4u8.hash(state);
            s.hash(state);
        } else {
            self.canonical().hash(state);
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => {
                // Keep a decimal point so the value round-trips as a float.
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_normalizes_to_null() {
        assert_eq!(Value::float(f64::NAN), Value::Null);
        assert_eq!(Value::float(1.5), Value::Float(1.5));
    }

    #[test]
    fn nulls_order_last() {
        assert_eq!(Value::Null.total_cmp(&Value::Int(1)), Ordering::Greater);
        assert_eq!(Value::Int(1).total_cmp(&Value::Null), Ordering::Less);
        assert_eq!(Value::Null.total_cmp(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn mixed_numeric_compare() {
        assert_eq!(Value::Int(2).total_cmp(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.0).total_cmp(&Value::Int(3)), Ordering::Equal);
    }

    #[test]
    fn key_equality_across_numeric_kinds() {
        assert_eq!(KeyValue(Value::Int(2)), KeyValue(Value::Float(2.0)));
        assert_ne!(KeyValue(Value::Int(2)), KeyValue(Value::Float(2.5)));
        assert_eq!(KeyValue(Value::Null), KeyValue(Value::Null));
    }

    #[test]
    fn display_formats_for_csv() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Null.to_string(), "");
    }
}

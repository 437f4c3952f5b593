use aws_sdk_dynamodb::{primitives::Blob, types::AttributeValue};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::dynamodb::{Error, Result};

/// A native attribute value.
///
/// DynamoDB tags every value on the wire (`S`, `N`, `B`, `BOOL`, `NULL`, `L`, `M`, ...).
/// `Value` is the closed set of kinds this crate exchanges with callers; conversion to
/// [`AttributeValue`] is total, conversion back fails only for variants the SDK itself
/// does not recognise.
///
/// String, number and binary sets (`SS`, `NS`, `BS`) have no native counterpart and are
/// read back as a [`Value::List`] of their members.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    String(String),
    Number(Number),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// An exact decimal number.
///
/// DynamoDB transmits numbers as decimal strings with up to 38 digits of precision, so the
/// textual form is kept verbatim rather than squeezed through `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Number(String);

impl Number {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Number {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if is_decimal(s) {
            Ok(Number(s.to_string()))
        } else {
            Err(Error::Validation(format!("'{s}' is not a decimal number")))
        }
    }
}

impl TryFrom<f64> for Number {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        if value.is_finite() {
            Ok(Number(value.to_string()))
        } else {
            Err(Error::Validation(format!(
                "{value} cannot be stored as a DynamoDB number"
            )))
        }
    }
}

macro_rules! number_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(value: $t) -> Self {
                    Number(value.to_string())
                }
            }

            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Number(value.into())
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, isize, usize);

// sign? digits [. digits] [e sign? digits], with at least one mantissa digit
fn is_decimal(s: &str) -> bool {
    let s = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };

    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = !(int.is_empty() && frac.is_empty()) && digits(int) && digits(frac);

    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['-', '+']).unwrap_or(e);
        !e.is_empty() && digits(e)
    });

    mantissa_ok && exponent_ok
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(value: HashMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null(true),
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::String(s) => AttributeValue::S(s),
            Value::Number(n) => AttributeValue::N(n.0),
            Value::Binary(b) => AttributeValue::B(Blob::new(b)),
            Value::List(l) => AttributeValue::L(l.into_iter().map(Into::into).collect()),
            Value::Map(m) => {
                AttributeValue::M(m.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl TryFrom<AttributeValue> for Value {
    type Error = Error;

    fn try_from(value: AttributeValue) -> Result<Self> {
        Ok(match value {
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::S(s) => Value::String(s),
            AttributeValue::N(n) => Value::Number(n.parse()?),
            AttributeValue::B(b) => Value::Binary(b.into_inner()),
            AttributeValue::L(l) => Value::List(
                l.into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::M(m) => Value::Map(
                m.into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::Ss(set) => Value::List(set.into_iter().map(Value::String).collect()),
            AttributeValue::Ns(set) => Value::List(
                set.into_iter()
                    .map(|n| Ok(Value::Number(n.parse()?)))
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::Bs(set) => Value::List(
                set.into_iter()
                    .map(|b| Value::Binary(b.into_inner()))
                    .collect(),
            ),
            other => return Err(Error::UnsupportedAttribute(format!("{other:?}"))),
        })
    }
}

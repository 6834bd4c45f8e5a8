use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::runner::ds::foreign::BridgeKind;
use crate::runner::ds::host::HostClass;
use crate::runner::ds::object::{JsObjectType, ObjectType};
use crate::runner::ds::operations::type_conversion::safe_to_string;

#[derive(Clone)]
pub enum JsValue {
    Undefined,
    Null,
    Boolean(bool),
    String(String),
    Number(JsNumberType),
    Object(JsObjectType),
}

impl JsValue {
    pub fn new_object(o: ObjectType) -> Self {
        JsValue::Object(Arc::new(o))
    }

    pub fn int(i: i64) -> Self {
        JsValue::Number(JsNumberType::Integer(i))
    }

    pub fn float(f: f64) -> Self {
        JsValue::Number(JsNumberType::from_f64(f))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, JsValue::Undefined | JsValue::Null)
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, JsValue::Object(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            JsValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The runtime type used by type-based guards.
    pub fn runtime_type(&self) -> RuntimeType {
        match self {
            JsValue::Undefined => RuntimeType::Undefined,
            JsValue::Null => RuntimeType::Null,
            JsValue::Boolean(_) => RuntimeType::Boolean,
            JsValue::String(_) => RuntimeType::String,
            JsValue::Number(_) => RuntimeType::Number,
            JsValue::Object(o) => match &**o {
                ObjectType::Ordinary(_) => RuntimeType::ScriptObject,
                ObjectType::Function(_) => RuntimeType::ScriptFunction,
                ObjectType::Bound(_) => RuntimeType::BoundCallable,
                ObjectType::Foreign(f) => RuntimeType::Foreign(f.bridge_kind()),
                ObjectType::Host(h) => RuntimeType::Host(h.class().clone()),
                ObjectType::DynamicMethod(_) => RuntimeType::DynamicMethod,
                ObjectType::StaticClass(_) => RuntimeType::StaticClass,
                ObjectType::SuperAdapter(_) => RuntimeType::SuperAdapter,
            },
        }
    }
}

impl Display for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", safe_to_string(self))
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "JsValue::Undefined"),
            JsValue::Null => write!(f, "JsValue::Null"),
            JsValue::Boolean(b) => write!(f, "JsValue::Boolean({})", b),
            JsValue::String(s) => write!(f, "JsValue::String({:?})", s),
            JsValue::Number(n) => write!(f, "JsValue::Number({:?})", n),
            JsValue::Object(o) => write!(f, "JsValue::Object({})", o.kind_name()),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<i32> for JsValue {
    fn from(i: i32) -> Self {
        JsValue::int(i as i64)
    }
}

impl From<i64> for JsValue {
    fn from(i: i64) -> Self {
        JsValue::int(i)
    }
}

impl From<f64> for JsValue {
    fn from(f: f64) -> Self {
        JsValue::float(f)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(s.to_string())
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsNumberType {
    Integer(i64),
    Float(f64),
    NaN,
    PositiveInfinity,
    NegativeInfinity,
}

impl JsNumberType {
    /// Normalizes a double: integral values that fit an `i64` become `Integer`.
    pub fn from_f64(f: f64) -> Self {
        if f.is_nan() {
            JsNumberType::NaN
        } else if f == f64::INFINITY {
            JsNumberType::PositiveInfinity
        } else if f == f64::NEG_INFINITY {
            JsNumberType::NegativeInfinity
        } else if f.fract() == 0.0
            && f >= i64::MIN as f64
            && f < i64::MAX as f64
            && !(f == 0.0 && f.is_sign_negative())
        {
            JsNumberType::Integer(f as i64)
        } else {
            JsNumberType::Float(f)
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            JsNumberType::Integer(i) => *i as f64,
            JsNumberType::Float(f) => *f,
            JsNumberType::NaN => f64::NAN,
            JsNumberType::PositiveInfinity => f64::INFINITY,
            JsNumberType::NegativeInfinity => f64::NEG_INFINITY,
        }
    }
}

impl Display for JsNumberType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            JsNumberType::Integer(i) => write!(f, "{}", i),
            JsNumberType::Float(nf) => write!(f, "{}", nf),
            JsNumberType::NaN => write!(f, "NaN"),
            JsNumberType::PositiveInfinity => write!(f, "Infinity"),
            JsNumberType::NegativeInfinity => write!(f, "-Infinity"),
        }
    }
}

/// Runtime type of a value as seen by type-based guards.
///
/// Host types compare by class identity, everything else by kind.
#[derive(Clone, Debug)]
pub enum RuntimeType {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    ScriptObject,
    ScriptFunction,
    BoundCallable,
    Foreign(BridgeKind),
    Host(Arc<HostClass>),
    DynamicMethod,
    StaticClass,
    SuperAdapter,
}

impl PartialEq for RuntimeType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeType::Host(a), RuntimeType::Host(b)) => Arc::ptr_eq(a, b),
            (RuntimeType::Foreign(a), RuntimeType::Foreign(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

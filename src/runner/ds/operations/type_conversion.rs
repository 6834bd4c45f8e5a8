use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::{JsNumberType, JsValue};

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";

const TWO_POW_32: f64 = 4294967296.0;

pub fn get_type(a: &JsValue) -> &'static str {
    match a {
        JsValue::Undefined => TYPE_STR_UNDEFINED,
        JsValue::Null => TYPE_STR_OBJECT,
        JsValue::Boolean(_) => TYPE_STR_BOOLEAN,
        JsValue::String(_) => TYPE_STR_STRING,
        JsValue::Number(_) => TYPE_STR_NUMBER,
        JsValue::Object(o) => match &**o {
            ObjectType::Function(_)
            | ObjectType::Bound(_)
            | ObjectType::DynamicMethod(_)
            | ObjectType::StaticClass(_) => TYPE_STR_FUNCTION,
            ObjectType::Foreign(f) if f.is_function() => TYPE_STR_FUNCTION,
            _ => TYPE_STR_OBJECT,
        },
    }
}

pub enum PreferredType {
    Default,
    String,
    Number,
}

/// ToPrimitive. Script objects consult their own `valueOf`/`toString`.
pub fn to_primitive(v: &JsValue, preferred_type: PreferredType) -> Result<JsValue, JErrorType> {
    let o = match v {
        JsValue::Object(o) => o,
        _ => return Ok(v.clone()),
    };
    match &**o {
        ObjectType::Ordinary(_) | ObjectType::Function(_) => {
            let order = match preferred_type {
                PreferredType::String => ["toString", "valueOf"],
                PreferredType::Number | PreferredType::Default => ["valueOf", "toString"],
            };
            if let Some(js_object) = o.as_js_object() {
                for method in order.iter() {
                    if let JsValue::Object(m) = js_object.get(method) {
                        if let ObjectType::Function(f) = &*m {
                            let r = f.call(v.clone(), vec![])?;
                            if r.is_primitive() {
                                return Ok(r);
                            }
                        }
                    }
                }
            }
            Ok(JsValue::String(safe_to_string(v)))
        }
        ObjectType::Foreign(f) => Ok(JsValue::String(f.to_display_string()?)),
        _ => Ok(JsValue::String(safe_to_string(v))),
    }
}

pub fn to_boolean(v: &JsValue) -> bool {
    match v {
        JsValue::Undefined | JsValue::Null => false,
        JsValue::Boolean(b) => *b,
        JsValue::String(s) => !s.is_empty(),
        JsValue::Number(n) => match n {
            JsNumberType::Integer(i) => *i != 0,
            JsNumberType::Float(f) => *f != 0.0,
            JsNumberType::NaN => false,
            JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => true,
        },
        JsValue::Object(_) => true,
    }
}

pub fn to_number(v: &JsValue) -> Result<JsNumberType, JErrorType> {
    match v {
        JsValue::Undefined => Ok(JsNumberType::NaN),
        JsValue::Null => Ok(JsNumberType::Integer(0)),
        JsValue::Boolean(b) => Ok(JsNumberType::Integer(if *b { 1 } else { 0 })),
        JsValue::String(s) => Ok(string_to_number(s)),
        JsValue::Number(n) => Ok(n.clone()),
        JsValue::Object(_) => {
            let pv = to_primitive(v, PreferredType::Number)?;
            to_number(&pv)
        }
    }
}

fn string_to_number(s: &str) -> JsNumberType {
    let t = s.trim();
    if t.is_empty() {
        return JsNumberType::Integer(0);
    }
    match t {
        "Infinity" | "+Infinity" => return JsNumberType::PositiveInfinity,
        "-Infinity" => return JsNumberType::NegativeInfinity,
        _ => {}
    }
    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return match i64::from_str_radix(hex, 16) {
            Ok(i) => JsNumberType::Integer(i),
            Err(_) => JsNumberType::NaN,
        };
    }
    // Rust accepts "inf"/"nan" spellings that ToNumber does not.
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return JsNumberType::NaN;
    }
    match t.parse::<f64>() {
        Ok(f) => JsNumberType::from_f64(f),
        Err(_) => JsNumberType::NaN,
    }
}

pub fn number_to_string(n: &JsNumberType) -> String {
    n.to_string()
}

pub fn to_string(v: &JsValue) -> Result<String, JErrorType> {
    match v {
        JsValue::Undefined => Ok(TYPE_STR_UNDEFINED.to_string()),
        JsValue::Null => Ok(TYPE_STR_NULL.to_string()),
        JsValue::Boolean(b) => Ok(b.to_string()),
        JsValue::String(s) => Ok(s.clone()),
        JsValue::Number(n) => Ok(number_to_string(n)),
        JsValue::Object(_) => {
            let pv = to_primitive(v, PreferredType::String)?;
            to_string(&pv)
        }
    }
}

pub fn to_int32(v: &JsValue) -> Result<i32, JErrorType> {
    Ok(number_to_int32(&to_number(v)?))
}

pub fn number_to_int32(n: &JsNumberType) -> i32 {
    match n {
        JsNumberType::Integer(i) => *i as i32,
        JsNumberType::Float(f) => {
            let m = f.trunc().rem_euclid(TWO_POW_32);
            m as u32 as i32
        }
        JsNumberType::NaN | JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => 0,
    }
}

pub fn to_int64(v: &JsValue) -> Result<i64, JErrorType> {
    Ok(match to_number(v)? {
        JsNumberType::Integer(i) => i,
        JsNumberType::Float(f) => f.trunc() as i64,
        JsNumberType::NaN | JsNumberType::PositiveInfinity | JsNumberType::NegativeInfinity => 0,
    })
}

pub fn to_double(v: &JsValue) -> Result<f64, JErrorType> {
    Ok(to_number(v)?.as_f64())
}

/// Renders any value without running user code, so it can not fail.
pub fn safe_to_string(v: &JsValue) -> String {
    match v {
        JsValue::Undefined => TYPE_STR_UNDEFINED.to_string(),
        JsValue::Null => TYPE_STR_NULL.to_string(),
        JsValue::Boolean(b) => b.to_string(),
        JsValue::String(s) => s.clone(),
        JsValue::Number(n) => number_to_string(n),
        JsValue::Object(o) => match &**o {
            ObjectType::Ordinary(_) => "[object Object]".to_string(),
            ObjectType::Function(f) => format!("function {}() {{ [native code] }}", f.name()),
            ObjectType::Bound(b) => format!("[bound {}]", safe_to_string(b.callable())),
            ObjectType::Foreign(f) => f
                .to_display_string()
                .unwrap_or_else(|_| format!("[object {}]", f.class_name())),
            ObjectType::Host(h) => format!("[{}]", h.class().name()),
            ObjectType::DynamicMethod(m) => {
                format!("[method {}.{}]", m.class().name(), m.name())
            }
            ObjectType::StaticClass(c) => format!("[class {}]", c.class().name()),
            ObjectType::SuperAdapter(s) => format!("[super {}]", safe_to_string(s.adapter())),
        },
    }
}

//! Auto-conversion of a candidate's return slot.

use crate::runner::ds::operations::type_conversion::{number_to_int32, to_boolean};
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::linker::invocation::Invocation;
use crate::runner::linker::signature::{MethodSignature, StaticType};

/// Adapts the return slot of `target` to `desired.ret()`.
///
/// A boxed return unboxes by narrowing cast into the primitive the call site
/// wants, provided the wrapped primitive widens to it; `null` becomes zero or
/// `false`. A `void` return becomes `undefined` when the call site wants
/// `Object`. Every other combination is left alone.
pub fn unbox_return_type(target: Invocation, desired: &MethodSignature) -> Invocation {
    let current = target.signature().ret().clone();
    let wanted = desired.ret().clone();
    if let Some(unboxed) = current.unboxed() {
        if wanted.is_primitive() {
            assert!(
                StaticType::is_method_invocation_convertible(&unboxed, &wanted),
                "return type {} can not be narrowed to {}",
                current,
                wanted
            );
            let to = wanted.clone();
            return target.filter_return(wanted, move |v| Ok(narrow(v, &to)));
        }
    }
    if current == StaticType::Void && wanted == StaticType::Object {
        return target.filter_return(StaticType::Object, |_| Ok(JsValue::Undefined));
    }
    target
}

fn narrow(v: JsValue, to: &StaticType) -> JsValue {
    match (to, v) {
        (StaticType::Boolean, JsValue::Null) => JsValue::Boolean(false),
        (StaticType::Double, JsValue::Null) => JsValue::float(0.0),
        (_, JsValue::Null) => JsValue::int(0),
        (StaticType::Boolean, v) => JsValue::Boolean(to_boolean(&v)),
        (StaticType::Int, JsValue::Number(n)) => JsValue::from(number_to_int32(&n)),
        (StaticType::Long, JsValue::Number(JsNumberType::Float(f))) => JsValue::int(f as i64),
        (StaticType::Double, JsValue::Number(n)) => JsValue::float(n.as_f64()),
        (_, v) => v,
    }
}

//! General value conversion between static types, following the script
//! language's ToNumber/ToString/ToBoolean/ToInt32 rules.

use crate::runner::callable::functional_proxy;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{
    to_boolean, to_double, to_int32, to_int64, to_string,
};
use crate::runner::ds::value::JsValue;
use crate::runner::linker::signature::StaticType;

/// Is there a conversion rule from `from` to `to`?
///
/// Script values of any static type convert to every other type except that
/// nothing but `Object`-typed values can become a functional proxy.
pub fn can_convert(from: &StaticType, to: &StaticType) -> bool {
    if from == to {
        return true;
    }
    match to {
        StaticType::Functional(_) => matches!(from, StaticType::Object),
        _ => !matches!(from, StaticType::Functional(_)) || matches!(to, StaticType::Object),
    }
}

/// Converts `value` so that `to.admits(result)` holds.
pub fn convert_value(value: JsValue, to: &StaticType) -> Result<JsValue, JErrorType> {
    if to.admits(&value) {
        return Ok(value);
    }
    match to {
        StaticType::Object => Ok(value),
        StaticType::Void => Ok(JsValue::Undefined),
        StaticType::Boolean => Ok(JsValue::Boolean(to_boolean(&value))),
        StaticType::Int => Ok(JsValue::from(to_int32(&value)?)),
        StaticType::Long => Ok(JsValue::int(to_int64(&value)?)),
        StaticType::Double => Ok(JsValue::float(to_double(&value)?)),
        StaticType::String => Ok(JsValue::String(to_string(&value)?)),
        StaticType::Functional(method) => functional_proxy(&value, method),
        boxed => {
            if let JsValue::Undefined = value {
                return Ok(JsValue::Null);
            }
            match boxed.unboxed() {
                Some(primitive) => convert_value(value, &primitive),
                None => Ok(value),
            }
        }
    }
}

/// Converts each argument to the matching parameter type. Missing trailing
/// arguments are converted from `undefined`; extra ones pass through.
pub fn convert_arguments(params: &[StaticType], args: &[JsValue]) -> Result<Vec<JsValue>, JErrorType> {
    let mut converted = Vec::with_capacity(params.len().max(args.len()));
    for (i, p) in params.iter().enumerate() {
        let a = args.get(i).cloned().unwrap_or(JsValue::Undefined);
        converted.push(convert_value(a, p)?);
    }
    if args.len() > params.len() {
        converted.extend_from_slice(&args[params.len()..]);
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::callable::is_functional_interface_object;
    use crate::runner::ds::function_object::ScriptFunction;

    #[test]
    fn test_numeric_conversions() {
        assert_eq!(convert_value(JsValue::from("12"), &StaticType::Int).unwrap(), JsValue::from(12));
        assert_eq!(convert_value(JsValue::float(2.9), &StaticType::Int).unwrap(), JsValue::from(2));
        assert_eq!(convert_value(JsValue::from(true), &StaticType::Double).unwrap(), JsValue::from(1));
        assert_eq!(convert_value(JsValue::from(0), &StaticType::Boolean).unwrap(), JsValue::from(false));
        assert_eq!(convert_value(JsValue::from(3), &StaticType::String).unwrap(), JsValue::from("3"));
    }

    #[test]
    fn test_boxed_targets_keep_null() {
        assert_eq!(convert_value(JsValue::Null, &StaticType::BoxedInt).unwrap(), JsValue::Null);
        assert_eq!(convert_value(JsValue::Undefined, &StaticType::BoxedDouble).unwrap(), JsValue::Null);
        assert_eq!(convert_value(JsValue::from("4"), &StaticType::BoxedLong).unwrap(), JsValue::from(4));
    }

    #[test]
    fn test_functional_target_builds_proxy() {
        let f = ScriptFunction::native("f", false, |_, _| Ok(JsValue::Undefined)).into_value();
        let p = convert_value(f, &StaticType::Functional("run".to_string())).unwrap();
        assert!(is_functional_interface_object(&p));
        assert!(convert_value(JsValue::from(1), &StaticType::Functional("run".to_string()))
            .unwrap_err()
            .is_type_error());
        assert!(!can_convert(&StaticType::Int, &StaticType::Functional("run".to_string())));
    }

    #[test]
    fn test_convert_arguments_pads_and_passes_extras() {
        let out = convert_arguments(
            &[StaticType::Int, StaticType::Boolean],
            &[JsValue::from("7")],
        )
        .unwrap();
        assert_eq!(out, vec![JsValue::from(7), JsValue::from(false)]);
        let out = convert_arguments(&[], &[JsValue::from(1)]).unwrap();
        assert_eq!(out, vec![JsValue::from(1)]);
    }
}

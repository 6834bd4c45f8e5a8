//! Static types of call-site and candidate signatures.

use std::fmt;
use std::fmt::{Display, Formatter};

use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::{JsNumberType, JsValue};

/// Static type of a parameter or return slot.
///
/// Boxed types admit `null`, primitive types do not. `Functional(m)` is a
/// single-method host type whose only method is named `m`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaticType {
    Void,
    Boolean,
    Int,
    Long,
    Double,
    BoxedBoolean,
    BoxedInt,
    BoxedLong,
    BoxedDouble,
    String,
    Object,
    Functional(String),
}

impl StaticType {
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            StaticType::Boolean | StaticType::Int | StaticType::Long | StaticType::Double
        )
    }

    pub fn is_boxed(&self) -> bool {
        matches!(
            self,
            StaticType::BoxedBoolean
                | StaticType::BoxedInt
                | StaticType::BoxedLong
                | StaticType::BoxedDouble
        )
    }

    /// The primitive a boxed type wraps.
    pub fn unboxed(&self) -> Option<StaticType> {
        match self {
            StaticType::BoxedBoolean => Some(StaticType::Boolean),
            StaticType::BoxedInt => Some(StaticType::Int),
            StaticType::BoxedLong => Some(StaticType::Long),
            StaticType::BoxedDouble => Some(StaticType::Double),
            _ => None,
        }
    }

    /// The wrapper type of a primitive.
    pub fn boxed(&self) -> Option<StaticType> {
        match self {
            StaticType::Boolean => Some(StaticType::BoxedBoolean),
            StaticType::Int => Some(StaticType::BoxedInt),
            StaticType::Long => Some(StaticType::BoxedLong),
            StaticType::Double => Some(StaticType::BoxedDouble),
            _ => None,
        }
    }

    /// Identity or widening primitive conversion from `from` to `to`.
    pub fn is_method_invocation_convertible(from: &StaticType, to: &StaticType) -> bool {
        match (from, to) {
            (a, b) if a == b => true,
            (StaticType::Int, StaticType::Long) | (StaticType::Int, StaticType::Double) => true,
            (StaticType::Long, StaticType::Double) => true,
            _ => false,
        }
    }

    /// Does `value` inhabit this static type without conversion?
    pub fn admits(&self, value: &JsValue) -> bool {
        match (self, value) {
            (StaticType::Object, _) => true,
            (StaticType::Void, JsValue::Undefined) => true,
            (StaticType::Boolean, JsValue::Boolean(_)) => true,
            (StaticType::Int, JsValue::Number(JsNumberType::Integer(i))) => {
                *i >= i32::MIN as i64 && *i <= i32::MAX as i64
            }
            (StaticType::Long, JsValue::Number(JsNumberType::Integer(_))) => true,
            (StaticType::Double, JsValue::Number(_)) => true,
            (StaticType::String, JsValue::String(_)) => true,
            (StaticType::Functional(m), JsValue::Object(o)) => match &**o {
                ObjectType::Host(h) => h.class().functional_method_name() == Some(m.as_str()),
                _ => false,
            },
            (boxed, JsValue::Null) if boxed.is_boxed() => true,
            (boxed, v) if boxed.is_boxed() => match boxed.unboxed() {
                Some(p) => p.admits(v),
                None => false,
            },
            _ => false,
        }
    }
}

impl Display for StaticType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StaticType::Void => write!(f, "void"),
            StaticType::Boolean => write!(f, "boolean"),
            StaticType::Int => write!(f, "int"),
            StaticType::Long => write!(f, "long"),
            StaticType::Double => write!(f, "double"),
            StaticType::BoxedBoolean => write!(f, "Boolean"),
            StaticType::BoxedInt => write!(f, "Integer"),
            StaticType::BoxedLong => write!(f, "Long"),
            StaticType::BoxedDouble => write!(f, "Double"),
            StaticType::String => write!(f, "String"),
            StaticType::Object => write!(f, "Object"),
            StaticType::Functional(m) => write!(f, "@{}", m),
        }
    }
}

/// Parameter and return types of a call site or a candidate invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    params: Vec<StaticType>,
    ret: StaticType,
}

impl MethodSignature {
    pub fn new(params: Vec<StaticType>, ret: StaticType) -> Self {
        MethodSignature { params, ret }
    }

    /// `(Object, ..., Object)Object` with `arity` parameters.
    pub fn generic(arity: usize) -> Self {
        MethodSignature {
            params: vec![StaticType::Object; arity],
            ret: StaticType::Object,
        }
    }

    pub fn params(&self) -> &[StaticType] {
        &self.params
    }

    pub fn ret(&self) -> &StaticType {
        &self.ret
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn change_return_type(&self, ret: StaticType) -> Self {
        MethodSignature {
            params: self.params.clone(),
            ret,
        }
    }

    pub fn change_parameter_types(&self, params: Vec<StaticType>) -> Self {
        MethodSignature {
            params,
            ret: self.ret.clone(),
        }
    }
}

impl Display for MethodSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        write!(f, "({}){}", params.join(","), self.ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_is_one_way() {
        assert!(StaticType::is_method_invocation_convertible(&StaticType::Int, &StaticType::Double));
        assert!(!StaticType::is_method_invocation_convertible(&StaticType::Double, &StaticType::Int));
        assert!(!StaticType::is_method_invocation_convertible(&StaticType::Boolean, &StaticType::Int));
    }

    #[test]
    fn test_boxed_types_admit_null() {
        assert!(StaticType::BoxedInt.admits(&JsValue::Null));
        assert!(StaticType::BoxedInt.admits(&JsValue::from(3)));
        assert!(!StaticType::Int.admits(&JsValue::Null));
        assert!(!StaticType::Int.admits(&JsValue::int(1 << 40)));
        assert!(StaticType::Long.admits(&JsValue::int(1 << 40)));
    }

    #[test]
    fn test_signature_rendering() {
        let sig = MethodSignature::new(vec![StaticType::Object, StaticType::Int], StaticType::BoxedBoolean);
        assert_eq!(sig.to_string(), "(Object,int)Boolean");
        assert_eq!(MethodSignature::generic(0).to_string(), "()Object");
    }
}

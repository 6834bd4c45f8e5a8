//! The unified callable abstraction.
//!
//! Every value that can be the target of a CALL or NEW falls into exactly one
//! [`Callable`] variant. The variants are closed; each operation is one match.

use std::sync::Arc;

use crate::runner::ds::bound_callable::BoundCallable;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::foreign::ForeignObject;
use crate::runner::ds::function_object::ScriptFunction;
use crate::runner::ds::host::{DynamicMethod, HostMethod, StaticClass};
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::conversion::convert_arguments;

pub enum Callable<'a> {
    NativeFunction(&'a ScriptFunction),
    ForeignFunction(&'a dyn ForeignObject),
    Bound(&'a BoundCallable),
    /// A host object whose type has exactly one abstract method.
    FunctionalAdapter {
        receiver: &'a JsValue,
        method: &'a HostMethod,
    },
    DynamicMethodRef(&'a DynamicMethod),
    StaticTypeRef(&'a StaticClass),
}

impl<'a> Callable<'a> {
    /// Classifies `v`, or returns `None` for values that can not be called.
    pub fn classify(v: &'a JsValue) -> Option<Callable<'a>> {
        let o = match v {
            JsValue::Object(o) => o,
            _ => return None,
        };
        match &**o {
            ObjectType::Function(f) => Some(Callable::NativeFunction(f)),
            ObjectType::Foreign(f) if f.is_function() => Some(Callable::ForeignFunction(&**f)),
            ObjectType::DynamicMethod(m) => Some(Callable::DynamicMethodRef(m)),
            ObjectType::Bound(b) => Some(Callable::Bound(b)),
            ObjectType::Host(h) => h.class().functional_method().map(|method| {
                Callable::FunctionalAdapter {
                    receiver: v,
                    method,
                }
            }),
            ObjectType::StaticClass(c) => Some(Callable::StaticTypeRef(c)),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Callable::NativeFunction(_) => "NativeFunction",
            Callable::ForeignFunction(_) => "ForeignFunction",
            Callable::Bound(_) => "BoundCallable",
            Callable::FunctionalAdapter { .. } => "FunctionalAdapter",
            Callable::DynamicMethodRef(_) => "DynamicMethod",
            Callable::StaticTypeRef(_) => "StaticClass",
        }
    }

    pub fn is_strict(&self) -> bool {
        match self {
            Callable::NativeFunction(f) => f.is_strict(),
            Callable::ForeignFunction(f) => f.is_strict_function(),
            Callable::Bound(b) => Callable::classify(b.callable()).map_or(false, |c| c.is_strict()),
            _ => false,
        }
    }

    pub fn call(&self, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        match self {
            Callable::NativeFunction(f) => f.call(this, args),
            Callable::ForeignFunction(f) => f.call(this, args),
            Callable::Bound(b) => inner_of(b)?.call(b.bound_this().clone(), b.splice_args(&args)),
            Callable::FunctionalAdapter { receiver, method } => invoke_host(method, receiver, args),
            Callable::DynamicMethodRef(m) => call_dynamic_method(m, &this, args),
            Callable::StaticTypeRef(c) => construct_static(c, args),
        }
    }

    pub fn construct(&self, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        match self {
            Callable::NativeFunction(f) => f.construct(args),
            Callable::ForeignFunction(f) => f.new_object(args),
            Callable::Bound(b) => inner_of(b)?.construct(b.splice_args(&args)),
            Callable::StaticTypeRef(c) => construct_static(c, args),
            Callable::FunctionalAdapter { .. } | Callable::DynamicMethodRef(_) => Err(
                JErrorType::TypeError(format!("{} is not a constructor", self.kind_name())),
            ),
        }
    }
}

fn inner_of(b: &BoundCallable) -> Result<Callable<'_>, JErrorType> {
    Callable::classify(b.callable())
        .ok_or_else(|| JErrorType::not_a_function(&safe_to_string(b.callable())))
}

/// Calls a host method with its arguments converted to the declared
/// parameter types.
pub fn invoke_host(
    method: &HostMethod,
    receiver: &JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let args = convert_arguments(method.signature().params(), &args)?;
    method.call(receiver, args)
}

/// Invokes a host method reference. Instance methods require a receiver of
/// the declaring class.
pub fn call_dynamic_method(
    m: &DynamicMethod,
    this: &JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let method = m.method().ok_or_else(|| {
        JErrorType::TypeError(format!("{} has no method {}", m.class().name(), m.name()))
    })?;
    if m.is_static() {
        return invoke_host(method, &JsValue::Undefined, args);
    }
    match this.as_object() {
        Some(ObjectType::Host(h)) if h.class().is_assignable_to(m.class()) => {
            invoke_host(method, this, args)
        }
        _ => Err(JErrorType::TypeError(format!(
            "{} is not an instance of {}",
            safe_to_string(this),
            m.class().name()
        ))),
    }
}

pub fn construct_static(c: &StaticClass, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    match c.class().constructor() {
        Some(ctor) => invoke_host(ctor, &JsValue::Undefined, args),
        None => Err(JErrorType::TypeError(format!(
            "{} has no public constructor",
            c.class().name()
        ))),
    }
}

/// `undefined` and `null` are never callable; this never fails.
pub fn is_callable(v: &JsValue) -> bool {
    Callable::classify(v).is_some()
}

pub fn is_strict_callable(v: &JsValue) -> Result<bool, JErrorType> {
    match Callable::classify(v) {
        Some(c) => Ok(c.is_strict()),
        None => Err(JErrorType::not_a_function(&safe_to_string(v))),
    }
}

/// Is `v` a host method reference, possibly wrapped in one bound layer?
pub fn is_dynamic_method(v: &JsValue) -> bool {
    match v.as_object() {
        Some(ObjectType::DynamicMethod(_)) => true,
        Some(ObjectType::Bound(b)) => {
            matches!(b.callable().as_object(), Some(ObjectType::DynamicMethod(_)))
        }
        _ => false,
    }
}

/// Is `v` a non-primitive whose type has exactly one abstract method?
pub fn is_functional_interface_object(v: &JsValue) -> bool {
    match v.as_object() {
        Some(ObjectType::Host(h)) => h.class().functional_method().is_some(),
        _ => false,
    }
}

/// Binds `this` and an argument prefix to a callable.
///
/// Script functions use their own bound representation. Binding a bound
/// callable appends to its prefix and keeps its receiver.
pub fn bind_callable(
    callable: &JsValue,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match Callable::classify(callable) {
        Some(Callable::NativeFunction(_)) => match callable {
            JsValue::Object(o) => Ok(JsValue::new_object(ObjectType::Function(
                ScriptFunction::create_bound(o, this, args)?,
            ))),
            _ => Err(JErrorType::not_a_function(&safe_to_string(callable))),
        },
        Some(_) => Ok(BoundCallable::new(callable.clone(), this, args).into_value()),
        None => Err(JErrorType::not_a_function(&safe_to_string(callable))),
    }
}

/// Wraps a callable into an instance of a synthesized single-method host
/// class so it can be passed where `Functional(method)` is expected.
pub fn functional_proxy(callable: &JsValue, method: &str) -> Result<JsValue, JErrorType> {
    use crate::runner::ds::host::{HostClass, HostObject};
    use crate::runner::linker::signature::{MethodSignature, StaticType};

    if !is_callable(callable) {
        return Err(JErrorType::TypeError(format!(
            "Cannot convert {} to a functional interface with method {}",
            safe_to_string(callable),
            method
        )));
    }
    let target = callable.clone();
    let class = HostClass::new(format!("$Proxy${}", method))
        .add_method(
            method,
            MethodSignature::new(vec![], StaticType::Object),
            move |_, args| match Callable::classify(&target) {
                Some(c) => c.call(JsValue::Undefined, args),
                None => Err(JErrorType::not_a_function(&safe_to_string(&target))),
            },
        )
        .functional(method);
    Ok(HostObject::new(Arc::new(class)).into_value())
}

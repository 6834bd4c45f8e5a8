use std::sync::Arc;

use parking_lot::RwLock;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectBase, ObjectType, ScriptObject};
use crate::runner::ds::value::JsValue;

/// Function signature for compiled-in script functions.
pub type NativeFn = fn(this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType>;

pub type ClosureFn = dyn Fn(JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync;

pub enum FunctionBody {
    /// Direct function pointer - zero overhead for compiled-in functions.
    Native(NativeFn),
    /// Closure-backed function, e.g. produced by the code generator.
    Closure(Arc<ClosureFn>),
    /// The function's own bound representation (see [`ScriptFunction::create_bound`]).
    Bound(BoundFunctionData),
}

pub struct BoundFunctionData {
    bound_target_function: JsObjectType,
    bound_this: JsValue,
    bound_arguments: Vec<JsValue>,
}
impl BoundFunctionData {
    pub fn target(&self) -> &JsObjectType {
        &self.bound_target_function
    }

    pub fn bound_this(&self) -> &JsValue {
        &self.bound_this
    }

    pub fn bound_arguments(&self) -> &[JsValue] {
        &self.bound_arguments
    }

    fn target_function(&self) -> &ScriptFunction {
        match &*self.bound_target_function {
            ObjectType::Function(f) => f,
            // create_bound only ever stores script functions
            _ => unreachable!("bound target is not a script function"),
        }
    }
}

/// A native script function.
pub struct ScriptFunction {
    name: String,
    strict: bool,
    constructor: bool,
    body: FunctionBody,
    object: ScriptObject,
}
impl ScriptFunction {
    pub fn native(name: impl Into<String>, strict: bool, f: NativeFn) -> Self {
        Self::with_body(name.into(), strict, FunctionBody::Native(f))
    }

    pub fn closure<F>(name: impl Into<String>, strict: bool, f: F) -> Self
    where
        F: Fn(JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        Self::with_body(name.into(), strict, FunctionBody::Closure(Arc::new(f)))
    }

    fn with_body(name: String, strict: bool, body: FunctionBody) -> Self {
        ScriptFunction {
            name,
            strict,
            constructor: true,
            body,
            object: ScriptObject::new(),
        }
    }

    /// Arrow functions and methods can not be used with `new`.
    pub fn non_constructor(mut self) -> Self {
        self.constructor = false;
        self
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::Function(self))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_constructor(&self) -> bool {
        self.constructor
    }

    pub fn bound_data(&self) -> Option<&BoundFunctionData> {
        match &self.body {
            FunctionBody::Bound(b) => Some(b),
            _ => None,
        }
    }

    pub fn call(&self, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        match &self.body {
            FunctionBody::Native(f) => f(this, args),
            FunctionBody::Closure(f) => f(this, args),
            FunctionBody::Bound(b) => {
                let mut input_args = args;
                let mut new_args = b.bound_arguments.clone();
                new_args.append(&mut input_args);
                b.target_function().call(b.bound_this.clone(), new_args)
            }
        }
    }

    pub fn construct(&self, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        if !self.constructor {
            return Err(JErrorType::TypeError(format!(
                "{} is not a constructor",
                self.name
            )));
        }
        if let FunctionBody::Bound(b) = &self.body {
            let mut input_args = args;
            let mut new_args = b.bound_arguments.clone();
            new_args.append(&mut input_args);
            return b.target_function().construct(new_args);
        }
        let instance = match self.get("prototype") {
            JsValue::Object(proto) if proto.as_js_object().is_some() => {
                ScriptObject::with_prototype(proto)
            }
            _ => ScriptObject::new(),
        }
        .into_value();
        match self.call(instance.clone(), args)? {
            r @ JsValue::Object(_) => Ok(r),
            _ => Ok(instance),
        }
    }

    /// Creates this function's specialized bound representation.
    ///
    /// Binding an already bound function keeps the original target and
    /// receiver and appends `bound_args` to the existing prefix.
    pub fn create_bound(
        target: &JsObjectType,
        bound_this: JsValue,
        bound_args: Vec<JsValue>,
    ) -> Result<ScriptFunction, JErrorType> {
        let f = match &**target {
            ObjectType::Function(f) => f,
            other => {
                return Err(JErrorType::not_a_function(other.kind_name()));
            }
        };
        let data = match &f.body {
            FunctionBody::Bound(b) => {
                let mut bound_arguments = b.bound_arguments.clone();
                bound_arguments.extend(bound_args);
                BoundFunctionData {
                    bound_target_function: b.bound_target_function.clone(),
                    bound_this: b.bound_this.clone(),
                    bound_arguments,
                }
            }
            _ => BoundFunctionData {
                bound_target_function: target.clone(),
                bound_this,
                bound_arguments: bound_args,
            },
        };
        let name = match &f.body {
            FunctionBody::Bound(_) => f.name.clone(),
            _ => format!("bound {}", f.name),
        };
        Ok(ScriptFunction {
            name,
            strict: f.strict,
            constructor: f.constructor,
            body: FunctionBody::Bound(data),
            object: ScriptObject::new(),
        })
    }
}

impl JsObject for ScriptFunction {
    fn get_object_base(&self) -> &RwLock<ObjectBase> {
        self.object.get_object_base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        let mut s = format!("{}", this);
        for a in args {
            s.push_str(&format!(",{}", a));
        }
        Ok(JsValue::String(s))
    }

    #[test]
    fn test_create_bound_prepends_arguments() {
        let f = Arc::new(ObjectType::Function(ScriptFunction::native("f", false, collect)));
        let b = ScriptFunction::create_bound(&f, JsValue::from("r"), vec![JsValue::from(1)]).unwrap();
        assert_eq!(b.name(), "bound f");
        let r = b.call(JsValue::from("ignored"), vec![JsValue::from(2)]).unwrap();
        assert_eq!(r, JsValue::from("r,1,2"));
    }

    #[test]
    fn test_rebinding_concatenates_prefix_and_keeps_receiver() {
        let f = Arc::new(ObjectType::Function(ScriptFunction::native("f", true, collect)));
        let b1 = Arc::new(ObjectType::Function(
            ScriptFunction::create_bound(&f, JsValue::from("r1"), vec![JsValue::from(1)]).unwrap(),
        ));
        let b2 = ScriptFunction::create_bound(&b1, JsValue::from("r2"), vec![JsValue::from(2)]).unwrap();
        assert!(b2.is_strict());
        assert!(Arc::ptr_eq(b2.bound_data().unwrap().target(), &f));
        let r = b2.call(JsValue::Undefined, vec![JsValue::from(3)]).unwrap();
        assert_eq!(r, JsValue::from("r1,1,2,3"));
    }

    #[test]
    fn test_construct_uses_prototype_property() {
        let proto = ScriptObject::new();
        proto.define_own_property("kind", JsValue::from("point"));
        let ctor = ScriptFunction::native("Point", false, |this, args| {
            if let Some(o) = this.as_object().and_then(|o| o.as_js_object()) {
                o.define_own_property("x", args.get(0).cloned().unwrap_or(JsValue::Undefined));
            }
            Ok(JsValue::Undefined)
        });
        ctor.define_own_property("prototype", proto.into_value());
        let p = ctor.construct(vec![JsValue::from(3)]).unwrap();
        let p = p.as_object().and_then(|o| o.as_js_object()).unwrap();
        assert_eq!(p.get("x"), JsValue::from(3));
        assert_eq!(p.get("kind"), JsValue::from("point"));
    }

    #[test]
    fn test_non_constructor_rejects_new() {
        let f = ScriptFunction::native("arrow", false, collect).non_constructor();
        assert!(f.construct(vec![]).unwrap_err().is_type_error());
    }
}

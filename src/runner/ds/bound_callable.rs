use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;

/// A callable with a fixed receiver and a fixed argument prefix.
///
/// Used for every callable that has no bound representation of its own
/// (foreign functions, dynamic methods, functional adapters, static classes).
/// The wrapped callable is never itself a `BoundCallable`: further binding
/// concatenates onto the prefix instead of nesting.
pub struct BoundCallable {
    callable: JsValue,
    bound_this: JsValue,
    bound_args: Vec<JsValue>,
}
impl BoundCallable {
    pub fn new(callable: JsValue, bound_this: JsValue, bound_args: Vec<JsValue>) -> Self {
        if let Some(ObjectType::Bound(inner)) = callable.as_object() {
            return inner.bind(bound_args);
        }
        BoundCallable {
            callable,
            bound_this,
            bound_args,
        }
    }

    /// Binds more arguments. The receiver of the first binding is kept.
    pub fn bind(&self, more_args: Vec<JsValue>) -> BoundCallable {
        let mut bound_args = self.bound_args.clone();
        bound_args.extend(more_args);
        BoundCallable {
            callable: self.callable.clone(),
            bound_this: self.bound_this.clone(),
            bound_args,
        }
    }

    pub fn callable(&self) -> &JsValue {
        &self.callable
    }

    pub fn bound_this(&self) -> &JsValue {
        &self.bound_this
    }

    pub fn bound_args(&self) -> &[JsValue] {
        &self.bound_args
    }

    /// Builds the full argument list for the wrapped callable.
    pub fn splice_args(&self, args: &[JsValue]) -> Vec<JsValue> {
        let mut all = Vec::with_capacity(self.bound_args.len() + args.len());
        all.extend_from_slice(&self.bound_args);
        all.extend_from_slice(args);
        all
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::Bound(self))
    }
}

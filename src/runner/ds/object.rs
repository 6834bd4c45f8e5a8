use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::runner::ds::bound_callable::BoundCallable;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::foreign::ForeignObject;
use crate::runner::ds::function_object::ScriptFunction;
use crate::runner::ds::host::{DynamicMethod, HostObject, StaticClass, SuperAdapter};
use crate::runner::ds::value::JsValue;
use crate::runner::linker::invocation::SwitchPoint;

pub type JsObjectType = Arc<ObjectType>;

/// Every object model the linking layer has to unify.
pub enum ObjectType {
    Ordinary(ScriptObject),
    Function(ScriptFunction),
    Bound(BoundCallable),
    Foreign(Box<dyn ForeignObject>),
    Host(HostObject),
    DynamicMethod(DynamicMethod),
    StaticClass(StaticClass),
    SuperAdapter(SuperAdapter),
}
impl ObjectType {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ObjectType::Ordinary(_) => "ScriptObject",
            ObjectType::Function(_) => "ScriptFunction",
            ObjectType::Bound(_) => "BoundCallable",
            ObjectType::Foreign(_) => "ForeignObject",
            ObjectType::Host(_) => "HostObject",
            ObjectType::DynamicMethod(_) => "DynamicMethod",
            ObjectType::StaticClass(_) => "StaticClass",
            ObjectType::SuperAdapter(_) => "SuperAdapter",
        }
    }

    /// The script-native property view of this object, if it has one.
    pub fn as_js_object(&self) -> Option<&dyn JsObject> {
        match self {
            ObjectType::Ordinary(o) => Some(o),
            ObjectType::Function(f) => Some(f),
            _ => None,
        }
    }
}

pub struct ObjectBase {
    properties: HashMap<String, JsValue>,
    is_extensible: bool,
    prototype: Option<JsObjectType>,
    layout: SwitchPoint,
}
impl ObjectBase {
    pub fn new() -> Self {
        ObjectBase {
            properties: HashMap::new(),
            is_extensible: true,
            prototype: None,
            layout: SwitchPoint::new(),
        }
    }

    fn relayout(&mut self) {
        self.layout.invalidate();
        self.layout = SwitchPoint::new();
    }
}

impl Default for ObjectBase {
    fn default() -> Self {
        Self::new()
    }
}

/// Property-model queries the linkers are allowed to make on script-native objects.
///
/// Properties live in the object model; the linkers only orchestrate.
pub trait JsObject: Send + Sync {
    fn get_object_base(&self) -> &RwLock<ObjectBase>;

    fn get_prototype_of(&self) -> Option<JsObjectType> {
        self.get_object_base().read().prototype.clone()
    }

    /// Returns `false` when the change would create a cycle or the object is not extensible.
    fn set_prototype_of(&self, prototype: Option<JsObjectType>) -> bool {
        if !self.is_extensible() {
            return false;
        }
        let mut p = prototype.clone();
        while let Some(some_p) = p {
            match some_p.as_js_object() {
                Some(o) => {
                    if std::ptr::eq(
                        o.get_object_base() as *const _,
                        self.get_object_base() as *const _,
                    ) {
                        // To prevent circular chain
                        return false;
                    }
                    p = o.get_prototype_of();
                }
                None => break,
            }
        }
        let mut base = self.get_object_base().write();
        base.prototype = prototype;
        base.relayout();
        true
    }

    fn is_extensible(&self) -> bool {
        self.get_object_base().read().is_extensible
    }

    fn prevent_extensions(&self) -> bool {
        let mut base = self.get_object_base().write();
        base.is_extensible = false;
        base.relayout();
        true
    }

    fn get_own_property(&self, key: &str) -> Option<JsValue> {
        self.get_object_base().read().properties.get(key).cloned()
    }

    fn has_own_property(&self, key: &str) -> bool {
        self.get_object_base().read().properties.contains_key(key)
    }

    fn has_property(&self, key: &str) -> bool {
        if self.has_own_property(key) {
            return true;
        }
        match self.get_prototype_of() {
            None => false,
            Some(p) => p.as_js_object().map_or(false, |o| o.has_property(key)),
        }
    }

    /// Reads through the prototype chain; absent properties read as `undefined`.
    fn get(&self, key: &str) -> JsValue {
        match self.get_own_property(key) {
            Some(v) => v,
            None => match self.get_prototype_of() {
                None => JsValue::Undefined,
                Some(p) => match p.as_js_object() {
                    Some(o) => o.get(key),
                    None => JsValue::Undefined,
                },
            },
        }
    }

    /// Adds or overwrites an own property. Returns `false` if the object is not extensible.
    fn define_own_property(&self, key: &str, value: JsValue) -> bool {
        let mut base = self.get_object_base().write();
        if let Some(slot) = base.properties.get_mut(key) {
            *slot = value;
            return true;
        }
        if !base.is_extensible {
            return false;
        }
        base.properties.insert(key.to_string(), value);
        base.relayout();
        true
    }

    /// Assignment semantics: non-extensible objects silently ignore new
    /// properties unless `strict` is set.
    fn put(&self, key: &str, value: JsValue, strict: bool) -> Result<(), JErrorType> {
        if self.define_own_property(key, value) || !strict {
            Ok(())
        } else {
            Err(JErrorType::TypeError(format!(
                "Cannot add property {}, object is not extensible",
                key
            )))
        }
    }

    fn own_keys(&self) -> Vec<String> {
        self.get_object_base().read().properties.keys().cloned().collect()
    }

    /// Switch points of this object and every object on its prototype chain.
    ///
    /// Each is invalidated when the corresponding object gains a property or
    /// changes prototype.
    fn layout_switch_points(&self) -> Vec<SwitchPoint> {
        let mut points = vec![self.get_object_base().read().layout.clone()];
        let mut p = self.get_prototype_of();
        while let Some(proto) = p {
            match proto.as_js_object() {
                Some(o) => {
                    points.push(o.get_object_base().read().layout.clone());
                    p = o.get_prototype_of();
                }
                None => break,
            }
        }
        points
    }
}

/// A plain script-native object.
pub struct ScriptObject {
    base: RwLock<ObjectBase>,
}
impl ScriptObject {
    pub fn new() -> Self {
        ScriptObject {
            base: RwLock::new(ObjectBase::new()),
        }
    }

    pub fn with_prototype(prototype: JsObjectType) -> Self {
        let o = ScriptObject::new();
        o.base.write().prototype = Some(prototype);
        o
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::Ordinary(self))
    }
}

impl Default for ScriptObject {
    fn default() -> Self {
        Self::new()
    }
}

impl JsObject for ScriptObject {
    fn get_object_base(&self) -> &RwLock<ObjectBase> {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_walks_prototype_chain() {
        let proto = ScriptObject::new();
        proto.define_own_property("greeting", JsValue::from("hi"));
        let proto = Arc::new(ObjectType::Ordinary(proto));
        let o = ScriptObject::with_prototype(proto);
        assert_eq!(o.get("greeting"), JsValue::from("hi"));
        assert_eq!(o.get("missing"), JsValue::Undefined);
        assert!(o.has_property("greeting"));
        assert!(!o.has_own_property("greeting"));
    }

    #[test]
    fn test_adding_property_invalidates_layout() {
        let o = ScriptObject::new();
        let points = o.layout_switch_points();
        assert!(!points[0].has_been_invalidated());
        o.define_own_property("x", JsValue::from(1));
        assert!(points[0].has_been_invalidated());
        // Overwriting an existing property keeps the layout.
        let points = o.layout_switch_points();
        o.define_own_property("x", JsValue::from(2));
        assert!(!points[0].has_been_invalidated());
    }

    #[test]
    fn test_put_on_non_extensible() {
        let o = ScriptObject::new();
        o.prevent_extensions();
        assert!(o.put("x", JsValue::from(1), false).is_ok());
        assert_eq!(o.get("x"), JsValue::Undefined);
        assert!(o.put("x", JsValue::from(1), true).unwrap_err().is_type_error());
    }

    #[test]
    fn test_prototype_cycle_rejected() {
        let a = Arc::new(ObjectType::Ordinary(ScriptObject::new()));
        let b = Arc::new(ObjectType::Ordinary(ScriptObject::with_prototype(a.clone())));
        assert!(!a.as_js_object().unwrap().set_prototype_of(Some(b)));
    }
}

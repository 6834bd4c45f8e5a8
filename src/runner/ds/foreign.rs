//! Foreign bridge objects: values that live outside the script object model
//! and are reached through an adapter boundary.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::{JsObject, ObjectType};
use crate::runner::ds::value::JsValue;

/// Which bridge linker owns a foreign object.
///
/// Browser objects carry their own missing-member semantics, so the
/// missing-member policy never synthesizes results for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeKind {
    Generic,
    Browser,
}

/// The adapter boundary every foreign object implements.
///
/// Missing members are whatever the foreign object says they are: the
/// linkers never substitute `undefined` on its behalf.
pub trait ForeignObject: Send + Sync {
    fn class_name(&self) -> String {
        "Object".to_string()
    }

    fn bridge_kind(&self) -> BridgeKind {
        BridgeKind::Generic
    }

    fn get_member(&self, name: &str) -> Result<JsValue, JErrorType>;

    fn set_member(&self, name: &str, value: JsValue) -> Result<(), JErrorType>;

    fn has_member(&self, name: &str) -> bool;

    fn get_slot(&self, index: i64) -> Result<JsValue, JErrorType> {
        self.get_member(&index.to_string())
    }

    fn set_slot(&self, index: i64, value: JsValue) -> Result<(), JErrorType> {
        self.set_member(&index.to_string(), value)
    }

    /// Is this object function-like? Only function-like objects are callable.
    fn is_function(&self) -> bool {
        false
    }

    fn is_strict_function(&self) -> bool {
        false
    }

    fn call(&self, _this: JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        Err(JErrorType::not_a_function(&self.class_name()))
    }

    fn new_object(&self, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        Err(JErrorType::TypeError(format!(
            "{} is not a constructor",
            self.class_name()
        )))
    }

    /// String rendering. Implementations may fail; callers that must not
    /// fail go through `safe_to_string`.
    fn to_display_string(&self) -> Result<String, JErrorType> {
        Ok(format!("[object {}]", self.class_name()))
    }

    /// The script value this object mirrors, for mirrors of internal objects.
    fn unwrap_script_object(&self) -> Option<JsValue> {
        None
    }
}

/// Exposes a script object to host code as a foreign object.
pub struct ScriptObjectMirror {
    target: JsValue,
}
impl ScriptObjectMirror {
    /// Returns `None` when `target` has no script-native property view.
    pub fn new(target: JsValue) -> Option<Self> {
        match target.as_object() {
            Some(o) if o.as_js_object().is_some() => Some(ScriptObjectMirror { target }),
            _ => None,
        }
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::Foreign(Box::new(self)))
    }

    fn object(&self) -> &dyn JsObject {
        match self.target.as_object().and_then(|o| o.as_js_object()) {
            Some(o) => o,
            None => unreachable!("mirror target checked at construction"),
        }
    }
}

impl ForeignObject for ScriptObjectMirror {
    fn class_name(&self) -> String {
        match self.target.as_object() {
            Some(ObjectType::Function(_)) => "Function".to_string(),
            _ => "Object".to_string(),
        }
    }

    fn get_member(&self, name: &str) -> Result<JsValue, JErrorType> {
        Ok(self.object().get(name))
    }

    fn set_member(&self, name: &str, value: JsValue) -> Result<(), JErrorType> {
        self.object().put(name, value, false)
    }

    fn has_member(&self, name: &str) -> bool {
        self.object().has_property(name)
    }

    fn is_function(&self) -> bool {
        matches!(self.target.as_object(), Some(ObjectType::Function(_)))
    }

    fn is_strict_function(&self) -> bool {
        match self.target.as_object() {
            Some(ObjectType::Function(f)) => f.is_strict(),
            _ => false,
        }
    }

    fn call(&self, this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        match self.target.as_object() {
            Some(ObjectType::Function(f)) => f.call(this, args),
            _ => Err(JErrorType::not_a_function(&self.class_name())),
        }
    }

    fn new_object(&self, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        match self.target.as_object() {
            Some(ObjectType::Function(f)) => f.construct(args),
            _ => Err(JErrorType::TypeError(format!(
                "{} is not a constructor",
                self.class_name()
            ))),
        }
    }

    fn unwrap_script_object(&self) -> Option<JsValue> {
        Some(self.target.clone())
    }
}

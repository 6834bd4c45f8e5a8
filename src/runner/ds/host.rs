//! Host ("bean") types exposed to scripts through reflection.
//!
//! A [`HostClass`] describes a native type: typed methods, bean properties,
//! static members and a constructor. [`HostObject`] is an instance of one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::signature::{MethodSignature, StaticType};

pub type HostMethodFn = dyn Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync;

/// Sensitivity of a host type. Anything but `Ordinary` is subject to the
/// environment's reflection access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCategory {
    Ordinary,
    Reflection,
    DynamicCode,
    ClassLoading,
}
impl HostCategory {
    pub fn is_restricted(&self) -> bool {
        !matches!(self, HostCategory::Ordinary)
    }
}

/// A typed native method. Arguments reach the body already converted to
/// the declared parameter types.
#[derive(Clone)]
pub struct HostMethod {
    name: String,
    signature: MethodSignature,
    body: Arc<HostMethodFn>,
}
impl HostMethod {
    pub fn new<F>(name: impl Into<String>, signature: MethodSignature, body: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        HostMethod {
            name: name.into(),
            signature,
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn call(&self, receiver: &JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
        (self.body)(receiver, args)
    }
}

#[derive(Clone)]
pub struct HostProperty {
    getter: HostMethod,
    setter: Option<HostMethod>,
}
impl HostProperty {
    pub fn getter(&self) -> &HostMethod {
        &self.getter
    }

    pub fn setter(&self) -> Option<&HostMethod> {
        self.setter.as_ref()
    }
}

pub struct HostClass {
    name: String,
    category: HostCategory,
    superclass: Option<Arc<HostClass>>,
    methods: HashMap<String, HostMethod>,
    properties: HashMap<String, HostProperty>,
    static_methods: HashMap<String, HostMethod>,
    static_properties: HashMap<String, HostProperty>,
    constructor: Option<HostMethod>,
    functional_method: Option<String>,
}
impl HostClass {
    pub fn new(name: impl Into<String>) -> Self {
        HostClass {
            name: name.into(),
            category: HostCategory::Ordinary,
            superclass: None,
            methods: HashMap::new(),
            properties: HashMap::new(),
            static_methods: HashMap::new(),
            static_properties: HashMap::new(),
            constructor: None,
            functional_method: None,
        }
    }

    pub fn with_category(mut self, category: HostCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_superclass(mut self, superclass: Arc<HostClass>) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn add_method<F>(mut self, name: &str, signature: MethodSignature, body: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        self.methods
            .insert(name.to_string(), HostMethod::new(name, signature, body));
        self
    }

    pub fn add_static_method<F>(mut self, name: &str, signature: MethodSignature, body: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        self.static_methods
            .insert(name.to_string(), HostMethod::new(name, signature, body));
        self
    }

    /// Read-only bean property of type `ty`.
    pub fn add_property<F>(mut self, name: &str, ty: StaticType, getter: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        let getter = HostMethod::new(name, MethodSignature::new(vec![], ty), getter);
        self.properties.insert(
            name.to_string(),
            HostProperty {
                getter,
                setter: None,
            },
        );
        self
    }

    /// Bean property backed by the instance field of the same name.
    pub fn add_field_property(mut self, name: &str, ty: StaticType) -> Self {
        let key = name.to_string();
        let getter_key = key.clone();
        let getter = HostMethod::new(
            name,
            MethodSignature::new(vec![], ty.clone()),
            move |receiver, _| Ok(HostObject::read_field(receiver, &getter_key)),
        );
        let setter_key = key.clone();
        let setter = HostMethod::new(
            name,
            MethodSignature::new(vec![ty], StaticType::Void),
            move |receiver, args| {
                let value = args.into_iter().next().unwrap_or(JsValue::Undefined);
                HostObject::write_field(receiver, &setter_key, value);
                Ok(JsValue::Undefined)
            },
        );
        self.properties.insert(
            key,
            HostProperty {
                getter,
                setter: Some(setter),
            },
        );
        self
    }

    pub fn add_static_property(mut self, name: &str, ty: StaticType, value: JsValue) -> Self {
        let getter = HostMethod::new(name, MethodSignature::new(vec![], ty), move |_, _| {
            Ok(value.clone())
        });
        self.static_properties.insert(
            name.to_string(),
            HostProperty {
                getter,
                setter: None,
            },
        );
        self
    }

    pub fn with_constructor<F>(mut self, signature: MethodSignature, body: F) -> Self
    where
        F: Fn(&JsValue, Vec<JsValue>) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        self.constructor = Some(HostMethod::new("<init>", signature, body));
        self
    }

    /// Marks the class as implementing a single-method interface whose only
    /// abstract method is `method`.
    pub fn functional(mut self, method: &str) -> Self {
        self.functional_method = Some(method.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn superclass(&self) -> Option<&Arc<HostClass>> {
        self.superclass.as_ref()
    }

    /// Restricted categories are inherited from superclasses.
    pub fn effective_category(&self) -> HostCategory {
        if self.category.is_restricted() {
            return self.category;
        }
        match &self.superclass {
            Some(s) => s.effective_category(),
            None => self.category,
        }
    }

    pub fn find_method(&self, name: &str) -> Option<&HostMethod> {
        match self.methods.get(name) {
            Some(m) => Some(m),
            None => self.superclass.as_ref().and_then(|s| s.find_method(name)),
        }
    }

    pub fn find_property(&self, name: &str) -> Option<&HostProperty> {
        match self.properties.get(name) {
            Some(p) => Some(p),
            None => self.superclass.as_ref().and_then(|s| s.find_property(name)),
        }
    }

    pub fn find_static_method(&self, name: &str) -> Option<&HostMethod> {
        self.static_methods.get(name)
    }

    pub fn find_static_property(&self, name: &str) -> Option<&HostProperty> {
        self.static_properties.get(name)
    }

    pub fn constructor(&self) -> Option<&HostMethod> {
        self.constructor.as_ref()
    }

    pub fn functional_method_name(&self) -> Option<&str> {
        match &self.functional_method {
            Some(m) => Some(m.as_str()),
            None => self
                .superclass
                .as_ref()
                .and_then(|s| s.functional_method_name()),
        }
    }

    /// The single abstract method, if the class names one and declares it.
    pub fn functional_method(&self) -> Option<&HostMethod> {
        self.functional_method_name()
            .and_then(|name| self.find_method(name))
    }

    pub fn is_assignable_to(self: &Arc<Self>, other: &Arc<HostClass>) -> bool {
        let mut c = Some(self.clone());
        while let Some(class) = c {
            if Arc::ptr_eq(&class, other) {
                return true;
            }
            c = class.superclass.clone();
        }
        false
    }
}

impl fmt::Debug for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostClass({})", self.name)
    }
}

/// An instance of a host class.
pub struct HostObject {
    class: Arc<HostClass>,
    fields: RwLock<HashMap<String, JsValue>>,
}
impl HostObject {
    pub fn new(class: Arc<HostClass>) -> Self {
        HostObject {
            class,
            fields: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_field(self, name: &str, value: JsValue) -> Self {
        self.fields.write().insert(name.to_string(), value);
        self
    }

    pub fn class(&self) -> &Arc<HostClass> {
        &self.class
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::Host(self))
    }

    pub fn get_field(&self, name: &str) -> JsValue {
        self.fields
            .read()
            .get(name)
            .cloned()
            .unwrap_or(JsValue::Null)
    }

    pub fn set_field(&self, name: &str, value: JsValue) {
        self.fields.write().insert(name.to_string(), value);
    }

    fn read_field(receiver: &JsValue, name: &str) -> JsValue {
        match receiver.as_object() {
            Some(ObjectType::Host(h)) => h.get_field(name),
            _ => JsValue::Null,
        }
    }

    fn write_field(receiver: &JsValue, name: &str, value: JsValue) {
        if let Some(ObjectType::Host(h)) = receiver.as_object() {
            h.set_field(name, value);
        }
    }
}

/// A reference to a (possibly overloaded-by-name) host method, detached from
/// any receiver. Calling it supplies the receiver as `this`.
pub struct DynamicMethod {
    class: Arc<HostClass>,
    name: String,
    is_static: bool,
}
impl DynamicMethod {
    pub fn new(class: Arc<HostClass>, name: impl Into<String>, is_static: bool) -> Self {
        DynamicMethod {
            class,
            name: name.into(),
            is_static,
        }
    }

    pub fn class(&self) -> &Arc<HostClass> {
        &self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn method(&self) -> Option<&HostMethod> {
        if self.is_static {
            self.class.find_static_method(&self.name)
        } else {
            self.class.find_method(&self.name)
        }
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::DynamicMethod(self))
    }
}

/// A reference to a host type itself; usable as a constructor.
pub struct StaticClass {
    class: Arc<HostClass>,
}
impl StaticClass {
    pub fn new(class: Arc<HostClass>) -> Self {
        StaticClass { class }
    }

    pub fn class(&self) -> &Arc<HostClass> {
        &self.class
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::StaticClass(self))
    }
}

/// Wraps an adapter instance so that `super$`-prefixed methods can be
/// reached as if they were the plain methods.
pub struct SuperAdapter {
    adapter: JsValue,
}
impl SuperAdapter {
    pub fn new(adapter: JsValue) -> Self {
        SuperAdapter { adapter }
    }

    pub fn adapter(&self) -> &JsValue {
        &self.adapter
    }

    pub fn into_value(self) -> JsValue {
        JsValue::new_object(ObjectType::SuperAdapter(self))
    }
}

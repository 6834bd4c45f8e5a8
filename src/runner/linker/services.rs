//! Services the chain hands to every linker: type adaptation, conversions,
//! the internal objects filter and the access policy.

use std::sync::Arc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::foreign::ScriptObjectMirror;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::environment::AccessPolicy;
use crate::runner::linker::conversion::{can_convert, convert_arguments, convert_value};
use crate::runner::linker::invocation::Invocation;
use crate::runner::linker::return_policy::unbox_return_type;
use crate::runner::linker::signature::{MethodSignature, StaticType};

#[derive(Clone)]
pub struct LinkerServices {
    access_policy: Arc<dyn AccessPolicy>,
    hide_internal_objects: bool,
}

impl LinkerServices {
    pub fn new(access_policy: Arc<dyn AccessPolicy>, hide_internal_objects: bool) -> Self {
        LinkerServices {
            access_policy,
            hide_internal_objects,
        }
    }

    pub fn access_policy(&self) -> &dyn AccessPolicy {
        &*self.access_policy
    }

    pub fn can_convert(&self, from: &StaticType, to: &StaticType) -> bool {
        can_convert(from, to)
    }

    pub fn convert(&self, value: JsValue, to: &StaticType) -> Result<JsValue, JErrorType> {
        convert_value(value, to)
    }

    /// Adapts `invocation` so that its signature is exactly `desired`.
    ///
    /// Parameters are converted by the general rules. A boxed return whose
    /// primitive widens to the wanted primitive goes through
    /// [`unbox_return_type`]; any remaining mismatch is converted by the
    /// general rules. Arity mismatches and types with no
    /// conversion rule violate the linker contract and panic.
    pub fn as_type(&self, invocation: Invocation, desired: &MethodSignature) -> Invocation {
        if invocation.signature() == desired {
            return invocation;
        }
        let current = invocation.signature().clone();
        assert_eq!(
            current.arity(),
            desired.arity(),
            "can not adapt {} to {}",
            current,
            desired
        );
        let mut adapted = invocation;
        if current.params() != desired.params() {
            for (from, to) in desired.params().iter().zip(current.params()) {
                assert!(can_convert(from, to), "can not adapt {} to {}", current, desired);
            }
            let target_params = current.params().to_vec();
            adapted = adapted.filter_arguments(desired.params().to_vec(), move |args| {
                convert_arguments(&target_params, args)
            });
        }
        if unboxes_by_widening(adapted.signature().ret(), desired.ret()) {
            adapted = unbox_return_type(adapted, desired);
        }
        let ret = adapted.signature().ret().clone();
        if &ret != desired.ret() {
            assert!(
                can_convert(&ret, desired.ret()),
                "can not adapt {} to {}",
                current,
                desired
            );
            let to = desired.ret().clone();
            adapted = adapted.filter_return(to.clone(), move |v| convert_value(v, &to));
        }
        adapted
    }

    /// Hides script objects from host code: script arguments are exported as
    /// mirrors and mirrors coming back are unwrapped.
    pub fn filter_internal_objects(&self, invocation: Invocation) -> Invocation {
        if !self.hide_internal_objects {
            return invocation;
        }
        let params = invocation.signature().params().to_vec();
        let ret = invocation.signature().ret().clone();
        invocation
            .filter_arguments(params, |args| Ok(args.iter().map(export_value).collect()))
            .filter_return(ret, |v| Ok(import_value(v)))
    }
}

fn unboxes_by_widening(from: &StaticType, to: &StaticType) -> bool {
    match from.unboxed() {
        Some(primitive) if to.is_primitive() => {
            StaticType::is_method_invocation_convertible(&primitive, to)
        }
        _ => true,
    }
}

/// Wraps script-native objects for host code.
pub fn export_value(v: &JsValue) -> JsValue {
    match v.as_object() {
        Some(ObjectType::Ordinary(_)) | Some(ObjectType::Function(_)) => {
            match ScriptObjectMirror::new(v.clone()) {
                Some(mirror) => mirror.into_value(),
                None => v.clone(),
            }
        }
        _ => v.clone(),
    }
}

/// Unwraps mirrors returned from host code.
pub fn import_value(v: JsValue) -> JsValue {
    if let Some(ObjectType::Foreign(f)) = v.as_object() {
        if let Some(target) = f.unwrap_script_object() {
            return target;
        }
    }
    v
}

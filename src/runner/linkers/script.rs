use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, Guard, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::StaticType;

use super::{callable_invocation, callee_guard};

/// Script-native objects and functions. Property storage is delegated to the
/// object model.
pub struct ScriptLinker;

impl GuardingLinker for ScriptLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        matches!(
            receiver.as_object(),
            Some(ObjectType::Ordinary(_)) | Some(ObjectType::Function(_))
        )
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        _services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let receiver = request.receiver();
        let object = match receiver.as_object().and_then(|o| o.as_js_object()) {
            Some(o) => o,
            None => return Ok(None),
        };
        let descriptor = request.descriptor().clone();
        let signature = request.generic_signature(StaticType::Object);
        let candidate = match descriptor.operation() {
            OperationKind::GetProperty | OperationKind::GetElement | OperationKind::GetMethod => {
                if let Some(name) = descriptor.name() {
                    if !object.has_property(name) {
                        // Valid until this object or a prototype gains a property.
                        return Ok(Some(
                            GuardedInvocation::guarded(
                                Invocation::constant(signature, JsValue::Undefined),
                                Guard::receiver_identity(receiver),
                            )
                            .with_switch_points(object.layout_switch_points()),
                        ));
                    }
                }
                GuardedInvocation::guarded(
                    Invocation::new(signature, move |args| {
                        let key = descriptor.member_key(args)?;
                        Ok(match argument(args, 0).as_object().and_then(|o| o.as_js_object()) {
                            Some(o) => o.get(&key),
                            None => JsValue::Undefined,
                        })
                    }),
                    Guard::receiver_type(receiver),
                )
            }
            OperationKind::SetProperty | OperationKind::SetElement => GuardedInvocation::guarded(
                Invocation::new(signature, move |args| {
                    let key = descriptor.member_key(args)?;
                    if let Some(o) = argument(args, 0).as_object().and_then(|o| o.as_js_object()) {
                        o.put(&key, descriptor.member_value(args).clone(), descriptor.is_strict())?;
                    }
                    Ok(JsValue::Undefined)
                }),
                Guard::receiver_type(receiver),
            ),
            OperationKind::Call | OperationKind::New => match receiver.as_object() {
                Some(ObjectType::Function(_)) => {
                    GuardedInvocation::guarded(callable_invocation(request), callee_guard(request))
                }
                _ => return Ok(None),
            },
        };
        Ok(Some(candidate))
    }

    fn name(&self) -> &str {
        "ScriptLinker"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::runner::ds::function_object::ScriptFunction;
    use crate::runner::ds::object::{JsObject, ScriptObject};
    use crate::runner::environment::PermitAll;
    use crate::runner::linker::descriptor::{CallSiteFlags, OperationDescriptor};
    use crate::runner::linker::signature::MethodSignature;

    fn services() -> LinkerServices {
        LinkerServices::new(Arc::new(PermitAll), true)
    }

    fn link(encoding: &str, flags: u32, args: &[JsValue]) -> Option<GuardedInvocation> {
        let d = Arc::new(
            OperationDescriptor::parse(encoding, MethodSignature::generic(args.len()), flags).unwrap(),
        );
        ScriptLinker
            .get_guarded_invocation(&LinkRequest::new(d, args), &services())
            .unwrap()
    }

    #[test]
    fn test_absent_property_is_invalidated_when_added() {
        let o = ScriptObject::new().into_value();
        let args = [o.clone()];
        let gi = link("GET:PROPERTY:x", 0, &args).unwrap();
        assert_eq!(gi.invocation().invoke(&args).unwrap(), JsValue::Undefined);
        assert!(gi.test(&args));
        o.as_object().unwrap().as_js_object().unwrap().define_own_property("x", JsValue::from(1));
        assert!(!gi.test(&args));
        let gi = link("GET:PROPERTY:x", 0, &args).unwrap();
        assert_eq!(gi.invocation().invoke(&args).unwrap(), JsValue::from(1));
    }

    #[test]
    fn test_element_get_and_set() {
        let o = ScriptObject::new().into_value();
        let set = [o.clone(), JsValue::from(3), JsValue::from("three")];
        link("SET:ELEMENT", 0, &set).unwrap().invocation().invoke(&set).unwrap();
        let get = [o, JsValue::from("3")];
        let gi = link("GET:ELEMENT", 0, &get).unwrap();
        assert_eq!(gi.invocation().invoke(&get).unwrap(), JsValue::from("three"));
    }

    #[test]
    fn test_strict_set_on_sealed_object_throws() {
        let o = ScriptObject::new();
        o.prevent_extensions();
        let o = o.into_value();
        let args = [o, JsValue::from(1)];
        let gi = link("SET:PROPERTY:y", CallSiteFlags::STRICT, &args).unwrap();
        assert!(gi.invocation().invoke(&args).unwrap_err().is_type_error());
        let gi = link("SET:PROPERTY:y", 0, &args).unwrap();
        assert!(gi.invocation().invoke(&args).is_ok());
    }

    #[test]
    fn test_call_script_function_with_identity_guard() {
        fn add(_this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
            let sum: i64 = args
                .iter()
                .map(|a| match a {
                    JsValue::Number(crate::runner::ds::value::JsNumberType::Integer(i)) => *i,
                    _ => 0,
                })
                .sum();
            Ok(JsValue::from(sum))
        }
        let f = ScriptFunction::native("add", false, add).into_value();
        let args = [f.clone(), JsValue::Undefined, JsValue::from(2), JsValue::from(3)];
        let gi = link("CALL", 0, &args).unwrap();
        assert_eq!(gi.invocation().invoke(&args).unwrap(), JsValue::from(5));
        let other = ScriptFunction::native("add", false, add).into_value();
        assert!(!gi.test(&[other, JsValue::Undefined]));

        let plain = [ScriptObject::new().into_value(), JsValue::Undefined];
        assert!(link("CALL", 0, &plain).is_none());
    }
}

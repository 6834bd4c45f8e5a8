use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, Guard, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::StaticType;

use super::array_index;

/// Strings, numbers and booleans used as receivers.
///
/// Strings expose `length` and indexed code units. Every other read yields
/// `undefined`; writes are dropped, or rejected on strict call sites.
pub struct PrimitiveLinker;

impl GuardingLinker for PrimitiveLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        matches!(
            receiver,
            JsValue::String(_) | JsValue::Number(_) | JsValue::Boolean(_)
        )
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        _services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let receiver = request.receiver();
        let descriptor = request.descriptor().clone();
        let signature = request.generic_signature(StaticType::Object);
        let invocation = match descriptor.operation() {
            OperationKind::GetProperty | OperationKind::GetElement | OperationKind::GetMethod => {
                match receiver {
                    JsValue::String(_) => Invocation::new(signature, move |args| {
                        let key = descriptor.member_key(args)?;
                        Ok(match argument(args, 0) {
                            JsValue::String(s) => string_member(s, &key),
                            _ => JsValue::Undefined,
                        })
                    }),
                    _ => Invocation::constant(signature, JsValue::Undefined),
                }
            }
            OperationKind::SetProperty | OperationKind::SetElement => {
                if descriptor.is_strict() {
                    Invocation::new(signature, move |args| {
                        Err(JErrorType::TypeError(format!(
                            "Cannot set property \"{}\" of primitive {}",
                            descriptor.member_key(args)?,
                            safe_to_string(argument(args, 0))
                        )))
                    })
                } else {
                    Invocation::constant(signature, JsValue::Undefined)
                }
            }
            OperationKind::Call | OperationKind::New => return Ok(None),
        };
        Ok(Some(GuardedInvocation::guarded(
            invocation,
            Guard::receiver_type(receiver),
        )))
    }

    fn name(&self) -> &str {
        "PrimitiveLinker"
    }
}

fn string_member(s: &str, key: &str) -> JsValue {
    if key == "length" {
        return JsValue::from(s.encode_utf16().count() as i64);
    }
    match array_index(key) {
        Some(i) => match s.encode_utf16().nth(i as usize) {
            Some(unit) => JsValue::String(String::from_utf16_lossy(&[unit])),
            None => JsValue::Undefined,
        },
        None => JsValue::Undefined,
    }
}

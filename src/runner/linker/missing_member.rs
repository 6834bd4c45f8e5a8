//! What a call site does when no linker has anything for its receiver.
//!
//! A missing member is a value in the script language, not a link failure:
//! reads produce `undefined`, writes extend or are ignored and calls fail
//! only when they run. The decision depends on the receiver's type alone, so
//! every candidate here is guarded by receiver type.

use tracing::debug;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::foreign::BridgeKind;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::invocation::{argument, Guard, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::signature::StaticType;

/// Browser bridge objects resolve their own missing members.
pub fn has_own_missing_member_semantics(receiver: &JsValue) -> bool {
    match receiver.as_object() {
        Some(ObjectType::Foreign(f)) => f.bridge_kind() == BridgeKind::Browser,
        _ => false,
    }
}

/// Links a missing member, or returns `None` for receivers with their own
/// missing-member semantics.
pub fn link_missing_member(request: &LinkRequest) -> Option<GuardedInvocation> {
    let receiver = request.receiver();
    if has_own_missing_member_semantics(receiver) {
        return None;
    }
    let descriptor = request.descriptor().clone();
    let operation = descriptor.operation();
    debug!(
        operation = %descriptor,
        receiver = ?receiver.runtime_type(),
        "linking missing member"
    );
    let guard = Guard::receiver_type(receiver);
    if receiver.is_nullish() {
        return Some(GuardedInvocation::guarded(
            nullish_receiver(request),
            guard,
        ));
    }
    let invocation = match operation {
        OperationKind::GetProperty | OperationKind::GetElement | OperationKind::GetMethod => {
            Invocation::constant(
                request.generic_signature(StaticType::Object),
                JsValue::Undefined,
            )
        }
        OperationKind::SetProperty | OperationKind::SetElement => Invocation::new(
            request.generic_signature(StaticType::Object),
            move |args| {
                let target = argument(args, 0);
                if let Some(o) = target.as_object().and_then(|o| o.as_js_object()) {
                    let key = descriptor.member_key(args)?;
                    o.put(&key, descriptor.member_value(args).clone(), descriptor.is_strict())?;
                }
                Ok(JsValue::Undefined)
            },
        ),
        OperationKind::Call | OperationKind::New => {
            Invocation::new(request.generic_signature(StaticType::Object), |args| {
                Err(JErrorType::not_a_function(&safe_to_string(argument(args, 0))))
            })
        }
    };
    Some(GuardedInvocation::guarded(invocation, guard))
}

/// Every operation on `undefined` or `null` links, and fails when run.
fn nullish_receiver(request: &LinkRequest) -> Invocation {
    let descriptor = request.descriptor().clone();
    Invocation::new(request.generic_signature(StaticType::Object), move |args| {
        let receiver = safe_to_string(argument(args, 0));
        let operation = descriptor.operation();
        let message = if operation.is_get() {
            format!(
                "Cannot read property \"{}\" of {}",
                descriptor.member_key(args)?,
                receiver
            )
        } else if operation.is_set() {
            format!(
                "Cannot set property \"{}\" of {}",
                descriptor.member_key(args)?,
                receiver
            )
        } else {
            format!("{} is not a function", receiver)
        };
        Err(JErrorType::TypeError(message))
    })
}

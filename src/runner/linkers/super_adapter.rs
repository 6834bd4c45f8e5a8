use crate::runner::ds::bound_callable::BoundCallable;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::host::DynamicMethod;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::environment::AccessPolicy;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, Guard, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::StaticType;

use super::check_callee_access;

const SUPER_PREFIX: &str = "super$";

/// `GET:METHOD:m` on a super adapter reads the adapter's `super$m` method,
/// already bound to the adapter. The adapter's class is subject to the
/// access policy like any other host receiver.
pub struct SuperAdapterLinker;

impl GuardingLinker for SuperAdapterLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        matches!(receiver.as_object(), Some(ObjectType::SuperAdapter(_)))
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let descriptor = request.descriptor().clone();
        if descriptor.operation() != OperationKind::GetMethod {
            return Ok(None);
        }
        if let Some(ObjectType::SuperAdapter(s)) = request.receiver().as_object() {
            check_callee_access(s.adapter(), services.access_policy())?;
        }
        let services = services.clone();
        let invocation = Invocation::new(request.generic_signature(StaticType::Object), move |args| {
            let key = descriptor.member_key(args)?;
            match argument(args, 0).as_object() {
                Some(ObjectType::SuperAdapter(s)) => {
                    super_method(s.adapter(), &key, services.access_policy())
                }
                _ => Ok(JsValue::Undefined),
            }
        });
        Ok(Some(GuardedInvocation::guarded(
            invocation,
            Guard::receiver_type(request.receiver()),
        )))
    }

    fn name(&self) -> &str {
        "SuperAdapterLinker"
    }
}

fn super_method(
    adapter: &JsValue,
    name: &str,
    policy: &dyn AccessPolicy,
) -> Result<JsValue, JErrorType> {
    let class = match adapter.as_object() {
        Some(ObjectType::Host(h)) => h.class().clone(),
        _ => return Ok(JsValue::Undefined),
    };
    check_callee_access(adapter, policy)?;
    let super_name = format!("{}{}", SUPER_PREFIX, name);
    if class.find_method(&super_name).is_none() {
        return Ok(JsValue::Undefined);
    }
    Ok(BoundCallable::new(
        DynamicMethod::new(class, super_name, false).into_value(),
        adapter.clone(),
        vec![],
    )
    .into_value())
}

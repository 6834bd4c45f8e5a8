use crate::runner::ds::error::JErrorType;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::StaticType;

use super::{callable_invocation, callee_guard, check_callee_access};

/// CALL and NEW on bound callables: the inner callable runs with the bound
/// receiver and the bound prefix spliced in front of the call's arguments.
/// Access to the host class behind the bound target is checked at link time
/// and on every invocation.
pub struct BoundCallableLinker;

impl GuardingLinker for BoundCallableLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        matches!(receiver.as_object(), Some(ObjectType::Bound(_)))
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        match request.descriptor().operation() {
            OperationKind::Call | OperationKind::New => {
                check_callee_access(request.receiver(), services.access_policy())?;
                let target = callable_invocation(request);
                let services = services.clone();
                let invocation =
                    Invocation::new(request.generic_signature(StaticType::Object), move |args| {
                        check_callee_access(argument(args, 0), services.access_policy())?;
                        target.invoke(args)
                    });
                Ok(Some(GuardedInvocation::guarded(invocation, callee_guard(request))))
            }
            _ => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "BoundCallableLinker"
    }
}

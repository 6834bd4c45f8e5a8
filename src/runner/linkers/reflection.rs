use tracing::debug;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::host::HostClass;
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::environment::AccessPolicy;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::GuardedInvocation;
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;

/// Fails the link when scripts reach a restricted host class the access
/// policy does not grant. Otherwise declines, so the bean and static class
/// linkers link the operation as usual.
pub struct ReflectionCheckLinker;

impl GuardingLinker for ReflectionCheckLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        matches!(
            receiver.as_object(),
            Some(ObjectType::Host(_))
                | Some(ObjectType::StaticClass(_))
                | Some(ObjectType::DynamicMethod(_))
        )
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let (class, is_static) = match request.receiver().as_object() {
            Some(ObjectType::Host(h)) => (h.class(), false),
            Some(ObjectType::StaticClass(c)) => (c.class(), true),
            Some(ObjectType::DynamicMethod(m)) => (m.class(), m.is_static()),
            _ => return Ok(None),
        };
        if class.effective_category().is_restricted() {
            check_reflection_access(class, is_static, services.access_policy())?;
        }
        Ok(None)
    }

    fn name(&self) -> &str {
        "ReflectionCheckLinker"
    }
}

/// Fails with a security error if `policy` denies access to the restricted
/// class `class`. Unrestricted classes always pass.
pub fn check_reflection_access(
    class: &HostClass,
    is_static: bool,
    policy: &dyn AccessPolicy,
) -> Result<(), JErrorType> {
    let category = class.effective_category();
    if !category.is_restricted() || policy.permits_reflection(class.name(), is_static) {
        return Ok(());
    }
    debug!(class = class.name(), ?category, is_static, "reflective access denied");
    Err(JErrorType::SecurityError(format!(
        "access to {:?} class {} denied",
        category,
        class.name()
    )))
}

/// Checks the host class a CALL or NEW on `callee` ends up in. Bound layers
/// are looked through; script and foreign functions are never restricted.
pub fn check_callee_access(callee: &JsValue, policy: &dyn AccessPolicy) -> Result<(), JErrorType> {
    match callee.as_object() {
        Some(ObjectType::Bound(b)) => check_callee_access(b.callable(), policy),
        Some(ObjectType::Host(h)) => check_reflection_access(h.class(), false, policy),
        Some(ObjectType::StaticClass(c)) => check_reflection_access(c.class(), true, policy),
        Some(ObjectType::DynamicMethod(m)) => {
            check_reflection_access(m.class(), m.is_static(), policy)
        }
        _ => Ok(()),
    }
}

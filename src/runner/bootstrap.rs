//! Entry points for generated code and for native code that wants script
//! dispatch semantics.

use std::sync::Arc;

use tracing::debug;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::host::{HostClass, SuperAdapter};
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::environment::{AccessPolicy, LookupContext, ScriptEnvironment};
use crate::runner::linker::callsite::LinkerCallSite;
use crate::runner::linker::chain::DynamicLinker;
use crate::runner::linker::descriptor::{OperationDescriptor, OperationKind};
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::GuardedInvocation;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::MethodSignature;
use crate::runner::linkers::{self, default_linker_factory, BeansLinker};

pub use crate::runner::callable::{
    bind_callable, is_callable, is_dynamic_method, is_functional_interface_object,
    is_strict_callable,
};

/// Creates the call site for one operation in generated code.
///
/// `encoding` is the operation with its escaped member name, such as
/// `GET:PROPERTY:length`. The environment's profiling and tracing settings
/// are folded into `flags`.
pub fn bootstrap(
    lookup: &LookupContext,
    encoding: &str,
    signature: MethodSignature,
    flags: u32,
) -> Result<Arc<LinkerCallSite>, JErrorType> {
    let environment = lookup.environment();
    let descriptor =
        OperationDescriptor::intern(encoding, signature, environment.effective_flags(flags))?;
    let site = LinkerCallSite::new(descriptor, environment.linker().clone());
    debug!(call_site = site.id(), operation = %site.descriptor(), "bootstrapped");
    Ok(Arc::new(site))
}

/// A call site in the default environment, for native callers.
pub fn create_dynamic_invoker(
    encoding: &str,
    flags: u32,
    signature: MethodSignature,
) -> Result<Arc<LinkerCallSite>, JErrorType> {
    bootstrap(&LookupContext::public(), encoding, signature, flags)
}

/// A CALL site in the default environment. `signature` covers the callee,
/// the receiver and the arguments.
pub fn create_dynamic_call_invoker(
    signature: MethodSignature,
) -> Result<Arc<LinkerCallSite>, JErrorType> {
    if signature.arity() < 2 {
        return Err(JErrorType::TypeError(format!(
            "call signature {} must take a callee and a receiver",
            signature
        )));
    }
    create_dynamic_invoker(OperationKind::Call.mnemonic(), 0, signature)
}

/// A fresh chain with the default tiers, `contributed` at the head of the
/// fallback tier and the given relink threshold.
pub fn create_dynamic_linker(
    contributed: Vec<Arc<dyn GuardingLinker>>,
    unstable_relink_threshold: usize,
) -> DynamicLinker {
    default_linker_factory()
        .with_contributed_linkers(contributed)
        .with_unstable_relink_threshold(unstable_relink_threshold)
        .create_linker()
}

pub fn get_exposed_linkers() -> Vec<Arc<dyn GuardingLinker>> {
    linkers::exposed_linkers()
}

pub fn get_bean_linker_for_class(class: Arc<HostClass>) -> Arc<dyn GuardingLinker> {
    Arc::new(BeansLinker::for_class(class))
}

/// Wraps a host object so that `GET:METHOD:m` reaches its `super$m`.
pub fn create_super_adapter(adapter: &JsValue) -> Result<JsValue, JErrorType> {
    match adapter.as_object() {
        Some(ObjectType::Host(_)) => Ok(SuperAdapter::new(adapter.clone()).into_value()),
        _ => Err(JErrorType::TypeError(format!(
            "{} is not an adapter instance",
            safe_to_string(adapter)
        ))),
    }
}

pub fn check_reflection_access(
    class: &HostClass,
    is_static: bool,
    policy: &dyn AccessPolicy,
) -> Result<(), JErrorType> {
    linkers::check_reflection_access(class, is_static, policy)
}

/// Services of the default environment.
pub fn get_linker_services() -> LinkerServices {
    ScriptEnvironment::default_environment().services().clone()
}

/// Adapts a candidate, if any, to `descriptor`'s signature.
pub fn as_type_safe_return(
    candidate: Option<GuardedInvocation>,
    services: &LinkerServices,
    descriptor: &OperationDescriptor,
) -> Option<GuardedInvocation> {
    candidate.map(|c| c.map_invocation(|inv| services.as_type(inv, descriptor.signature())))
}

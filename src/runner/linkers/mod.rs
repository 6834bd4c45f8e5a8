//! The built-in linkers and the process-wide default tiers.

mod beans;
mod bottom;
mod bound;
mod foreign;
mod primitive;
mod reflection;
mod script;
mod static_class;
mod super_adapter;

use std::sync::Arc;

use crate::runner::callable::Callable;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::foreign::BridgeKind;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::factory::DynamicLinkerFactory;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, Guard, Invocation};
use crate::runner::linker::optimistic::filter_optimistic_return_value;
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::signature::StaticType;

pub use self::beans::BeansLinker;
pub use self::bottom::BottomLinker;
pub use self::bound::BoundCallableLinker;
pub use self::foreign::ForeignObjectLinker;
pub use self::primitive::PrimitiveLinker;
pub use self::reflection::{check_callee_access, check_reflection_access, ReflectionCheckLinker};
pub use self::script::ScriptLinker;
pub use self::static_class::StaticClassLinker;
pub use self::super_adapter::SuperAdapterLinker;

struct DefaultLinkers {
    prioritized: Vec<Arc<dyn GuardingLinker>>,
    fallback: Vec<Arc<dyn GuardingLinker>>,
    exposed: Vec<Arc<dyn GuardingLinker>>,
}

impl DefaultLinkers {
    fn new() -> Self {
        let generic_foreign: Arc<dyn GuardingLinker> =
            Arc::new(ForeignObjectLinker::new(BridgeKind::Generic));
        DefaultLinkers {
            prioritized: vec![
                Arc::new(ScriptLinker),
                Arc::new(PrimitiveLinker),
                Arc::new(BoundCallableLinker),
                Arc::new(SuperAdapterLinker),
                generic_foreign.clone(),
                Arc::new(ForeignObjectLinker::new(BridgeKind::Browser)),
                Arc::new(ReflectionCheckLinker),
            ],
            fallback: vec![
                Arc::new(StaticClassLinker),
                Arc::new(BeansLinker::new()),
                Arc::new(BottomLinker),
            ],
            exposed: vec![generic_foreign, Arc::new(BeansLinker::exposed())],
        }
    }
}

lazy_static! {
    static ref DEFAULT_LINKERS: DefaultLinkers = DefaultLinkers::new();
}

pub fn prioritized_linkers() -> Vec<Arc<dyn GuardingLinker>> {
    DEFAULT_LINKERS.prioritized.clone()
}

pub fn fallback_linkers() -> Vec<Arc<dyn GuardingLinker>> {
    DEFAULT_LINKERS.fallback.clone()
}

/// Linkers for native code that wants script dispatch without script
/// missing-member semantics.
pub fn exposed_linkers() -> Vec<Arc<dyn GuardingLinker>> {
    DEFAULT_LINKERS.exposed.clone()
}

/// A factory preloaded with the default tiers, the optimistic return filter
/// and serialized relinking.
pub fn default_linker_factory() -> DynamicLinkerFactory {
    DynamicLinkerFactory::new()
        .with_prioritized_linkers(prioritized_linkers())
        .with_fallback_linkers(fallback_linkers())
        .with_prelink_filter(|candidate, request, _services| {
            filter_optimistic_return_value(candidate, request.descriptor())
        })
        .with_sync_on_relink(true)
}

/// CALL or NEW through the unified callable abstraction. The callee is read
/// from the arguments on every invocation.
fn callable_invocation(request: &LinkRequest) -> Invocation {
    let descriptor = request.descriptor().clone();
    Invocation::new(request.generic_signature(StaticType::Object), move |args| {
        let callee = argument(args, 0);
        let callable = Callable::classify(callee)
            .ok_or_else(|| JErrorType::not_a_function(&safe_to_string(callee)))?;
        match descriptor.operation() {
            OperationKind::New => callable.construct(descriptor.call_arguments(args)),
            _ => callable.call(
                descriptor.call_receiver(args).clone(),
                descriptor.call_arguments(args),
            ),
        }
    })
}

/// Callee identity while the call site is stable, callee type afterwards.
fn callee_guard(request: &LinkRequest) -> Guard {
    if request.is_call_site_unstable() {
        Guard::receiver_type(request.receiver())
    } else {
        Guard::receiver_identity(request.receiver())
    }
}

/// Canonical array index: digits only, no leading zero.
fn array_index(key: &str) -> Option<i64> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

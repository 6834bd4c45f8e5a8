use std::sync::Arc;

use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::OperationDescriptor;
use crate::runner::linker::invocation::argument;
use crate::runner::linker::signature::{MethodSignature, StaticType};

/// One link attempt: the call site's descriptor plus the arguments of the
/// call that triggered it.
pub struct LinkRequest<'a> {
    descriptor: Arc<OperationDescriptor>,
    arguments: &'a [JsValue],
    call_site_unstable: bool,
}

impl<'a> LinkRequest<'a> {
    pub fn new(descriptor: Arc<OperationDescriptor>, arguments: &'a [JsValue]) -> Self {
        LinkRequest {
            descriptor,
            arguments,
            call_site_unstable: false,
        }
    }

    /// Marks the request as coming from a call site past its relink threshold.
    /// Linkers should then prefer broad guards over identity guards.
    pub fn with_call_site_unstable(mut self, unstable: bool) -> Self {
        self.call_site_unstable = unstable;
        self
    }

    pub fn descriptor(&self) -> &Arc<OperationDescriptor> {
        &self.descriptor
    }

    pub fn arguments(&self) -> &'a [JsValue] {
        self.arguments
    }

    /// The receiver: argument 0 (the callee for CALL and NEW).
    pub fn receiver(&self) -> &'a JsValue {
        argument(self.arguments, 0)
    }

    pub fn is_call_site_unstable(&self) -> bool {
        self.call_site_unstable
    }

    /// `(Object, ...)ret` with the call site's arity.
    pub fn generic_signature(&self, ret: StaticType) -> MethodSignature {
        MethodSignature::generic(self.descriptor.signature().arity()).change_return_type(ret)
    }
}

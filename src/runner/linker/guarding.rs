//! The trait every specialized linker implements.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::invocation::GuardedInvocation;
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;

/// A linker that produces guarded candidates for the receivers it knows.
///
/// Linkers are queried in chain order. The first one to return a candidate
/// wins; returning `Ok(None)` declines and lets the next linker try.
pub trait GuardingLinker: Send + Sync {
    /// Cheap receiver type check made before [`get_guarded_invocation`].
    ///
    /// It must not inspect members or allocate.
    ///
    /// [`get_guarded_invocation`]: GuardingLinker::get_guarded_invocation
    fn can_link_type(&self, _receiver: &JsValue) -> bool {
        true
    }

    /// Produce a candidate for `request`, or decline with `Ok(None)`.
    ///
    /// An `Err` aborts the link and is surfaced at the call site; use it only
    /// for failures that must not fall through to other linkers, such as
    /// denied reflective access.
    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType>;

    /// Human-readable name for this linker (for debugging/logging).
    fn name(&self) -> &str;
}

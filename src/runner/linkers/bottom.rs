use crate::runner::ds::error::JErrorType;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::GuardedInvocation;
use crate::runner::linker::missing_member::link_missing_member;
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;

/// Last linker of the default chain. Accepts whatever is left, including
/// `undefined` and `null` receivers, through the missing-member policy.
pub struct BottomLinker;

impl GuardingLinker for BottomLinker {
    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        _services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        Ok(link_missing_member(request))
    }

    fn name(&self) -> &str {
        "BottomLinker"
    }
}

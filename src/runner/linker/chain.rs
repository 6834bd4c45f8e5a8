//! The linker chain: ordered tiers of guarding linkers, the missing-member
//! fallback and the post-link adaptation every candidate goes through.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::runner::ds::error::JErrorType;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::GuardedInvocation;
use crate::runner::linker::missing_member::link_missing_member;
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;

/// Environment-wide transformation applied to every candidate after it is
/// selected and before it is adapted to the call-site signature.
pub type PrelinkFilter =
    dyn Fn(GuardedInvocation, &LinkRequest, &LinkerServices) -> GuardedInvocation + Send + Sync;

/// Default number of relinks after which a call site is considered unstable.
pub const DEFAULT_UNSTABLE_RELINK_THRESHOLD: usize = 8;

/// An immutable linker chain. Build one with
/// [`DynamicLinkerFactory`](crate::runner::linker::factory::DynamicLinkerFactory).
pub struct DynamicLinker {
    pub(crate) prioritized: Vec<Arc<dyn GuardingLinker>>,
    pub(crate) fallback: Vec<Arc<dyn GuardingLinker>>,
    pub(crate) services: LinkerServices,
    pub(crate) synthesize_missing_members: bool,
    pub(crate) prelink_filter: Option<Arc<PrelinkFilter>>,
    pub(crate) unstable_relink_threshold: usize,
    pub(crate) sync_on_relink: bool,
}

impl DynamicLinker {
    /// Links `request`.
    ///
    /// Returns `Ok(None)` when every linker declines and no missing-member
    /// candidate applies. Errors raised by a linker abort the link.
    pub fn link(&self, request: &LinkRequest) -> Result<Option<GuardedInvocation>, JErrorType> {
        let descriptor = request.descriptor();
        let candidate = match self.select(request)? {
            Some(c) => c,
            None => return Ok(None),
        };
        let candidate = match &self.prelink_filter {
            Some(filter) => filter(candidate, request, &self.services),
            None => candidate,
        };
        let services = &self.services;
        Ok(Some(candidate.map_invocation(|inv| {
            services.as_type(inv, descriptor.signature())
        })))
    }

    fn select(&self, request: &LinkRequest) -> Result<Option<GuardedInvocation>, JErrorType> {
        let receiver = request.receiver();
        for linker in self.prioritized.iter().chain(self.fallback.iter()) {
            if !linker.can_link_type(receiver) {
                continue;
            }
            if let Some(candidate) = linker.get_guarded_invocation(request, &self.services)? {
                debug!(
                    linker = linker.name(),
                    operation = %request.descriptor(),
                    "linked"
                );
                return Ok(Some(candidate));
            }
        }
        if self.synthesize_missing_members {
            return Ok(link_missing_member(request));
        }
        Ok(None)
    }

    pub fn prioritized_linkers(&self) -> &[Arc<dyn GuardingLinker>] {
        &self.prioritized
    }

    pub fn fallback_linkers(&self) -> &[Arc<dyn GuardingLinker>] {
        &self.fallback
    }

    pub fn services(&self) -> &LinkerServices {
        &self.services
    }

    pub fn synthesizes_missing_members(&self) -> bool {
        self.synthesize_missing_members
    }

    pub fn unstable_relink_threshold(&self) -> usize {
        self.unstable_relink_threshold
    }

    pub fn sync_on_relink(&self) -> bool {
        self.sync_on_relink
    }
}

impl fmt::Debug for DynamicLinker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = |tier: &[Arc<dyn GuardingLinker>]| {
            tier.iter().map(|l| l.name().to_string()).collect::<Vec<_>>()
        };
        f.debug_struct("DynamicLinker")
            .field("prioritized", &names(&self.prioritized))
            .field("fallback", &names(&self.fallback))
            .field("unstable_relink_threshold", &self.unstable_relink_threshold)
            .finish()
    }
}

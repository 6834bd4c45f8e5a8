//! Builder for linker chains.

use std::sync::Arc;

use crate::runner::environment::{AccessPolicy, PermitAll};
use crate::runner::linker::chain::{DynamicLinker, PrelinkFilter, DEFAULT_UNSTABLE_RELINK_THRESHOLD};
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::GuardedInvocation;
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;

/// Collects tiers and policies, then freezes them into a [`DynamicLinker`].
///
/// Contributed linkers are placed at the head of the fallback tier, after
/// every prioritized linker and before the built-in fallbacks.
pub struct DynamicLinkerFactory {
    prioritized: Vec<Arc<dyn GuardingLinker>>,
    fallback: Vec<Arc<dyn GuardingLinker>>,
    contributed: Vec<Arc<dyn GuardingLinker>>,
    access_policy: Arc<dyn AccessPolicy>,
    hide_internal_objects: bool,
    synthesize_missing_members: bool,
    prelink_filter: Option<Arc<PrelinkFilter>>,
    unstable_relink_threshold: usize,
    sync_on_relink: bool,
}

impl DynamicLinkerFactory {
    pub fn new() -> Self {
        DynamicLinkerFactory {
            prioritized: vec![],
            fallback: vec![],
            contributed: vec![],
            access_policy: Arc::new(PermitAll),
            hide_internal_objects: true,
            synthesize_missing_members: true,
            prelink_filter: None,
            unstable_relink_threshold: DEFAULT_UNSTABLE_RELINK_THRESHOLD,
            sync_on_relink: false,
        }
    }

    pub fn with_prioritized_linkers(mut self, linkers: Vec<Arc<dyn GuardingLinker>>) -> Self {
        self.prioritized = linkers;
        self
    }

    pub fn with_fallback_linkers(mut self, linkers: Vec<Arc<dyn GuardingLinker>>) -> Self {
        self.fallback = linkers;
        self
    }

    pub fn with_contributed_linkers(mut self, linkers: Vec<Arc<dyn GuardingLinker>>) -> Self {
        self.contributed.extend(linkers);
        self
    }

    pub fn with_access_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.access_policy = policy;
        self
    }

    pub fn with_hide_internal_objects(mut self, hide: bool) -> Self {
        self.hide_internal_objects = hide;
        self
    }

    pub fn with_synthesize_missing_members(mut self, synthesize: bool) -> Self {
        self.synthesize_missing_members = synthesize;
        self
    }

    pub fn with_prelink_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(GuardedInvocation, &LinkRequest, &LinkerServices) -> GuardedInvocation
            + Send
            + Sync
            + 'static,
    {
        self.prelink_filter = Some(Arc::new(filter));
        self
    }

    /// With a threshold of zero a call site stops caching at its first relink.
    pub fn with_unstable_relink_threshold(mut self, threshold: usize) -> Self {
        self.unstable_relink_threshold = threshold;
        self
    }

    pub fn with_sync_on_relink(mut self, sync: bool) -> Self {
        self.sync_on_relink = sync;
        self
    }

    pub fn create_linker(self) -> DynamicLinker {
        let mut fallback = self.contributed;
        fallback.extend(self.fallback);
        DynamicLinker {
            prioritized: self.prioritized,
            fallback,
            services: LinkerServices::new(self.access_policy, self.hide_internal_objects),
            synthesize_missing_members: self.synthesize_missing_members,
            prelink_filter: self.prelink_filter,
            unstable_relink_threshold: self.unstable_relink_threshold,
            sync_on_relink: self.sync_on_relink,
        }
    }
}

impl Default for DynamicLinkerFactory {
    fn default() -> Self {
        Self::new()
    }
}

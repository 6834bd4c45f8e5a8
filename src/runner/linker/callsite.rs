//! A single-entry caching call site.
//!
//! The site caches one guarded invocation. A call whose arguments fail the
//! guard (or whose switch points were invalidated) relinks through the chain.
//! Once the number of relinks exceeds the chain's unstable-relink threshold,
//! the site stops caching and links every call afresh.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::chain::DynamicLinker;
use crate::runner::linker::descriptor::OperationDescriptor;
use crate::runner::linker::invocation::{argument, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;

pub struct LinkerCallSite {
    id: String,
    descriptor: Arc<OperationDescriptor>,
    linker: Arc<DynamicLinker>,
    target: RwLock<Option<GuardedInvocation>>,
    relink_lock: Mutex<()>,
    linked_once: AtomicBool,
    relink_count: AtomicUsize,
    megamorphic: AtomicBool,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl LinkerCallSite {
    pub fn new(descriptor: Arc<OperationDescriptor>, linker: Arc<DynamicLinker>) -> Self {
        LinkerCallSite {
            id: Uuid::new_v4().to_hyphenated().to_string(),
            descriptor,
            linker,
            target: RwLock::new(None),
            relink_lock: Mutex::new(()),
            linked_once: AtomicBool::new(false),
            relink_count: AtomicUsize::new(0),
            megamorphic: AtomicBool::new(false),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn descriptor(&self) -> &Arc<OperationDescriptor> {
        &self.descriptor
    }

    pub fn linker(&self) -> &Arc<DynamicLinker> {
        &self.linker
    }

    /// Links performed after the first one.
    pub fn relink_count(&self) -> usize {
        self.relink_count.load(Ordering::Acquire)
    }

    /// Has the site given up caching?
    pub fn is_megamorphic(&self) -> bool {
        self.megamorphic.load(Ordering::Acquire)
    }

    /// Calls served from the cache. Only counted on profiling sites.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Calls that had to link. Only counted on profiling sites.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn has_cached_target(&self) -> bool {
        self.target.read().is_some()
    }

    /// Runs the operation with `args` laid out in the descriptor's calling
    /// convention.
    pub fn invoke(&self, args: &[JsValue]) -> Result<JsValue, JErrorType> {
        let flags = self.descriptor.flags();
        if flags.is_tracing() {
            trace!(
                call_site = %self.id,
                operation = %self.descriptor,
                receiver = %argument(args, 0),
                "invoke"
            );
        }
        if let Some(invocation) = self.cached(args) {
            if flags.is_profiling() {
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
            return invocation.invoke(args);
        }
        if flags.is_profiling() {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        self.relink(args)?.invoke(args)
    }

    fn cached(&self, args: &[JsValue]) -> Option<Invocation> {
        if self.is_megamorphic() {
            return None;
        }
        match &*self.target.read() {
            Some(gi) if gi.test(args) => Some(gi.invocation().clone()),
            _ => None,
        }
    }

    fn relink(&self, args: &[JsValue]) -> Result<Invocation, JErrorType> {
        let _serialized = if self.linker.sync_on_relink() && !self.is_megamorphic() {
            let guard = self.relink_lock.lock();
            // A concurrent relink may already have produced a usable target.
            if let Some(invocation) = self.cached(args) {
                return Ok(invocation);
            }
            Some(guard)
        } else {
            None
        };

        let threshold = self.linker.unstable_relink_threshold();
        let relinks = if self.linked_once.swap(true, Ordering::AcqRel) {
            self.relink_count.fetch_add(1, Ordering::AcqRel) + 1
        } else {
            0
        };
        if relinks > threshold && !self.megamorphic.swap(true, Ordering::AcqRel) {
            warn!(
                call_site = %self.id,
                operation = %self.descriptor,
                relinks,
                "call site exceeded its relink threshold and stops caching"
            );
            *self.target.write() = None;
        }
        let megamorphic = self.is_megamorphic();

        let request = LinkRequest::new(self.descriptor.clone(), args)
            .with_call_site_unstable(megamorphic || relinks >= threshold);
        let candidate = self.linker.link(&request)?.ok_or_else(|| {
            JErrorType::TypeError(format!(
                "No such operation {} on {}",
                self.descriptor.encoding(),
                safe_to_string(argument(args, 0))
            ))
        })?;
        if self.descriptor.flags().is_tracing() {
            trace!(
                call_site = %self.id,
                relinks,
                guard = ?candidate.guard(),
                "relinked"
            );
        }
        let invocation = candidate.invocation().clone();
        if !megamorphic {
            *self.target.write() = Some(candidate);
        }
        Ok(invocation)
    }
}

impl fmt::Debug for LinkerCallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkerCallSite")
            .field("id", &self.id)
            .field("descriptor", &self.descriptor.to_string())
            .field("relink_count", &self.relink_count())
            .field("megamorphic", &self.is_megamorphic())
            .finish()
    }
}

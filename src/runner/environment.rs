//! Execution environments: the access policy and the linker chain a group of
//! call sites links against.

use std::fmt;
use std::sync::Arc;

use crate::runner::linker::chain::DynamicLinker;
use crate::runner::linker::config::LinkerConfig;
use crate::runner::linker::descriptor::CallSiteFlags;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linkers::default_linker_factory;

/// Decides whether scripts may reach restricted host classes.
///
/// Consulted on the linking path, so implementations must be fast and must
/// not block.
pub trait AccessPolicy: Send + Sync {
    fn permits_reflection(&self, class_name: &str, is_static: bool) -> bool;
}

/// Grants every reflective access.
pub struct PermitAll;

impl AccessPolicy for PermitAll {
    fn permits_reflection(&self, _class_name: &str, _is_static: bool) -> bool {
        true
    }
}

/// Denies every reflective access.
pub struct DenyReflection;

impl AccessPolicy for DenyReflection {
    fn permits_reflection(&self, _class_name: &str, _is_static: bool) -> bool {
        false
    }
}

lazy_static! {
    static ref DEFAULT_ENVIRONMENT: Arc<ScriptEnvironment> = Arc::new(ScriptEnvironment::new());
}

/// An execution environment. Each one owns its own chain; the default
/// linkers inside it are shared with every other environment.
pub struct ScriptEnvironment {
    config: LinkerConfig,
    access_policy: Arc<dyn AccessPolicy>,
    contributed: Vec<Arc<dyn GuardingLinker>>,
    linker: Arc<DynamicLinker>,
}

impl ScriptEnvironment {
    pub fn new() -> Self {
        Self::build(LinkerConfig::new(), Arc::new(PermitAll), vec![])
    }

    /// The environment shared by native callers and public lookups.
    pub fn default_environment() -> Arc<ScriptEnvironment> {
        DEFAULT_ENVIRONMENT.clone()
    }

    /// Applies `config`. A config that disallows reflection installs
    /// [`DenyReflection`].
    pub fn with_config(self, config: LinkerConfig) -> Self {
        let policy: Arc<dyn AccessPolicy> = if config.allow_reflection {
            self.access_policy
        } else {
            Arc::new(DenyReflection)
        };
        Self::build(config, policy, self.contributed)
    }

    pub fn with_access_policy(self, policy: Arc<dyn AccessPolicy>) -> Self {
        Self::build(self.config, policy, self.contributed)
    }

    /// Adds linkers at the head of this environment's fallback tier.
    pub fn with_contributed_linkers(self, linkers: Vec<Arc<dyn GuardingLinker>>) -> Self {
        let mut contributed = self.contributed;
        contributed.extend(linkers);
        Self::build(self.config, self.access_policy, contributed)
    }

    fn build(
        config: LinkerConfig,
        access_policy: Arc<dyn AccessPolicy>,
        contributed: Vec<Arc<dyn GuardingLinker>>,
    ) -> Self {
        let linker = default_linker_factory()
            .with_contributed_linkers(contributed.clone())
            .with_access_policy(access_policy.clone())
            .with_unstable_relink_threshold(config.unstable_relink_threshold)
            .with_sync_on_relink(config.sync_on_relink)
            .create_linker();
        ScriptEnvironment {
            config,
            access_policy,
            contributed,
            linker: Arc::new(linker),
        }
    }

    pub fn linker(&self) -> &Arc<DynamicLinker> {
        &self.linker
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    pub fn services(&self) -> &LinkerServices {
        self.linker.services()
    }

    /// Call-site flags with the environment-wide profiling and tracing
    /// settings folded in.
    pub fn effective_flags(&self, flags: u32) -> u32 {
        let mut flags = CallSiteFlags::new(flags);
        if self.config.profile_callsites {
            flags = flags.with(CallSiteFlags::PROFILE);
        }
        if self.config.trace_callsites {
            flags = flags.with(CallSiteFlags::TRACE);
        }
        flags.bits()
    }
}

impl Default for ScriptEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScriptEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptEnvironment")
            .field("config", &self.config)
            .field("linker", &self.linker)
            .finish()
    }
}

/// What generated code hands to bootstrap: the environment its call sites
/// belong to.
#[derive(Clone, Debug)]
pub struct LookupContext {
    environment: Arc<ScriptEnvironment>,
}

impl LookupContext {
    pub fn new(environment: Arc<ScriptEnvironment>) -> Self {
        LookupContext { environment }
    }

    /// A lookup in the default environment.
    pub fn public() -> Self {
        LookupContext::new(ScriptEnvironment::default_environment())
    }

    pub fn environment(&self) -> &Arc<ScriptEnvironment> {
        &self.environment
    }
}

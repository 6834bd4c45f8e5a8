//! Linking machinery: descriptors, guarded invocations, the linker chain and
//! the call sites that cache its results.
//!
//! The pipeline for one link is:
//!
//! ```text
//! call site → descriptor → chain (prioritized, fallback, missing member)
//!           → prelink filter → as_type(call-site signature) → cached candidate
//! ```

pub mod callsite;
pub mod chain;
pub mod config;
pub mod conversion;
pub mod descriptor;
pub mod factory;
pub mod guarding;
pub mod invocation;
pub mod missing_member;
pub mod optimistic;
pub mod request;
pub mod return_policy;
pub mod services;
pub mod signature;

pub use self::callsite::LinkerCallSite;
pub use self::chain::DynamicLinker;
pub use self::descriptor::{CallSiteFlags, OperationDescriptor, OperationKind};
pub use self::factory::DynamicLinkerFactory;
pub use self::guarding::GuardingLinker;
pub use self::invocation::{Guard, GuardedInvocation, Invocation, SwitchPoint};
pub use self::request::LinkRequest;
pub use self::services::LinkerServices;
pub use self::signature::{MethodSignature, StaticType};

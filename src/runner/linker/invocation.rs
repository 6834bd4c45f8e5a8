//! Linked executables and the guards that keep them valid.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::value::{JsValue, RuntimeType};
use crate::runner::linker::signature::{MethodSignature, StaticType};

pub(crate) static UNDEFINED: JsValue = JsValue::Undefined;

/// Reads argument `i`, treating absent arguments as `undefined`.
pub fn argument(args: &[JsValue], i: usize) -> &JsValue {
    args.get(i).unwrap_or(&UNDEFINED)
}

/// An invalidation hook shared between a linked candidate and whatever
/// assumption it depends on. Once invalidated it stays invalidated.
#[derive(Clone, Debug, Default)]
pub struct SwitchPoint {
    invalidated: Arc<AtomicBool>,
}

impl SwitchPoint {
    pub fn new() -> Self {
        SwitchPoint {
            invalidated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn invalidate(&self) {
        self.invalidated.store(true, Ordering::Release);
    }

    pub fn has_been_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::Acquire)
    }
}

pub type InvocationFn = dyn Fn(&[JsValue]) -> Result<JsValue, JErrorType> + Send + Sync;

/// A native executable with a static signature.
///
/// Arguments follow the call-site calling convention of the descriptor the
/// invocation was linked for.
#[derive(Clone)]
pub struct Invocation {
    signature: MethodSignature,
    body: Arc<InvocationFn>,
}

impl Invocation {
    pub fn new<F>(signature: MethodSignature, body: F) -> Self
    where
        F: Fn(&[JsValue]) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        Invocation {
            signature,
            body: Arc::new(body),
        }
    }

    pub fn constant(signature: MethodSignature, value: JsValue) -> Self {
        Invocation::new(signature, move |_| Ok(value.clone()))
    }

    /// An invocation that links successfully but fails every time it runs.
    pub fn throwing(signature: MethodSignature, error: JErrorType) -> Self {
        Invocation::new(signature, move |_| Err(error.clone()))
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn invoke(&self, args: &[JsValue]) -> Result<JsValue, JErrorType> {
        (self.body)(args)
    }

    /// Post-processes the result; the return slot becomes `ret`.
    pub fn filter_return<F>(self, ret: StaticType, filter: F) -> Self
    where
        F: Fn(JsValue) -> Result<JsValue, JErrorType> + Send + Sync + 'static,
    {
        let signature = self.signature.change_return_type(ret);
        let body = self.body;
        Invocation::new(signature, move |args| filter(body(args)?))
    }

    /// Pre-processes the arguments; the parameter slots become `params`.
    pub fn filter_arguments<F>(self, params: Vec<StaticType>, filter: F) -> Self
    where
        F: Fn(&[JsValue]) -> Result<Vec<JsValue>, JErrorType> + Send + Sync + 'static,
    {
        let signature = self.signature.change_parameter_types(params);
        let body = self.body;
        Invocation::new(signature, move |args| {
            let filtered = filter(args)?;
            body(&filtered)
        })
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invocation{}", self.signature)
    }
}

pub type GuardFn = dyn Fn(&[JsValue]) -> bool + Send + Sync;

/// Predicate over the call-site arguments deciding whether a cached
/// candidate may be reused.
#[derive(Clone)]
pub enum Guard {
    /// Argument `position` has the given runtime type.
    RuntimeType {
        position: usize,
        expected: RuntimeType,
    },
    /// Argument `position` is the given value (objects by identity).
    Identity { position: usize, expected: JsValue },
    Predicate(Arc<GuardFn>),
    And(Box<Guard>, Box<Guard>),
}

impl Guard {
    pub fn receiver_type(receiver: &JsValue) -> Guard {
        Guard::RuntimeType {
            position: 0,
            expected: receiver.runtime_type(),
        }
    }

    pub fn receiver_identity(receiver: &JsValue) -> Guard {
        Guard::Identity {
            position: 0,
            expected: receiver.clone(),
        }
    }

    pub fn predicate<F>(f: F) -> Guard
    where
        F: Fn(&[JsValue]) -> bool + Send + Sync + 'static,
    {
        Guard::Predicate(Arc::new(f))
    }

    pub fn and(self, other: Guard) -> Guard {
        Guard::And(Box::new(self), Box::new(other))
    }

    pub fn test(&self, args: &[JsValue]) -> bool {
        match self {
            Guard::RuntimeType { position, expected } => {
                argument(args, *position).runtime_type() == *expected
            }
            Guard::Identity { position, expected } => argument(args, *position) == expected,
            Guard::Predicate(f) => f(args),
            Guard::And(a, b) => a.test(args) && b.test(args),
        }
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::RuntimeType { position, expected } => {
                write!(f, "type(#{}) == {:?}", position, expected)
            }
            Guard::Identity { position, expected } => {
                write!(f, "#{} is {:?}", position, expected)
            }
            Guard::Predicate(_) => write!(f, "predicate"),
            Guard::And(a, b) => write!(f, "({:?} && {:?})", a, b),
        }
    }
}

/// A candidate produced by a linker: the executable, the guard that
/// validates it and the switch points it depends on.
///
/// An absent guard means the invocation is valid for every call through the
/// descriptor it was linked for.
#[derive(Clone, Debug)]
pub struct GuardedInvocation {
    invocation: Invocation,
    guard: Option<Guard>,
    switch_points: Vec<SwitchPoint>,
}

impl GuardedInvocation {
    pub fn new(invocation: Invocation, guard: Option<Guard>) -> Self {
        GuardedInvocation {
            invocation,
            guard,
            switch_points: vec![],
        }
    }

    pub fn guarded(invocation: Invocation, guard: Guard) -> Self {
        GuardedInvocation::new(invocation, Some(guard))
    }

    pub fn with_switch_points(mut self, switch_points: Vec<SwitchPoint>) -> Self {
        self.switch_points.extend(switch_points);
        self
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    pub fn switch_points(&self) -> &[SwitchPoint] {
        &self.switch_points
    }

    pub fn has_been_invalidated(&self) -> bool {
        self.switch_points.iter().any(|s| s.has_been_invalidated())
    }

    /// Can this candidate serve a call with `args`?
    pub fn test(&self, args: &[JsValue]) -> bool {
        !self.has_been_invalidated() && self.guard.as_ref().map_or(true, |g| g.test(args))
    }

    pub fn replace_invocation(self, invocation: Invocation) -> Self {
        GuardedInvocation {
            invocation,
            guard: self.guard,
            switch_points: self.switch_points,
        }
    }

    pub fn map_invocation<F>(self, f: F) -> Self
    where
        F: FnOnce(Invocation) -> Invocation,
    {
        let invocation = f(self.invocation.clone());
        self.replace_invocation(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::object::ScriptObject;

    #[test]
    fn test_switch_point_invalidates_candidate() {
        let sp = SwitchPoint::new();
        let gi = GuardedInvocation::new(
            Invocation::constant(MethodSignature::generic(1), JsValue::from(1)),
            None,
        )
        .with_switch_points(vec![sp.clone()]);
        assert!(gi.test(&[JsValue::Undefined]));
        sp.invalidate();
        assert!(!gi.test(&[JsValue::Undefined]));
    }

    #[test]
    fn test_type_and_identity_guards() {
        let a = ScriptObject::new().into_value();
        let b = ScriptObject::new().into_value();
        let by_type = Guard::receiver_type(&a);
        let by_identity = Guard::receiver_identity(&a);
        assert!(by_type.test(&[b.clone()]));
        assert!(!by_identity.test(&[b.clone()]));
        assert!(by_identity.test(&[a.clone()]));
        assert!(!by_type.test(&[JsValue::from("a")]));
        assert!(!by_type.clone().and(by_identity).test(&[b]));
    }

    #[test]
    fn test_filters_compose_in_order() {
        let inv = Invocation::new(MethodSignature::generic(1), |args| Ok(argument(args, 0).clone()))
            .filter_arguments(vec![StaticType::Int], |args| Ok(vec![JsValue::from(format!("{}!", argument(args, 0)))]))
            .filter_return(StaticType::String, |v| Ok(JsValue::from(format!("<{}>", v))));
        assert_eq!(inv.signature().to_string(), "(int)String");
        assert_eq!(inv.invoke(&[JsValue::from(7)]).unwrap(), JsValue::from("<7!>"));
    }
}

//! Operation descriptors: what a call site asks the linkers to do.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::parser::{name_codec, parse_operation};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::invocation::argument;
use crate::runner::linker::signature::MethodSignature;

/// The fixed operation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GetProperty,
    GetElement,
    GetMethod,
    SetProperty,
    SetElement,
    Call,
    New,
}

impl OperationKind {
    pub fn is_get(&self) -> bool {
        matches!(
            self,
            OperationKind::GetProperty | OperationKind::GetElement | OperationKind::GetMethod
        )
    }

    pub fn is_set(&self) -> bool {
        matches!(self, OperationKind::SetProperty | OperationKind::SetElement)
    }

    pub fn mnemonic(&self) -> &'static str {
        match self {
            OperationKind::GetProperty => "GET:PROPERTY",
            OperationKind::GetElement => "GET:ELEMENT",
            OperationKind::GetMethod => "GET:METHOD",
            OperationKind::SetProperty => "SET:PROPERTY",
            OperationKind::SetElement => "SET:ELEMENT",
            OperationKind::Call => "CALL",
            OperationKind::New => "NEW",
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// Link-time flags of a call site.
///
/// The low bits are boolean flags; bits 11 and up carry the program point
/// (the call-site identity used by deoptimization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallSiteFlags(u32);

impl CallSiteFlags {
    pub const STRICT: u32 = 1 << 0;
    pub const PROFILE: u32 = 1 << 1;
    pub const TRACE: u32 = 1 << 2;
    pub const OPTIMISTIC: u32 = 1 << 3;
    pub const PROGRAM_POINT_SHIFT: u32 = 11;

    pub fn new(bits: u32) -> Self {
        CallSiteFlags(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn with(&self, flag: u32) -> Self {
        CallSiteFlags(self.0 | flag)
    }

    pub fn with_program_point(&self, program_point: u32) -> Self {
        let low = self.0 & ((1 << Self::PROGRAM_POINT_SHIFT) - 1);
        CallSiteFlags(low | (program_point << Self::PROGRAM_POINT_SHIFT))
    }

    pub fn is_strict(&self) -> bool {
        self.0 & Self::STRICT != 0
    }

    pub fn is_profiling(&self) -> bool {
        self.0 & Self::PROFILE != 0
    }

    pub fn is_tracing(&self) -> bool {
        self.0 & Self::TRACE != 0
    }

    pub fn is_optimistic(&self) -> bool {
        self.0 & Self::OPTIMISTIC != 0
    }

    pub fn program_point(&self) -> u32 {
        self.0 >> Self::PROGRAM_POINT_SHIFT
    }
}

impl Display for CallSiteFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names = vec![];
        if self.is_strict() {
            names.push("strict");
        }
        if self.is_profiling() {
            names.push("profile");
        }
        if self.is_tracing() {
            names.push("trace");
        }
        if self.is_optimistic() {
            names.push("optimistic");
        }
        if names.is_empty() {
            names.push("none");
        }
        write!(f, "{} pp={}", names.join("|"), self.program_point())
    }
}

lazy_static! {
    static ref INTERNED: Mutex<HashMap<(String, MethodSignature, u32), Arc<OperationDescriptor>>> =
        Mutex::new(HashMap::new());
}

/// Immutable description of one call site's operation.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct OperationDescriptor {
    operation: OperationKind,
    name: Option<String>,
    signature: MethodSignature,
    flags: CallSiteFlags,
}

impl OperationDescriptor {
    pub fn new(
        operation: OperationKind,
        name: Option<String>,
        signature: MethodSignature,
        flags: CallSiteFlags,
    ) -> Self {
        OperationDescriptor {
            operation,
            name,
            signature,
            flags,
        }
    }

    pub fn parse(encoding: &str, signature: MethodSignature, flags: u32) -> Result<Self, JErrorType> {
        let (operation, name) = parse_operation(encoding)?;
        Ok(OperationDescriptor::new(
            operation,
            name,
            signature,
            CallSiteFlags::new(flags),
        ))
    }

    /// Returns the shared descriptor for identical call sites.
    ///
    /// Descriptors carrying a program point are unique to one call site and
    /// are never entered in the table, so it holds at most one entry per
    /// encoding, signature and flag combination.
    pub fn intern(
        encoding: &str,
        signature: MethodSignature,
        flags: u32,
    ) -> Result<Arc<Self>, JErrorType> {
        if CallSiteFlags::new(flags).program_point() != 0 {
            return Ok(Arc::new(OperationDescriptor::parse(encoding, signature, flags)?));
        }
        let key = (encoding.to_string(), signature, flags);
        if let Some(d) = INTERNED.lock().get(&key) {
            return Ok(d.clone());
        }
        let descriptor = Arc::new(OperationDescriptor::parse(encoding, key.1.clone(), flags)?);
        Ok(INTERNED.lock().entry(key).or_insert(descriptor).clone())
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn flags(&self) -> CallSiteFlags {
        self.flags
    }

    pub fn is_strict(&self) -> bool {
        self.flags.is_strict()
    }

    /// The textual encoding this descriptor parses from.
    pub fn encoding(&self) -> String {
        match &self.name {
            Some(n) => format!("{}:{}", self.operation.mnemonic(), name_codec::encode(n)),
            None => self.operation.mnemonic().to_string(),
        }
    }

    /// Property key of a GET/SET: the fixed name, or the key argument.
    pub fn member_key(&self, args: &[JsValue]) -> Result<String, JErrorType> {
        match &self.name {
            Some(n) => Ok(n.clone()),
            None => to_string(argument(args, 1)),
        }
    }

    /// Value argument of a SET.
    pub fn member_value<'a>(&self, args: &'a [JsValue]) -> &'a JsValue {
        match &self.name {
            Some(_) => argument(args, 1),
            None => argument(args, 2),
        }
    }

    /// Receiver (`this`) argument of a CALL.
    pub fn call_receiver<'a>(&self, args: &'a [JsValue]) -> &'a JsValue {
        argument(args, 1)
    }

    /// Arguments passed on to the callee of a CALL or NEW.
    pub fn call_arguments(&self, args: &[JsValue]) -> Vec<JsValue> {
        let start = match self.operation {
            OperationKind::New => 1,
            _ => 2,
        };
        args.get(start..).map(|a| a.to_vec()).unwrap_or_default()
    }
}

impl Display for OperationDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} [{}]", self.encoding(), self.signature, self.flags)
    }
}

//! # just-linker - dynamic call-site linking for the just JavaScript engine
//!
//! Every polymorphic operation a script performs (property and element
//! access, method lookup, calls, construction) compiles to a dynamic call
//! site. On first execution the site asks a chain of guarding linkers for a
//! native invocation plus a guard that says when that invocation may be
//! reused. This crate is that linking layer:
//!
//! - a fixed operation vocabulary, encoded as `GET:PROPERTY:name` style
//!   descriptors and parsed with a PEG grammar
//! - specialized linkers for script objects, primitives, bound callables,
//!   super adapters, foreign bridge objects, host ("bean") classes and
//!   static class references
//! - a unified callable abstraction and a bound-callable model
//! - return-type coercion and a missing-member policy applied after linking
//! - a bootstrap facade and a single-entry caching call site
//!
//! ## Quick Start
//!
//! ```
//! use just_linker::runner::bootstrap;
//! use just_linker::runner::ds::object::ScriptObject;
//! use just_linker::runner::ds::value::JsValue;
//! use just_linker::runner::environment::LookupContext;
//! use just_linker::runner::linker::MethodSignature;
//!
//! let lookup = LookupContext::public();
//! let set_x = bootstrap::bootstrap(&lookup, "SET:PROPERTY:x", MethodSignature::generic(2), 0).unwrap();
//! let get_x = bootstrap::bootstrap(&lookup, "GET:PROPERTY:x", MethodSignature::generic(1), 0).unwrap();
//!
//! let o = ScriptObject::new().into_value();
//! assert_eq!(get_x.invoke(&[o.clone()]).unwrap(), JsValue::Undefined);
//! set_x.invoke(&[o.clone(), JsValue::from(5)]).unwrap();
//! assert_eq!(get_x.invoke(&[o]).unwrap(), JsValue::from(5));
//! ```
//!
//! ## Linking
//!
//! A link request walks the prioritized tier, then the fallback tier. The
//! first linker that returns a candidate wins; when all decline, the
//! missing-member policy decides (reads give `undefined`, writes extend or
//! are ignored, calls fail when run). The winner then passes the
//! environment's prelink filter and is adapted to the call-site signature.
//!
//! ## Architecture
//!
//! - **[`parser`]** - Descriptor grammar and the member name codec
//! - **[`runner`]** - Linking layer
//!   - **[`runner::ds`]** - Values and the object models linkers dispatch over
//!   - **[`runner::linker`]** - Descriptors, invocations, chain, call sites
//!   - **[`runner::linkers`]** - The built-in linkers
//!   - **[`runner::bootstrap`]** - Entry points

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;

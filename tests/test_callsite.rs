//! Tests for caching call sites.
//!
//! These tests drive call sites created by `bootstrap` through cache hits,
//! guard failures, layout invalidation, the megamorphic state and concurrent
//! use from several threads.

extern crate just_linker;

use std::sync::Arc;
use std::thread;

use just_linker::runner::bootstrap::bootstrap;
use just_linker::runner::ds::object::{JsObject, ScriptObject};
use just_linker::runner::ds::value::JsValue;
use just_linker::runner::environment::{LookupContext, ScriptEnvironment};
use just_linker::runner::linker::config::LinkerConfig;
use just_linker::runner::linker::{CallSiteFlags, LinkerCallSite, MethodSignature};

fn lookup_with_threshold(threshold: usize) -> LookupContext {
    let mut config = LinkerConfig::new();
    config.unstable_relink_threshold = threshold;
    LookupContext::new(Arc::new(ScriptEnvironment::new().with_config(config)))
}

fn get_site(lookup: &LookupContext, name: &str, flags: u32) -> Arc<LinkerCallSite> {
    bootstrap(
        lookup,
        &format!("GET:PROPERTY:{}", name),
        MethodSignature::generic(1),
        flags,
    )
    .unwrap()
}

fn object_with(key: &str, value: JsValue) -> JsValue {
    let o = ScriptObject::new();
    o.define_own_property(key, value);
    o.into_value()
}

#[test]
fn test_profiled_site_counts_hits_and_misses() {
    let site = get_site(&LookupContext::public(), "length", CallSiteFlags::PROFILE);
    assert!(!site.has_cached_target());
    assert_eq!(site.invoke(&[JsValue::from("ab")]).unwrap(), JsValue::from(2));
    assert_eq!(site.invoke(&[JsValue::from("abcd")]).unwrap(), JsValue::from(4));
    assert!(site.has_cached_target());
    assert_eq!(site.misses(), 1);
    assert_eq!(site.hits(), 1);
    assert_eq!(site.relink_count(), 0);
}

#[test]
fn test_unprofiled_site_does_not_count() {
    let site = get_site(&LookupContext::public(), "length", 0);
    site.invoke(&[JsValue::from("ab")]).unwrap();
    site.invoke(&[JsValue::from("ab")]).unwrap();
    assert_eq!(site.hits(), 0);
    assert_eq!(site.misses(), 0);
}

#[test]
fn test_guard_failure_relinks() {
    let site = get_site(&LookupContext::public(), "length", 0);
    assert_eq!(site.invoke(&[JsValue::from("abc")]).unwrap(), JsValue::from(3));
    let o = object_with("length", JsValue::from(11));
    assert_eq!(site.invoke(&[o]).unwrap(), JsValue::from(11));
    assert_eq!(site.relink_count(), 1);
    assert!(!site.is_megamorphic());
}

#[test]
fn test_adding_a_property_invalidates_absent_read() {
    let site = get_site(&LookupContext::public(), "late", 0);
    let o = ScriptObject::new().into_value();
    assert_eq!(site.invoke(&[o.clone()]).unwrap(), JsValue::Undefined);
    o.as_object()
        .and_then(|t| t.as_js_object())
        .unwrap()
        .define_own_property("late", JsValue::from("here"));
    assert_eq!(site.invoke(&[o]).unwrap(), JsValue::from("here"));
}

#[test]
fn test_megamorphic_site_stays_correct() {
    let lookup = lookup_with_threshold(2);
    let site = get_site(&lookup, "length", 0);
    let receivers = vec![
        (JsValue::from("abc"), JsValue::from(3)),
        (JsValue::from(1), JsValue::Undefined),
        (JsValue::from(true), JsValue::Undefined),
        (object_with("length", JsValue::from(7)), JsValue::from(7)),
    ];
    for _ in 0..3 {
        for (receiver, expected) in &receivers {
            assert_eq!(&site.invoke(&[receiver.clone()]).unwrap(), expected);
        }
    }
    assert!(site.is_megamorphic());
    assert!(!site.has_cached_target());
}

#[test]
fn test_threshold_zero_stops_caching_at_first_relink() {
    let lookup = lookup_with_threshold(0);
    let site = get_site(&lookup, "length", 0);
    site.invoke(&[JsValue::from("a")]).unwrap();
    assert!(site.has_cached_target());
    site.invoke(&[JsValue::from(2)]).unwrap();
    assert!(site.is_megamorphic());
    assert_eq!(site.invoke(&[JsValue::from("xyz")]).unwrap(), JsValue::from(3));
}

#[test]
fn test_set_then_get_through_sites() {
    let lookup = LookupContext::public();
    let set = bootstrap(&lookup, "SET:PROPERTY:n", MethodSignature::generic(2), 0).unwrap();
    let get = get_site(&lookup, "n", 0);
    let o = ScriptObject::new().into_value();
    for i in 0..5 {
        set.invoke(&[o.clone(), JsValue::from(i)]).unwrap();
        assert_eq!(get.invoke(&[o.clone()]).unwrap(), JsValue::from(i));
    }
}

#[test]
fn test_shared_site_across_threads() {
    let site = get_site(&lookup_with_threshold(4), "length", 0);
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let site = site.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let s = "x".repeat(t + i % 3);
                    let expected = JsValue::from((t + i % 3) as i64);
                    assert_eq!(site.invoke(&[JsValue::from(s)]).unwrap(), expected);
                    if i % 10 == 0 {
                        let o = object_with("length", JsValue::from(-1));
                        assert_eq!(site.invoke(&[o]).unwrap(), JsValue::from(-1));
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

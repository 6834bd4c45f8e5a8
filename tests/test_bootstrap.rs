//! End-to-end tests for the bootstrap entry points.
//!
//! Call sites are created the way generated code creates them and then
//! exercised against host beans, static classes, super adapters, restricted
//! classes and optimistic return types.

extern crate just_linker;

use std::sync::Arc;

use just_linker::runner::bootstrap::{
    bind_callable, bootstrap, create_dynamic_call_invoker, create_dynamic_invoker,
    create_super_adapter, get_bean_linker_for_class,
};
use just_linker::runner::ds::error::JErrorType;
use just_linker::runner::ds::function_object::ScriptFunction;
use just_linker::runner::ds::host::{DynamicMethod, HostCategory, HostClass, HostObject, StaticClass};
use just_linker::runner::ds::object::{JsObject, ObjectType, ScriptObject};
use just_linker::runner::ds::value::JsValue;
use just_linker::runner::environment::{DenyReflection, LookupContext, ScriptEnvironment};
use just_linker::runner::linker::config::LinkerConfig;
use just_linker::runner::linker::{CallSiteFlags, MethodSignature, StaticType};

fn point_class() -> Arc<HostClass> {
    Arc::new(
        HostClass::new("Point")
            .add_field_property("x", StaticType::Int)
            .add_method(
                "shifted",
                MethodSignature::new(vec![StaticType::Int], StaticType::Int),
                |this, args| match (this.as_object(), &args[0]) {
                    (Some(ObjectType::Host(h)), JsValue::Number(n)) => match h.get_field("x") {
                        JsValue::Number(x) => Ok(JsValue::from(x.as_f64() as i64 + n.as_f64() as i64)),
                        _ => Ok(JsValue::from(n.as_f64() as i64)),
                    },
                    _ => Ok(JsValue::Null),
                },
            )
            .with_constructor(
                MethodSignature::new(vec![StaticType::Int], StaticType::Object),
                |_, args| Ok(HostObject::new(point_class()).with_field("x", args[0].clone()).into_value()),
            )
            .add_static_property("DIMENSIONS", StaticType::BoxedInt, JsValue::from(2)),
    )
}

fn site_args(lookup: &LookupContext, encoding: &str, args: &[JsValue]) -> Result<JsValue, JErrorType> {
    bootstrap(lookup, encoding, MethodSignature::generic(args.len()), 0)?.invoke(args)
}

#[test]
fn test_bean_property_and_method_access() {
    let lookup = LookupContext::public();
    let p = HostObject::new(point_class()).with_field("x", JsValue::from(3)).into_value();

    assert_eq!(site_args(&lookup, "GET:PROPERTY:x", &[p.clone()]).unwrap(), JsValue::from(3));
    site_args(&lookup, "SET:PROPERTY:x", &[p.clone(), JsValue::from("12")]).unwrap();
    assert_eq!(site_args(&lookup, "GET:PROPERTY:x", &[p.clone()]).unwrap(), JsValue::from(12));

    let shifted = site_args(&lookup, "GET:METHOD:shifted", &[p.clone()]).unwrap();
    let call = create_dynamic_call_invoker(MethodSignature::generic(3)).unwrap();
    assert_eq!(call.invoke(&[shifted, p, JsValue::from(5)]).unwrap(), JsValue::from(17));
}

#[test]
fn test_missing_bean_member_reads_undefined() {
    let p = HostObject::new(point_class()).into_value();
    let get = create_dynamic_invoker("GET:PROPERTY:z", 0, MethodSignature::generic(1)).unwrap();
    assert_eq!(get.invoke(&[p.clone()]).unwrap(), JsValue::Undefined);
    assert_eq!(get.invoke(&[p]).unwrap(), JsValue::Undefined);
}

#[test]
fn test_static_class_construction_and_statics() {
    let lookup = LookupContext::public();
    let class = StaticClass::new(point_class()).into_value();
    let p = site_args(&lookup, "NEW", &[class.clone(), JsValue::from("4")]).unwrap();
    assert_eq!(site_args(&lookup, "GET:PROPERTY:x", &[p]).unwrap(), JsValue::from(4));

    let unboxed = bootstrap(
        &lookup,
        "GET:PROPERTY:DIMENSIONS",
        MethodSignature::new(vec![StaticType::Object], StaticType::Int),
        0,
    )
    .unwrap();
    assert_eq!(unboxed.invoke(&[class]).unwrap(), JsValue::from(2));
}

#[test]
fn test_script_function_call() {
    let f = ScriptFunction::closure("add", false, |_, args| match (&args[0], &args[1]) {
        (JsValue::Number(a), JsValue::Number(b)) => Ok(JsValue::float(a.as_f64() + b.as_f64())),
        _ => Ok(JsValue::Undefined),
    })
    .into_value();
    let call = create_dynamic_call_invoker(MethodSignature::generic(4)).unwrap();
    assert_eq!(
        call.invoke(&[f.clone(), JsValue::Undefined, JsValue::from(2), JsValue::from(3)]).unwrap(),
        JsValue::from(5)
    );
    let not_callable = call.invoke(&[JsValue::from("f"), JsValue::Undefined, JsValue::Null, JsValue::Null]);
    assert_eq!(not_callable.unwrap_err(), JErrorType::not_a_function("f"));
}

#[test]
fn test_super_adapter_reaches_super_methods() {
    let class = Arc::new(
        HostClass::new("WidgetAdapter")
            .add_method("describe", MethodSignature::new(vec![], StaticType::String), |_, _| {
                Ok(JsValue::from("override"))
            })
            .add_method("super$describe", MethodSignature::new(vec![], StaticType::String), |_, _| {
                Ok(JsValue::from("base"))
            }),
    );
    let adapter = HostObject::new(class).into_value();
    let sup = create_super_adapter(&adapter).unwrap();
    let lookup = LookupContext::public();

    let describe = site_args(&lookup, "GET:METHOD:describe", &[sup.clone()]).unwrap();
    let call = create_dynamic_call_invoker(MethodSignature::generic(2)).unwrap();
    assert_eq!(call.invoke(&[describe, JsValue::Undefined]).unwrap(), JsValue::from("base"));
    assert_eq!(site_args(&lookup, "GET:METHOD:other", &[sup]).unwrap(), JsValue::Undefined);
}

#[test]
fn test_reflection_access_follows_policy() {
    let class = Arc::new(
        HostClass::new("ClassLoader")
            .with_category(HostCategory::ClassLoading)
            .add_property("name", StaticType::String, |_, _| Ok(JsValue::from("app"))),
    );
    let loader = HostObject::new(class).into_value();

    let permitted = LookupContext::public();
    assert_eq!(site_args(&permitted, "GET:PROPERTY:name", &[loader.clone()]).unwrap(), JsValue::from("app"));

    let denied = LookupContext::new(Arc::new(
        ScriptEnvironment::new().with_access_policy(Arc::new(DenyReflection)),
    ));
    let e = site_args(&denied, "GET:PROPERTY:name", &[loader.clone()]).unwrap_err();
    assert!(e.is_security_error(), "{:?}", e);
    let e = site_args(&denied, "GET:METHOD:name", &[loader]).unwrap_err();
    assert!(e.is_security_error());
}

#[test]
fn test_config_file_settings_reach_call_sites() {
    let config = LinkerConfig::parse(
        "[linker]\nunstable_relink_threshold = 1\nprofile_callsites = true\n\n[reflection]\nallow = false\n",
    )
    .unwrap();
    let environment = Arc::new(ScriptEnvironment::new().with_config(config));
    assert_eq!(environment.linker().unstable_relink_threshold(), 1);
    let lookup = LookupContext::new(environment);

    let site = bootstrap(&lookup, "GET:PROPERTY:length", MethodSignature::generic(1), 0).unwrap();
    assert!(site.descriptor().flags().is_profiling());
    site.invoke(&[JsValue::from("a")]).unwrap();
    site.invoke(&[JsValue::from("b")]).unwrap();
    assert_eq!(site.hits(), 1);

    let method = Arc::new(HostClass::new("Method").with_category(HostCategory::Reflection));
    let m = HostObject::new(method).into_value();
    assert!(site_args(&lookup, "GET:PROPERTY:name", &[m]).unwrap_err().is_security_error());
}

#[test]
fn test_strict_set_on_primitive() {
    let lookup = LookupContext::public();
    let lax = bootstrap(&lookup, "SET:PROPERTY:x", MethodSignature::generic(2), 0).unwrap();
    assert_eq!(lax.invoke(&[JsValue::from(true), JsValue::from(1)]).unwrap(), JsValue::Undefined);
    let strict =
        bootstrap(&lookup, "SET:PROPERTY:x", MethodSignature::generic(2), CallSiteFlags::STRICT).unwrap();
    assert!(strict.invoke(&[JsValue::from(true), JsValue::from(1)]).unwrap_err().is_type_error());
}

#[test]
fn test_optimistic_site_reports_unrepresentable_result() {
    let flags = CallSiteFlags::new(CallSiteFlags::OPTIMISTIC)
        .with_program_point(42)
        .bits();
    let site = bootstrap(
        &LookupContext::public(),
        "GET:PROPERTY:x",
        MethodSignature::new(vec![StaticType::Object], StaticType::Int),
        flags,
    )
    .unwrap();
    let p = HostObject::new(point_class()).with_field("x", JsValue::from(7)).into_value();
    assert_eq!(site.invoke(&[p]).unwrap(), JsValue::from(7));

    let o = ScriptObject::new();
    o.define_own_property("x", JsValue::float(1.5));
    match site.invoke(&[o.into_value()]) {
        Err(JErrorType::UnwarrantedOptimism { value, program_point }) => {
            assert_eq!(value, "1.5");
            assert_eq!(program_point, 42);
        }
        other => panic!("expected unwarranted optimism, got {:?}", other),
    }
}

#[test]
fn test_bean_linker_for_single_class() {
    let class = point_class();
    let linker = get_bean_linker_for_class(class.clone());
    assert!(linker.can_link_type(&HostObject::new(class).into_value()));
    assert!(!linker.can_link_type(&HostObject::new(point_class()).into_value()));
    assert!(!linker.can_link_type(&JsValue::from(1)));
}

#[test]
fn test_boxed_bean_getters_convert_at_int_sites() {
    let class = Arc::new(
        HostClass::new("Account")
            .add_field_property("amount", StaticType::BoxedDouble)
            .add_field_property("active", StaticType::BoxedBoolean),
    );
    let account = HostObject::new(class)
        .with_field("amount", JsValue::float(2.5))
        .with_field("active", JsValue::from(true))
        .into_value();
    let int_site = |name: &str| {
        bootstrap(
            &LookupContext::public(),
            &format!("GET:PROPERTY:{}", name),
            MethodSignature::new(vec![StaticType::Object], StaticType::Int),
            0,
        )
        .unwrap()
    };

    assert_eq!(int_site("amount").invoke(&[account.clone()]).unwrap(), JsValue::from(2));
    assert_eq!(int_site("active").invoke(&[account]).unwrap(), JsValue::from(1));
}

fn reflective_class() -> Arc<HostClass> {
    Arc::new(
        HostClass::new("Method")
            .with_category(HostCategory::Reflection)
            .add_method("invoke", MethodSignature::new(vec![], StaticType::String), |_, _| {
                Ok(JsValue::from("reflected"))
            })
            .add_method("super$invoke", MethodSignature::new(vec![], StaticType::String), |_, _| {
                Ok(JsValue::from("reflected"))
            }),
    )
}

fn denying_lookup() -> LookupContext {
    LookupContext::new(Arc::new(
        ScriptEnvironment::new().with_access_policy(Arc::new(DenyReflection)),
    ))
}

#[test]
fn test_bound_restricted_method_is_denied() {
    let class = reflective_class();
    let method = DynamicMethod::new(class.clone(), "invoke", false).into_value();
    let bound = bind_callable(&method, HostObject::new(class).into_value(), vec![]).unwrap();
    let call = |lookup: &LookupContext| {
        bootstrap(lookup, "CALL", MethodSignature::generic(2), 0)
            .unwrap()
            .invoke(&[bound.clone(), JsValue::Undefined])
    };

    assert!(call(&denying_lookup()).unwrap_err().is_security_error());
    assert_eq!(call(&LookupContext::public()).unwrap(), JsValue::from("reflected"));
}

#[test]
fn test_super_adapter_of_restricted_class_is_denied() {
    let adapter = HostObject::new(reflective_class()).into_value();
    let sup = create_super_adapter(&adapter).unwrap();

    let denied = site_args(&denying_lookup(), "GET:METHOD:invoke", &[sup.clone()]);
    assert!(denied.unwrap_err().is_security_error());

    let lookup = LookupContext::public();
    let invoke = site_args(&lookup, "GET:METHOD:invoke", &[sup]).unwrap();
    let call = bootstrap(&lookup, "CALL", MethodSignature::generic(2), 0).unwrap();
    assert_eq!(call.invoke(&[invoke, JsValue::Undefined]).unwrap(), JsValue::from("reflected"));
}

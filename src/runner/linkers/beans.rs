use std::sync::Arc;

use crate::runner::callable::{call_dynamic_method, invoke_host};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::host::{DynamicMethod, HostClass, HostMethod};
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::{OperationDescriptor, OperationKind};
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, Guard, GuardedInvocation, Invocation};
use crate::runner::linker::missing_member::link_missing_member;
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::StaticType;

/// Host objects and host method references, linked through their class.
///
/// Bean properties win over methods for GET:PROPERTY and GET:ELEMENT;
/// methods win for GET:METHOD. Absent members go to the missing-member
/// policy unless the linker is the exposed variant, which declines instead.
pub struct BeansLinker {
    exposed: bool,
    only_class: Option<Arc<HostClass>>,
}

impl BeansLinker {
    pub fn new() -> Self {
        BeansLinker {
            exposed: false,
            only_class: None,
        }
    }

    /// The variant handed to native code: no missing-member synthesis.
    pub fn exposed() -> Self {
        BeansLinker {
            exposed: true,
            only_class: None,
        }
    }

    /// Links only receivers of exactly `class`.
    pub fn for_class(class: Arc<HostClass>) -> Self {
        BeansLinker {
            exposed: false,
            only_class: Some(class),
        }
    }

    fn missing(&self, request: &LinkRequest) -> Result<Option<GuardedInvocation>, JErrorType> {
        if self.exposed {
            Ok(None)
        } else {
            Ok(link_missing_member(request))
        }
    }

    fn link_host_object(
        &self,
        class: &Arc<HostClass>,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let descriptor = request.descriptor().clone();
        let name = descriptor.name().map(|n| n.to_string());
        let invocation = match (descriptor.operation(), name.as_deref()) {
            (OperationKind::Call, _) => {
                let method = match class.functional_method_name().and_then(|m| class.find_method(m)) {
                    Some(m) => m.clone(),
                    None => return self.missing(request),
                };
                let ret = method.signature().ret().clone();
                Invocation::new(request.generic_signature(ret), move |args| {
                    invoke_host(&method, argument(args, 0), descriptor.call_arguments(args))
                })
            }
            (OperationKind::New, _) => return self.missing(request),
            (op, Some(name)) if op.is_get() => {
                match find_member(class, name, op == OperationKind::GetMethod) {
                    Some(Member::Property(getter)) => {
                        let ret = getter.signature().ret().clone();
                        Invocation::new(request.generic_signature(ret), move |args| {
                            getter.call(argument(args, 0), vec![])
                        })
                    }
                    Some(Member::Method) => Invocation::constant(
                        request.generic_signature(StaticType::Object),
                        DynamicMethod::new(class.clone(), name, false).into_value(),
                    ),
                    None => return self.missing(request),
                }
            }
            (op, Some(name)) => match class.find_property(name).and_then(|p| p.setter()) {
                Some(setter) if op.is_set() => {
                    let setter = setter.clone();
                    let ret = setter.signature().ret().clone();
                    Invocation::new(request.generic_signature(ret), move |args| {
                        invoke_host(
                            &setter,
                            argument(args, 0),
                            vec![descriptor.member_value(args).clone()],
                        )
                    })
                }
                _ => return self.missing(request),
            },
            (_, None) => {
                let class = class.clone();
                Invocation::new(request.generic_signature(StaticType::Object), move |args| {
                    dynamic_member(&class, &descriptor, args)
                })
            }
        };
        Ok(Some(GuardedInvocation::guarded(
            services.filter_internal_objects(invocation),
            Guard::receiver_type(request.receiver()),
        )))
    }

    fn link_dynamic_method(
        &self,
        method: &DynamicMethod,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let descriptor = request.descriptor().clone();
        if descriptor.operation() != OperationKind::Call {
            return self.missing(request);
        }
        // The declared return type only holds while the callee is fixed.
        let (ret, guard) = match (request.is_call_site_unstable(), method.method()) {
            (false, Some(m)) => (
                m.signature().ret().clone(),
                Guard::receiver_identity(request.receiver()),
            ),
            _ => (StaticType::Object, Guard::receiver_type(request.receiver())),
        };
        let invocation = Invocation::new(request.generic_signature(ret), move |args| {
            match argument(args, 0).as_object() {
                Some(ObjectType::DynamicMethod(m)) => call_dynamic_method(
                    m,
                    descriptor.call_receiver(args),
                    descriptor.call_arguments(args),
                ),
                _ => Err(JErrorType::not_a_function(&safe_to_string(argument(args, 0)))),
            }
        });
        Ok(Some(GuardedInvocation::guarded(
            services.filter_internal_objects(invocation),
            guard,
        )))
    }
}

impl Default for BeansLinker {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardingLinker for BeansLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        let class = match receiver.as_object() {
            Some(ObjectType::Host(h)) => h.class(),
            Some(ObjectType::DynamicMethod(m)) => m.class(),
            _ => return false,
        };
        match &self.only_class {
            Some(only) => Arc::ptr_eq(only, class),
            None => true,
        }
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        match request.receiver().as_object() {
            Some(ObjectType::Host(h)) => self.link_host_object(h.class(), request, services),
            Some(ObjectType::DynamicMethod(m)) => self.link_dynamic_method(m, request, services),
            _ => Ok(None),
        }
    }

    fn name(&self) -> &str {
        match (&self.only_class, self.exposed) {
            (Some(_), _) => "BeansLinker(class)",
            (None, true) => "BeansLinker(exposed)",
            (None, false) => "BeansLinker",
        }
    }
}

enum Member {
    Property(HostMethod),
    Method,
}

fn find_member(class: &HostClass, name: &str, prefer_method: bool) -> Option<Member> {
    let property = || class.find_property(name).map(|p| Member::Property(p.getter().clone()));
    let method = || class.find_method(name).map(|_| Member::Method);
    if prefer_method {
        method().or_else(property)
    } else {
        property().or_else(method)
    }
}

/// GET or SET with the key taken from the arguments.
fn dynamic_member(
    class: &Arc<HostClass>,
    descriptor: &OperationDescriptor,
    args: &[JsValue],
) -> Result<JsValue, JErrorType> {
    let key = descriptor.member_key(args)?;
    let receiver = argument(args, 0);
    if descriptor.operation().is_set() {
        if let Some(setter) = class.find_property(&key).and_then(|p| p.setter()) {
            invoke_host(setter, receiver, vec![descriptor.member_value(args).clone()])?;
        }
        return Ok(JsValue::Undefined);
    }
    match find_member(class, &key, descriptor.operation() == OperationKind::GetMethod) {
        Some(Member::Property(getter)) => getter.call(receiver, vec![]),
        Some(Member::Method) => Ok(DynamicMethod::new(class.clone(), key, false).into_value()),
        None => Ok(JsValue::Undefined),
    }
}

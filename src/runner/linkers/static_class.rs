use std::sync::Arc;

use crate::runner::callable::invoke_host;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::host::{DynamicMethod, HostClass};
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, Guard, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::StaticType;

use super::callable_invocation;

/// References to host types: construction and static members.
pub struct StaticClassLinker;

impl GuardingLinker for StaticClassLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        matches!(receiver.as_object(), Some(ObjectType::StaticClass(_)))
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let class = match request.receiver().as_object() {
            Some(ObjectType::StaticClass(c)) => c.class().clone(),
            _ => return Ok(None),
        };
        let descriptor = request.descriptor().clone();
        let guard = same_class(class.clone());
        let invocation = match descriptor.operation() {
            OperationKind::New | OperationKind::Call => {
                services.filter_internal_objects(callable_invocation(request))
            }
            OperationKind::GetProperty | OperationKind::GetElement | OperationKind::GetMethod => {
                match descriptor.name() {
                    Some(name) => match class.find_static_property(name) {
                        Some(property) => {
                            let getter = property.getter().clone();
                            Invocation::new(
                                request.generic_signature(getter.signature().ret().clone()),
                                move |_| getter.call(&JsValue::Undefined, vec![]),
                            )
                        }
                        None if class.find_static_method(name).is_some() => Invocation::constant(
                            request.generic_signature(StaticType::Object),
                            DynamicMethod::new(class.clone(), name, true).into_value(),
                        ),
                        None => return Ok(None),
                    },
                    None => Invocation::new(
                        request.generic_signature(StaticType::Object),
                        move |args| {
                            let key = descriptor.member_key(args)?;
                            static_member(&class, &key)
                        },
                    ),
                }
            }
            OperationKind::SetProperty | OperationKind::SetElement => {
                let setter = match descriptor
                    .name()
                    .and_then(|n| class.find_static_property(n))
                    .and_then(|p| p.setter())
                {
                    Some(s) => s.clone(),
                    None => return Ok(None),
                };
                Invocation::new(request.generic_signature(StaticType::Object), move |args| {
                    invoke_host(
                        &setter,
                        &JsValue::Undefined,
                        vec![descriptor.member_value(args).clone()],
                    )?;
                    Ok(JsValue::Undefined)
                })
            }
        };
        Ok(Some(GuardedInvocation::guarded(invocation, guard)))
    }

    fn name(&self) -> &str {
        "StaticClassLinker"
    }
}

/// Any reference to exactly `class`.
fn same_class(class: Arc<HostClass>) -> Guard {
    Guard::predicate(move |args| match argument(args, 0).as_object() {
        Some(ObjectType::StaticClass(c)) => Arc::ptr_eq(c.class(), &class),
        _ => false,
    })
}

fn static_member(class: &Arc<HostClass>, key: &str) -> Result<JsValue, JErrorType> {
    if let Some(property) = class.find_static_property(key) {
        return property.getter().call(&JsValue::Undefined, vec![]);
    }
    if class.find_static_method(key).is_some() {
        return Ok(DynamicMethod::new(class.clone(), key, true).into_value());
    }
    Ok(JsValue::Undefined)
}

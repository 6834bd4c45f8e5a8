use crate::runner::ds::error::JErrorType;
use crate::runner::ds::foreign::{BridgeKind, ForeignObject};
use crate::runner::ds::object::ObjectType;
use crate::runner::ds::value::JsValue;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::guarding::GuardingLinker;
use crate::runner::linker::invocation::{argument, Guard, GuardedInvocation, Invocation};
use crate::runner::linker::request::LinkRequest;
use crate::runner::linker::services::LinkerServices;
use crate::runner::linker::signature::StaticType;

use super::array_index;

/// Every operation on a foreign object of one bridge kind, forwarded through
/// the bridge. Foreign objects answer for their own missing members.
pub struct ForeignObjectLinker {
    kind: BridgeKind,
}

impl ForeignObjectLinker {
    pub fn new(kind: BridgeKind) -> Self {
        ForeignObjectLinker { kind }
    }
}

impl GuardingLinker for ForeignObjectLinker {
    fn can_link_type(&self, receiver: &JsValue) -> bool {
        match receiver.as_object() {
            Some(ObjectType::Foreign(f)) => f.bridge_kind() == self.kind,
            _ => false,
        }
    }

    fn get_guarded_invocation(
        &self,
        request: &LinkRequest,
        _services: &LinkerServices,
    ) -> Result<Option<GuardedInvocation>, JErrorType> {
        let descriptor = request.descriptor().clone();
        let signature = request.generic_signature(StaticType::Object);
        let invocation = match descriptor.operation() {
            OperationKind::GetProperty | OperationKind::GetElement | OperationKind::GetMethod => {
                Invocation::new(signature, move |args| {
                    let key = descriptor.member_key(args)?;
                    let f = bridge(argument(args, 0))?;
                    match array_index(&key) {
                        Some(i) => f.get_slot(i),
                        None => f.get_member(&key),
                    }
                })
            }
            OperationKind::SetProperty | OperationKind::SetElement => {
                Invocation::new(signature, move |args| {
                    let key = descriptor.member_key(args)?;
                    let value = descriptor.member_value(args).clone();
                    let f = bridge(argument(args, 0))?;
                    match array_index(&key) {
                        Some(i) => f.set_slot(i, value)?,
                        None => f.set_member(&key, value)?,
                    }
                    Ok(JsValue::Undefined)
                })
            }
            OperationKind::Call => Invocation::new(signature, move |args| {
                bridge(argument(args, 0))?.call(
                    descriptor.call_receiver(args).clone(),
                    descriptor.call_arguments(args),
                )
            }),
            OperationKind::New => Invocation::new(signature, move |args| {
                bridge(argument(args, 0))?.new_object(descriptor.call_arguments(args))
            }),
        };
        Ok(Some(GuardedInvocation::guarded(
            invocation,
            Guard::receiver_type(request.receiver()),
        )))
    }

    fn name(&self) -> &str {
        match self.kind {
            BridgeKind::Generic => "ForeignObjectLinker(Generic)",
            BridgeKind::Browser => "ForeignObjectLinker(Browser)",
        }
    }
}

fn bridge(v: &JsValue) -> Result<&dyn ForeignObject, JErrorType> {
    match v.as_object() {
        Some(ObjectType::Foreign(f)) => Ok(&**f),
        _ => Err(JErrorType::TypeError(format!("{} is not a foreign object", v))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::RwLock;

    use super::*;
    use crate::runner::environment::PermitAll;
    use crate::runner::linker::descriptor::OperationDescriptor;
    use crate::runner::linker::signature::MethodSignature;

    #[derive(Default)]
    struct Document {
        members: RwLock<HashMap<String, JsValue>>,
        slots: RwLock<Vec<JsValue>>,
    }

    impl ForeignObject for Document {
        fn class_name(&self) -> String {
            "Document".to_string()
        }
        fn bridge_kind(&self) -> BridgeKind {
            BridgeKind::Browser
        }
        fn get_member(&self, name: &str) -> Result<JsValue, JErrorType> {
            Ok(self.members.read().get(name).cloned().unwrap_or(JsValue::Null))
        }
        fn set_member(&self, name: &str, value: JsValue) -> Result<(), JErrorType> {
            self.members.write().insert(name.to_string(), value);
            Ok(())
        }
        fn has_member(&self, name: &str) -> bool {
            self.members.read().contains_key(name)
        }
        fn get_slot(&self, index: i64) -> Result<JsValue, JErrorType> {
            Ok(self.slots.read().get(index as usize).cloned().unwrap_or(JsValue::Null))
        }
        fn set_slot(&self, index: i64, value: JsValue) -> Result<(), JErrorType> {
            let mut slots = self.slots.write();
            if slots.len() <= index as usize {
                slots.resize(index as usize + 1, JsValue::Null);
            }
            slots[index as usize] = value;
            Ok(())
        }
    }

    fn link(linker: &ForeignObjectLinker, encoding: &str, args: &[JsValue]) -> GuardedInvocation {
        let d = Arc::new(
            OperationDescriptor::parse(encoding, MethodSignature::generic(args.len()), 0).unwrap(),
        );
        linker
            .get_guarded_invocation(
                &LinkRequest::new(d, args),
                &LinkerServices::new(Arc::new(PermitAll), true),
            )
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_only_matching_bridge_kind_is_linked() {
        let doc = JsValue::new_object(ObjectType::Foreign(Box::new(Document::default())));
        assert!(ForeignObjectLinker::new(BridgeKind::Browser).can_link_type(&doc));
        assert!(!ForeignObjectLinker::new(BridgeKind::Generic).can_link_type(&doc));
    }

    #[test]
    fn test_members_and_slots_go_through_bridge() {
        let linker = ForeignObjectLinker::new(BridgeKind::Browser);
        let doc = JsValue::new_object(ObjectType::Foreign(Box::new(Document::default())));

        let set = [doc.clone(), JsValue::from("Title")];
        link(&linker, "SET:PROPERTY:title", &set).invocation().invoke(&set).unwrap();
        let set = [doc.clone(), JsValue::from(2), JsValue::from("third")];
        link(&linker, "SET:ELEMENT", &set).invocation().invoke(&set).unwrap();

        let get = [doc.clone()];
        let gi = link(&linker, "GET:PROPERTY:title", &get);
        assert_eq!(gi.invocation().invoke(&get).unwrap(), JsValue::from("Title"));
        let get = [doc.clone(), JsValue::from("2")];
        let gi = link(&linker, "GET:ELEMENT", &get);
        assert_eq!(gi.invocation().invoke(&get).unwrap(), JsValue::from("third"));

        // Missing members are the bridge's business.
        let get = [doc.clone()];
        let gi = link(&linker, "GET:PROPERTY:body", &get);
        assert_eq!(gi.invocation().invoke(&get).unwrap(), JsValue::Null);
    }

    #[test]
    fn test_calling_non_function_reports_class() {
        let linker = ForeignObjectLinker::new(BridgeKind::Browser);
        let doc = JsValue::new_object(ObjectType::Foreign(Box::new(Document::default())));
        let args = [doc, JsValue::Undefined];
        let gi = link(&linker, "CALL", &args);
        assert_eq!(
            gi.invocation().invoke(&args).unwrap_err(),
            JErrorType::not_a_function("Document")
        );
    }
}

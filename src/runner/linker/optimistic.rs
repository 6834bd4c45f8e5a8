//! Return filter for optimistic call sites.
//!
//! An optimistic call site was compiled assuming its result fits a narrow
//! numeric type. When a result does not fit, the invocation fails with
//! [`JErrorType::UnwarrantedOptimism`] carrying the value and the program
//! point, and the code generator recompiles the site pessimistically.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::safe_to_string;
use crate::runner::ds::value::{JsNumberType, JsValue};
use crate::runner::linker::descriptor::OperationDescriptor;
use crate::runner::linker::invocation::GuardedInvocation;
use crate::runner::linker::signature::StaticType;

/// Applies the optimistic check when `descriptor` is optimistic and returns
/// `int`, `long` or `double`. The candidate's return slot becomes that type.
pub fn filter_optimistic_return_value(
    candidate: GuardedInvocation,
    descriptor: &OperationDescriptor,
) -> GuardedInvocation {
    let flags = descriptor.flags();
    if !flags.is_optimistic() {
        return candidate;
    }
    let ret = descriptor.signature().ret().clone();
    if !matches!(ret, StaticType::Int | StaticType::Long | StaticType::Double) {
        return candidate;
    }
    let program_point = flags.program_point();
    let to = ret.clone();
    candidate.map_invocation(move |inv| {
        inv.filter_return(ret, move |v| ensure_representable(v, &to, program_point))
    })
}

fn ensure_representable(
    v: JsValue,
    to: &StaticType,
    program_point: u32,
) -> Result<JsValue, JErrorType> {
    let fits = match (&v, to) {
        (JsValue::Number(JsNumberType::Integer(i)), StaticType::Int) => {
            *i >= i32::MIN as i64 && *i <= i32::MAX as i64
        }
        (JsValue::Number(JsNumberType::Integer(_)), StaticType::Long) => true,
        (JsValue::Number(_), StaticType::Double) => true,
        _ => false,
    };
    if fits {
        Ok(v)
    } else {
        Err(JErrorType::UnwarrantedOptimism {
            value: safe_to_string(&v),
            program_point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::linker::descriptor::CallSiteFlags;
    use crate::runner::linker::invocation::{argument, Invocation};
    use crate::runner::linker::signature::MethodSignature;

    fn echo() -> GuardedInvocation {
        GuardedInvocation::new(
            Invocation::new(MethodSignature::generic(2), |args| Ok(argument(args, 1).clone())),
            None,
        )
    }

    fn descriptor(ret: StaticType, flags: u32) -> OperationDescriptor {
        OperationDescriptor::parse(
            "GET:ELEMENT",
            MethodSignature::new(vec![StaticType::Object, StaticType::Object], ret),
            flags,
        )
        .unwrap()
    }

    #[test]
    fn test_int_site_rejects_fractions_and_strings() {
        let flags = CallSiteFlags::new(CallSiteFlags::OPTIMISTIC).with_program_point(17).bits();
        let gi = filter_optimistic_return_value(echo(), &descriptor(StaticType::Int, flags));
        assert_eq!(gi.invocation().signature().ret(), &StaticType::Int);
        let inv = gi.invocation();
        assert_eq!(inv.invoke(&[JsValue::Null, JsValue::from(3)]).unwrap(), JsValue::from(3));
        assert_eq!(
            inv.invoke(&[JsValue::Null, JsValue::float(1.5)]).unwrap_err(),
            JErrorType::UnwarrantedOptimism {
                value: "1.5".to_string(),
                program_point: 17
            }
        );
        assert!(inv.invoke(&[JsValue::Null, JsValue::int(1 << 40)]).is_err());
        assert!(inv.invoke(&[JsValue::Null, JsValue::from("3")]).is_err());
    }

    #[test]
    fn test_non_optimistic_sites_are_untouched() {
        let gi = filter_optimistic_return_value(echo(), &descriptor(StaticType::Int, 0));
        assert_eq!(gi.invocation().signature().ret(), &StaticType::Object);
        let gi = filter_optimistic_return_value(
            echo(),
            &descriptor(StaticType::Object, CallSiteFlags::OPTIMISTIC),
        );
        assert_eq!(gi.invocation().signature().ret(), &StaticType::Object);
    }
}

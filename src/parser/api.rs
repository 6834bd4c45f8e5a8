use pest::error::Error;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::name_codec;
use crate::runner::ds::error::JErrorType;
use crate::runner::linker::descriptor::OperationKind;
use crate::runner::linker::signature::{MethodSignature, StaticType};

#[derive(Parser)]
#[grammar = "parser/descriptor.pest"] // relative to src
pub struct DescriptorParser;

const TAB_WIDTH: usize = 2;

/// Renders the parse tree of an operation descriptor encoding.
pub fn parse_to_token_tree(encoding: &str) -> Result<String, String> {
    let mut tree = vec![];
    match DescriptorParser::parse(Rule::descriptor, encoding) {
        Ok(pairs) => {
            for pair in pairs {
                tree.push(pair_to_string(pair, 0).join("\n"));
            }
        }
        Err(rule) => {
            return Err(format!("Parse error due to {:?}", rule));
        }
    }
    Ok(tree.join("\n"))
}

fn pair_to_string(pair: Pair<Rule>, level: usize) -> Vec<String> {
    let mut tree = vec![];
    let span = pair.as_span();
    let rule_name = format!(
        "{:?} => ({},{}) #{:?}",
        pair.as_rule(),
        span.start(),
        span.end(),
        span.as_str()
    );
    let string_pads = " ".repeat(level * TAB_WIDTH);
    tree.push(format!("{}{}", string_pads, rule_name));
    for child_pair in pair.into_inner() {
        tree.append(pair_to_string(child_pair, level + 1).as_mut());
    }
    tree
}

fn syntax_error(input: &str, e: Error<Rule>) -> JErrorType {
    JErrorType::SyntaxError(format!("Malformed {:?}: {}", input, e))
}

fn first_inner<'i>(pair: Pair<'i, Rule>) -> Result<Pair<'i, Rule>, JErrorType> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| JErrorType::SyntaxError(format!("Empty {:?}", rule)))
}

/// Parses `GET:PROPERTY:name`-style encodings. The member name comes back decoded.
pub fn parse_operation(encoding: &str) -> Result<(OperationKind, Option<String>), JErrorType> {
    let descriptor = DescriptorParser::parse(Rule::descriptor, encoding)
        .map_err(|e| syntax_error(encoding, e))?
        .next()
        .ok_or_else(|| JErrorType::SyntaxError(format!("Malformed {:?}", encoding)))?;
    let mut operation = None;
    let mut name = None;
    for pair in descriptor.into_inner() {
        match pair.as_rule() {
            Rule::operation => operation = Some(operation_kind(pair)?),
            Rule::member_name => name = Some(name_codec::decode(pair.as_str())),
            _ => {}
        }
    }
    match operation {
        Some(op) => Ok((op, name)),
        None => Err(JErrorType::SyntaxError(format!(
            "Malformed {:?}: missing operation",
            encoding
        ))),
    }
}

fn operation_kind(pair: Pair<Rule>) -> Result<OperationKind, JErrorType> {
    let inner = first_inner(pair)?;
    match inner.as_rule() {
        Rule::get_operation => match first_inner(inner)?.as_str() {
            "PROPERTY" => Ok(OperationKind::GetProperty),
            "ELEMENT" => Ok(OperationKind::GetElement),
            _ => Ok(OperationKind::GetMethod),
        },
        Rule::set_operation => match first_inner(inner)?.as_str() {
            "PROPERTY" => Ok(OperationKind::SetProperty),
            _ => Ok(OperationKind::SetElement),
        },
        Rule::call_operation => Ok(OperationKind::Call),
        Rule::new_operation => Ok(OperationKind::New),
        r => Err(JErrorType::SyntaxError(format!("Unexpected {:?}", r))),
    }
}

/// Parses `(Object,int)Boolean`-style static signatures.
pub fn parse_signature(input: &str) -> Result<MethodSignature, JErrorType> {
    let signature = DescriptorParser::parse(Rule::signature, input)
        .map_err(|e| syntax_error(input, e))?
        .next()
        .ok_or_else(|| JErrorType::SyntaxError(format!("Malformed {:?}", input)))?;
    let mut params = vec![];
    let mut ret = None;
    for pair in signature.into_inner() {
        match pair.as_rule() {
            Rule::parameter_list => {
                for p in pair.into_inner() {
                    params.push(static_type(p)?);
                }
            }
            Rule::static_type => ret = Some(static_type(pair)?),
            _ => {}
        }
    }
    match ret {
        Some(ret) => Ok(MethodSignature::new(params, ret)),
        None => Err(JErrorType::SyntaxError(format!(
            "Malformed {:?}: missing return type",
            input
        ))),
    }
}

fn static_type(pair: Pair<Rule>) -> Result<StaticType, JErrorType> {
    let inner = first_inner(pair)?;
    match inner.as_rule() {
        Rule::functional_type => Ok(StaticType::Functional(
            first_inner(inner)?.as_str().to_string(),
        )),
        _ => match inner.as_str() {
            "void" => Ok(StaticType::Void),
            "boolean" => Ok(StaticType::Boolean),
            "int" => Ok(StaticType::Int),
            "long" => Ok(StaticType::Long),
            "double" => Ok(StaticType::Double),
            "Boolean" => Ok(StaticType::BoxedBoolean),
            "Integer" => Ok(StaticType::BoxedInt),
            "Long" => Ok(StaticType::BoxedLong),
            "Double" => Ok(StaticType::BoxedDouble),
            "String" => Ok(StaticType::String),
            "Object" => Ok(StaticType::Object),
            other => Err(JErrorType::SyntaxError(format!(
                "Unknown static type {}",
                other
            ))),
        },
    }
}

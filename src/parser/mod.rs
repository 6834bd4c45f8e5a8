//! Grammar for operation descriptor encodings and static signatures.

mod api;
pub mod name_codec;

pub use api::{parse_operation, parse_signature, parse_to_token_tree, DescriptorParser};

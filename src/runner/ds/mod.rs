pub mod bound_callable;
pub mod error;
pub mod foreign;
pub mod function_object;
pub mod host;
pub mod object;
pub mod operations;
pub mod value;

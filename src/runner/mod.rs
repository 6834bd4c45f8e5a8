pub mod bootstrap;
pub mod callable;
pub mod ds;
pub mod environment;
pub mod linker;
pub mod linkers;

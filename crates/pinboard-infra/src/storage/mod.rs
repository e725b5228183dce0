//! Binary asset storage implementations.

mod local;

pub use local::LocalImageStore;

// Mark-Sweep Runtime
// An embeddable stop-the-world tracing collector with a bounded root stack

#[cfg(test)]
mod test;

pub mod gc;
pub mod runtime;

pub use gc::*;
pub use runtime::{GcError, GcOption, GcResult, RootStack, Runtime};

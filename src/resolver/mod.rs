//! The resolution engine: context bindings, condition evaluation, and the
//! recursive plan walk

mod context;
mod engine;

pub use context::Context;
pub use engine::{AtaDerivation, ResolvedAccounts, Resolver};

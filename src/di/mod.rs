mod dispatch;
mod key;
mod registry;
mod resolver;

pub use dispatch::{Constructor, Dispatch, Entry};
pub use key::{Instance, TypeKey};
pub use registry::OverrideRegistry;
pub use resolver::Resolver;

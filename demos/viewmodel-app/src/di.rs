//! Generated component.

use crate::platform::Context;

include!(concat!(env!("OUT_DIR"), "/di/tiny_di_component.rs"));

/// Component with the runtime bindings the application always needs.
pub fn component(context: Context) -> TinyDiComponent {
    let mut component = TinyDiComponent::new();
    component.bind_value(context);
    component
}

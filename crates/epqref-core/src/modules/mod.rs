pub mod atomic_shell;
pub mod element;
pub mod xray_transition;

pub use atomic_shell::{ATOMIC_SHELL_SCHEMA, AtomicShellRow};
pub use element::{ELEMENT_SCHEMA, ElementRow};
pub use xray_transition::{XRAY_TRANSITION_SCHEMA, XRayTransitionRow};

use crate::schema::SchemaRegistry;

/// Registry covering every dump module the reference oracle ships.
pub fn builtin_schema_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(ELEMENT_SCHEMA);
    registry.register(XRAY_TRANSITION_SCHEMA);
    registry.register(ATOMIC_SHELL_SCHEMA);
    registry
}

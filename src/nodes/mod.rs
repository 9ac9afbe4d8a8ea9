pub mod component;
pub mod events;
pub mod node;

pub use component::{define_component, Component};
pub use events::{Event, EventHandler, EventKind};
pub use node::{h, AttributeValue, Attributes, Children, Node, NodeKind};

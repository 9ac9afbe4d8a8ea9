use crate::result::VireoResult;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Click,
    /// Carries the new value of the input element
    Input(String),
    Custom(String),
}

impl Event {
    pub fn click() -> Self {
        Self {
            kind: EventKind::Click,
        }
    }

    pub fn input(value: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Input(value.into()),
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Custom(name.into()),
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Name used to look up the `on<name>` handler attribute
    pub fn name(&self) -> &str {
        match &self.kind {
            EventKind::Click => "click",
            EventKind::Input(_) => "input",
            EventKind::Custom(name) => name,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Input(value) => Some(value),
            _ => None,
        }
    }

    pub fn handler_attribute(&self) -> String {
        format!("on{}", self.name())
    }
}

/// Callback attached to a node as an attribute value
#[derive(Clone)]
pub struct EventHandler {
    function: Rc<dyn Fn(&Event) -> VireoResult<()>>,
}

impl EventHandler {
    pub fn new(function: impl Fn(&Event) -> VireoResult<()> + 'static) -> Self {
        Self {
            function: Rc::new(function),
        }
    }

    pub fn call(&self, event: &Event) -> VireoResult<()> {
        (self.function)(event)
    }
}

impl Debug for EventHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventHandler")
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.function, &other.function)
    }
}

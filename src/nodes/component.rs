use crate::nodes::node::{Attributes, Node};
use crate::result::{VireoErrorKind, VireoResult};
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

pub type ComponentFunction = dyn Fn(&Attributes) -> VireoResult<Node>;

/// A user-supplied function from attributes to a substitute node
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    function: Rc<ComponentFunction>,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        function: impl Fn(&Attributes) -> VireoResult<Node> + 'static,
    ) -> Self {
        let name: String = name.into();
        Self {
            name: Rc::from(name),
            function: Rc::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce the substitute node for `attributes`
    pub fn call(&self, attributes: &Attributes) -> VireoResult<Node> {
        (self.function)(attributes).map_err(|error| {
            error.change_kind(VireoErrorKind::Build(format!(
                "Failed to build component '{}'",
                self.name
            )))
        })
    }
}

impl Debug for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.function, &other.function)
    }
}

/// Compose a `setup` step deriving a context from the attributes with a
/// `render` step building the node from that context
pub fn define_component<C: 'static>(
    name: impl Into<String>,
    setup: impl Fn(&Attributes) -> VireoResult<C> + 'static,
    render: impl Fn(&C) -> VireoResult<Node> + 'static,
) -> Component {
    Component::new(name, move |attributes| {
        let context = setup(attributes)?;
        render(&context)
    })
}

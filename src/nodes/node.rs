use crate::nodes::component::Component;
use crate::nodes::events::{Event, EventHandler};
use crate::result::VireoResult;
use std::fmt::{Display, Formatter};

/// Description of one unit of output: an element or a component reference
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub children: Children,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(String),
    Component(Component),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Children {
    #[default]
    None,
    Text(String),
    Nodes(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Handler(EventHandler),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(text) => Some(text),
            AttributeValue::Handler(_) => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            AttributeValue::Handler(handler) => Some(handler),
            AttributeValue::Text(_) => None,
        }
    }
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Text(text) => write!(f, "{text}"),
            AttributeValue::Handler(_) => write!(f, "[handler]"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<EventHandler> for AttributeValue {
    fn from(handler: EventHandler) -> Self {
        Self::Handler(handler)
    }
}

/// Attribute map that keeps insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttributeValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace in place
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.set(name, value);
        }
        attributes
    }
}

impl From<&str> for NodeKind {
    fn from(tag: &str) -> Self {
        Self::Element(tag.to_string())
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        Self::Element(tag)
    }
}

impl From<Component> for NodeKind {
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<&str> for Children {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Children {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<Node>> for Children {
    fn from(nodes: Vec<Node>) -> Self {
        Self::Nodes(nodes)
    }
}

/// Construct a node; no validation is performed
pub fn h(
    kind: impl Into<NodeKind>,
    attributes: Option<Attributes>,
    children: impl Into<Children>,
) -> Node {
    Node {
        kind: kind.into(),
        attributes: attributes.unwrap_or_default(),
        children: children.into(),
    }
}

impl Node {
    pub fn element(tag: impl Into<String>) -> Self {
        h(NodeKind::Element(tag.into()), None, Children::None)
    }

    pub fn component(component: Component) -> Self {
        h(component, None, Children::None)
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Attach `handler` as the `on<event>` attribute
    pub fn on(
        self,
        event: &str,
        handler: impl Fn(&Event) -> VireoResult<()> + 'static,
    ) -> Self {
        self.attr(format!("on{event}"), EventHandler::new(handler))
    }

    /// Replace the children with a text payload
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children = Children::Text(text.into());
        self
    }

    /// Append a child; text children are replaced by the sequence
    pub fn child(mut self, child: Node) -> Self {
        match &mut self.children {
            Children::Nodes(nodes) => nodes.push(child),
            _ => self.children = Children::Nodes(vec![child]),
        }
        self
    }

    pub fn children(self, children: impl IntoIterator<Item = Node>) -> Self {
        children.into_iter().fold(self, Node::child)
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Component(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h_without_attributes() {
        let node = h("h1", None, "Title");
        assert_eq!(Some("h1"), node.tag());
        assert!(node.attributes.is_empty());
        assert_eq!(Children::Text("Title".to_string()), node.children);
    }

    #[test]
    fn test_h_with_children() {
        let node = h(
            "div",
            Some(Attributes::new().with("id", "app")),
            vec![h("span", None, "a"), h("span", None, "b")],
        );
        let Children::Nodes(children) = &node.children else {
            panic!("expected node children");
        };
        assert_eq!(2, children.len());
        assert_eq!(Some("app"), node.attributes.text("id"));
    }

    #[test]
    fn test_builder_matches_h() {
        let built = Node::element("ul")
            .attr("class", "list")
            .child(Node::element("li").text("one"))
            .children([Node::element("li").text("two")]);
        let constructed = h(
            "ul",
            Some([("class", "list")].into_iter().collect()),
            vec![h("li", None, "one"), h("li", None, "two")],
        );
        assert_eq!(constructed, built);
    }

    #[test]
    fn test_child_replaces_text() {
        let node = Node::element("p").text("gone").child(Node::element("b"));
        assert_eq!(Children::Nodes(vec![Node::element("b")]), node.children);
        let node = node.text("back");
        assert_eq!(Children::Text("back".to_string()), node.children);
    }

    #[test]
    fn test_attributes_keep_order_and_replace_in_place() {
        let mut attributes = Attributes::new();
        attributes.set("b", "1");
        attributes.set("a", "2");
        attributes.set("b", "3");
        let entries: Vec<(&str, String)> = attributes
            .iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();
        assert_eq!(vec![("b", "3".to_string()), ("a", "2".to_string())], entries);
        assert_eq!(2, attributes.len());
    }

    #[test]
    fn test_on_attaches_handler() {
        let node = Node::element("button").on("click", |_| Ok(()));
        let value = node.attributes.get("onclick").unwrap();
        assert!(value.as_handler().is_some());
        assert_eq!(None, value.as_text());
        assert_eq!("[handler]", value.to_string());
    }
}

use crate::nodes::node::{Children, Node, NodeKind};
use crate::render::surface::OutputSurface;
use crate::result::VireoResult;
use tracing::{trace, warn};

/// Materialize `node` and append it to `parent`
///
/// Rendering only appends: existing children of `parent` are left alone.
pub fn render<S: OutputSurface>(node: &Node, surface: &mut S, parent: &S::Handle) -> VireoResult<()> {
    match &node.kind {
        NodeKind::Element(tag) => {
            trace!("Rendering <{}>", tag);
            let element = surface.create_element(tag)?;
            let result = populate(node, surface, &element)
                .and_then(|()| surface.append_child(parent, &element));
            if let Err(error) = result {
                // The element never reached the tree, so nothing else frees it
                if let Err(remove_error) = surface.remove_element(&element) {
                    warn!("Failed to remove partially rendered <{}>: {:?}", tag, remove_error);
                }
                return Err(error);
            }
            Ok(())
        }
        NodeKind::Component(component) => {
            trace!("Rendering component {}", component.name());
            let substitute = component.call(&node.attributes)?;
            render(&substitute, surface, parent)
        }
    }
}

fn populate<S: OutputSurface>(node: &Node, surface: &mut S, element: &S::Handle) -> VireoResult<()> {
    for (name, value) in node.attributes.iter() {
        surface.set_attribute(element, name, value)?;
    }
    match &node.children {
        Children::None => Ok(()),
        Children::Text(text) => surface.set_text_content(element, text),
        Children::Nodes(children) => {
            for child in children {
                render(child, surface, element)?;
            }
            Ok(())
        }
    }
}

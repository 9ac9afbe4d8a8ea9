//! In-memory output surface.
//!
//! `DomTree` keeps its elements in a generational arena, so handles held
//! across a re-render fail cleanly instead of pointing at a reused slot.

use crate::arenal::{Arenal, Idx};
use crate::bail;
use crate::err;
use crate::nodes::events::EventHandler;
use crate::nodes::node::{AttributeValue, Attributes};
use crate::render::surface::OutputSurface;
use crate::result::VireoResult;
use itertools::Itertools;
use phf::phf_set;
use termtree::Tree;

static VOID_ELEMENTS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
};

pub type ElementIdx = Idx<DomElement>;

#[derive(Debug)]
pub struct DomElement {
    tag: String,
    attributes: Attributes,
    text: Option<String>,
    children: Vec<ElementIdx>,
    parent: Option<ElementIdx>,
}

impl DomElement {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Attributes::new(),
            text: None,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[ElementIdx] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementIdx> {
        self.parent
    }
}

pub struct DomTree {
    elements: Arenal<DomElement>,
    root: ElementIdx,
}

impl DomTree {
    pub fn new(root_tag: &str) -> Self {
        let mut elements = Arenal::new();
        let root = elements.insert(DomElement::new(root_tag));
        Self { elements, root }
    }

    pub fn root(&self) -> ElementIdx {
        self.root
    }

    /// Number of live elements, including the root and detached ones
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, idx: &ElementIdx) -> VireoResult<&DomElement> {
        self.elements
            .get(idx)
            .ok_or_else(|| err!(Render: "Stale element handle {:?}", idx))
    }

    fn element_mut(&mut self, idx: &ElementIdx) -> VireoResult<&mut DomElement> {
        self.elements
            .get_mut(idx)
            .ok_or_else(|| err!(Render: "Stale element handle {:?}", idx))
    }

    pub fn children(&self, idx: &ElementIdx) -> VireoResult<&[ElementIdx]> {
        Ok(self.element(idx)?.children())
    }

    /// Concatenated text of the element and all its descendants
    pub fn text_content(&self, idx: &ElementIdx) -> VireoResult<String> {
        let mut text = String::new();
        self.collect_text(idx, &mut text)?;
        Ok(text)
    }

    fn collect_text(&self, idx: &ElementIdx, text: &mut String) -> VireoResult<()> {
        let element = self.element(idx)?;
        if let Some(own_text) = &element.text {
            text.push_str(own_text);
        }
        for child in &element.children {
            self.collect_text(child, text)?;
        }
        Ok(())
    }

    /// Elements with the given tag, in document order
    pub fn find_by_tag(&self, tag: &str) -> Vec<ElementIdx> {
        let mut found = vec![];
        let mut todo = vec![self.root];
        while let Some(idx) = todo.pop() {
            let Some(element) = self.elements.get(&idx) else {
                continue;
            };
            if element.tag == tag {
                found.push(idx);
            }
            todo.extend(element.children.iter().rev());
        }
        found
    }

    /// The handler registered as the `on<event_name>` attribute, if any
    pub fn event_handler(
        &self,
        idx: &ElementIdx,
        event_name: &str,
    ) -> VireoResult<Option<EventHandler>> {
        let element = self.element(idx)?;
        Ok(element
            .attributes
            .get(&format!("on{event_name}"))
            .and_then(AttributeValue::as_handler)
            .cloned())
    }

    fn is_ancestor(&self, candidate: &ElementIdx, idx: &ElementIdx) -> bool {
        let mut current = Some(*idx);
        while let Some(current_idx) = current {
            if current_idx == *candidate {
                return true;
            }
            current = self.elements.get(&current_idx).and_then(|e| e.parent);
        }
        false
    }

    fn remove_subtree(&mut self, idx: &ElementIdx) {
        let mut todo = vec![*idx];
        while let Some(idx) = todo.pop() {
            if let Some(element) = self.elements.remove(&idx) {
                todo.extend(element.children);
            }
        }
    }

    pub fn to_html(&self) -> VireoResult<String> {
        self.outer_html(&self.root)
    }

    pub fn inner_html(&self, idx: &ElementIdx) -> VireoResult<String> {
        let element = self.element(idx)?;
        let mut html = element.text.as_deref().map(escape_text).unwrap_or_default();
        for child in &element.children {
            html += &self.outer_html(child)?;
        }
        Ok(html)
    }

    pub fn outer_html(&self, idx: &ElementIdx) -> VireoResult<String> {
        let element = self.element(idx)?;
        let attributes = element
            .attributes
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_text()
                    .map(|text| format!(" {}=\"{}\"", name, escape_attribute(text)))
            })
            .join("");
        let is_empty = element.text.is_none() && element.children.is_empty();
        if is_empty && VOID_ELEMENTS.contains(element.tag.as_str()) {
            return Ok(format!("<{}{}>", element.tag, attributes));
        }
        Ok(format!(
            "<{tag}{attributes}>{inner}</{tag}>",
            tag = element.tag,
            inner = self.inner_html(idx)?
        ))
    }

    /// Human readable dump of the tree, for debugging
    pub fn to_tree(&self) -> VireoResult<String> {
        Ok(format!("{}", self.element_to_tree(&self.root)?))
    }

    fn element_to_tree(&self, idx: &ElementIdx) -> VireoResult<Tree<String>> {
        let element = self.element(idx)?;
        let mut label = element.tag.clone();
        for (name, value) in element.attributes.iter() {
            label += &format!(" {name}={value}");
        }
        let mut tree = Tree::new(label);
        if let Some(text) = &element.text {
            tree.push(Tree::new(format!("{:?}", text)));
        }
        for child in &element.children {
            tree.push(self.element_to_tree(child)?);
        }
        Ok(tree)
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

impl OutputSurface for DomTree {
    type Handle = ElementIdx;

    fn create_element(&mut self, tag: &str) -> VireoResult<ElementIdx> {
        if tag.is_empty() {
            bail!(Render: "Cannot create element with empty tag");
        }
        Ok(self.elements.insert(DomElement::new(tag)))
    }

    fn set_attribute(
        &mut self,
        element: &ElementIdx,
        name: &str,
        value: &AttributeValue,
    ) -> VireoResult<()> {
        self.element_mut(element)?
            .attributes
            .set(name, value.clone());
        Ok(())
    }

    fn set_text_content(&mut self, element: &ElementIdx, text: &str) -> VireoResult<()> {
        let children = {
            let element = self.element_mut(element)?;
            element.text = Some(text.to_string());
            std::mem::take(&mut element.children)
        };
        for child in &children {
            self.remove_subtree(child);
        }
        Ok(())
    }

    fn append_child(&mut self, parent: &ElementIdx, child: &ElementIdx) -> VireoResult<()> {
        self.element(parent)?;
        if self.is_ancestor(child, parent) {
            bail!(Render: "Cannot append {:?} to its own descendant {:?}", child, parent);
        }
        let previous_parent = self.element_mut(child)?.parent.replace(*parent);
        if let Some(previous_parent) = previous_parent {
            if let Some(previous) = self.elements.get_mut(&previous_parent) {
                previous.children.retain(|idx| idx != child);
            }
        }
        self.element_mut(parent)?.children.push(*child);
        Ok(())
    }

    fn remove_element(&mut self, element: &ElementIdx) -> VireoResult<()> {
        if *element == self.root {
            bail!(Render: "Cannot remove the root element");
        }
        let parent = self.element(element)?.parent;
        if let Some(parent) = parent {
            if let Some(parent) = self.elements.get_mut(&parent) {
                parent.children.retain(|idx| idx != element);
            }
        }
        self.remove_subtree(element);
        Ok(())
    }

    fn clear_children(&mut self, element: &ElementIdx) -> VireoResult<()> {
        let children = {
            let element = self.element_mut(element)?;
            element.text = None;
            std::mem::take(&mut element.children)
        };
        for child in &children {
            self.remove_subtree(child);
        }
        Ok(())
    }
}

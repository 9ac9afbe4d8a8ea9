use crate::nodes::node::AttributeValue;
use crate::result::VireoResult;

/// A mutable output tree that rendering populates
///
/// Handles are only valid for the surface that created them.
pub trait OutputSurface {
    type Handle: Clone;

    fn create_element(&mut self, tag: &str) -> VireoResult<Self::Handle>;

    fn set_attribute(
        &mut self,
        element: &Self::Handle,
        name: &str,
        value: &AttributeValue,
    ) -> VireoResult<()>;

    /// Replace any existing text payload
    fn set_text_content(&mut self, element: &Self::Handle, text: &str) -> VireoResult<()>;

    fn append_child(&mut self, parent: &Self::Handle, child: &Self::Handle) -> VireoResult<()>;

    /// Remove every child of `element`, and their subtrees
    fn clear_children(&mut self, element: &Self::Handle) -> VireoResult<()>;

    /// Remove `element` and its subtree, detaching it from its parent
    fn remove_element(&mut self, element: &Self::Handle) -> VireoResult<()>;
}

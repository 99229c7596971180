use std::{fmt, hash::Hash};

mod document;
pub mod markup;

pub use document::{Document, NodeId, NodeKey, NodeRef};

/// The kind of a node, using the numeric codes of the DOM `nodeType` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentFragment = 11,
}

impl NodeType {
    pub fn from_raw(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Element),
            3 => Some(Self::Text),
            8 => Some(Self::Comment),
            9 => Some(Self::Document),
            11 => Some(Self::DocumentFragment),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Element => "element",
            NodeType::Text => "text",
            NodeType::Comment => "comment",
            NodeType::Document => "document",
            NodeType::DocumentFragment => "document fragment",
        };

        f.write_str(name)
    }
}

/// The subset of a host DOM the loading widget operates on.
///
/// Implemented by a handle to a node, such as a browser node reference or a node of the
/// headless [`Document`]. Cloning a handle must refer to the same node.
pub trait Node: Clone + fmt::Debug {
    /// Identity of a node. Distinct nodes never share an id.
    type Id: Copy + Eq + Hash + fmt::Debug;

    fn id(&self) -> Self::Id;

    fn node_type(&self) -> NodeType;

    /// Returns true if the node exposes a mutable class list
    fn has_class_list(&self) -> bool;

    fn contains_class(&self, class: &str) -> bool;

    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    fn has_attribute(&self, name: &str) -> bool;

    fn parent(&self) -> Option<Self>;

    fn children(&self) -> Vec<Self>;

    /// Detaches `child` from this node.
    ///
    /// Returns `false` if `child` was not a child of this node.
    fn remove_child(&self, child: &Self) -> bool;

    /// Adds the class if `force` is set, removes it otherwise
    fn toggle_class(&self, class: &str, force: bool) {
        if force {
            self.add_class(class)
        } else {
            self.remove_class(class)
        }
    }
}

/// Returns true if the node is an element which a widget can attach to
pub fn is_element<N: Node>(node: &N) -> bool {
    node.node_type() == NodeType::Element && node.has_class_list()
}

/// Returns all descendants of `root` which carry `attribute`, in document order.
///
/// `root` itself is not included.
pub fn query_all<N: Node>(root: &N, attribute: &str) -> Vec<N> {
    let mut found = Vec::new();
    let mut stack = root.children();
    stack.reverse();

    while let Some(node) = stack.pop() {
        if node.node_type() == NodeType::Element && node.has_attribute(attribute) {
            found.push(node.clone());
        }

        stack.extend(node.children().into_iter().rev());
    }

    found
}

/// Returns the first descendant of `root` which carries `attribute`
pub fn query<N: Node>(root: &N, attribute: &str) -> Option<N> {
    let mut stack = root.children();
    stack.reverse();

    while let Some(node) = stack.pop() {
        if node.node_type() == NodeType::Element && node.has_attribute(attribute) {
            return Some(node);
        }

        stack.extend(node.children().into_iter().rev());
    }

    None
}

use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use super::{
    markup::{self, Markup},
    Node, NodeType,
};
use crate::error::{Error, Result};

new_key_type! { pub struct NodeKey; }

#[derive(Debug)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element { .. } => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    fn classes(&self) -> Option<&Vec<String>> {
        match &self.kind {
            NodeKind::Element { classes, .. } => Some(classes),
            _ => None,
        }
    }

    fn classes_mut(&mut self) -> Option<&mut Vec<String>> {
        match &mut self.kind {
            NodeKind::Element { classes, .. } => Some(classes),
            _ => None,
        }
    }
}

/// Nodes are never freed, so a key handed out by the tree stays valid.
struct Tree {
    nodes: SlotMap<NodeKey, NodeData>,
    root: NodeKey,
    body: NodeKey,
}

impl Tree {
    fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData::new(NodeKind::Document));

        let mut tree = Self {
            nodes,
            root,
            body: root,
        };

        let html = tree.insert(element_kind("html", Vec::new()));
        let body = tree.insert(element_kind("body", Vec::new()));
        tree.attach(root, html);
        tree.attach(html, body);
        tree.body = body;

        tree
    }

    fn insert(&mut self, kind: NodeKind) -> NodeKey {
        self.nodes.insert(NodeData::new(kind))
    }

    fn detach(&mut self, child: NodeKey) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|&v| v != child);
        }
    }

    fn attach(&mut self, parent: NodeKey, child: NodeKey) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn is_ancestor(&self, ancestor: NodeKey, mut node: NodeKey) -> bool {
        loop {
            if node == ancestor {
                return true;
            }

            match self.nodes[node].parent {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn instantiate(&mut self, parent: NodeKey, markup: Vec<Markup>) {
        let mut pending = vec![(parent, markup.into_iter())];

        while let Some((parent, items)) = pending.last_mut() {
            let parent = *parent;
            let Some(item) = items.next() else {
                pending.pop();
                continue;
            };

            let key = match item {
                Markup::Element {
                    tag,
                    attributes,
                    children,
                } => {
                    let key = self.insert(element_kind(&tag, attributes));
                    pending.push((key, children.into_iter()));
                    key
                }
                Markup::Text(text) => self.insert(NodeKind::Text(text)),
                Markup::Comment(text) => self.insert(NodeKind::Comment(text)),
            };

            self.attach(parent, key);
        }
    }

    fn text_content(&self, key: NodeKey) -> String {
        let mut out = String::new();
        let mut stack = vec![key];

        while let Some(key) = stack.pop() {
            let node = &self.nodes[key];
            match &node.kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Comment(_) => {}
                NodeKind::Document | NodeKind::Element { .. } => {
                    stack.extend(node.children.iter().rev());
                }
            }
        }

        out
    }
}

/// Splits the `class` attribute out into the class list
fn element_kind(tag: &str, attributes: Vec<(String, String)>) -> NodeKind {
    let mut classes = Vec::new();
    let attributes = attributes
        .into_iter()
        .filter_map(|(name, value)| {
            if name == "class" {
                push_classes(&mut classes, &value);
                None
            } else {
                Some((name, value))
            }
        })
        .collect();

    NodeKind::Element {
        tag: tag.to_string(),
        attributes,
        classes,
    }
}

fn push_classes(classes: &mut Vec<String>, value: &str) {
    for class in value.split_whitespace() {
        if !classes.iter().any(|v| v == class) {
            classes.push(class.to_string());
        }
    }
}

/// An in-memory document.
///
/// Cloning the document yields another handle to the same tree.
#[derive(Clone)]
pub struct Document {
    tree: Arc<Mutex<Tree>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.tree.lock().nodes.len())
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree::new())),
        }
    }

    fn node(&self, key: NodeKey) -> NodeRef {
        NodeRef {
            document: self.clone(),
            key,
        }
    }

    /// Returns the document node
    pub fn root(&self) -> NodeRef {
        let root = self.tree.lock().root;
        self.node(root)
    }

    pub fn body(&self) -> NodeRef {
        let body = self.tree.lock().body;
        self.node(body)
    }

    pub fn create_element(&self, tag: &str) -> NodeRef {
        let key = self.tree.lock().insert(element_kind(tag, Vec::new()));
        self.node(key)
    }

    pub fn create_text_node(&self, text: &str) -> NodeRef {
        let key = self.tree.lock().insert(NodeKind::Text(text.to_string()));
        self.node(key)
    }

    pub fn create_comment(&self, text: &str) -> NodeRef {
        let key = self.tree.lock().insert(NodeKind::Comment(text.to_string()));
        self.node(key)
    }

    /// Returns the first connected element carrying `attribute`
    pub fn query_selector(&self, attribute: &str) -> Option<NodeRef> {
        super::query(&self.root(), attribute)
    }

    fn same(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of a node across all documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    document: usize,
    key: NodeKey,
}

/// Handle to a node of a [`Document`]
#[derive(Clone)]
pub struct NodeRef {
    document: Document,
    key: NodeKey,
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.document.tree.lock();
        let node = &tree.nodes[self.key];

        match &node.kind {
            NodeKind::Element { tag, classes, .. } => f
                .debug_struct("Element")
                .field("key", &self.key)
                .field("tag", tag)
                .field("classes", classes)
                .finish(),
            kind => f
                .debug_struct("Node")
                .field("key", &self.key)
                .field("kind", kind)
                .finish(),
        }
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.document.same(&other.document)
    }
}

impl Eq for NodeRef {}

impl NodeRef {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub fn tag_name(&self) -> Option<String> {
        match &self.document.tree.lock().nodes[self.key].kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let tree = self.document.tree.lock();
        match &tree.nodes[self.key].kind {
            NodeKind::Element { classes, .. } if name == "class" => {
                (!classes.is_empty()).then(|| classes.join(" "))
            }
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Sets an attribute of an element. Does nothing for other nodes.
    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut tree = self.document.tree.lock();
        if let NodeKind::Element {
            attributes,
            classes,
            ..
        } = &mut tree.nodes[self.key].kind
        {
            if name == "class" {
                classes.clear();
                push_classes(classes, value);
            } else if let Some((_, v)) = attributes.iter_mut().find(|(k, _)| k == name) {
                *v = value.to_string();
            } else {
                attributes.push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Appends `child`, moving it from its current parent
    pub fn append_child(&self, child: &NodeRef) -> Result<()> {
        if !self.document.same(&child.document) {
            return Err(Error::Hierarchy);
        }

        let mut tree = self.document.tree.lock();
        let can_hold = matches!(
            tree.nodes[self.key].kind,
            NodeKind::Document | NodeKind::Element { .. }
        );

        if !can_hold || tree.is_ancestor(child.key, self.key) {
            return Err(Error::Hierarchy);
        }

        tree.attach(self.key, child.key);
        Ok(())
    }

    /// Replaces the children of the node with the parsed `markup`.
    ///
    /// The node is left untouched if the markup is malformed.
    pub fn set_inner_html(&self, source: &str) -> Result<()> {
        let parsed = markup::parse(source)?;

        let mut tree = self.document.tree.lock();
        if !matches!(
            tree.nodes[self.key].kind,
            NodeKind::Document | NodeKind::Element { .. }
        ) {
            return Err(Error::Hierarchy);
        }

        for child in std::mem::take(&mut tree.nodes[self.key].children) {
            tree.nodes[child].parent = None;
        }

        tree.instantiate(self.key, parsed);
        Ok(())
    }

    pub fn text_content(&self) -> String {
        self.document.tree.lock().text_content(self.key)
    }

    /// Returns the data of a text or comment node
    pub fn node_value(&self) -> Option<String> {
        match &self.document.tree.lock().nodes[self.key].kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Returns true if the node is reachable from the document node
    pub fn is_connected(&self) -> bool {
        let tree = self.document.tree.lock();
        tree.is_ancestor(tree.root, self.key)
    }
}

impl Node for NodeRef {
    type Id = NodeId;

    fn id(&self) -> NodeId {
        NodeId {
            document: Arc::as_ptr(&self.document.tree) as usize,
            key: self.key,
        }
    }

    fn node_type(&self) -> NodeType {
        self.document.tree.lock().nodes[self.key].node_type()
    }

    fn has_class_list(&self) -> bool {
        self.document.tree.lock().nodes[self.key].classes().is_some()
    }

    fn contains_class(&self, class: &str) -> bool {
        self.document.tree.lock().nodes[self.key]
            .classes()
            .is_some_and(|classes| classes.iter().any(|v| v == class))
    }

    fn add_class(&self, class: &str) {
        if let Some(classes) = self.document.tree.lock().nodes[self.key].classes_mut() {
            push_classes(classes, class);
        }
    }

    fn remove_class(&self, class: &str) {
        if let Some(classes) = self.document.tree.lock().nodes[self.key].classes_mut() {
            classes.retain(|v| v != class);
        }
    }

    fn has_attribute(&self, name: &str) -> bool {
        match &self.document.tree.lock().nodes[self.key].kind {
            NodeKind::Element { classes, .. } if name == "class" => !classes.is_empty(),
            NodeKind::Element { attributes, .. } => attributes.iter().any(|(k, _)| k == name),
            _ => false,
        }
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.document.tree.lock().nodes[self.key].parent?;
        Some(self.document.node(parent))
    }

    fn children(&self) -> Vec<Self> {
        let children = self.document.tree.lock().nodes[self.key].children.clone();
        children
            .into_iter()
            .map(|key| self.document.node(key))
            .collect()
    }

    fn remove_child(&self, child: &Self) -> bool {
        if !self.document.same(&child.document) {
            return false;
        }

        let mut tree = self.document.tree.lock();
        if tree.nodes[child.key].parent != Some(self.key) {
            return false;
        }

        tree.detach(child.key);
        true
    }
}

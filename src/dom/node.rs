//! Arena-backed node tree.

/// Index of a node in its [`Tree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic document root
    Document,
    /// An element with a tag name and attributes
    Element,
    /// A text node
    Text,
    /// A comment (`<!-- ... -->`)
    Comment,
    /// A doctype declaration
    Doctype,
}

/// A single node in the tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node kind
    pub kind: NodeKind,
    /// Tag name (lowercased) for elements, empty otherwise
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
    /// Text content for text/comment/doctype nodes
    pub text: String,
    /// Child node ids in document order
    pub children: Vec<NodeId>,
    /// Parent node id (`None` for the root)
    pub parent: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            tag: String::new(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A document tree over an arena of nodes.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Create an empty tree with a document root.
    pub fn new() -> Self {
        let root = Node::new(NodeKind::Document);
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Borrow a node.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Borrow a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Create a new element node (not yet attached).
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Element);
        node.tag = tag.to_ascii_lowercase();
        self.push(node)
    }

    /// Create a new text node (not yet attached).
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Text);
        node.text = text.to_string();
        self.push(node)
    }

    /// Create a new comment node (not yet attached).
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Comment);
        node.text = text.to_string();
        self.push(node)
    }

    /// Create a new doctype node (not yet attached).
    pub fn create_doctype(&mut self, text: &str) -> NodeId {
        let mut node = Node::new(NodeKind::Doctype);
        node.text = text.to_string();
        self.push(node)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Append `child` to `parent`'s child list.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Parent of a node, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Attribute value of a node.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attr(name)
    }

    /// Set (or replace) an attribute on a node.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let node = &mut self.nodes[id.0];
        if let Some(entry) = node.attrs.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            node.attrs.push((name.to_string(), value.to_string()));
        }
    }

    /// Append a CSS declaration to a node's `style` attribute.
    pub fn append_style(&mut self, id: NodeId, declaration: &str) {
        let existing = self.attr(id, "style").unwrap_or("").to_string();
        let mut style = existing;
        if !style.is_empty() && !style.ends_with(';') {
            style.push(';');
        }
        style.push_str(declaration);
        self.set_attr(id, "style", &style);
    }

    /// All element ids in document (pre-) order.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(self.root, &mut out);
        out
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.nodes[id.0].kind == NodeKind::Element {
            out.push(id);
        }
        for &child in &self.nodes[id.0].children {
            self.collect_elements(child, out);
        }
    }

    /// Concatenated text of a node's descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        if node.kind == NodeKind::Text {
            out.push_str(&node.text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    /// Whether any descendant element's class attribute contains `token`.
    pub fn descendant_has_class(&self, id: NodeId, token: &str) -> bool {
        for &child in &self.nodes[id.0].children {
            let node = &self.nodes[child.0];
            if node.kind == NodeKind::Element {
                if let Some(class) = node.attr("class") {
                    if class.split_whitespace().any(|t| t == token) {
                        return true;
                    }
                }
            }
            if self.descendant_has_class(child, token) {
                return true;
            }
        }
        false
    }

    /// Serialize the tree back to markup.
    pub fn to_html(&self) -> String {
        super::serialize(self)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

//! Minimal in-process document tree.

use std::fmt;

use serde::Deserialize;

/// Index of a node inside a [`PageTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Nested page description, as loaded from JSON.
///
/// A bare string is a text node. An element may carry `text` as shorthand for
/// a single text child placed before its `children`.
///
/// ```json
/// {"tag": "body", "children": [
///   {"tag": "nav", "children": [{"tag": "p", "text": "Menu"}]},
///   {"tag": "p", "children": ["Plain text and ", {"tag": "a", "text": "a link"}]}
/// ]}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeDesc {
    Text(String),
    Element {
        tag: String,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        children: Vec<NodeDesc>,
    },
}

/// Arena of element and text nodes.
///
/// Detached nodes stay in the arena so stale [`NodeId`]s remain valid; they
/// are just no longer reachable from the root.
#[derive(Debug, Clone)]
pub struct PageTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl PageTree {
    /// Empty tree with a single root element.
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Element {
                    tag: root_tag.to_ascii_lowercase(),
                },
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let desc: NodeDesc = serde_json::from_str(json)?;
        Ok(Self::from_desc(&desc))
    }

    pub fn from_desc(desc: &NodeDesc) -> Self {
        match desc {
            NodeDesc::Text(text) => {
                let mut tree = Self::new("body");
                let root = tree.root();
                tree.append_text(root, text);
                tree
            }
            NodeDesc::Element {
                tag,
                text,
                children,
            } => {
                let mut tree = Self::new(tag);
                let root = tree.root();
                tree.append_content(root, text.as_deref(), children);
                tree
            }
        }
    }

    fn append_desc(&mut self, parent: NodeId, desc: &NodeDesc) {
        match desc {
            NodeDesc::Text(text) => {
                self.append_text(parent, text);
            }
            NodeDesc::Element {
                tag,
                text,
                children,
            } => {
                let id = self.append_element(parent, tag);
                self.append_content(id, text.as_deref(), children);
            }
        }
    }

    fn append_content(&mut self, id: NodeId, text: Option<&str>, children: &[NodeDesc]) {
        if let Some(text) = text {
            self.append_text(id, text);
        }
        for child in children {
            self.append_desc(id, child);
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
        )
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Element tag, lowercase. `None` for text nodes and unknown ids.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Strict descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every connected element in document order, root included.
    pub fn elements(&self) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|id| self.tag(*id).is_some())
            .collect()
    }

    /// `id` itself or its nearest ancestor whose tag satisfies `matches`.
    pub fn closest(&self, id: NodeId, matches: impl Fn(&str) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|node| self.tag(*node).is_some_and(&matches))
    }

    /// Concatenated text of `id` and everything below it.
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.nodes.get(id.0) else {
            return String::new();
        };
        if let NodeKind::Text(text) = &node.kind {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| match &self.nodes[d.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                NodeKind::Element { .. } => None,
            })
            .collect()
    }

    /// Replace the children of `id` with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        if let NodeKind::Text(_) = node.kind {
            self.nodes[id.0].kind = NodeKind::Text(text.to_string());
            return;
        }

        let old_children = std::mem::take(&mut self.nodes[id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        self.push(id, NodeKind::Text(text.to_string()));
    }

    /// Unlink `id` from its parent. The root cannot be detached.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
        self.nodes[id.0].parent = None;
    }

    /// Whether `id` is still reachable from the root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        if id.0 >= self.nodes.len() {
            return false;
        }
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }
}

use std::{fmt, iter};

use crate::lexer::Position;

/// A node of the path syntax tree.
///
/// Nodes form a left-leaning chain: the outermost access is the returned
/// node and each node owns the access that precedes it through `parent`.
///
/// Dropping, cloning, comparing and formatting walk the chain in a loop, so a
/// path of any length is handled in constant stack space.
///
/// # Examples
///
/// `a[0].b` parses to
///
/// ```text
/// Selector { name: "b", parent: Index { index: 0, parent: Selector { name: "a" } } }
/// ```
pub enum Node {
    /// Explicit `$` at the start of the path
    Root { pos: Position },

    /// Field access by name, `.name` or `['name']`
    Selector {
        pos: Position,
        parent: Option<Box<Node>>,
        name: String,
    },

    /// Element access by position, `[N]`
    Index {
        pos: Position,
        parent: Option<Box<Node>>,
        index: usize,
    },
}

impl Node {
    /// Position of the first character belonging to the node.
    pub fn pos(&self) -> Position {
        match self {
            Node::Root { pos } | Node::Selector { pos, .. } | Node::Index { pos, .. } => *pos,
        }
    }

    /// The node this access is applied to, if any.
    pub fn parent(&self) -> Option<&Node> {
        match self {
            Node::Root { .. } => None,
            Node::Selector { parent, .. } | Node::Index { parent, .. } => parent.as_deref(),
        }
    }

    /// This node followed by every node it is applied to, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Node> {
        iter::successors(Some(self), |node| node.parent())
    }

    fn take_parent(&mut self) -> Option<Box<Node>> {
        match self {
            Node::Root { .. } => None,
            Node::Selector { parent, .. } | Node::Index { parent, .. } => parent.take(),
        }
    }

    fn set_parent(&mut self, node: Node) {
        if let Node::Selector { parent, .. } | Node::Index { parent, .. } = self {
            *parent = Some(Box::new(node));
        }
    }

    /// Copy of this node alone, without its parent.
    fn detached(&self) -> Node {
        match self {
            Node::Root { pos } => Node::Root { pos: *pos },
            Node::Selector { pos, name, .. } => Node::Selector {
                pos: *pos,
                parent: None,
                name: name.clone(),
            },
            Node::Index { pos, index, .. } => Node::Index {
                pos: *pos,
                parent: None,
                index: *index,
            },
        }
    }

    fn same_link(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Root { pos: a }, Node::Root { pos: b }) => a == b,
            (
                Node::Selector { pos: a, name: x, .. },
                Node::Selector { pos: b, name: y, .. },
            ) => a == b && x == y,
            (
                Node::Index { pos: a, index: x, .. },
                Node::Index { pos: b, index: y, .. },
            ) => a == b && x == y,
            _ => false,
        }
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut next = self.take_parent();
        while let Some(mut node) = next {
            next = node.take_parent();
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let links: Vec<Node> = self.chain().map(Node::detached).collect();
        links
            .into_iter()
            .rev()
            .reduce(|parent, mut child| {
                child.set_parent(parent);
                child
            })
            .unwrap_or_else(|| self.detached())
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.chain();
        let mut right = other.chain();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a.same_link(b) => {}
                _ => return false,
            }
        }
    }
}

impl Eq for Node {}

/// One node printed without its parent.
struct Link<'a>(&'a Node);

impl fmt::Debug for Link<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Node::Root { pos } => f.debug_struct("Root").field("pos", pos).finish(),
            Node::Selector { pos, name, .. } => f
                .debug_struct("Selector")
                .field("pos", pos)
                .field("name", name)
                .finish(),
            Node::Index { pos, index, .. } => f
                .debug_struct("Index")
                .field("pos", pos)
                .field("index", index)
                .finish(),
        }
    }
}

// root first, the way the path reads
impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let links: Vec<Link<'_>> = self.chain().map(Link).collect();
        f.debug_list().entries(links.iter().rev()).finish()
    }
}

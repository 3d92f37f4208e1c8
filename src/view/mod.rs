//! View tree - the declarative render output of a component.
//!
//! A [`View`] is pure data describing structure, never side effects. It has
//! two independently addressable positions:
//! - `W`, the child-placeholder position ([`View::Child`]) - where a parent
//!   embeds a [`ComponentSlot`](crate::slot::ComponentSlot),
//! - `A`, the self-message position - messages attached to event bindings.
//!
//! [`View::map_slots`] rewrites the first position without touching the
//! second; [`View::map_messages`] does the opposite. The erasure boundary and
//! `hoist` are built on exactly these two maps.
//!
//! # Example
//!
//! ```ignore
//! use ember_ui::view::{EventKind, View, ViewNode, NodeKind};
//!
//! ViewNode::new(NodeKind::Column)
//!     .child(View::text("count: 3"))
//!     .child(
//!         ViewNode::new(NodeKind::Row)
//!             .on(EventKind::Press, Msg::Increment)
//!             .child(View::text("[+]"))
//!             .into(),
//!     )
//!     .into()
//! ```

use bitflags::bitflags;

// =============================================================================
// Node vocabulary
// =============================================================================

/// Layout direction of a container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Children stacked top to bottom.
    Column,
    /// Children laid out left to right.
    Row,
}

/// Event classes a node can bind messages to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Press,
    Submit,
    Change,
    FocusGained,
    FocusLost,
}

bitflags! {
    /// Behavior flags a node opts into.
    ///
    /// Combine with bitwise OR: `NodeFlags::FOCUSABLE | NodeFlags::SCROLLABLE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        const NONE       = 0;
        const FOCUSABLE  = 1 << 0;
        const SCROLLABLE = 1 << 1;
        const HIDDEN     = 1 << 2;
    }
}

/// One event binding: when `event` fires on the node, dispatch `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding<A> {
    pub event: EventKind,
    pub message: A,
}

// =============================================================================
// View
// =============================================================================

/// A render-tree fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<W, A> {
    /// A container with children, bindings, and flags.
    Node(ViewNode<W, A>),
    /// A run of text.
    Text(String),
    /// A child component mount point.
    Child(W),
}

/// A container node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNode<W, A> {
    pub kind: NodeKind,
    pub flags: NodeFlags,
    pub bindings: Vec<Binding<A>>,
    pub children: Vec<View<W, A>>,
}

impl<W, A> ViewNode<W, A> {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            flags: NodeFlags::NONE,
            bindings: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a child fragment.
    pub fn child(mut self, child: View<W, A>) -> Self {
        self.children.push(child);
        self
    }

    /// Bind `message` to `event` on this node.
    pub fn on(mut self, event: EventKind, message: A) -> Self {
        self.bindings.push(Binding { event, message });
        self
    }

    /// Set behavior flags.
    pub fn flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl<W, A> From<ViewNode<W, A>> for View<W, A> {
    fn from(node: ViewNode<W, A>) -> Self {
        View::Node(node)
    }
}

impl<W, A> View<W, A> {
    /// A text fragment.
    pub fn text(content: impl Into<String>) -> Self {
        View::Text(content.into())
    }

    /// A child mount point.
    pub fn child(slot: W) -> Self {
        View::Child(slot)
    }

    /// A column container with the given children.
    pub fn column(children: Vec<View<W, A>>) -> Self {
        let mut node = ViewNode::new(NodeKind::Column);
        node.children = children;
        View::Node(node)
    }

    /// A row container with the given children.
    pub fn row(children: Vec<View<W, A>>) -> Self {
        let mut node = ViewNode::new(NodeKind::Row);
        node.children = children;
        View::Node(node)
    }

    /// Map over every child placeholder, leaving messages untouched.
    pub fn map_slots<W2>(self, mut f: impl FnMut(W) -> W2) -> View<W2, A> {
        self.map_slots_with(&mut f)
    }

    fn map_slots_with<W2, F: FnMut(W) -> W2>(self, f: &mut F) -> View<W2, A> {
        match self {
            View::Node(node) => View::Node(ViewNode {
                kind: node.kind,
                flags: node.flags,
                bindings: node.bindings,
                children: node
                    .children
                    .into_iter()
                    .map(|child| child.map_slots_with(f))
                    .collect(),
            }),
            View::Text(text) => View::Text(text),
            View::Child(slot) => View::Child(f(slot)),
        }
    }

    /// Map over every bound message, leaving child placeholders untouched.
    pub fn map_messages<B>(self, f: impl Fn(A) -> B) -> View<W, B> {
        self.map_messages_with(&f)
    }

    fn map_messages_with<B, F: Fn(A) -> B>(self, f: &F) -> View<W, B> {
        match self {
            View::Node(node) => View::Node(ViewNode {
                kind: node.kind,
                flags: node.flags,
                bindings: node
                    .bindings
                    .into_iter()
                    .map(|binding| Binding {
                        event: binding.event,
                        message: f(binding.message),
                    })
                    .collect(),
                children: node
                    .children
                    .into_iter()
                    .map(|child| child.map_messages_with(f))
                    .collect(),
            }),
            View::Text(text) => View::Text(text),
            View::Child(slot) => View::Child(slot),
        }
    }

    /// Borrow every embedded child placeholder, in document order.
    ///
    /// Document order is depth-first, which is what gives siblings sharing an
    /// address scheme their parent-to-child delivery order.
    pub fn slots(&self) -> Vec<&W> {
        let mut out = Vec::new();
        self.collect_slots(&mut out);
        out
    }

    fn collect_slots<'a>(&'a self, out: &mut Vec<&'a W>) {
        match self {
            View::Node(node) => {
                for child in &node.children {
                    child.collect_slots(out);
                }
            }
            View::Text(_) => {}
            View::Child(slot) => out.push(slot),
        }
    }
}

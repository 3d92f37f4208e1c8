//! Slot addressing - symbolic names, ordering keys, and child-kind
//! declarations.
//!
//! A child mount point is addressed by a `(name, key)` pair. The name is the
//! symbolic label a [`SlotDef`] declares; the key distinguishes siblings of
//! the same kind (list items, tabs, ...). Keys are totally ordered so the
//! storage container can index and iterate them deterministically.

use std::fmt;

// =============================================================================
// SlotKey
// =============================================================================

/// A totally ordered slot key.
///
/// Variants order among themselves first (`Unit < Int < Str < Pair`), then by
/// value, which is exactly the derived order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    /// The only key of a singleton slot.
    Unit,
    Int(i64),
    Str(String),
    /// Compound key, ordered lexicographically.
    Pair(Box<SlotKey>, Box<SlotKey>),
}

impl From<()> for SlotKey {
    fn from(_: ()) -> Self {
        SlotKey::Unit
    }
}

impl From<i64> for SlotKey {
    fn from(value: i64) -> Self {
        SlotKey::Int(value)
    }
}

impl From<i32> for SlotKey {
    fn from(value: i32) -> Self {
        SlotKey::Int(value as i64)
    }
}

impl From<u32> for SlotKey {
    fn from(value: u32) -> Self {
        SlotKey::Int(value as i64)
    }
}

impl From<usize> for SlotKey {
    fn from(value: usize) -> Self {
        SlotKey::Int(value as i64)
    }
}

impl From<String> for SlotKey {
    fn from(value: String) -> Self {
        SlotKey::Str(value)
    }
}

impl From<&str> for SlotKey {
    fn from(value: &str) -> Self {
        SlotKey::Str(value.to_string())
    }
}

impl<K1: Into<SlotKey>, K2: Into<SlotKey>> From<(K1, K2)> for SlotKey {
    fn from((first, second): (K1, K2)) -> Self {
        SlotKey::Pair(Box::new(first.into()), Box::new(second.into()))
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Unit => f.write_str("()"),
            SlotKey::Int(value) => write!(f, "{value}"),
            SlotKey::Str(value) => write!(f, "{value:?}"),
            SlotKey::Pair(first, second) => write!(f, "({first}, {second})"),
        }
    }
}

// =============================================================================
// SlotAddress
// =============================================================================

/// One `(name, key)` address within a parent's slot set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotAddress {
    name: &'static str,
    key: SlotKey,
}

impl SlotAddress {
    pub fn new(name: &'static str, key: impl Into<SlotKey>) -> Self {
        Self {
            name,
            key: key.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key(&self) -> &SlotKey {
        &self.key
    }
}

impl fmt::Display for SlotAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.key)
    }
}

// =============================================================================
// SlotDef
// =============================================================================

/// Declares one child kind a parent may mount.
///
/// The def type itself is a zero-sized marker; its associated items tie the
/// symbolic name to exactly one (query, input, output) shape. Because
/// [`ComponentSlot::new`](crate::slot::ComponentSlot::new) is generic over
/// the def, mounting a component with the wrong types at a name is a
/// compile-time error rather than a runtime one.
///
/// # Example
///
/// ```ignore
/// struct ListItem;
///
/// impl SlotDef for ListItem {
///     const NAME: &'static str = "item";
///     type Key = usize;
///     type Query = ItemQuery;
///     type Input = ItemProps;
///     type Output = ItemEvent;
/// }
/// ```
pub trait SlotDef: 'static {
    /// Symbolic name of the mount point.
    const NAME: &'static str;
    /// Ordering key distinguishing siblings of this kind.
    type Key: Into<SlotKey>;
    /// Query algebra the parent may address to this child.
    type Query: 'static;
    /// Input the parent feeds the child on every re-render.
    type Input: Clone + 'static;
    /// Output messages the child emits to the parent.
    type Output: 'static;

    /// The full address for one key of this kind.
    fn address(key: Self::Key) -> SlotAddress {
        SlotAddress::new(Self::NAME, key)
    }
}

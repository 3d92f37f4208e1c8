//! # ember-ui
//!
//! Component model for a declarative terminal UI framework.
//!
//! This crate is the static heart of the framework: it describes what a
//! component *is* - state, rendering, message handling, child composition -
//! without running anything. The effectful interpreter that mounts trees,
//! dispatches events, and reconciles output lives outside this crate and
//! drives everything here through a small, uniform surface.
//!
//! ## Architecture
//!
//! ```text
//! ComponentSpec ──construct──▶ Component (state & messages hidden)
//!        │                         │
//!        │ render                  │ render (erased)
//!        ▼                         ▼
//! View<ComponentSlot, Msg>    View<ComponentSlot, OpaqueMessage>
//!                                  │
//!                                  │ get / pop / set per slot
//!                                  ▼
//!                        SlotContainer (uniform child storage)
//! ```
//!
//! Heterogeneous, strongly-typed components nest to arbitrary depth because
//! each layer hides its internals: a [`Component`] hides its state and
//! self-message types, a [`ComponentSlot`] hides its child's query, input,
//! and output types, and slot storage holds every child as the same
//! [`ChildHandle`] shape. [`Component::hoist`] retargets a whole tree from
//! one effect context to another by rewriting it, never by mutating it.
//!
//! ## Modules
//!
//! - [`types`] - Opaque tokens and the [`Evaluated`] event result
//! - [`view`] - The render-output tree with its two mappable positions
//! - [`component`] - The existential boundary, spec records, and hoist
//! - [`slot`] - Slot addressing, the slot capability bundle, child storage

pub mod component;
pub mod slot;
pub mod types;
pub mod view;

pub use component::{
    AnyComponent, AnyDriver, Component, ComponentSpec, Driver, ErasedView, LifecycleSpec,
};

pub use slot::{
    ChildHandle, ChildId, ComponentSlot, SlotAddress, SlotArena, SlotContainer, SlotDef, SlotKey,
    SlotSpec,
};

pub use types::{
    Evaluated, OpaqueInput, OpaqueMessage, OpaqueOutput, OpaqueQuery, OpaqueState,
};

pub use view::{Binding, EventKind, NodeFlags, NodeKind, View, ViewNode};

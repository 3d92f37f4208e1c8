//! Child storage - the uniform container of live child handles.
//!
//! A parent's mounted children all live in one container, keyed by
//! [`SlotAddress`]. The container only ever sees [`ChildHandle`]s - fully
//! erased components plus their state tokens - so heterogeneous children
//! store uniformly.
//!
//! Slot accessors talk to the [`SlotContainer`] trait, never to a concrete
//! backend, so interpreters can swap storage strategies without touching the
//! slot layer. [`SlotArena`] is the default backend: a slotmap arena for the
//! handles plus an ordered address index, which also gives deterministic
//! parent-to-child iteration order for siblings.

use std::any::TypeId;
use std::collections::BTreeMap;

use slotmap::{SlotMap, new_key_type};

use crate::component::AnyComponent;
use crate::slot::address::{SlotAddress, SlotDef};
use crate::types::OpaqueState;

new_key_type! {
    /// Stable handle for a mounted child within one arena.
    pub struct ChildId;
}

// =============================================================================
// ChildHandle
// =============================================================================

/// A live mounted child: its erased component plus its current state.
///
/// The `kind` tag records which [`SlotDef`] mounted it; replacing a handle at
/// an address with one of a different kind trips a debug assertion in the
/// slot's `set` accessor.
pub struct ChildHandle<Ctx> {
    kind: TypeId,
    component: AnyComponent<Ctx>,
    state: OpaqueState,
}

impl<Ctx: 'static> ChildHandle<Ctx> {
    pub fn new<D: SlotDef>(component: AnyComponent<Ctx>, state: OpaqueState) -> Self {
        Self {
            kind: TypeId::of::<D>(),
            component,
            state,
        }
    }

    pub(crate) fn with_kind(
        kind: TypeId,
        component: AnyComponent<Ctx>,
        state: OpaqueState,
    ) -> Self {
        Self {
            kind,
            component,
            state,
        }
    }

    pub fn kind(&self) -> TypeId {
        self.kind
    }

    pub fn component(&self) -> &AnyComponent<Ctx> {
        &self.component
    }

    pub fn state(&self) -> &OpaqueState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut OpaqueState {
        &mut self.state
    }

    /// Split the handle, e.g. to run the finalizer against the final state.
    pub fn into_parts(self) -> (AnyComponent<Ctx>, OpaqueState) {
        (self.component, self.state)
    }
}

// =============================================================================
// SlotContainer
// =============================================================================

/// Abstract container interface the slot accessors talk to.
///
/// Concrete backends keep whatever internal layout they want; the slot layer
/// only requires addressed get/insert/remove plus ordered iteration.
pub trait SlotContainer<Ctx> {
    fn get(&self, address: &SlotAddress) -> Option<&ChildHandle<Ctx>>;

    /// Insert or replace, returning the previous handle at the address.
    fn insert(&mut self, address: SlotAddress, handle: ChildHandle<Ctx>)
    -> Option<ChildHandle<Ctx>>;

    fn remove(&mut self, address: &SlotAddress) -> Option<ChildHandle<Ctx>>;

    /// All occupied addresses, in address order.
    fn addresses(&self) -> Vec<SlotAddress>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, address: &SlotAddress) -> bool {
        self.get(address).is_some()
    }
}

// =============================================================================
// SlotArena
// =============================================================================

/// Default [`SlotContainer`] backend.
///
/// Handles live in a slotmap arena; a `BTreeMap` maps addresses to arena
/// keys. The split keeps handle storage dense while the index stays ordered.
pub struct SlotArena<Ctx> {
    children: SlotMap<ChildId, ChildHandle<Ctx>>,
    index: BTreeMap<SlotAddress, ChildId>,
}

impl<Ctx> SlotArena<Ctx> {
    pub fn new() -> Self {
        Self {
            children: SlotMap::with_key(),
            index: BTreeMap::new(),
        }
    }
}

impl<Ctx> Default for SlotArena<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> SlotContainer<Ctx> for SlotArena<Ctx> {
    fn get(&self, address: &SlotAddress) -> Option<&ChildHandle<Ctx>> {
        let id = self.index.get(address)?;
        self.children.get(*id)
    }

    fn insert(
        &mut self,
        address: SlotAddress,
        handle: ChildHandle<Ctx>,
    ) -> Option<ChildHandle<Ctx>> {
        let id = self.children.insert(handle);
        let previous = self.index.insert(address, id)?;
        self.children.remove(previous)
    }

    fn remove(&mut self, address: &SlotAddress) -> Option<ChildHandle<Ctx>> {
        let id = self.index.remove(address)?;
        self.children.remove(id)
    }

    fn addresses(&self) -> Vec<SlotAddress> {
        self.index.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.index.len()
    }
}

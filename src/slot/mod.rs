//! Component slots - addressed child mount points.
//!
//! A [`ComponentSlot`] is what a parent's render output embeds wherever a
//! child component mounts. It is opaque: the child's query, input, and output
//! types are hidden, and the storage container's representation never shows
//! through. What it carries:
//! - `get` / `pop` / `set` - capability closures bound to one
//!   `(name, key)` address, operating on any [`SlotContainer`],
//! - the erased child component and the input to feed it,
//! - an output projector mapping the child's outputs into the parent's
//!   message type (`None` swallows the output).
//!
//! The interpreter walks a rendered view and drives each slot's accessors
//! against the parent's storage without knowing any child's concrete type.
//!
//! # Addressing
//!
//! [`ComponentSlot::new`] is generic over a [`SlotDef`], which ties the
//! symbolic name to exactly one child kind: mounting a component with the
//! wrong query/input/output types at that name does not compile. Sibling
//! mounts of the same kind are distinguished by the def's ordering key.

mod address;
mod storage;

pub use address::{SlotAddress, SlotDef, SlotKey};
pub use storage::{ChildHandle, ChildId, SlotArena, SlotContainer};

use std::any::TypeId;
use std::rc::Rc;

use crate::component::{AnyComponent, Component};
use crate::types::{OpaqueInput, OpaqueOutput};

// =============================================================================
// Accessor capabilities
// =============================================================================

/// Read the child's live handle at the slot's address, if mounted.
pub type SlotGetFn<Ctx> =
    Rc<dyn for<'a> Fn(&'a dyn SlotContainer<Ctx>) -> Option<&'a ChildHandle<Ctx>>>;

/// Remove and return the child's live handle, leaving the rest of the
/// storage in place.
pub type SlotPopFn<Ctx> = Rc<dyn Fn(&mut dyn SlotContainer<Ctx>) -> Option<ChildHandle<Ctx>>>;

/// Insert or replace the child's live handle.
pub type SlotSetFn<Ctx> = Rc<dyn Fn(&mut dyn SlotContainer<Ctx>, ChildHandle<Ctx>)>;

/// Project a child output into the parent's message type.
pub type SlotOutputFn<A> = Rc<dyn Fn(OpaqueOutput) -> Option<A>>;

fn make_get<Ctx: 'static>(address: SlotAddress) -> SlotGetFn<Ctx> {
    // Anchors the closure's higher-ranked signature before unsizing.
    fn anchor<Ctx, F>(f: F) -> F
    where
        F: for<'a> Fn(&'a dyn SlotContainer<Ctx>) -> Option<&'a ChildHandle<Ctx>>,
    {
        f
    }
    Rc::new(anchor(move |container| container.get(&address)))
}

fn make_pop<Ctx: 'static>(address: SlotAddress) -> SlotPopFn<Ctx> {
    Rc::new(move |container: &mut dyn SlotContainer<Ctx>| container.remove(&address))
}

fn make_set<Ctx: 'static>(address: SlotAddress) -> SlotSetFn<Ctx> {
    Rc::new(
        move |container: &mut dyn SlotContainer<Ctx>, handle: ChildHandle<Ctx>| {
            if let Some(existing) = container.get(&address) {
                debug_assert_eq!(
                    existing.kind(),
                    handle.kind(),
                    "slot {address} replaced with a different child kind",
                );
            }
            container.insert(address.clone(), handle);
        },
    )
}

fn accessors<Ctx: 'static>(
    address: &SlotAddress,
) -> (SlotGetFn<Ctx>, SlotPopFn<Ctx>, SlotSetFn<Ctx>) {
    (
        make_get(address.clone()),
        make_pop(address.clone()),
        make_set(address.clone()),
    )
}

// =============================================================================
// SlotSpec
// =============================================================================

/// The full internal shape of a slot.
///
/// [`ComponentSlot::from_spec`] accepts this directly - the escape hatch used
/// by hoisting and output mapping, not the primary construction path.
pub struct SlotSpec<A, Ctx> {
    /// The `(name, key)` address this slot is bound to.
    pub address: SlotAddress,
    /// [`SlotDef`] identity of the mounted child kind.
    pub kind: TypeId,
    pub get: SlotGetFn<Ctx>,
    pub pop: SlotPopFn<Ctx>,
    pub set: SlotSetFn<Ctx>,
    /// The child itself, fully erased.
    pub component: AnyComponent<Ctx>,
    /// Producer of input tokens; one fresh token per delivery.
    pub input: Rc<dyn Fn() -> OpaqueInput>,
    /// Output projector. `None` swallows the child's output.
    pub output: SlotOutputFn<A>,
}

impl<A, Ctx> Clone for SlotSpec<A, Ctx> {
    fn clone(&self) -> Self {
        Self {
            address: self.address.clone(),
            kind: self.kind,
            get: self.get.clone(),
            pop: self.pop.clone(),
            set: self.set.clone(),
            component: self.component.clone(),
            input: self.input.clone(),
            output: self.output.clone(),
        }
    }
}

// =============================================================================
// ComponentSlot
// =============================================================================

/// An addressed child mount point inside a parent's render output.
pub struct ComponentSlot<A, Ctx> {
    spec: SlotSpec<A, Ctx>,
}

impl<A, Ctx> Clone for ComponentSlot<A, Ctx> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
        }
    }
}

impl<A: 'static, Ctx: 'static> ComponentSlot<A, Ctx> {
    /// Mount `component` at `(D::NAME, key)`.
    ///
    /// The def `D` ties the address to exactly one child kind; the key type
    /// must convert into the totally ordered [`SlotKey`]. `output` maps each
    /// child output into a parent message, or `None` to swallow it.
    pub fn new<D: SlotDef>(
        key: D::Key,
        component: Component<D::Query, D::Input, D::Output, Ctx>,
        input: D::Input,
        output: impl Fn(D::Output) -> Option<A> + 'static,
    ) -> Self {
        let address = D::address(key);
        let (get, pop, set) = accessors(&address);
        Self::from_spec(SlotSpec {
            address,
            kind: TypeId::of::<D>(),
            get,
            pop,
            set,
            component: AnyComponent::new(component),
            input: Rc::new(move || OpaqueInput::new(input.clone())),
            output: Rc::new(move |token| output(token.take::<D::Output>())),
        })
    }

    /// Build a slot from its full internal shape.
    pub fn from_spec(spec: SlotSpec<A, Ctx>) -> Self {
        Self { spec }
    }

    /// Inspect the slot through its internal shape.
    ///
    /// The slot analogue of
    /// [`Component::with_internal`](crate::component::Component::with_internal):
    /// `f`'s result type cannot mention the child's hidden types, because the
    /// spec already speaks only in tokens.
    pub fn with_internal<R>(&self, f: impl FnOnce(&SlotSpec<A, Ctx>) -> R) -> R {
        f(&self.spec)
    }

    /// The `(name, key)` address this slot is bound to.
    pub fn address(&self) -> &SlotAddress {
        &self.spec.address
    }

    /// Read the child's live handle, if mounted.
    pub fn get<'a>(&self, container: &'a dyn SlotContainer<Ctx>) -> Option<&'a ChildHandle<Ctx>> {
        (self.spec.get)(container)
    }

    /// Remove and return the child's live handle.
    pub fn pop(&self, container: &mut dyn SlotContainer<Ctx>) -> Option<ChildHandle<Ctx>> {
        (self.spec.pop)(container)
    }

    /// Insert or replace the child's live handle.
    pub fn set(&self, container: &mut dyn SlotContainer<Ctx>, handle: ChildHandle<Ctx>) {
        (self.spec.set)(container, handle)
    }

    /// The embedded child, fully erased.
    pub fn component(&self) -> &AnyComponent<Ctx> {
        &self.spec.component
    }

    /// A fresh input token for the child.
    pub fn input(&self) -> OpaqueInput {
        (self.spec.input)()
    }

    /// Project one child output into the parent's message type.
    pub fn project_output(&self, output: OpaqueOutput) -> Option<A> {
        (self.spec.output)(output)
    }

    /// Mount step: the child's initial state for this slot's input, stamped
    /// with the slot's kind, ready to `set` into storage.
    pub fn instantiate(&self) -> ChildHandle<Ctx> {
        let state = self.spec.component.initial_state(self.input());
        ChildHandle::with_kind(self.spec.kind, self.spec.component.clone(), state)
    }

    /// Post-compose `f` onto the output projector.
    ///
    /// Accessors, component, and input are untouched, so mapping the identity
    /// yields an observably identical slot, and mapping `f` then `g` equals
    /// mapping their composition.
    pub fn map_output<B: 'static>(self, f: impl Fn(A) -> B + 'static) -> ComponentSlot<B, Ctx> {
        let project = self.spec.output;
        ComponentSlot::from_spec(SlotSpec {
            address: self.spec.address,
            kind: self.spec.kind,
            get: self.spec.get,
            pop: self.spec.pop,
            set: self.spec.set,
            component: self.spec.component,
            input: self.spec.input,
            output: Rc::new(move |token| project(token).map(&f)),
        })
    }

    /// Retarget the embedded child to another effect context.
    ///
    /// The child component is rewritten via
    /// [`AnyComponent::hoist`](crate::component::AnyComponent::hoist)
    /// (recursing into its own slots on render); the accessors are rebound to
    /// the new context's container type at the same address; input and output
    /// projector are untouched.
    pub fn hoist<Ctx2: 'static>(self, transform: Rc<dyn Fn(Ctx) -> Ctx2>) -> ComponentSlot<A, Ctx2> {
        let (get, pop, set) = accessors(&self.spec.address);
        ComponentSlot::from_spec(SlotSpec {
            address: self.spec.address,
            kind: self.spec.kind,
            get,
            pop,
            set,
            component: self.spec.component.hoist(transform),
            input: self.spec.input,
            output: self.spec.output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentSpec;
    use crate::types::{Evaluated, OpaqueOutput};
    use crate::view::View;

    struct ItemDef;

    impl SlotDef for ItemDef {
        const NAME: &'static str = "item";
        type Key = i64;
        type Query = ();
        type Input = i32;
        type Output = i32;
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ParentMsg {
        Picked(i32),
    }

    #[derive(Debug, Clone)]
    enum ItemMsg {
        Pick,
    }

    fn item_component() -> Component<(), i32, i32, ()> {
        let spec: ComponentSpec<i32, ItemMsg, (), i32, i32, ()> = ComponentSpec::new(
            |input: i32| input,
            |state: &i32| View::text(format!("item {state}")),
            |ItemMsg::Pick, state: &mut i32| Evaluated::output(*state),
        );
        Component::without_lifecycle(spec)
    }

    fn item_slot(key: i64, input: i32) -> ComponentSlot<ParentMsg, ()> {
        ComponentSlot::new::<ItemDef>(key, item_component(), input, |output| {
            Some(ParentMsg::Picked(output))
        })
    }

    #[test]
    fn test_lens_laws_on_fresh_storage() {
        let slot = item_slot(0, 40);
        let mut arena = SlotArena::new();

        // get after set returns the set handle
        slot.set(&mut arena, slot.instantiate());
        let handle = slot.get(&arena).unwrap();
        assert_eq!(*handle.state().downcast_ref::<i32>(), 40);

        // set after pop restores equivalent storage
        let popped = slot.pop(&mut arena).unwrap();
        assert!(slot.get(&arena).is_none());
        slot.set(&mut arena, popped);
        assert!(slot.get(&arena).is_some());

        // pop then get is absent
        slot.pop(&mut arena);
        assert!(slot.get(&arena).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_slots_at_distinct_keys_do_not_collide() {
        let first = item_slot(1, 10);
        let second = item_slot(2, 20);
        let mut arena = SlotArena::new();

        first.set(&mut arena, first.instantiate());
        second.set(&mut arena, second.instantiate());
        assert_eq!(arena.len(), 2);

        // Each slot's accessors only see their own address.
        assert_eq!(*first.get(&arena).unwrap().state().downcast_ref::<i32>(), 10);
        first.pop(&mut arena);
        assert!(first.get(&arena).is_none());
        assert_eq!(*second.get(&arena).unwrap().state().downcast_ref::<i32>(), 20);
    }

    #[test]
    fn test_output_projection_and_swallowing() {
        let slot = item_slot(0, 3);
        assert_eq!(
            slot.project_output(OpaqueOutput::new(3_i32)),
            Some(ParentMsg::Picked(3))
        );

        let muted: ComponentSlot<ParentMsg, ()> =
            ComponentSlot::new::<ItemDef>(1, item_component(), 3, |_| None);
        assert_eq!(muted.project_output(OpaqueOutput::new(3_i32)), None);
    }

    #[test]
    fn test_map_output_identity_is_observable_noop() {
        let original = item_slot(0, 7);
        let mapped = original.clone().map_output(|message| message);

        assert_eq!(original.address(), mapped.address());
        assert_eq!(
            original.project_output(OpaqueOutput::new(7_i32)),
            mapped.project_output(OpaqueOutput::new(7_i32))
        );

        // Accessor behavior is indistinguishable: handles set through one are
        // visible through the other.
        let mut arena = SlotArena::new();
        original.set(&mut arena, original.instantiate());
        assert!(mapped.get(&arena).is_some());
        assert!(mapped.pop(&mut arena).is_some());
        assert!(original.get(&arena).is_none());
    }

    #[test]
    fn test_map_output_composition() {
        let slot = item_slot(0, 2);
        let two_steps = slot
            .clone()
            .map_output(|ParentMsg::Picked(n)| Some(n + 1))
            .map_output(|n: Option<i32>| n.map(|n| n * 2));
        let composed = slot.map_output(|ParentMsg::Picked(n)| Some((n + 1) * 2));

        assert_eq!(
            two_steps.project_output(OpaqueOutput::new(4_i32)),
            composed.project_output(OpaqueOutput::new(4_i32))
        );
    }

    #[test]
    fn test_with_internal_exposes_spec() {
        let slot = item_slot(5, 0);
        let (name, kind) = slot.with_internal(|spec| (spec.address.name(), spec.kind));
        assert_eq!(name, "item");
        assert_eq!(kind, std::any::TypeId::of::<ItemDef>());
    }

    #[test]
    fn test_from_spec_round_trip() {
        let slot = item_slot(9, 1);
        let rebuilt = slot.with_internal(|spec| ComponentSlot::from_spec(spec.clone()));
        assert_eq!(rebuilt.address(), slot.address());
        assert_eq!(
            rebuilt.project_output(OpaqueOutput::new(1_i32)),
            Some(ParentMsg::Picked(1))
        );
    }

    #[test]
    fn test_instantiate_uses_slot_input() {
        let slot = item_slot(0, 123);
        let handle = slot.instantiate();
        assert_eq!(*handle.state().downcast_ref::<i32>(), 123);
        assert_eq!(handle.kind(), std::any::TypeId::of::<ItemDef>());
    }

    #[test]
    fn test_hoist_rebinds_accessors_and_child() {
        #[derive(Debug, PartialEq)]
        struct Tagged(&'static str);

        let slot = item_slot(0, 8);
        let hoisted: ComponentSlot<ParentMsg, Tagged> =
            slot.hoist(Rc::new(|_: ()| Tagged("lifted")));

        // Accessors now target the new context's containers.
        let mut arena: SlotArena<Tagged> = SlotArena::new();
        hoisted.set(&mut arena, hoisted.instantiate());
        assert_eq!(
            *hoisted.get(&arena).unwrap().state().downcast_ref::<i32>(),
            8
        );

        // Projector untouched.
        assert_eq!(
            hoisted.project_output(OpaqueOutput::new(8_i32)),
            Some(ParentMsg::Picked(8))
        );
    }
}

//! Components - opaque, type-erased UI units.
//!
//! A [`Component`] packages state, rendering, and message handling behind a
//! boundary that exposes only four types: the query algebra `Q`, the input
//! `I`, the output message `O`, and the effect context `Ctx`. The state type
//! and the self-message type are hidden; outside this module they exist only
//! as opaque tokens.
//!
//! # The erasure boundary
//!
//! The single sanctioned way to operate on a component's internals is
//! [`Component::with_internal`], which hands out `&dyn Driver` - an
//! object-safe interface whose signatures mention none of the hidden types.
//! State and messages travel through it as [`OpaqueState`] / [`OpaqueMessage`]
//! tokens, so whatever a caller computes from the driver cannot name them.
//!
//! Two erasure levels exist:
//! 1. [`Component<Q, I, O, Ctx>`] hides state and self-messages but keeps the
//!    query/input/output types - this is what applications compose.
//! 2. [`AnyComponent<Ctx>`] hides those too - this is what slot storage holds,
//!    so one container can store heterogeneous children uniformly.
//!
//! # Hoist
//!
//! [`Component::hoist`] retargets a component (and, lazily, its whole subtree)
//! from one effect context to another by mapping every emitted effect through
//! a transform and rewriting every embedded slot. Hoisting is not memoized:
//! each render under a hoisted component re-walks its slots. That cost is a
//! known tradeoff of the lazy wrapper, not something to cache away here.

mod spec;

pub use spec::{
    ComponentSpec, EvalFn, InitialStateFn, LifecycleSpec, QueryFn, ReceiveFn, RenderFn,
};

use std::rc::Rc;

use crate::slot::ComponentSlot;
use crate::types::{
    Evaluated, OpaqueInput, OpaqueMessage, OpaqueOutput, OpaqueQuery, OpaqueState,
};
use crate::view::View;

/// A component's rendered view after erasure: child placeholders are slots
/// projecting into opaque parent messages, bindings carry opaque messages.
pub type ErasedView<Ctx> = View<ComponentSlot<OpaqueMessage, Ctx>, OpaqueMessage>;

// =============================================================================
// Driver - the internal interface
// =============================================================================

/// Object-safe interface to a component's internals.
///
/// Every method speaks in the component's exposed types plus opaque tokens.
/// The interpreter threads tokens between calls without inspecting them:
/// feed `initial_state`'s token to `render` and `eval`, feed a binding's
/// message token back to `eval`, and so on. Tokens must stay with the
/// component that produced them.
pub trait Driver<Q, I, O, Ctx> {
    /// Produce the initial state for the first input.
    fn initial_state(&self, input: I) -> OpaqueState;

    /// Describe the view for the current state. Pure.
    fn render(&self, state: &OpaqueState) -> ErasedView<Ctx>;

    /// Evaluate one self-message, mutating the state in place.
    fn eval(&self, message: OpaqueMessage, state: &mut OpaqueState) -> Evaluated<O, Ctx>;

    /// Convert a fresh input (one per parent re-render) into a self-message.
    fn receive(&self, input: I) -> Option<OpaqueMessage>;

    /// Convert an incoming query into a self-message.
    fn on_query(&self, query: Q) -> Option<OpaqueMessage>;

    /// Message to dispatch once after the first render, if any.
    fn initializer(&self) -> Option<OpaqueMessage>;

    /// Message to dispatch once on removal, if any.
    fn finalizer(&self) -> Option<OpaqueMessage>;
}

// =============================================================================
// Component
// =============================================================================

/// An opaque UI unit. Cheap to clone; immutable once constructed.
///
/// Hoisting rebuilds rather than mutates: the original component is untouched
/// and remains usable under its original effect context.
pub struct Component<Q, I, O, Ctx> {
    driver: Rc<dyn Driver<Q, I, O, Ctx>>,
}

impl<Q, I, O, Ctx> Clone for Component<Q, I, O, Ctx> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
        }
    }
}

impl<Q: 'static, I: 'static, O: 'static, Ctx: 'static> Component<Q, I, O, Ctx> {
    /// Wrap a full spec (including lifecycle hooks) into the opaque type.
    ///
    /// Total: all illegal states are excluded by construction, so there is
    /// nothing to validate.
    pub fn construct<S: 'static, A: Clone + 'static>(
        spec: LifecycleSpec<S, A, Q, I, O, Ctx>,
    ) -> Self {
        Self {
            driver: Rc::new(SpecDriver { spec }),
        }
    }

    /// Build a component with no initializer/finalizer.
    pub fn without_lifecycle<S: 'static, A: Clone + 'static>(
        spec: ComponentSpec<S, A, Q, I, O, Ctx>,
    ) -> Self {
        Self::construct(LifecycleSpec::new(spec))
    }

    /// Build a component whose lifecycle messages are dispatched by the
    /// interpreter on mount and unmount.
    pub fn with_lifecycle<S: 'static, A: Clone + 'static>(
        spec: LifecycleSpec<S, A, Q, I, O, Ctx>,
    ) -> Self {
        Self::construct(spec)
    }

    /// Inspect the component through its internal interface.
    ///
    /// `f` sees only `&dyn Driver`, so its result cannot reference the hidden
    /// state/message types. Contract: `f` must not stash opaque tokens
    /// anywhere they could be fed to a different component.
    pub fn with_internal<R>(&self, f: impl FnOnce(&dyn Driver<Q, I, O, Ctx>) -> R) -> R {
        f(self.driver.as_ref())
    }

    /// Retarget this component to run under another effect context.
    ///
    /// `transform` must be structure-preserving: it maps each effect command
    /// without reordering or dropping. Applies recursively to every child
    /// slot the component renders, at arbitrary nesting depth.
    pub fn hoist<Ctx2: 'static>(
        &self,
        transform: impl Fn(Ctx) -> Ctx2 + 'static,
    ) -> Component<Q, I, O, Ctx2> {
        self.hoist_shared(Rc::new(transform))
    }

    pub(crate) fn hoist_shared<Ctx2: 'static>(
        &self,
        transform: Rc<dyn Fn(Ctx) -> Ctx2>,
    ) -> Component<Q, I, O, Ctx2> {
        Component {
            driver: Rc::new(Hoisted {
                inner: self.driver.clone(),
                transform,
            }),
        }
    }
}

// =============================================================================
// Typed driver over a spec
// =============================================================================

/// The one bridge between a typed spec and the erased interface.
struct SpecDriver<S, A, Q, I, O, Ctx> {
    spec: LifecycleSpec<S, A, Q, I, O, Ctx>,
}

impl<S, A, Q, I, O, Ctx> Driver<Q, I, O, Ctx> for SpecDriver<S, A, Q, I, O, Ctx>
where
    S: 'static,
    A: Clone + 'static,
    Q: 'static,
    I: 'static,
    O: 'static,
    Ctx: 'static,
{
    fn initial_state(&self, input: I) -> OpaqueState {
        OpaqueState::new((self.spec.spec.initial_state)(input))
    }

    fn render(&self, state: &OpaqueState) -> ErasedView<Ctx> {
        (self.spec.spec.render)(state.downcast_ref::<S>())
            .map_slots(|slot| slot.map_output(OpaqueMessage::new))
            .map_messages(OpaqueMessage::new)
    }

    fn eval(&self, message: OpaqueMessage, state: &mut OpaqueState) -> Evaluated<O, Ctx> {
        (self.spec.spec.eval)(message.take::<A>(), state.downcast_mut::<S>())
    }

    fn receive(&self, input: I) -> Option<OpaqueMessage> {
        (self.spec.spec.receive)(input).map(OpaqueMessage::new)
    }

    fn on_query(&self, query: Q) -> Option<OpaqueMessage> {
        (self.spec.spec.on_query)(query).map(OpaqueMessage::new)
    }

    fn initializer(&self) -> Option<OpaqueMessage> {
        self.spec.initializer.clone().map(OpaqueMessage::new)
    }

    fn finalizer(&self) -> Option<OpaqueMessage> {
        self.spec.finalizer.clone().map(OpaqueMessage::new)
    }
}

// =============================================================================
// Hoisted driver
// =============================================================================

/// Delegating driver that lifts effects into another context.
///
/// State, receiver, queries, and lifecycle messages carry no effect-context
/// values, so they pass through untouched. Only `eval`'s effects and the
/// slots embedded in rendered views are rewritten.
struct Hoisted<Q, I, O, Ctx, Ctx2> {
    inner: Rc<dyn Driver<Q, I, O, Ctx>>,
    transform: Rc<dyn Fn(Ctx) -> Ctx2>,
}

impl<Q, I, O, Ctx, Ctx2> Driver<Q, I, O, Ctx2> for Hoisted<Q, I, O, Ctx, Ctx2>
where
    Q: 'static,
    I: 'static,
    O: 'static,
    Ctx: 'static,
    Ctx2: 'static,
{
    fn initial_state(&self, input: I) -> OpaqueState {
        self.inner.initial_state(input)
    }

    fn render(&self, state: &OpaqueState) -> ErasedView<Ctx2> {
        let transform = self.transform.clone();
        self.inner
            .render(state)
            .map_slots(move |slot| slot.hoist(transform.clone()))
    }

    fn eval(&self, message: OpaqueMessage, state: &mut OpaqueState) -> Evaluated<O, Ctx2> {
        let transform = self.transform.clone();
        self.inner
            .eval(message, state)
            .map_effects(move |effect| transform(effect))
    }

    fn receive(&self, input: I) -> Option<OpaqueMessage> {
        self.inner.receive(input)
    }

    fn on_query(&self, query: Q) -> Option<OpaqueMessage> {
        self.inner.on_query(query)
    }

    fn initializer(&self) -> Option<OpaqueMessage> {
        self.inner.initializer()
    }

    fn finalizer(&self) -> Option<OpaqueMessage> {
        self.inner.finalizer()
    }
}

// =============================================================================
// AnyComponent - the second erasure level
// =============================================================================

/// Internal interface to a fully erased component.
///
/// Same operation set as [`Driver`], but query, input, and output are opaque
/// tokens too. This is the shape slot storage holds.
pub trait AnyDriver<Ctx> {
    fn initial_state(&self, input: OpaqueInput) -> OpaqueState;
    fn render(&self, state: &OpaqueState) -> ErasedView<Ctx>;
    fn eval(&self, message: OpaqueMessage, state: &mut OpaqueState) -> Evaluated<OpaqueOutput, Ctx>;
    fn receive(&self, input: OpaqueInput) -> Option<OpaqueMessage>;
    fn on_query(&self, query: OpaqueQuery) -> Option<OpaqueMessage>;
    fn initializer(&self) -> Option<OpaqueMessage>;
    fn finalizer(&self) -> Option<OpaqueMessage>;
}

/// A component with every type erased except its effect context.
pub struct AnyComponent<Ctx> {
    driver: Rc<dyn AnyDriver<Ctx>>,
}

impl<Ctx> Clone for AnyComponent<Ctx> {
    fn clone(&self) -> Self {
        Self {
            driver: self.driver.clone(),
        }
    }
}

impl<Ctx: 'static> AnyComponent<Ctx> {
    /// Erase a component's query/input/output types.
    pub fn new<Q: 'static, I: 'static, O: 'static>(component: Component<Q, I, O, Ctx>) -> Self {
        Self {
            driver: Rc::new(ErasedChild { component }),
        }
    }

    pub fn initial_state(&self, input: OpaqueInput) -> OpaqueState {
        self.driver.initial_state(input)
    }

    pub fn render(&self, state: &OpaqueState) -> ErasedView<Ctx> {
        self.driver.render(state)
    }

    pub fn eval(
        &self,
        message: OpaqueMessage,
        state: &mut OpaqueState,
    ) -> Evaluated<OpaqueOutput, Ctx> {
        self.driver.eval(message, state)
    }

    pub fn receive(&self, input: OpaqueInput) -> Option<OpaqueMessage> {
        self.driver.receive(input)
    }

    pub fn on_query(&self, query: OpaqueQuery) -> Option<OpaqueMessage> {
        self.driver.on_query(query)
    }

    pub fn initializer(&self) -> Option<OpaqueMessage> {
        self.driver.initializer()
    }

    pub fn finalizer(&self) -> Option<OpaqueMessage> {
        self.driver.finalizer()
    }

    /// The fully-erased analogue of [`Component::with_internal`].
    pub fn with_internal<R>(&self, f: impl FnOnce(&dyn AnyDriver<Ctx>) -> R) -> R {
        f(self.driver.as_ref())
    }

    /// Retarget to another effect context. See [`Component::hoist`].
    pub fn hoist<Ctx2: 'static>(&self, transform: Rc<dyn Fn(Ctx) -> Ctx2>) -> AnyComponent<Ctx2> {
        AnyComponent {
            driver: Rc::new(HoistedAny {
                inner: self.driver.clone(),
                transform,
            }),
        }
    }
}

/// Adapter from the typed driver to the fully erased one.
struct ErasedChild<Q, I, O, Ctx> {
    component: Component<Q, I, O, Ctx>,
}

impl<Q, I, O, Ctx> AnyDriver<Ctx> for ErasedChild<Q, I, O, Ctx>
where
    Q: 'static,
    I: 'static,
    O: 'static,
    Ctx: 'static,
{
    fn initial_state(&self, input: OpaqueInput) -> OpaqueState {
        self.component.driver.initial_state(input.take::<I>())
    }

    fn render(&self, state: &OpaqueState) -> ErasedView<Ctx> {
        self.component.driver.render(state)
    }

    fn eval(
        &self,
        message: OpaqueMessage,
        state: &mut OpaqueState,
    ) -> Evaluated<OpaqueOutput, Ctx> {
        let evaluated = self.component.driver.eval(message, state);
        Evaluated {
            effects: evaluated.effects,
            output: evaluated.output.map(OpaqueOutput::new),
        }
    }

    fn receive(&self, input: OpaqueInput) -> Option<OpaqueMessage> {
        self.component.driver.receive(input.take::<I>())
    }

    fn on_query(&self, query: OpaqueQuery) -> Option<OpaqueMessage> {
        self.component.driver.on_query(query.take::<Q>())
    }

    fn initializer(&self) -> Option<OpaqueMessage> {
        self.component.driver.initializer()
    }

    fn finalizer(&self) -> Option<OpaqueMessage> {
        self.component.driver.finalizer()
    }
}

/// Fully-erased analogue of [`Hoisted`].
struct HoistedAny<Ctx, Ctx2> {
    inner: Rc<dyn AnyDriver<Ctx>>,
    transform: Rc<dyn Fn(Ctx) -> Ctx2>,
}

impl<Ctx: 'static, Ctx2: 'static> AnyDriver<Ctx2> for HoistedAny<Ctx, Ctx2> {
    fn initial_state(&self, input: OpaqueInput) -> OpaqueState {
        self.inner.initial_state(input)
    }

    fn render(&self, state: &OpaqueState) -> ErasedView<Ctx2> {
        let transform = self.transform.clone();
        self.inner
            .render(state)
            .map_slots(move |slot| slot.hoist(transform.clone()))
    }

    fn eval(
        &self,
        message: OpaqueMessage,
        state: &mut OpaqueState,
    ) -> Evaluated<OpaqueOutput, Ctx2> {
        let transform = self.transform.clone();
        self.inner
            .eval(message, state)
            .map_effects(move |effect| transform(effect))
    }

    fn receive(&self, input: OpaqueInput) -> Option<OpaqueMessage> {
        self.inner.receive(input)
    }

    fn on_query(&self, query: OpaqueQuery) -> Option<OpaqueMessage> {
        self.inner.on_query(query)
    }

    fn initializer(&self) -> Option<OpaqueMessage> {
        self.inner.initializer()
    }

    fn finalizer(&self) -> Option<OpaqueMessage> {
        self.inner.finalizer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{SlotArena, SlotDef};
    use crate::view::View;

    #[derive(Debug, Clone, PartialEq)]
    enum Msg {
        Increment,
        Set(i32),
        Init,
        Done,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Fx {
        Emit(i32),
    }

    fn counter_spec() -> ComponentSpec<i32, Msg, (), i32, i32, Fx> {
        ComponentSpec::new(
            |input: i32| input,
            |state: &i32| View::text(format!("count: {state}")),
            |message, state: &mut i32| match message {
                Msg::Increment => {
                    *state += 1;
                    Evaluated::none()
                }
                Msg::Set(n) => {
                    *state = n;
                    Evaluated::effect(Fx::Emit(n)).with_output(n)
                }
                Msg::Init | Msg::Done => Evaluated::none(),
            },
        )
    }

    #[test]
    fn test_counter_eval_increments_without_output() {
        let component = Component::without_lifecycle(counter_spec());
        component.with_internal(|driver| {
            let mut state = driver.initial_state(0);
            let evaluated = driver.eval(OpaqueMessage::new(Msg::Increment), &mut state);
            assert_eq!(*state.downcast_ref::<i32>(), 1);
            assert!(evaluated.output.is_none());
            assert!(evaluated.effects.is_empty());
        });
    }

    #[test]
    fn test_construction_round_trip() {
        let spec = counter_spec().with_receiver(|input: i32| Some(Msg::Set(input)));
        let component = Component::without_lifecycle(spec);
        component.with_internal(|driver| {
            // initial_state preserved
            let state = driver.initial_state(7);
            assert_eq!(*state.downcast_ref::<i32>(), 7);
            // receiver preserved
            let message = driver.receive(5).unwrap();
            assert_eq!(message.take::<Msg>(), Msg::Set(5));
            // eval preserved, output and effect flow through
            let mut state = driver.initial_state(0);
            let evaluated = driver.eval(OpaqueMessage::new(Msg::Set(9)), &mut state);
            assert_eq!(evaluated.output, Some(9));
            assert_eq!(evaluated.effects, vec![Fx::Emit(9)]);
        });
    }

    #[test]
    fn test_without_lifecycle_exposes_no_hooks() {
        let component = Component::without_lifecycle(counter_spec());
        component.with_internal(|driver| {
            assert!(driver.initializer().is_none());
            assert!(driver.finalizer().is_none());
        });
    }

    #[test]
    fn test_lifecycle_messages_survive_construction() {
        let spec = LifecycleSpec::new(counter_spec())
            .with_initializer(Msg::Init)
            .with_finalizer(Msg::Done);
        let component = Component::with_lifecycle(spec);
        component.with_internal(|driver| {
            assert_eq!(driver.initializer().unwrap().take::<Msg>(), Msg::Init);
            assert_eq!(driver.finalizer().unwrap().take::<Msg>(), Msg::Done);
            // Lifecycle messages are re-dispatchable across mounts.
            assert_eq!(driver.initializer().unwrap().take::<Msg>(), Msg::Init);
        });
    }

    #[test]
    fn test_query_converts_to_message() {
        #[derive(Clone)]
        struct Ping;

        let spec: ComponentSpec<i32, Msg, Ping, i32, i32, Fx> = ComponentSpec::new(
            |input: i32| input,
            |_state| View::text("q"),
            |_message, _state| Evaluated::none(),
        )
        .with_query(|_: Ping| Some(Msg::Increment));

        let component = Component::without_lifecycle(spec);
        component.with_internal(|driver| {
            assert_eq!(driver.on_query(Ping).unwrap().take::<Msg>(), Msg::Increment);
        });
    }

    // -------------------------------------------------------------------------
    // Hoist
    // -------------------------------------------------------------------------

    #[derive(Debug, Clone, PartialEq)]
    enum FxB {
        Lifted(Fx),
    }

    #[derive(Debug, Clone, PartialEq)]
    enum FxC {
        Tagged(String),
    }

    fn lift(effect: Fx) -> FxB {
        FxB::Lifted(effect)
    }

    fn tag(effect: FxB) -> FxC {
        FxC::Tagged(format!("{effect:?}"))
    }

    fn run_set<Q: 'static, Ctx: 'static>(
        component: &Component<Q, i32, i32, Ctx>,
        value: i32,
    ) -> (Vec<Ctx>, Option<i32>) {
        component.with_internal(|driver| {
            let mut state = driver.initial_state(0);
            let evaluated = driver.eval(OpaqueMessage::new(Msg::Set(value)), &mut state);
            (evaluated.effects, evaluated.output)
        })
    }

    #[test]
    fn test_hoist_composition_law() {
        let component = Component::without_lifecycle(counter_spec());

        let stepwise = component.hoist(lift).hoist(tag);
        let composed = component.hoist(|effect| tag(lift(effect)));

        assert_eq!(run_set(&stepwise, 4), run_set(&composed, 4));
        assert_eq!(
            run_set(&stepwise, 4).0,
            vec![FxC::Tagged("Lifted(Emit(4))".to_string())]
        );
    }

    #[test]
    fn test_hoist_leaves_state_and_receiver_untouched() {
        let spec = counter_spec().with_receiver(|input: i32| Some(Msg::Set(input)));
        let component = Component::without_lifecycle(spec).hoist(lift);
        component.with_internal(|driver| {
            assert_eq!(*driver.initial_state(3).downcast_ref::<i32>(), 3);
            assert_eq!(driver.receive(8).unwrap().take::<Msg>(), Msg::Set(8));
            assert!(driver.initializer().is_none());
        });
    }

    // -------------------------------------------------------------------------
    // Parent / child composition
    // -------------------------------------------------------------------------

    struct ChildDef;

    impl SlotDef for ChildDef {
        const NAME: &'static str = "child";
        type Key = i64;
        type Query = ();
        type Input = i32;
        type Output = i32;
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ParentMsg {
        FromChild(i32),
    }

    fn parent_with_child() -> Component<(), (), (), Fx> {
        let child = Component::without_lifecycle(counter_spec());
        let spec: ComponentSpec<(), ParentMsg, (), (), (), Fx> = ComponentSpec::new(
            |_: ()| (),
            move |_state| {
                View::column(vec![View::child(ComponentSlot::new::<ChildDef>(
                    0,
                    child.clone(),
                    10,
                    |output| Some(ParentMsg::FromChild(output)),
                ))])
            },
            |_message, _state| Evaluated::none(),
        );
        Component::without_lifecycle(spec)
    }

    #[test]
    fn test_parent_render_embeds_child_slot() {
        let parent = parent_with_child();
        parent.with_internal(|driver| {
            let state = driver.initial_state(());
            let view = driver.render(&state);
            let slots = view.slots();
            assert_eq!(slots.len(), 1);
            assert_eq!(slots[0].address().name(), "child");

            // Mount the child, then exercise get / pop on the storage.
            let mut arena = SlotArena::new();
            let slot = slots[0];
            slot.set(&mut arena, slot.instantiate());
            assert!(slot.get(&arena).is_some());

            let handle = slot.pop(&mut arena).unwrap();
            assert!(slot.get(&arena).is_none());

            // Child was initialized from the slot's input.
            assert_eq!(*handle.state().downcast_ref::<i32>(), 10);
        });
    }

    #[test]
    fn test_child_output_projects_into_parent_message() {
        let parent = parent_with_child();
        parent.with_internal(|driver| {
            let state = driver.initial_state(());
            let view = driver.render(&state);
            let slot = view.slots()[0];

            let mut handle = slot.instantiate();
            let child = handle.component().clone();
            let evaluated = child.eval(OpaqueMessage::new(Msg::Set(6)), handle.state_mut());

            let output = evaluated.output.unwrap();
            let projected = slot.project_output(output).unwrap();
            // Parent messages are erased at this level; recover the type.
            assert_eq!(projected.take::<ParentMsg>(), ParentMsg::FromChild(6));
        });
    }

    #[test]
    fn test_hoist_recurses_into_child_slots() {
        let parent = parent_with_child().hoist(lift);
        parent.with_internal(|driver| {
            let state = driver.initial_state(());
            let view = driver.render(&state);
            let slot = view.slots()[0];

            let mut handle = slot.instantiate();
            let child = handle.component().clone();
            let evaluated = child.eval(OpaqueMessage::new(Msg::Set(2)), handle.state_mut());

            // The child's effects were lifted into the parent's new context.
            assert_eq!(evaluated.effects, vec![FxB::Lifted(Fx::Emit(2))]);
        });
    }
}

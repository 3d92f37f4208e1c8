//! Spec records - the builder inputs from which components are constructed.
//!
//! A [`ComponentSpec`] bundles the four functions every component has:
//! initial state, render, eval, and the input receiver. A [`LifecycleSpec`]
//! adds the optional initializer/finalizer messages dispatched by the
//! interpreter on mount and unmount.
//!
//! `render` must be pure with respect to effects: it describes structure,
//! never performs side effects. Effects belong in `eval`'s result.

use crate::slot::ComponentSlot;
use crate::types::Evaluated;
use crate::view::View;

/// Produce the initial state from the first input.
pub type InitialStateFn<I, S> = Box<dyn Fn(I) -> S>;

/// Describe the view for a state. Pure.
pub type RenderFn<S, A, Ctx> = Box<dyn Fn(&S) -> View<ComponentSlot<A, Ctx>, A>>;

/// Evaluate one self-message against the state.
pub type EvalFn<A, S, O, Ctx> = Box<dyn Fn(A, &mut S) -> Evaluated<O, Ctx>>;

/// Turn a fresh input (delivered on every parent re-render) into a
/// self-message, or `None` to ignore it.
pub type ReceiveFn<I, A> = Box<dyn Fn(I) -> Option<A>>;

/// Turn an incoming query into a self-message, or `None` to ignore it.
pub type QueryFn<Q, A> = Box<dyn Fn(Q) -> Option<A>>;

/// Everything a component does, before erasure.
///
/// Type parameters: `S` state, `A` self-message, `Q` query, `I` input,
/// `O` output message, `Ctx` effect context. `S` and `A` are hidden once the
/// spec is constructed into a [`Component`](crate::component::Component).
pub struct ComponentSpec<S, A, Q, I, O, Ctx> {
    pub initial_state: InitialStateFn<I, S>,
    pub render: RenderFn<S, A, Ctx>,
    pub eval: EvalFn<A, S, O, Ctx>,
    pub receive: ReceiveFn<I, A>,
    pub on_query: QueryFn<Q, A>,
}

impl<S, A, Q, I, O, Ctx> ComponentSpec<S, A, Q, I, O, Ctx> {
    /// Build a spec from the three mandatory functions.
    ///
    /// `receive` and `on_query` default to "no message".
    pub fn new(
        initial_state: impl Fn(I) -> S + 'static,
        render: impl Fn(&S) -> View<ComponentSlot<A, Ctx>, A> + 'static,
        eval: impl Fn(A, &mut S) -> Evaluated<O, Ctx> + 'static,
    ) -> Self {
        Self {
            initial_state: Box::new(initial_state),
            render: Box::new(render),
            eval: Box::new(eval),
            receive: Box::new(|_| None),
            on_query: Box::new(|_| None),
        }
    }

    /// React to new inputs delivered on parent re-renders.
    pub fn with_receiver(mut self, receive: impl Fn(I) -> Option<A> + 'static) -> Self {
        self.receive = Box::new(receive);
        self
    }

    /// React to queries from the parent.
    ///
    /// Request/response queries embed a responder inside `Q`; at this layer a
    /// query is just converted into a self-message.
    pub fn with_query(mut self, on_query: impl Fn(Q) -> Option<A> + 'static) -> Self {
        self.on_query = Box::new(on_query);
        self
    }
}

/// A [`ComponentSpec`] plus optional lifecycle messages.
///
/// The initializer fires once, after the component's first render and before
/// any other message reaches it. The finalizer fires once, after the
/// component is removed from its parent's slot storage.
pub struct LifecycleSpec<S, A, Q, I, O, Ctx> {
    pub spec: ComponentSpec<S, A, Q, I, O, Ctx>,
    pub initializer: Option<A>,
    pub finalizer: Option<A>,
}

impl<S, A, Q, I, O, Ctx> LifecycleSpec<S, A, Q, I, O, Ctx> {
    /// Wrap a spec with no lifecycle hooks.
    pub fn new(spec: ComponentSpec<S, A, Q, I, O, Ctx>) -> Self {
        Self {
            spec,
            initializer: None,
            finalizer: None,
        }
    }

    /// Dispatch `message` once after the first render.
    pub fn with_initializer(mut self, message: A) -> Self {
        self.initializer = Some(message);
        self
    }

    /// Dispatch `message` once on removal.
    pub fn with_finalizer(mut self, message: A) -> Self {
        self.finalizer = Some(message);
        self
    }
}

impl<S, A, Q, I, O, Ctx> From<ComponentSpec<S, A, Q, I, O, Ctx>>
    for LifecycleSpec<S, A, Q, I, O, Ctx>
{
    fn from(spec: ComponentSpec<S, A, Q, I, O, Ctx>) -> Self {
        Self::new(spec)
    }
}

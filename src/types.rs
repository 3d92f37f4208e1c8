//! Core types for ember-ui.
//!
//! Two families live here:
//! - Opaque tokens (`OpaqueState`, `OpaqueMessage`, ...) - the safe wrappers
//!   that let a component's hidden state/message types cross the erasure
//!   boundary without becoming observable.
//! - [`Evaluated`] - the result of evaluating one message against a component:
//!   emitted effects plus an optional output message.
//!
//! # Tokens
//!
//! The interpreter threads tokens between a component's operations without
//! ever inspecting them: `initial_state` produces an [`OpaqueState`], `render`
//! and `eval` consume it, and so on. Each token remembers its concrete type
//! via `dyn Any`; handing a token back to a component that did not produce it
//! is an interpreter bug and panics with the expected type name.
//!
//! [`OpaqueMessage`] is the one token that is not single-use: a rendered view
//! holds messages in its event bindings, and the same binding may fire any
//! number of times. It is therefore a cloneable producer rather than a boxed
//! value, which is also why message types must be `Clone`.

use std::any::{Any, type_name};
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Opaque State
// =============================================================================

/// A component's state, hidden behind the erasure boundary.
///
/// Produced by `initial_state`, mutated in place by `eval`, read by `render`.
pub struct OpaqueState(Box<dyn Any>);

impl OpaqueState {
    pub fn new<S: 'static>(state: S) -> Self {
        Self(Box::new(state))
    }

    /// Read the state as its concrete type.
    ///
    /// Panics if the token was produced by a component with a different state
    /// type - the interpreter must never mix tokens across components.
    pub fn downcast_ref<S: 'static>(&self) -> &S {
        match self.0.downcast_ref::<S>() {
            Some(state) => state,
            None => panic!("state token does not hold a {}", type_name::<S>()),
        }
    }

    /// Mutable access to the state as its concrete type.
    pub fn downcast_mut<S: 'static>(&mut self) -> &mut S {
        match self.0.downcast_mut::<S>() {
            Some(state) => state,
            None => panic!("state token does not hold a {}", type_name::<S>()),
        }
    }

    /// Consume the token, recovering the state by value.
    pub fn take<S: 'static>(self) -> S {
        match self.0.downcast::<S>() {
            Ok(state) => *state,
            Err(_) => panic!("state token does not hold a {}", type_name::<S>()),
        }
    }
}

impl fmt::Debug for OpaqueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueState(..)")
    }
}

// =============================================================================
// Opaque Message
// =============================================================================

/// A self-message, hidden behind the erasure boundary.
///
/// Unlike the other tokens this one is re-dispatchable: event bindings in a
/// rendered view fire repeatedly, and lifecycle messages fire once per mount
/// of a shared component. `take` therefore produces a fresh copy each call.
#[derive(Clone)]
pub struct OpaqueMessage(Rc<dyn Fn() -> Box<dyn Any>>);

impl OpaqueMessage {
    pub fn new<A: Clone + 'static>(message: A) -> Self {
        Self(Rc::new(move || Box::new(message.clone())))
    }

    /// Produce a typed copy of the message.
    pub fn take<A: 'static>(&self) -> A {
        match (self.0)().downcast::<A>() {
            Ok(message) => *message,
            Err(_) => panic!("message token does not hold a {}", type_name::<A>()),
        }
    }
}

impl fmt::Debug for OpaqueMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueMessage(..)")
    }
}

// =============================================================================
// Opaque Input / Output / Query
// =============================================================================

/// A child component's input value, hidden behind the erasure boundary.
///
/// Single-use; a slot's input producer mints a fresh token per render pass.
pub struct OpaqueInput(Box<dyn Any>);

impl OpaqueInput {
    pub fn new<I: 'static>(input: I) -> Self {
        Self(Box::new(input))
    }

    pub fn take<I: 'static>(self) -> I {
        match self.0.downcast::<I>() {
            Ok(input) => *input,
            Err(_) => panic!("input token does not hold a {}", type_name::<I>()),
        }
    }
}

impl fmt::Debug for OpaqueInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueInput(..)")
    }
}

/// An output message emitted by a child, before the parent's slot projects it.
pub struct OpaqueOutput(Box<dyn Any>);

impl OpaqueOutput {
    pub fn new<O: 'static>(output: O) -> Self {
        Self(Box::new(output))
    }

    pub fn take<O: 'static>(self) -> O {
        match self.0.downcast::<O>() {
            Ok(output) => *output,
            Err(_) => panic!("output token does not hold a {}", type_name::<O>()),
        }
    }
}

impl fmt::Debug for OpaqueOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueOutput(..)")
    }
}

/// A query addressed to a fully erased component.
pub struct OpaqueQuery(Box<dyn Any>);

impl OpaqueQuery {
    pub fn new<Q: 'static>(query: Q) -> Self {
        Self(Box::new(query))
    }

    pub fn take<Q: 'static>(self) -> Q {
        match self.0.downcast::<Q>() {
            Ok(query) => *query,
            Err(_) => panic!("query token does not hold a {}", type_name::<Q>()),
        }
    }
}

impl fmt::Debug for OpaqueQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OpaqueQuery(..)")
    }
}

// =============================================================================
// Evaluated
// =============================================================================

/// Result of evaluating one message against a component.
///
/// `effects` are commands in the component's effect context `Ctx`, to be run
/// by the interpreter in order. `output` is an optional message for the
/// parent, routed through the slot's output projector.
///
/// # Example
///
/// ```ignore
/// use ember_ui::Evaluated;
///
/// // Bump the counter, tell the parent, schedule a save.
/// |message, state: &mut i32| {
///     *state += 1;
///     Evaluated::output(*state).with_effect(Fx::Save)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluated<O, Ctx> {
    /// Effect commands to run, in order.
    pub effects: Vec<Ctx>,
    /// Optional output message for the parent.
    pub output: Option<O>,
}

impl<O, Ctx> Evaluated<O, Ctx> {
    /// No effects, no output.
    pub fn none() -> Self {
        Self {
            effects: Vec::new(),
            output: None,
        }
    }

    /// An output message and nothing else.
    pub fn output(output: O) -> Self {
        Self {
            effects: Vec::new(),
            output: Some(output),
        }
    }

    /// A single effect and nothing else.
    pub fn effect(effect: Ctx) -> Self {
        Self {
            effects: vec![effect],
            output: None,
        }
    }

    /// Append an effect, keeping order.
    pub fn with_effect(mut self, effect: Ctx) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set (or replace) the output message.
    pub fn with_output(mut self, output: O) -> Self {
        self.output = Some(output);
        self
    }

    /// Map every effect into another context, leaving the output untouched.
    pub fn map_effects<Ctx2>(self, f: impl Fn(Ctx) -> Ctx2) -> Evaluated<O, Ctx2> {
        Evaluated {
            effects: self.effects.into_iter().map(f).collect(),
            output: self.output,
        }
    }
}

impl<O, Ctx> Default for Evaluated<O, Ctx> {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_token_round_trip() {
        let mut token = OpaqueState::new(41_i32);
        assert_eq!(*token.downcast_ref::<i32>(), 41);
        *token.downcast_mut::<i32>() += 1;
        assert_eq!(token.take::<i32>(), 42);
    }

    #[test]
    #[should_panic(expected = "state token does not hold")]
    fn test_state_token_wrong_type_panics() {
        let token = OpaqueState::new("hello".to_string());
        let _ = token.downcast_ref::<i32>();
    }

    #[test]
    fn test_message_token_is_redispatchable() {
        let token = OpaqueMessage::new(vec![1, 2, 3]);
        assert_eq!(token.take::<Vec<i32>>(), vec![1, 2, 3]);
        // A second take produces a fresh copy.
        assert_eq!(token.take::<Vec<i32>>(), vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "message token does not hold")]
    fn test_message_token_wrong_type_panics() {
        let token = OpaqueMessage::new(7_u8);
        let _ = token.take::<u16>();
    }

    #[test]
    fn test_input_output_query_tokens() {
        assert_eq!(OpaqueInput::new(5_usize).take::<usize>(), 5);
        assert_eq!(OpaqueOutput::new("out").take::<&str>(), "out");
        assert_eq!(OpaqueQuery::new(true).take::<bool>(), true);
    }

    #[test]
    fn test_evaluated_builders() {
        let e: Evaluated<i32, &str> = Evaluated::none();
        assert!(e.effects.is_empty());
        assert!(e.output.is_none());

        let e: Evaluated<i32, &str> = Evaluated::output(3).with_effect("save").with_effect("log");
        assert_eq!(e.effects, vec!["save", "log"]);
        assert_eq!(e.output, Some(3));

        let e: Evaluated<i32, &str> = Evaluated::effect("tick").with_output(9);
        assert_eq!(e.effects, vec!["tick"]);
        assert_eq!(e.output, Some(9));
    }

    #[test]
    fn test_evaluated_map_effects() {
        let e: Evaluated<(), i32> = Evaluated::effect(1).with_effect(2);
        let mapped = e.map_effects(|n| n * 10);
        assert_eq!(mapped.effects, vec![10, 20]);
        assert!(mapped.output.is_none());
    }
}

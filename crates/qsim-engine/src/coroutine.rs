//! Stackful coroutine wrapper around `corosensei`, grounding the actor
//! runtime's "reified coroutine" design (DESIGN.md: Cyclic references).
//!
//! Each actor (generator or processor) runs its whole `Run` behavior as one
//! coroutine on a dedicated stack. The coroutine yields a [`SchedEvent`]
//! every time the actor's body calls a suspending [`crate::actor_ctx::ActorCtx`]
//! method, and is resumed with `()` once the engine has incorporated that
//! event and decided it is this actor's turn again.

use std::cell::Cell;

use corosensei::stack::DefaultStack;
use corosensei::{Coroutine, CoroutineResult, Yielder};

use crate::event::SchedEvent;

/// Coroutine stack size. Actor bodies are small, tail-recursive loops with
/// no deep call chains, so this is generous without being wasteful even
/// with thousands of actors.
const STACK_SIZE: usize = 64 * 1024;

thread_local! {
    /// Pointer to the currently-running actor coroutine's `Yielder`.
    ///
    /// Set when a coroutine body starts running and re-installed every time
    /// `suspend` returns, because a different actor's coroutine may have run
    /// on this thread (and overwritten this thread-local) while this one was
    /// parked. The single-threaded engine never runs two coroutines'
    /// bodies concurrently, so there is always exactly one valid pointer to
    /// hold at any instant the body is actually executing.
    static CURRENT_YIELDER: Cell<Option<*const Yielder<(), SchedEvent>>> = const { Cell::new(None) };
}

/// Suspend the calling actor coroutine, yielding `event` to the engine.
///
/// Called from inside [`crate::actor_ctx::ActorCtx`]'s suspending methods.
/// Panics if called outside of a running actor coroutine -- that would be
/// an engine bug, not a user error.
pub(crate) fn suspend(event: SchedEvent) {
    CURRENT_YIELDER.with(|cell| {
        let ptr = cell
            .get()
            .expect("suspend() called outside of an actor coroutine");
        // Safety: `ptr` was captured from a `&Yielder` borrowed for the
        // duration of the enclosing coroutine body, which is still on the
        // stack (we are suspending from inside it, not after it returned).
        let yielder: &Yielder<(), SchedEvent> = unsafe { &*ptr };
        yielder.suspend(event);
        cell.set(Some(ptr));
    });
}

/// What an actor coroutine did when resumed: yielded another event, or ran
/// to completion.
pub enum ActorStep {
    Event(SchedEvent),
    Done,
}

/// One actor's coroutine. `!Send` (inherited from `corosensei::Coroutine`):
/// the engine that owns it never moves it across threads.
pub struct ActorCoroutine {
    coro: Coroutine<(), SchedEvent, ()>,
}

impl ActorCoroutine {
    /// Wrap `body` as a coroutine. `body` is the actor's `Run` closure; it
    /// suspends by calling [`suspend`] (indirectly, via `ActorCtx` methods)
    /// and returns only if the actor's behavior is not an infinite loop
    /// (none of the built-in generators/processors do this, but the
    /// contract permits it).
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        let stack = DefaultStack::new(STACK_SIZE).expect("failed to allocate actor coroutine stack");
        let coro = Coroutine::with_stack(stack, move |yielder: &Yielder<(), SchedEvent>, _input: ()| {
            CURRENT_YIELDER.with(|cell| cell.set(Some(yielder as *const _)));
            body();
        });
        ActorCoroutine { coro }
    }

    /// Resume the coroutine. Must only be called by the engine that owns
    /// this actor's slot.
    pub fn resume(&mut self) -> ActorStep {
        match self.coro.resume(()) {
            CoroutineResult::Yield(event) => ActorStep::Event(event),
            CoroutineResult::Return(()) => ActorStep::Done,
        }
    }
}

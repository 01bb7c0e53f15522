//! The single-threaded cooperative engine: owns virtual time, the timer
//! heap, and the per-queue blocked-waiter lists, and drives every actor
//! coroutine to completion of the run.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::{FxHashMap, FxHashSet};

use qsim_common::{ActorId, QueueHandle, QueueId};

use crate::actor_ctx::ActorCtx;
use crate::coroutine::{ActorCoroutine, ActorStep};
use crate::drain::RequestDrain;
use crate::event::{PendingWait, WaitHandle};
use crate::heap::TimerHeap;

/// The mutable state shared between the [`Engine`] driver loop and every
/// live [`ActorCtx`]. Split out from `Engine` itself so that an actor
/// coroutine's body -- running inside `Engine::resume_and_incorporate` --
/// can borrow `EngineState` through its own `Rc<RefCell<_>>` handle without
/// the engine needing a second, aliasing mutable borrow of the same data at
/// the same time.
pub struct EngineState {
    pub now: f64,
    heap: TimerHeap,
    watched_ids: FxHashSet<QueueId>,
    watched_order: Vec<QueueHandle>,
    blocked_on: FxHashMap<QueueId, VecDeque<WaitHandle>>,
    rng: StdRng,
}

impl EngineState {
    fn new(seed: u64) -> Self {
        EngineState {
            now: 0.0,
            heap: TimerHeap::new(),
            watched_ids: FxHashSet::default(),
            watched_order: Vec::new(),
            blocked_on: FxHashMap::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Register `q` as watched (an output queue of some actor). Idempotent.
    pub fn watch(&mut self, q: &QueueHandle) {
        let id = q.borrow().id();
        if self.watched_ids.insert(id) {
            self.watched_order.push(Rc::clone(q));
        }
    }
}

struct ActorSlot {
    coro: ActorCoroutine,
}

/// The simulation engine. Owns the actor table and the shared
/// [`EngineState`]; drives the main loop described in the specification's
/// scheduler section.
pub struct Engine {
    state: Rc<RefCell<EngineState>>,
    actors: FxHashMap<ActorId, ActorSlot>,
    spawn_order: Vec<ActorId>,
    stats: Vec<Rc<RefCell<dyn RequestDrain>>>,
}

impl Engine {
    pub fn new(seed: u64) -> Self {
        Engine {
            state: Rc::new(RefCell::new(EngineState::new(seed))),
            actors: FxHashMap::default(),
            spawn_order: Vec::new(),
            stats: Vec::new(),
        }
    }

    /// Current virtual time. Only meaningful before/after/between `run`
    /// calls; actor bodies read time via `ActorCtx::now`.
    pub fn now(&self) -> f64 {
        self.state.borrow().now
    }

    /// Mint a fresh [`ActorCtx`] sharing this engine's state. Callers
    /// populate its in/out queues before handing it to [`Engine::spawn`].
    pub fn new_ctx(&self) -> ActorCtx {
        ActorCtx::new(Rc::clone(&self.state))
    }

    /// Register a statistics collector. Collectors are printed in
    /// registration order at termination.
    pub fn register_drain(&mut self, drain: Rc<RefCell<dyn RequestDrain>>) {
        self.stats.push(drain);
    }

    /// Spawn an actor: `body` becomes the coroutine running on `ctx`. Not
    /// resumed yet -- that happens in [`Engine::run`]'s startup handshake.
    pub fn spawn<F>(&mut self, ctx: ActorCtx, body: F) -> ActorId
    where
        F: FnOnce(ActorCtx) + 'static,
    {
        let id = ctx.id();
        let coro = ActorCoroutine::new(move || body(ctx));
        self.actors.insert(id, ActorSlot { coro });
        self.spawn_order.push(id);
        id
    }

    pub fn actor_count(&self) -> usize {
        self.spawn_order.len()
    }

    /// Run the engine until virtual time reaches `threshold`, then print
    /// every registered collector's stats in registration order.
    pub fn run(&mut self, threshold: f64) {
        log::info!(
            "engine starting: {} actors, duration={threshold}",
            self.actor_count()
        );
        self.startup();
        while self.state.borrow().now < threshold {
            self.queue_delivery_pass();
            if !self.timer_pass() {
                log::warn!(
                    "engine deadlock at t={}: no pending timer and no deliverable queue work; \
                     fast-forwarding to the duration threshold",
                    self.state.borrow().now
                );
                self.state.borrow_mut().now = threshold;
                break;
            }
        }
        let now = self.state.borrow().now;
        log::info!(
            "engine terminating at t={now}: {} actors still active",
            self.actors.len()
        );
        for drain in &self.stats {
            drain.borrow().print_stats(now);
        }
    }

    /// Every actor must reach its first suspending operation as its very
    /// first observable behavior, so this resumes each once, in spawn
    /// order, and incorporates its first yielded event.
    fn startup(&mut self) {
        let ids = self.spawn_order.clone();
        for id in ids {
            log::debug!("starting actor {id}");
            self.resume_and_incorporate(id);
        }
    }

    /// For every watched queue (in registration order) with available
    /// items and at least one blocked waiter, wake waiters oldest-to-newest
    /// until the queue runs dry or its waiter list does.
    fn queue_delivery_pass(&mut self) {
        let queues: Vec<QueueHandle> = self.state.borrow().watched_order.clone();
        for q in queues {
            loop {
                if q.borrow().len() == 0 {
                    break;
                }
                let qid = q.borrow().id();
                let waiter = {
                    let mut state = self.state.borrow_mut();
                    match state.blocked_on.get_mut(&qid) {
                        Some(list) => list.pop_front(),
                        None => None,
                    }
                };
                let waiter = match waiter {
                    Some(w) => w,
                    None => break,
                };
                self.rescind(&waiter, Some(qid));
                self.resume_and_incorporate(waiter.waker);
            }
        }
    }

    /// Pop the heap's minimum timer/linked wait and advance `now` to fire.
    /// Returns `false` if the heap was empty (caller treats as deadlock).
    fn timer_pass(&mut self) -> bool {
        let popped = self.state.borrow_mut().heap.pop_min();
        let waiter = match popped {
            Some(w) => w,
            None => return false,
        };
        let fire_time = waiter
            .fire_time
            .expect("only timed waits are ever pushed onto the heap");
        {
            let mut state = self.state.borrow_mut();
            debug_assert!(
                fire_time >= state.now,
                "virtual time must never move backward"
            );
            state.now = fire_time;
        }
        self.rescind(&waiter, None);
        self.resume_and_incorporate(waiter.waker);
        true
    }

    /// Remove `waiter` from every blocked-list it is registered in (except
    /// `skip_queue`, already popped by the caller) and, if it was a timed
    /// wait, from the heap. Used both when a queue delivery fires a
    /// `Block`/`Linked` wait and when a timer fires one -- the side that
    /// did *not* fire must still be rescinded.
    fn rescind(&mut self, waiter: &WaitHandle, skip_queue: Option<QueueId>) {
        let mut state = self.state.borrow_mut();
        for qid in &waiter.queue_refs {
            if Some(*qid) == skip_queue {
                continue;
            }
            if let Some(list) = state.blocked_on.get_mut(qid) {
                list.retain(|w| !Rc::ptr_eq(w, waiter));
            }
        }
        if waiter.fire_time.is_some() {
            state.heap.remove(waiter);
        }
    }

    /// Resume actor `id` and incorporate whatever it yields next (or drop
    /// its slot if it ran to completion). A no-op if the actor already
    /// exited.
    fn resume_and_incorporate(&mut self, id: ActorId) {
        let step = match self.actors.get_mut(&id) {
            Some(slot) => slot.coro.resume(),
            None => return,
        };
        match step {
            ActorStep::Event(event) => {
                let wait = PendingWait::from_event(id, event);
                self.incorporate(wait);
            }
            ActorStep::Done => {
                self.actors.remove(&id);
            }
        }
    }

    fn incorporate(&mut self, wait: WaitHandle) {
        let mut state = self.state.borrow_mut();
        if wait.fire_time.is_some() {
            state.heap.push(Rc::clone(&wait));
        }
        for qid in &wait.queue_refs {
            state
                .blocked_on
                .entry(*qid)
                .or_default()
                .push_back(Rc::clone(&wait));
        }
    }
}

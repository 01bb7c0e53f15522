//! The contract every generator/processor actor runs against: declaring
//! input/output queues, waiting on virtual time, and reading/writing
//! requests. Every suspending method here turns into a [`SchedEvent`]
//! yielded through [`crate::coroutine::suspend`]; the engine resumes the
//! coroutine once it has incorporated that event and it is this actor's
//! turn again.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use qsim_common::{ActorId, QueueHandle, QueueId, Request};

use crate::coroutine::suspend;
use crate::engine::EngineState;
use crate::event::SchedEvent;

/// Per-actor handle into the shared engine. Cheap to clone (just an `Rc`
/// bump); callers normally create one via [`crate::engine::Engine::new_ctx`],
/// populate its queues, then hand it to [`crate::engine::Engine::spawn`].
#[derive(Clone)]
pub struct ActorCtx {
    id: ActorId,
    state: Rc<RefCell<EngineState>>,
    in_queues: Rc<RefCell<Vec<QueueHandle>>>,
    out_queues: Rc<RefCell<Vec<QueueHandle>>>,
}

impl ActorCtx {
    pub(crate) fn new(state: Rc<RefCell<EngineState>>) -> Self {
        ActorCtx {
            id: ActorId::next(),
            state,
            in_queues: Rc::new(RefCell::new(Vec::new())),
            out_queues: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Current virtual time.
    pub fn now(&self) -> f64 {
        self.state.borrow().now
    }

    /// Append an input queue. Input queues are declared in decreasing
    /// priority -- index 0 is consulted first by every read operation.
    pub fn add_in_queue(&self, q: QueueHandle) {
        self.in_queues.borrow_mut().push(q);
    }

    /// Append an output queue, registering it with the engine as watched
    /// (idempotent: watching the same [`QueueId`] twice is a no-op).
    pub fn add_out_queue(&self, q: QueueHandle) {
        self.state.borrow_mut().watch(&q);
        self.out_queues.borrow_mut().push(q);
    }

    /// Run `f` with the engine's shared RNG. Used by generators for
    /// uniform-random dispatch and by processors/distributions that need
    /// a reproducible source of randomness tied to the run's seed.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut dyn rand::RngCore) -> R) -> R {
        let mut state = self.state.borrow_mut();
        f(state.rng())
    }

    /// Uniformly sample an index in `[0, n)` via the shared engine RNG.
    /// Panics if `n == 0`.
    pub fn random_index(&self, n: usize) -> usize {
        assert!(n > 0, "random_index called with an empty range");
        self.with_rng(|rng| rng.random_range(0..n))
    }

    /// Suspend for exactly `d >= 0` units of virtual time.
    pub fn wait(&self, d: f64) {
        debug_assert!(d >= 0.0, "Wait duration must be non-negative, got {d}");
        let fire_time = self.now() + d;
        suspend(SchedEvent::Timer { fire_time });
    }

    /// Wait up to `d` units of virtual time for an item on `in_queues[0]`,
    /// whichever comes first. `d < 0` means "no timeout" -- block solely
    /// on the queue, and never create a timer.
    ///
    /// Returns `(fired_by_timer, request)`. A `true`/`None` result means
    /// the timeout elapsed with nothing arriving; `false`/`Some(_)` means
    /// a request arrived (instantly, or after blocking).
    pub fn wait_interruptible(&self, d: f64) -> (bool, Option<Request>) {
        if let Some(req) = self.in_queues.borrow()[0].borrow_mut().dequeue() {
            return (false, Some(req));
        }
        if d < 0.0 {
            return (false, Some(self.read_in_queue_i(0)));
        }
        let fire_time = self.now() + d;
        let q0 = self.in_queues.borrow()[0].borrow().id();
        suspend(SchedEvent::Linked {
            fire_time,
            queues: vec![q0],
        });
        if let Some(req) = self.in_queues.borrow()[0].borrow_mut().dequeue() {
            (false, Some(req))
        } else if self.now() == fire_time {
            (true, None)
        } else {
            (false, None)
        }
    }

    /// Dequeue from `in_queues[i]`, blocking (on the full input set, as the
    /// reference implementation does) and retrying until something is
    /// available.
    pub fn read_in_queue_i(&self, i: usize) -> Request {
        loop {
            if let Some(req) = self.in_queues.borrow()[i].borrow_mut().dequeue() {
                return req;
            }
            self.block_on_all_in_queues();
        }
    }

    /// Convenience for `read_in_queue_i(0)`.
    pub fn read_in_queue(&self) -> Request {
        self.read_in_queue_i(0)
    }

    /// Scan input queues in declared (priority) order; dequeue and return
    /// the first non-empty one along with its index. Blocks on the full
    /// set and retries if all are empty.
    pub fn read_in_queues(&self) -> (Request, usize) {
        loop {
            for (i, q) in self.in_queues.borrow().iter().enumerate() {
                if let Some(req) = q.borrow_mut().dequeue() {
                    return (req, i);
                }
            }
            self.block_on_all_in_queues();
        }
    }

    /// Sample uniformly among the currently non-empty input queues.
    /// Blocks on the full set and retries if all are empty.
    pub fn read_in_queues_rand(&self) -> (Request, usize) {
        loop {
            let candidates: Vec<usize> = self
                .in_queues
                .borrow()
                .iter()
                .enumerate()
                .filter(|(_, q)| !q.borrow().is_empty())
                .map(|(i, _)| i)
                .collect();
            if !candidates.is_empty() {
                let pick = candidates[self.random_index(candidates.len())];
                let req = self.in_queues.borrow()[pick]
                    .borrow_mut()
                    .dequeue()
                    .expect("index was just observed non-empty");
                return (req, pick);
            }
            self.block_on_all_in_queues();
        }
    }

    /// Prefer `in_queues[0]`; if empty, sample uniformly among the rest
    /// that are non-empty. Blocks on the full set and retries if all are
    /// empty.
    pub fn read_in_queues_rand_local_pr(&self) -> (Request, usize) {
        loop {
            if let Some(req) = self.in_queues.borrow()[0].borrow_mut().dequeue() {
                return (req, 0);
            }
            let candidates: Vec<usize> = self
                .in_queues
                .borrow()
                .iter()
                .enumerate()
                .skip(1)
                .filter(|(_, q)| !q.borrow().is_empty())
                .map(|(i, _)| i)
                .collect();
            if !candidates.is_empty() {
                let pick = candidates[self.random_index(candidates.len())];
                let req = self.in_queues.borrow()[pick]
                    .borrow_mut()
                    .dequeue()
                    .expect("index was just observed non-empty");
                return (req, pick);
            }
            self.block_on_all_in_queues();
        }
    }

    fn block_on_all_in_queues(&self) {
        let queues: Vec<QueueId> = self
            .in_queues
            .borrow()
            .iter()
            .map(|q| q.borrow().id())
            .collect();
        suspend(SchedEvent::Block { queues });
    }

    /// Enqueue onto `out_queues[i]`. Never suspends.
    pub fn write_out_queue_i(&self, req: Request, i: usize) {
        self.out_queues.borrow()[i].borrow_mut().enqueue(req);
    }

    /// Enqueue onto `out_queues[0]`. Never suspends.
    pub fn write_out_queue(&self, req: Request) {
        self.write_out_queue_i(req, 0);
    }

    /// Enqueue onto `in_queues[i]` -- used by feedback loops such as TS's
    /// quantum re-enqueue. Never suspends.
    pub fn write_in_queue_i(&self, req: Request, i: usize) {
        self.in_queues.borrow()[i].borrow_mut().enqueue(req);
    }

    /// Enqueue onto `in_queues[0]`. Never suspends.
    pub fn write_in_queue(&self, req: Request) {
        self.write_in_queue_i(req, 0);
    }

    pub fn in_queue_len(&self, i: usize) -> usize {
        self.in_queues.borrow()[i].borrow().len()
    }

    pub fn out_queue_len(&self, i: usize) -> usize {
        self.out_queues.borrow()[i].borrow().len()
    }

    pub fn all_in_queue_lens(&self) -> Vec<usize> {
        self.in_queues.borrow().iter().map(|q| q.borrow().len()).collect()
    }

    pub fn all_out_queue_lens(&self) -> Vec<usize> {
        self.out_queues.borrow().iter().map(|q| q.borrow().len()).collect()
    }

    pub fn in_queue_count(&self) -> usize {
        self.in_queues.borrow().len()
    }

    pub fn out_queue_count(&self) -> usize {
        self.out_queues.borrow().len()
    }
}

//! The three shapes an actor coroutine can suspend with, and the engine's
//! unified bookkeeping record for a pending wait.

use std::cell::Cell;
use std::rc::Rc;

use qsim_common::{ActorId, QueueId};

/// What an actor coroutine yields to the engine when it suspends.
///
/// `Linked` is the conjunction of a timer and a block: it wakes on whichever
/// fires first, and the engine cancels the other side.
#[derive(Debug, Clone)]
pub enum SchedEvent {
    Timer { fire_time: f64 },
    Block { queues: Vec<QueueId> },
    Linked { fire_time: f64, queues: Vec<QueueId> },
}

/// A single pending wait. `Timer`, `Block`, and `Linked` are all represented
/// by this one record rather than three separate types, so a `Linked` wait
/// is literally one shared handle the engine pushes into both the timer
/// heap and every queue's blocked-list -- waking (or cancelling) it from
/// either side is then just "remove this handle from the other structure."
pub struct PendingWait {
    pub waker: ActorId,
    pub fire_time: Option<f64>,
    pub queue_refs: Vec<QueueId>,
    /// Current position in the timer heap's backing array, kept live by the
    /// heap's swap callback. `None` when this wait is not (or no longer) in
    /// the heap -- always the case for a pure `Block` wait.
    pub heap_index: Cell<Option<usize>>,
}

/// Shared handle to a [`PendingWait`]. The same `Rc` is cloned into the
/// heap slot and into each queue's blocked-list for a `Linked` wait.
pub type WaitHandle = Rc<PendingWait>;

impl PendingWait {
    pub fn from_event(waker: ActorId, event: SchedEvent) -> WaitHandle {
        let (fire_time, queue_refs) = match event {
            SchedEvent::Timer { fire_time } => (Some(fire_time), Vec::new()),
            SchedEvent::Block { queues } => (None, queues),
            SchedEvent::Linked { fire_time, queues } => (Some(fire_time), queues),
        };
        Rc::new(PendingWait {
            waker,
            fire_time,
            queue_refs,
            heap_index: Cell::new(None),
        })
    }
}

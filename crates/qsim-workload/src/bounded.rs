//! Bounded-buffer admission: a two-processor pair gating access to a
//! downstream queue of fixed capacity.
//!
//! Per the expanded spec's Open Question resolution, there is no request
//! "coloring" -- admission is a pure threshold check on the downstream
//! queue's length, and dropped requests go to a drain distinct from the
//! accepted-path drain so drop-rate statistics are queryable independently.

use std::cell::RefCell;
use std::rc::Rc;

use qsim_engine::{ActorCtx, RequestDrain};

/// Upstream half of the pair. Reads from its own input queue; forwards
/// onto the downstream queue (already wired as `ctx`'s sole output queue)
/// if `downstream.len() < buffer_size`, else routes the request straight
/// to `drop_drain`. Admission never adds latency -- it is a gate, not a
/// service stage.
pub fn bounded_processor_body(
    ctx: ActorCtx,
    buffer_size: usize,
    drop_drain: Rc<RefCell<dyn RequestDrain>>,
) {
    loop {
        let req = ctx.read_in_queue_i(0);
        if ctx.out_queue_len(0) < buffer_size {
            ctx.write_out_queue_i(req, 0);
        } else {
            drop_drain.borrow_mut().terminate_req(&req, ctx.now());
        }
    }
}

/// Downstream half of the pair: a plain RTC processor draining the
/// bounded queue into `req_drain`.
pub fn bounded_processor2_body(ctx: ActorCtx, ctx_cost: f64, req_drain: Rc<RefCell<dyn RequestDrain>>) {
    crate::rtc::rtc_body(ctx, ctx_cost, req_drain);
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_common::{Queue, Request, RequestVariant};
    use qsim_engine::Engine;
    use std::rc::Rc as StdRc;

    struct RecordingDrain {
        delays: Vec<f64>,
    }
    impl RequestDrain for RecordingDrain {
        fn terminate_req(&mut self, req: &Request, now: f64) {
            self.delays.push(req.delay(now));
        }
        fn print_stats(&self, _now: f64) {}
    }

    #[test]
    fn admits_while_downstream_below_capacity() {
        let mut engine = Engine::new(1);
        let up_q = Queue::new();
        let down_q = Queue::new();
        up_q.borrow_mut()
            .enqueue(Request::new(0.0, 1.0, RequestVariant::Plain));

        let drop_drain = Rc::new(RefCell::new(RecordingDrain { delays: Vec::new() }));
        let ctx = engine.new_ctx();
        ctx.add_in_queue(StdRc::clone(&up_q));
        ctx.add_out_queue(StdRc::clone(&down_q));
        let d = Rc::clone(&drop_drain);
        engine.spawn(ctx, move |ctx| bounded_processor_body(ctx, 1, d));

        engine.run(1.0);
        assert_eq!(down_q.borrow().len(), 1);
        assert!(drop_drain.borrow().delays.is_empty());
    }

    #[test]
    fn drops_when_downstream_is_at_capacity() {
        let mut engine = Engine::new(1);
        let up_q = Queue::new();
        let down_q = Queue::new();
        // downstream already holds one item -- at the buffer_size=1 cap.
        down_q
            .borrow_mut()
            .enqueue(Request::new(0.0, 1.0, RequestVariant::Plain));
        up_q.borrow_mut()
            .enqueue(Request::new(0.0, 1.0, RequestVariant::Plain));

        let drop_drain = Rc::new(RefCell::new(RecordingDrain { delays: Vec::new() }));
        let ctx = engine.new_ctx();
        ctx.add_in_queue(StdRc::clone(&up_q));
        ctx.add_out_queue(StdRc::clone(&down_q));
        let d = Rc::clone(&drop_drain);
        engine.spawn(ctx, move |ctx| bounded_processor_body(ctx, 1, d));

        engine.run(1.0);
        assert_eq!(down_q.borrow().len(), 1, "downstream length must never exceed buffer_size");
        assert_eq!(drop_drain.borrow().delays.len(), 1);
    }

    #[test]
    fn downstream_half_is_plain_rtc() {
        let mut engine = Engine::new(1);
        let q = Queue::new();
        q.borrow_mut()
            .enqueue(Request::new(0.0, 4.0, RequestVariant::Plain));
        let drain = Rc::new(RefCell::new(RecordingDrain { delays: Vec::new() }));
        let ctx = engine.new_ctx();
        ctx.add_in_queue(StdRc::clone(&q));
        let d = Rc::clone(&drain);
        engine.spawn(ctx, move |ctx| bounded_processor2_body(ctx, 0.0, d));

        engine.run(10.0);
        assert_eq!(drain.borrow().delays, vec![4.0]);
    }
}

//! Run-to-completion processor: serve each request's full residual in one
//! go, no preemption.

use std::cell::RefCell;
use std::rc::Rc;

use qsim_common::RequestVariant;
use qsim_engine::{ActorCtx, RequestDrain};

/// `loop { r = read; wait(r.service_time + ctx_cost); drain(r) }`, plus the
/// monitor bookkeeping a `Monitor`-variant request needs on its way out.
pub fn rtc_body(ctx: ActorCtx, ctx_cost: f64, drain: Rc<RefCell<dyn RequestDrain>>) {
    loop {
        let mut req = ctx.read_in_queue_i(0);
        ctx.wait(req.service_time + ctx_cost);
        if matches!(req.variant, RequestVariant::Monitor { .. }) {
            req.set_final_len(ctx.in_queue_len(0));
        }
        drain.borrow_mut().terminate_req(&req, ctx.now());
    }
}

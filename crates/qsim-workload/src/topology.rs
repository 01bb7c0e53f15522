//! Topology builders: wire generators and processors onto queues per the
//! three shapes the CLI selects with `-topo`. Kept here (not in
//! `qsim-cli`) because wiring is a workload concern -- the CLI only picks
//! *which* builder to call and with what parameters.

use std::cell::RefCell;
use std::rc::Rc;

use qsim_common::Queue;
use qsim_dist::Distribution;
use qsim_engine::{ActorCtx, Engine, RequestDrain};

use crate::bounded::{bounded_processor2_body, bounded_processor_body};
use crate::generator::{generator_body, Dispatch, ServiceSource};
use crate::ps::ps_body;
use crate::request_factory::RequestFactory;
use crate::rtc::rtc_body;
use crate::ts::ts_body;

/// Which processor discipline every queue-consuming actor in a built
/// topology runs.
#[derive(Clone, Copy)]
pub enum ProcessorKind {
    Rtc,
    Ts { quantum: f64 },
    Ps { worker_count: usize },
}

fn spawn_processor(
    engine: &mut Engine,
    ctx: ActorCtx,
    ctx_cost: f64,
    proc_kind: ProcessorKind,
    drain: Rc<RefCell<dyn RequestDrain>>,
) {
    match proc_kind {
        ProcessorKind::Rtc => {
            engine.spawn(ctx, move |ctx| rtc_body(ctx, ctx_cost, drain));
        }
        ProcessorKind::Ts { quantum } => {
            engine.spawn(ctx, move |ctx| ts_body(ctx, quantum, ctx_cost, drain));
        }
        ProcessorKind::Ps { worker_count } => {
            engine.spawn(ctx, move |ctx| ps_body(ctx, worker_count, ctx_cost, drain));
        }
    }
}

/// `-topo 0`: a single shared input queue. For `Rtc`/`Ts`, `cores`
/// independent processors compete for it (service order follows the
/// engine's FIFO blocked-waiter policy, §4.5). For `Ps`, `cores` is not a
/// processor count at all -- PS realizes its concurrency internally via
/// `worker_count`, so exactly one PS actor is spawned, sharing the queue
/// with nobody (mirrors the reference `single_queue.go`'s single
/// `PSProcessor` with `SetWorkerCount(cores)`, as opposed to RTC/TS's N
/// separate processor actors).
pub fn build_single_queue(
    engine: &mut Engine,
    cores: usize,
    ctx_cost: f64,
    proc_kind: ProcessorKind,
    drain: Rc<RefCell<dyn RequestDrain>>,
    wait_time: Box<dyn Distribution>,
    service: ServiceSource,
    factory: RequestFactory,
) {
    let q = Queue::new();

    let gen_ctx = engine.new_ctx();
    gen_ctx.add_out_queue(Rc::clone(&q));
    engine.spawn(gen_ctx, move |ctx| {
        generator_body(ctx, wait_time, service, Dispatch::RoundRobin, factory)
    });

    let processor_count = match proc_kind {
        ProcessorKind::Ps { .. } => 1,
        ProcessorKind::Rtc | ProcessorKind::Ts { .. } => cores,
    };
    for _ in 0..processor_count {
        let ctx = engine.new_ctx();
        ctx.add_in_queue(Rc::clone(&q));
        spawn_processor(engine, ctx, ctx_cost, proc_kind, Rc::clone(&drain));
    }
}

/// `-topo 1`: one queue per processor, no sharing. The generator spreads
/// requests across the `cores` queues per `dispatch`.
pub fn build_per_queue(
    engine: &mut Engine,
    cores: usize,
    ctx_cost: f64,
    proc_kind: ProcessorKind,
    drain: Rc<RefCell<dyn RequestDrain>>,
    wait_time: Box<dyn Distribution>,
    service: ServiceSource,
    dispatch: Dispatch,
    factory: RequestFactory,
) {
    let queues: Vec<_> = (0..cores).map(|_| Queue::new()).collect();

    let gen_ctx = engine.new_ctx();
    for q in &queues {
        gen_ctx.add_out_queue(Rc::clone(q));
    }
    engine.spawn(gen_ctx, move |ctx| {
        generator_body(ctx, wait_time, service, dispatch, factory)
    });

    for q in queues {
        let ctx = engine.new_ctx();
        ctx.add_in_queue(q);
        spawn_processor(engine, ctx, ctx_cost, proc_kind, Rc::clone(&drain));
    }
}

/// `-topo 2`: generator -> bounded upstream gate -> downstream RTC drain.
/// `req_drain` records accepted-and-served requests; `drop_drain` records
/// requests the gate refused because the downstream queue was already at
/// `buffer_size`.
pub fn build_bounded(
    engine: &mut Engine,
    buffer_size: usize,
    ctx_cost: f64,
    req_drain: Rc<RefCell<dyn RequestDrain>>,
    drop_drain: Rc<RefCell<dyn RequestDrain>>,
    wait_time: Box<dyn Distribution>,
    service: ServiceSource,
    factory: RequestFactory,
) {
    let up_q = Queue::new();
    let down_q = Queue::new();

    let gen_ctx = engine.new_ctx();
    gen_ctx.add_out_queue(Rc::clone(&up_q));
    engine.spawn(gen_ctx, move |ctx| {
        generator_body(ctx, wait_time, service, Dispatch::RoundRobin, factory)
    });

    let up_ctx = engine.new_ctx();
    up_ctx.add_in_queue(Rc::clone(&up_q));
    up_ctx.add_out_queue(Rc::clone(&down_q));
    engine.spawn(up_ctx, move |ctx| {
        bounded_processor_body(ctx, buffer_size, drop_drain)
    });

    let down_ctx = engine.new_ctx();
    down_ctx.add_in_queue(down_q);
    engine.spawn(down_ctx, move |ctx| {
        bounded_processor2_body(ctx, ctx_cost, req_drain)
    });
}

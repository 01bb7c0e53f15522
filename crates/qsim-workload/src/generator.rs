//! Generator actor bodies: synthesize requests, spaced by an interarrival
//! distribution, and route them to one or more output queues.

use qsim_dist::{Distribution, PlaybackTable};
use qsim_engine::ActorCtx;

use crate::request_factory::RequestFactory;

/// How a generator picks which output queue a freshly-minted request goes
/// to. `Playback`'s CPU choice is made by the [`PlaybackTable`] itself (it
/// is inherently two-dimensional), so it is not a `Dispatch` variant --
/// see [`ServiceSource::Playback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    RoundRobin,
    UniformRandom,
}

/// Where a generator's service-time sample comes from.
pub enum ServiceSource {
    Distribution(Box<dyn Distribution>),
    Playback(PlaybackTable),
}

/// Run a generator's infinite cycle: sample a service time, mint a
/// request, dispatch it to an output queue, then wait for the next
/// interarrival sample. Never returns -- the engine drives it forever,
/// same as every built-in generator/processor.
pub fn generator_body(
    ctx: ActorCtx,
    wait_time: Box<dyn Distribution>,
    service: ServiceSource,
    dispatch: Dispatch,
    factory: RequestFactory,
) {
    let mut cycle: u64 = 0;
    loop {
        let (queue_idx, service_time) = match &service {
            ServiceSource::Distribution(dist) => {
                let s = ctx.with_rng(|rng| dist.sample(rng));
                let n = ctx.out_queue_count();
                let idx = match dispatch {
                    Dispatch::RoundRobin => (cycle as usize) % n,
                    Dispatch::UniformRandom => ctx.random_index(n),
                };
                (idx, s)
            }
            ServiceSource::Playback(table) => ctx.with_rng(|rng| table.sample(rng)),
        };

        let mut req = factory.mint(ctx.now(), service_time);
        if matches!(req.variant, qsim_common::RequestVariant::Monitor { .. }) {
            req.set_init_len(ctx.out_queue_len(queue_idx));
        }
        ctx.write_out_queue_i(req, queue_idx);

        cycle = cycle.wrapping_add(1);
        let delay = ctx.with_rng(|rng| wait_time.sample(rng));
        ctx.wait(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_common::{Queue, RequestVariant};
    use qsim_dist::Deterministic;
    use qsim_engine::Engine;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn round_robin_cycles_through_out_queues_in_order() {
        let mut engine = Engine::new(1);
        let queues: Vec<_> = (0..3).map(|_| Queue::new()).collect();
        let ctx = engine.new_ctx();
        for q in &queues {
            ctx.add_out_queue(Rc::clone(q));
        }
        engine.spawn(ctx, |ctx| {
            generator_body(
                ctx,
                Box::new(Deterministic::new(1.0)),
                ServiceSource::Distribution(Box::new(Deterministic::new(1.0))),
                Dispatch::RoundRobin,
                RequestFactory::Plain,
            )
        });
        engine.run(3.5);
        let lens: Vec<usize> = queues.iter().map(|q| q.borrow().len()).collect();
        assert_eq!(lens, vec![1, 1, 1]);
    }

    #[test]
    fn monitor_requests_record_init_len_before_enqueue() {
        let mut engine = Engine::new(1);
        let q = Queue::new();
        q.borrow_mut()
            .enqueue(stub_request());
        let ctx = engine.new_ctx();
        ctx.add_out_queue(Rc::clone(&q));
        engine.spawn(ctx, |ctx| {
            generator_body(
                ctx,
                Box::new(Deterministic::new(100.0)),
                ServiceSource::Distribution(Box::new(Deterministic::new(1.0))),
                Dispatch::RoundRobin,
                RequestFactory::Monitor,
            )
        });
        engine.run(0.5);
        // One pre-seeded item, then our minted Monitor request enqueued
        // after observing a length of 1.
        assert_eq!(q.borrow().len(), 2);
        let items: Vec<_> = std::iter::from_fn(|| q.borrow_mut().dequeue()).collect();
        let minted = items
            .into_iter()
            .find(|r| matches!(r.variant, RequestVariant::Monitor { .. }))
            .unwrap();
        match minted.variant {
            RequestVariant::Monitor { init_len, .. } => assert_eq!(init_len, 1),
            _ => unreachable!(),
        }
    }

    fn stub_request() -> qsim_common::Request {
        qsim_common::Request::new(0.0, 1.0, RequestVariant::Plain)
    }
}

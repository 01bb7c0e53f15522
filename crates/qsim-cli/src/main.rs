//! The `qsim` binary: parses topology flags, builds the selected network,
//! and runs it to the requested virtual-time horizon.
//!
//! Topology selection and argument parsing are the distilled spec's
//! declared "external collaborators" -- this binary is the concrete
//! realization the expanded spec's ambient stack calls for, living
//! entirely in `qsim-cli` so `qsim-workload`/`qsim-engine` stay free of
//! CLI concerns.

mod config;

use std::cell::RefCell;
use std::process;
use std::rc::Rc;

use clap::Parser;

use qsim_dist::{Bimodal, Deterministic, Distribution, Exponential, PlaybackTable};
use qsim_engine::Engine;
use qsim_stats::ExactStats;
use qsim_workload::{
    build_bounded, build_per_queue, build_single_queue, Dispatch, ProcessorKind, RequestFactory,
    ServiceSource,
};

use config::{Cli, ConfigError};

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .parse_filters(&cli.log_level)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ConfigError> {
    if cli.duration < 0.0 {
        return Err(ConfigError::NegativeDuration(cli.duration));
    }
    if !(0..=2).contains(&cli.topo) {
        return Err(ConfigError::UnknownTopology(cli.topo));
    }
    if !(0..=3).contains(&cli.gen_type) {
        return Err(ConfigError::UnknownGenType(cli.gen_type));
    }
    if !(0..=1).contains(&cli.proc_type) {
        return Err(ConfigError::UnknownProcType(cli.proc_type));
    }

    let service = build_service_source(&cli)?;
    let proc_kind = match cli.proc_type {
        0 => ProcessorKind::Rtc,
        1 => ProcessorKind::Ps {
            worker_count: cli.cores,
        },
        _ => unreachable!("validated above"),
    };

    let mut engine = Engine::new(cli.seed);
    log::info!(
        "building topo={} cores={} duration={} procType={}",
        cli.topo,
        cli.cores,
        cli.duration,
        cli.proc_type
    );

    match cli.topo {
        0 => {
            let drain = Rc::new(RefCell::new(ExactStats::new("accepted")));
            engine.register_drain(drain.clone());
            build_single_queue(
                &mut engine,
                cli.cores,
                cli.ctx_cost,
                proc_kind,
                drain,
                Box::new(Exponential::new(cli.lambda)),
                service,
                RequestFactory::Plain,
            );
        }
        1 => {
            let drain = Rc::new(RefCell::new(ExactStats::new("accepted")));
            engine.register_drain(drain.clone());
            build_per_queue(
                &mut engine,
                cli.cores,
                cli.ctx_cost,
                proc_kind,
                drain,
                Box::new(Exponential::new(cli.lambda)),
                service,
                Dispatch::RoundRobin,
                RequestFactory::Plain,
            );
        }
        2 => {
            let req_drain = Rc::new(RefCell::new(ExactStats::new("accepted")));
            let drop_drain = Rc::new(RefCell::new(ExactStats::new("dropped")));
            engine.register_drain(req_drain.clone());
            engine.register_drain(drop_drain.clone());
            build_bounded(
                &mut engine,
                cli.buffer_size,
                cli.ctx_cost,
                req_drain,
                drop_drain,
                Box::new(Exponential::new(cli.lambda)),
                service,
                RequestFactory::Plain,
            );
        }
        _ => unreachable!("validated above"),
    }

    engine.run(cli.duration);
    let now = engine.now();
    log::info!("simulation complete: now={now}");
    Ok(())
}

fn build_service_source(cli: &Cli) -> Result<ServiceSource, ConfigError> {
    if !cli.playback_files.is_empty() {
        let table = PlaybackTable::load_from_files(&cli.playback_files).map_err(|e| {
            let source = match e.source {
                qsim_dist::playback::PlaybackLoadErrorKind::Io(io_err) => io_err,
                qsim_dist::playback::PlaybackLoadErrorKind::InvalidLine(line) => {
                    std::io::Error::new(std::io::ErrorKind::InvalidData, format!("non-integer line: {line:?}"))
                }
            };
            ConfigError::PlaybackFileUnreadable { path: e.path, source }
        })?;
        return Ok(ServiceSource::Playback(table));
    }

    let dist: Box<dyn Distribution> = match cli.gen_type {
        0 => Box::new(Exponential::new(cli.mu)),
        1 => Box::new(Deterministic::new(1.0 / cli.mu)),
        2 => Box::new(bimodal_for(cli.mu, 0.9)),
        3 => Box::new(bimodal_for(cli.mu, 0.999)),
        _ => return Err(ConfigError::UnknownGenType(cli.gen_type)),
    };
    Ok(ServiceSource::Distribution(dist))
}

/// `p_small` is the probability mass on the *small* mode (`-genType`'s
/// `MBimodal(0.9)`/`MBimodal(0.999)`). `small`/`large` are picked so the
/// sample mean is exactly `1/mu`, matching every other `-genType`'s
/// service distribution mean.
fn bimodal_for(mu: f64, p_small: f64) -> Bimodal {
    let target_mean = 1.0 / mu;
    let small = target_mean * 0.1;
    let large = (target_mean - p_small * small) / (1.0 - p_small);
    Bimodal::new(p_small, small, large)
}

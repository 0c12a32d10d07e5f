use std::sync::atomic::AtomicBool;
use std::sync::mpsc;

use indicatif::{ProgressBar, ProgressStyle};
use resonance_sim::{
    run_ensemble, ChannelRecorder, EnsembleSpec, FeedbackConfig, InitialState, SimConfig,
    Simulation, Snapshot,
};
use tracing_subscriber::EnvFilter;

const N_TEMPS: usize = 12;
const N_REALIZATIONS: usize = 4;

fn progress_bar(len: u64, msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{msg} [{bar:40}] {pos}/{len} [{elapsed_precise} < {eta_precise}, {per_sec}]",
        )
        .unwrap()
        .progress_chars("=> "),
    );
    pb.set_message(msg);
    pb
}

/// Usage: `cargo run --release --example run -- [config.json] [-i u|r] [--scan]`
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mut scan = false;
    let mut initial_state = None;
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scan" => scan = true,
            "-i" => {
                let value = args.next().expect("-i needs 'u' or 'r'");
                initial_state = Some(InitialState::try_from(value.as_str()).unwrap());
            }
            _ => path = Some(arg),
        }
    }

    let mut config: SimConfig = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).expect("read config");
            serde_json::from_str(&text).expect("parse config")
        }
        None => SimConfig {
            size: 64,
            epochs: 2_000,
            record_video: true,
            feedback: FeedbackConfig {
                gain: 0.5,
                amplitude: 0.3,
                frequency: 0.01,
                ..FeedbackConfig::default()
            },
            ..SimConfig::default()
        },
    };
    if let Some(init) = initial_state {
        config.initial_state = init;
    }

    let interrupted = AtomicBool::new(false);

    if scan {
        let temperatures: Vec<f64> = (0..N_TEMPS)
            .map(|i| 1.0 + 3.0 * i as f64 / (N_TEMPS - 1) as f64)
            .collect();
        let spec = EnsembleSpec {
            temperatures,
            n_realizations: N_REALIZATIONS,
        };
        let pb = progress_bar(config.epochs * (N_TEMPS * N_REALIZATIONS) as u64, "epochs");
        let points = run_ensemble(&config, &spec, &interrupted, &|_| pb.inc(1)).unwrap();
        pb.finish();

        println!("{:>8} {:>10} {:>10} {:>10} {:>10}", "T", "<|m|>", "C", "A", "lag");
        for p in points {
            let o = &p.observables;
            println!(
                "{:>8.3} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                p.temperature,
                o.abs_mags,
                o.heat_capacity,
                o.resonance.amplitude,
                o.resonance.phase_lag
            );
        }
        return;
    }

    let (tx, rx) = mpsc::sync_channel::<Snapshot>(4);
    let consumer = std::thread::spawn(move || {
        rx.iter()
            .map(|frame| (frame.epoch, frame.mean_magnetization()))
            .collect::<Vec<_>>()
    });

    let mut sim = Simulation::new(config.clone()).unwrap();
    let pb = progress_bar(config.epochs, "epochs");
    let mut recorder = ChannelRecorder::new(tx);
    let summary = sim.run(&mut recorder, &interrupted, &|_| pb.inc(1)).unwrap();
    pb.finish();
    drop(recorder);

    let frames = consumer.join().unwrap();
    println!("frames: {}", frames.len());
    for (epoch, m) in frames.iter().step_by((frames.len() / 10).max(1)) {
        println!("  epoch {epoch:>8}  m = {m:+.4}");
    }
    println!("{:.<25}{:.2}", "Net Magnetization [%]:", summary.observables.net_magnetization);
    println!("{:.<25}{:.2}", "Heat Capacity [AU]:", summary.observables.heat_capacity);
    println!(
        "{:.<25}{:.4}",
        "Response amplitude:", summary.observables.resonance.amplitude
    );
}

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use washer_core::mocks::NullOutputs;
use washer_core::{Frame, GateGroup, WasherCfg, build_washer, classify};
use washer_hardware::SimulatedPanel;
use washer_traits::{AnalogChannel, ButtonId, ManualClock};

// Controller ticking through an idle machine with a noisy panel.
fn bench_idle_tick(c: &mut Criterion) {
    c.bench_function("tick_idle_5ms", |b| {
        b.iter_batched(
            || {
                let clock = ManualClock::new();
                let panel = SimulatedPanel::new();
                let h = panel.handle();
                h.set_ripple(0.02);
                let mut w = build_washer(
                    panel,
                    NullOutputs,
                    WasherCfg::default(),
                    Some(Box::new(clock.clone())),
                )
                .expect("build");
                // Arm the buttons, then power on.
                w.tick();
                clock.advance(w.poll_interval());
                h.tap(ButtonId::Power);
                w.tick();
                (w, clock)
            },
            |(mut w, clock)| {
                for _ in 0..1000 {
                    black_box(w.tick());
                    clock.advance(w.poll_interval());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_frame_processing(c: &mut Criterion) {
    let frames: Vec<Frame> = (0..256)
        .map(|i| {
            let x = (i as f32) / 255.0;
            Frame::from_values(&[
                (AnalogChannel::Load, x),
                (AnalogChannel::Light, 1.0 - x),
                (AnalogChannel::WaterTemperature, 0.2),
            ])
        })
        .collect();
    c.bench_function("gate_and_classify_256", |b| {
        b.iter(|| {
            let mut gates = GateGroup::new([0.05, 5.0, 15.0]);
            let mut reported = 0u32;
            for f in &frames {
                let load = f.get(AnalogChannel::Load);
                if gates.observe([
                    load,
                    f.get(AnalogChannel::WaterTemperature).map(|v| v * 165.0),
                    f.get(AnalogChannel::Light).map(|v| v * 100.0),
                ]) {
                    reported += 1;
                }
                if let Some(l) = load {
                    black_box(classify(l));
                }
            }
            black_box(reported)
        })
    });
}

criterion_group!(benches, bench_idle_tick, bench_frame_processing);
criterion_main!(benches);

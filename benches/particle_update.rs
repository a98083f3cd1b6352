use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use particlize_sim::config::{EmissionConfig, RuntimeConfig};
use particlize_sim::{ParticleEffect, ParticleSystem, ParticlizeConfig, PixelBuffer};

const PARTICLES: usize = 15_000;

fn looping_config(parallel_threshold: usize) -> ParticlizeConfig {
    let mut config = ParticlizeConfig {
        emission: EmissionConfig {
            particle_count: PARTICLES,
            ..EmissionConfig::instant_explosion()
        },
        runtime: RuntimeConfig {
            parallel_threshold,
            ..RuntimeConfig::default()
        },
        seed: Some(42),
        ..ParticlizeConfig::default()
    };
    // boucle infinie : l'effet ne se termine jamais pendant la mesure
    config.animation.repeat_count = -1;
    config
}

fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut pixels = PixelBuffer::filled(width, height, [0, 0, 0, 255]);
    for y in 0..height {
        for x in 0..width {
            pixels.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, 128, 255]);
        }
    }
    pixels
}

fn bench_update(c: &mut Criterion) {
    let pixels = gradient(200, 150);

    for (name, effect, threshold) in [
        ("assembly_serial_15000", ParticleEffect::Assembly, usize::MAX),
        ("assembly_parallel_15000", ParticleEffect::Assembly, 0),
        ("disintegration_serial_15000", ParticleEffect::Disintegration, usize::MAX),
    ] {
        c.bench_function(name, |b| {
            let mut system = ParticleSystem::new(looping_config(threshold)).unwrap();
            system.generate_particles(&pixels, effect, 0);
            let mut now = 0;
            b.iter(|| {
                now += 16;
                black_box(system.update_animation(now));
            })
        });
    }
}

fn bench_generation(c: &mut Criterion) {
    let pixels = gradient(200, 150);
    c.bench_function("generate_15000", |b| {
        let mut system = ParticleSystem::new(looping_config(usize::MAX)).unwrap();
        b.iter(|| black_box(system.generate_particles(&pixels, ParticleEffect::Disintegration, 0)))
    });
}

criterion_group!(benches, bench_update, bench_generation);
criterion_main!(benches);

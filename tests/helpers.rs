#![allow(dead_code)]

use particlize_sim::config::{DisintegrationConfig, EmissionConfig, RuntimeConfig};
use particlize_sim::{ParticleEffect, ParticleSystem, ParticlizeConfig, PixelBuffer};

/// Buffer entièrement opaque (blanc).
pub fn opaque_buffer(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::filled(width, height, [255, 255, 255, 255])
}

/// Configuration reproductible : graine fixe, `count` particules.
pub fn seeded_config(count: usize) -> ParticlizeConfig {
    ParticlizeConfig {
        emission: EmissionConfig {
            particle_count: count,
            ..EmissionConfig::default()
        },
        seed: Some(42),
        ..ParticlizeConfig::default()
    }
}

/// Explosion pure : aucune force optionnelle, aucune variation aléatoire
/// sur le temps, l'alpha ou l'échelle, aucune particule retirée en route.
pub fn pure_explosion_config(count: usize) -> ParticlizeConfig {
    let mut config = seeded_config(count);
    config.emission = EmissionConfig {
        particle_count: count,
        ..EmissionConfig::instant_explosion()
    };
    config.animation.randomize_timings = false;
    config.animation.randomize_alpha = false;
    config.animation.randomize_scale = false;
    config.disintegration = DisintegrationConfig {
        gravity: 0.0,
        turbulence_strength: 0.0,
        explosion_directionality: 0.0,
        lifespan_variation_range: 0.0,
        alpha_variation_range: 0.0,
        fade_out_rate: 0.0,
        ..DisintegrationConfig::default()
    };
    config
}

/// Physique toujours exécutée en série.
pub fn serial(mut config: ParticlizeConfig) -> ParticlizeConfig {
    config.runtime = RuntimeConfig {
        parallel_threshold: usize::MAX,
        ..config.runtime
    };
    config
}

/// Génère puis fait tourner l'effet par pas de `step_ms` jusqu'à la fin.
/// Retourne le nombre d'appels à `update_animation`.
pub fn run_to_end(
    system: &mut ParticleSystem,
    pixels: &PixelBuffer,
    effect: ParticleEffect,
    step_ms: u64,
) -> usize {
    system.generate_particles(pixels, effect, 0);
    let mut now = 0;
    let mut calls = 0;
    loop {
        now += step_ms;
        calls += 1;
        if !system.update_animation(now) {
            return calls;
        }
        assert!(calls < 100_000, "effect never finished");
    }
}

use rand::{Rng, RngCore};
use std::f32::consts::TAU;

use crate::animation::easing::quad_in_out;
use crate::config::AssemblyConfig;
use crate::particle::{ParticleChunkMut, ParticleEffect, ParticleStorage, Vec2};
use crate::physics::{FrameContext, ParticlePhysics};

/// Amplitude (pixels) de l'oscillation perpendiculaire.
const OSCILLATION_AMPLITUDE: f32 = 20.0;
/// Amplitude (pixels) de la turbulence.
const TURBULENCE_AMPLITUDE: f32 = 10.0;
const TURBULENCE_FREQUENCY: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyParams {
    pub alpha_variation: f32,
    pub scale_variation: f32,
    pub rotation_variation: f32,
    pub oscillation_phase: f32,
    pub oscillation_frequency: f32,
    pub turbulence_phase: Vec2,
}

/// Assemblage par interpolation : chaque particule glisse de
/// `original + start_offset` vers `original` selon une courbe quadratique
/// in-out, perturbée par une oscillation et une turbulence qui s'éteignent à
/// l'approche de la cible, puis se recale exactement sur la cible.
#[derive(Debug)]
pub struct AssemblyPhysics {
    config: AssemblyConfig,
    params: Vec<AssemblyParams>,
}

impl AssemblyPhysics {
    pub fn new(config: AssemblyConfig) -> Self {
        Self {
            config,
            params: Vec::new(),
        }
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn params(&self, index: usize) -> Option<&AssemblyParams> {
        self.params.get(index)
    }
}

impl ParticlePhysics for AssemblyPhysics {
    fn prepare(&mut self, storage: &ParticleStorage, rng: &mut dyn RngCore) {
        let cfg = &self.config;
        let half_alpha = cfg.alpha_variation_range / 2.0;
        let half_scale = cfg.scale_variation_range / 2.0;
        let half_rotation = cfg.rotation_variation_range / 2.0;

        self.params.clear();
        self.params.reserve(storage.len());
        for _ in 0..storage.len() {
            self.params.push(AssemblyParams {
                alpha_variation: rng.random_range(-half_alpha..=half_alpha),
                scale_variation: rng.random_range(-half_scale..=half_scale),
                rotation_variation: rng.random_range(-half_rotation..=half_rotation),
                oscillation_phase: rng.random_range(0.0..TAU),
                oscillation_frequency: cfg.oscillation_frequency * rng.random_range(0.8..=1.2),
                turbulence_phase: Vec2::new(
                    rng.random_range(0.0..1000.0),
                    rng.random_range(0.0..1000.0),
                ),
            });
        }
    }

    fn update_chunk(&self, chunk: &mut ParticleChunkMut<'_>, ctx: &FrameContext<'_>) {
        let cfg = &self.config;
        let animation = ctx.animation;

        for local in 0..chunk.len() {
            if !chunk.is_active(local) {
                continue;
            }
            let index = chunk.global_index(local);
            let Some(params) = self.params.get(index) else {
                continue;
            };

            let target = chunk.original[local];
            let start = target + chunk.start_offset[local];
            let progress = animation.particle_progress(index);
            let eased = quad_in_out(progress);

            let mut position = start.lerp(target, eased);

            if cfg.oscillation_strength > 0.0 {
                let oscillation = if animation.config().add_oscillation {
                    animation.particle_oscillation(index, params.oscillation_frequency)
                        * animation.config().oscillation_strength
                } else {
                    (progress * params.oscillation_frequency + params.oscillation_phase).sin()
                        * cfg.oscillation_strength
                } * (1.0 - eased);

                let path = target - start;
                let length = path.length();
                if length > 0.01 {
                    position += path.perp() / length * oscillation * OSCILLATION_AMPLITUDE;
                }
            }

            if cfg.turbulence_strength > 0.0 {
                let phase = params.turbulence_phase + Vec2::splat(progress * TURBULENCE_FREQUENCY);
                position += Vec2::new(phase.x.sin(), phase.y.cos())
                    * cfg.turbulence_strength
                    * (1.0 - eased)
                    * TURBULENCE_AMPLITUDE;
            }

            let previous = chunk.position[local];
            chunk.velocity[local] = if ctx.dt > 0.0 {
                (position - previous) / ctx.dt
            } else {
                Vec2::ZERO
            };
            chunk.position[local] = position;

            chunk.alphas[local] = if animation.config().randomize_alpha {
                animation.particle_alpha(index, ParticleEffect::Assembly)
            } else {
                let base = cfg.initial_alpha + (1.0 - cfg.initial_alpha) * eased;
                base * cfg.fade_in_rate * (1.0 + params.alpha_variation)
            }
            .clamp(0.0, 1.0);

            chunk.scales[local] = if animation.config().randomize_scale {
                animation.particle_scale(index, ParticleEffect::Assembly)
            } else {
                let base = cfg.initial_scale + (cfg.final_scale - cfg.initial_scale) * eased;
                base * (1.0 + params.scale_variation)
            };

            // la rotation ralentit à l'approche de la cible
            chunk.rotations[local] +=
                cfg.rotation_speed * (1.0 - eased) * params.rotation_variation * ctx.dt * 60.0;

            if progress > cfg.snap_progress && position.distance(target) < cfg.snap_distance {
                chunk.position[local] = target;
                chunk.velocity[local] = Vec2::ZERO;
                chunk.alphas[local] = 1.0;
                chunk.scales[local] = 1.0;
            }
        }
    }

    fn reset(&mut self) {
        self.params.clear();
    }
}

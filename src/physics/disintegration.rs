use rand::{Rng, RngCore};
use std::f32::consts::TAU;

use crate::config::{BoundaryBehavior, DisintegrationConfig, ForceFieldType};
use crate::particle::{ParticleChunkMut, ParticleEffect, ParticleStorage, Vec2, Vec2Ext};
use crate::physics::{FrameContext, ParticlePhysics};

/// Distance de parcours de référence (pixels) à force d'explosion 1.
pub const BASE_TRAVEL_DISTANCE: f32 = 200.0;
/// Marge hors contenu au-delà de laquelle `Destroy` retire la particule.
pub const DESTROY_MARGIN: f32 = 20.0;
/// Alpha en dessous duquel une particule est retirée.
pub const MIN_VISIBLE_ALPHA: f32 = 0.01;

/// Paramètres tirés une fois par particule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisintegrationParams {
    /// Direction d'explosion (radians)
    pub angle: f32,
    pub speed: f32,
    pub alpha_variation: f32,
    pub scale_variation: f32,
    pub rotation_speed: f32,
    /// ±1
    pub rotation_direction: f32,
    pub turbulence_phase: Vec2,
    /// Facteur de durée de vie ∈ (0, 1] : la particule finit plus tôt
    pub lifespan_factor: f32,
}

/// Explosion paramétrée par la progression.
///
/// La position n'est pas intégrée frame après frame : elle est recalculée à
/// partir de la position d'origine et de la progression de la particule, ce
/// qui rend la trajectoire indépendante de la cadence.
#[derive(Debug)]
pub struct DisintegrationPhysics {
    config: DisintegrationConfig,
    velocity_magnitude: f32,
    params: Vec<DisintegrationParams>,
    wind_time: f32,
}

impl DisintegrationPhysics {
    pub fn new(config: DisintegrationConfig, velocity_magnitude: f32) -> Self {
        Self {
            config,
            velocity_magnitude,
            params: Vec::new(),
            wind_time: 0.0,
        }
    }

    pub fn config(&self) -> &DisintegrationConfig {
        &self.config
    }

    pub fn params(&self, index: usize) -> Option<&DisintegrationParams> {
        self.params.get(index)
    }

    pub fn wind_time(&self) -> f32 {
        self.wind_time
    }

    /// Distance maximale parcourue à vitesse unitaire.
    pub fn max_travel_distance(&self) -> f32 {
        BASE_TRAVEL_DISTANCE * self.config.explosion_strength.clamp(0.5, 5.0)
    }

    /// Vecteur de mouvement (unités normalisées) pour une progression `p`.
    fn movement(
        &self,
        params: &DisintegrationParams,
        index: usize,
        p: f32,
        current: Vec2,
        ctx: &FrameContext<'_>,
    ) -> Vec2 {
        let cfg = &self.config;
        let dir = Vec2::from_angle(params.angle);

        // surplus d'explosion qui s'éteint après `explosion_duration`
        let explosion_phase = (p / cfg.explosion_duration).min(1.0);
        let mut movement =
            dir * params.speed * (1.0 + cfg.explosion_burst * (1.0 - explosion_phase));

        movement.y += cfg.gravity * p * 2.0;

        if cfg.wind_enabled {
            let gust = 1.0 + (self.wind_time * 1.5).sin() * cfg.wind_gustiness;
            movement += Vec2::from_degrees(cfg.wind_direction) * cfg.wind_strength * gust * p;
        }

        let normalized = current / ctx.content_size.max(Vec2::ONE);

        if cfg.vortex_enabled {
            let to_center = Vec2::from(cfg.vortex_position) - normalized;
            let distance = to_center.length();
            if distance < cfg.vortex_radius {
                let falloff = (1.0 - (distance / cfg.vortex_radius).powf(cfg.vortex_decay))
                    .clamp(0.0, 1.0);
                let tangent = to_center.normalize_or_zero().perp() * cfg.vortex_direction;
                movement += tangent * cfg.vortex_strength * falloff * p;
            }
        }

        if cfg.force_field_enabled {
            let to_center = Vec2::from(cfg.force_field_position) - normalized;
            let distance = to_center.length();
            if distance < cfg.force_field_radius {
                let falloff = 1.0 - distance / cfg.force_field_radius;
                let toward = to_center.normalize_or_zero();
                let force = match cfg.force_field_type {
                    ForceFieldType::Attract => toward,
                    ForceFieldType::Repel => -toward,
                    ForceFieldType::Orbit => toward.perp(),
                };
                movement += force * cfg.force_field_strength * falloff * p;
            }
        }

        if cfg.turbulence_strength > 0.0 {
            let phase = params.turbulence_phase + Vec2::splat(p * cfg.turbulence_frequency);
            movement +=
                Vec2::new(phase.x.sin(), phase.y.cos()) * cfg.turbulence_strength * (1.0 - p);
        }

        let animation = ctx.animation;
        if animation.config().add_oscillation {
            let oscillation = animation
                .particle_oscillation(index, animation.config().oscillation_frequency)
                * animation.config().oscillation_strength;
            movement += dir.perp() * oscillation * (1.0 - p);
        }

        movement
    }

    /// Applique le comportement aux bords. Retourne `false` si la particule doit être retirée.
    fn apply_boundaries(&self, position: &mut Vec2, size: Vec2) -> bool {
        let elasticity = self.config.boundary_elasticity;
        match self.config.boundary_behavior {
            BoundaryBehavior::None => true,
            BoundaryBehavior::Bounce => {
                position.x = reflect(position.x, size.x, elasticity);
                position.y = reflect(position.y, size.y, elasticity);
                true
            }
            BoundaryBehavior::Wrap => {
                position.x = wrap(position.x, size.x);
                position.y = wrap(position.y, size.y);
                true
            }
            BoundaryBehavior::Destroy => {
                position.x >= -DESTROY_MARGIN
                    && position.x <= size.x + DESTROY_MARGIN
                    && position.y >= -DESTROY_MARGIN
                    && position.y <= size.y + DESTROY_MARGIN
            }
        }
    }
}

#[inline]
fn reflect(value: f32, max: f32, elasticity: f32) -> f32 {
    if value < 0.0 {
        -value * elasticity
    } else if value > max {
        max - (value - max) * elasticity
    } else {
        value
    }
}

#[inline]
fn wrap(value: f32, max: f32) -> f32 {
    if max <= 0.0 || (0.0..=max).contains(&value) {
        value
    } else {
        value.rem_euclid(max)
    }
}

impl ParticlePhysics for DisintegrationPhysics {
    fn prepare(&mut self, storage: &ParticleStorage, rng: &mut dyn RngCore) {
        let cfg = &self.config;
        let fixed_angle = cfg.explosion_direction.to_radians();
        let directionality = cfg.explosion_directionality;

        self.params.clear();
        self.params.reserve(storage.len());
        for i in 0..storage.len() {
            let initial = storage.velocity[i];
            let random_angle = if initial != Vec2::ZERO {
                initial.to_angle()
            } else {
                rng.random_range(0.0..TAU)
            };
            let angle = random_angle * (1.0 - directionality) + fixed_angle * directionality;
            let speed =
                self.velocity_magnitude * rng.random_range(0.8..=1.2) * cfg.explosion_strength;
            let half_scale = cfg.scale_variation_range / 2.0;

            self.params.push(DisintegrationParams {
                angle,
                speed,
                alpha_variation: rng.random_range(0.0..=cfg.alpha_variation_range),
                scale_variation: rng.random_range(-half_scale..=half_scale),
                rotation_speed: cfg.rotation_speed
                    * (0.5 + rng.random_range(0.0..=cfg.rotation_variation_range)),
                rotation_direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
                turbulence_phase: Vec2::new(
                    rng.random_range(0.0..1000.0),
                    rng.random_range(0.0..1000.0),
                ),
                lifespan_factor: 1.0 - rng.random_range(0.0..=cfg.lifespan_variation_range),
            });
        }
        self.wind_time = 0.0;
    }

    fn begin_frame(&mut self, dt: f32) {
        if self.config.wind_enabled {
            self.wind_time += dt;
        }
    }

    fn update_chunk(&self, chunk: &mut ParticleChunkMut<'_>, ctx: &FrameContext<'_>) {
        let cfg = &self.config;
        let animation = ctx.animation;
        let max_travel = self.max_travel_distance();

        for local in 0..chunk.len() {
            if !chunk.is_active(local) {
                continue;
            }
            let index = chunk.global_index(local);
            let Some(params) = self.params.get(index) else {
                continue;
            };

            let progress = (animation.particle_progress(index) / params.lifespan_factor)
                .clamp(0.0, 1.0);

            let previous = chunk.position[local];
            let movement = self.movement(params, index, progress, previous, ctx);
            let mut position = chunk.original[local] + movement * max_travel * progress;

            let alive = self.apply_boundaries(&mut position, ctx.content_size);
            chunk.position[local] = position;
            chunk.velocity[local] = if ctx.dt > 0.0 {
                (position - previous) / ctx.dt
            } else {
                Vec2::ZERO
            };

            let envelope = (1.0 - progress * cfg.fade_out_rate).clamp(0.0, 1.0);
            let alpha = if animation.config().randomize_alpha {
                animation.particle_alpha(index, ParticleEffect::Disintegration)
            } else {
                (1.0 - progress * cfg.fade_out_rate) * (1.0 - params.alpha_variation * progress)
            };
            let alpha = alpha.min(envelope).clamp(0.0, 1.0);
            chunk.alphas[local] = alpha;

            chunk.scales[local] = if animation.config().randomize_scale {
                animation.particle_scale(index, ParticleEffect::Disintegration)
            } else {
                1.0 - progress * cfg.scale_down_factor * (1.0 + params.scale_variation)
            }
            .max(0.0);

            chunk.rotations[local] +=
                params.rotation_speed * params.rotation_direction * ctx.dt * 60.0;

            if !alive || alpha <= MIN_VISIBLE_ALPHA {
                chunk.deactivate(local);
            }
        }
    }

    fn reset(&mut self) {
        self.params.clear();
        self.wind_time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_reflects_with_elasticity() {
        assert_eq!(reflect(-10.0, 100.0, 0.5), 5.0);
        assert_eq!(reflect(110.0, 100.0, 0.5), 95.0);
        assert_eq!(reflect(50.0, 100.0, 0.5), 50.0);
    }

    #[test]
    fn wrap_brings_back_inside() {
        assert_eq!(wrap(-10.0, 100.0), 90.0);
        assert_eq!(wrap(130.0, 100.0), 30.0);
    }

    #[test]
    fn max_travel_is_clamped() {
        let mut config = DisintegrationConfig::default();
        config.explosion_strength = 10.0;
        assert_eq!(DisintegrationPhysics::new(config, 1.0).max_travel_distance(), 1000.0);
    }
}

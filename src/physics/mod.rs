pub mod assembly;
pub use self::assembly::{AssemblyParams, AssemblyPhysics};

pub mod disintegration;
pub use self::disintegration::{DisintegrationParams, DisintegrationPhysics};

use rand::RngCore;

use crate::animation::AnimationController;
use crate::config::ParticlizeConfig;
use crate::particle::{ParticleChunkMut, ParticleEffect, ParticleStorage, Vec2};

/// Données partagées par toutes les particules d'une frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub animation: &'a AnimationController,
    /// Pas de temps (s) de la frame
    pub dt: f32,
    /// Taille du contenu capturé (pixels)
    pub content_size: Vec2,
}

/// 🔧 Trait `ParticlePhysics`
///
/// Interface commune aux deux modèles de mouvement. Les paramètres aléatoires
/// par particule sont tirés une fois dans `prepare` ; `update_chunk` ne prend
/// que `&self`, si bien que plusieurs vues disjointes du stockage peuvent être
/// mises à jour en parallèle.
pub trait ParticlePhysics: Send + Sync {
    /// Tire les paramètres par particule pour les `storage.len()` slots.
    fn prepare(&mut self, storage: &ParticleStorage, rng: &mut dyn RngCore);

    /// État global avancé une fois par frame, avant les particules.
    fn begin_frame(&mut self, _dt: f32) {}

    /// Met à jour les particules actives d'une vue.
    fn update_chunk(&self, chunk: &mut ParticleChunkMut<'_>, ctx: &FrameContext<'_>);

    fn reset(&mut self);
}

/// Stratégie physique choisie une fois par exécution.
#[derive(Debug)]
pub enum PhysicsEngine {
    Disintegration(DisintegrationPhysics),
    Assembly(AssemblyPhysics),
}

impl PhysicsEngine {
    pub fn for_effect(effect: ParticleEffect, config: &ParticlizeConfig) -> Self {
        match effect {
            ParticleEffect::Disintegration => PhysicsEngine::Disintegration(
                DisintegrationPhysics::new(
                    config.disintegration.clone(),
                    config.particle.velocity_magnitude,
                ),
            ),
            ParticleEffect::Assembly => {
                PhysicsEngine::Assembly(AssemblyPhysics::new(config.assembly.clone()))
            }
        }
    }

    pub fn effect(&self) -> ParticleEffect {
        match self {
            PhysicsEngine::Disintegration(_) => ParticleEffect::Disintegration,
            PhysicsEngine::Assembly(_) => ParticleEffect::Assembly,
        }
    }

    pub fn as_disintegration(&self) -> Option<&DisintegrationPhysics> {
        match self {
            PhysicsEngine::Disintegration(physics) => Some(physics),
            PhysicsEngine::Assembly(_) => None,
        }
    }

    pub fn as_assembly(&self) -> Option<&AssemblyPhysics> {
        match self {
            PhysicsEngine::Assembly(physics) => Some(physics),
            PhysicsEngine::Disintegration(_) => None,
        }
    }
}

impl ParticlePhysics for PhysicsEngine {
    fn prepare(&mut self, storage: &ParticleStorage, rng: &mut dyn RngCore) {
        match self {
            PhysicsEngine::Disintegration(physics) => physics.prepare(storage, rng),
            PhysicsEngine::Assembly(physics) => physics.prepare(storage, rng),
        }
    }

    fn begin_frame(&mut self, dt: f32) {
        match self {
            PhysicsEngine::Disintegration(physics) => physics.begin_frame(dt),
            PhysicsEngine::Assembly(physics) => physics.begin_frame(dt),
        }
    }

    #[inline]
    fn update_chunk(&self, chunk: &mut ParticleChunkMut<'_>, ctx: &FrameContext<'_>) {
        match self {
            PhysicsEngine::Disintegration(physics) => physics.update_chunk(chunk, ctx),
            PhysicsEngine::Assembly(physics) => physics.update_chunk(chunk, ctx),
        }
    }

    fn reset(&mut self) {
        match self {
            PhysicsEngine::Disintegration(physics) => physics.reset(),
            PhysicsEngine::Assembly(physics) => physics.reset(),
        }
    }
}

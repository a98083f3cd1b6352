pub mod animation;
pub use self::animation::{AnimationConfig, AnimationConfigBuilder};

pub mod assembly;
pub use self::assembly::AssemblyConfig;

pub mod disintegration;
pub use self::disintegration::{BoundaryBehavior, DisintegrationConfig, ForceFieldType};

pub mod emission;
pub use self::emission::{EmissionConfig, EmissionPattern, EmissionType};

pub mod particle;
pub use self::particle::ParticleConfig;

use serde::{Deserialize, Serialize};

use crate::animation::Easing;

/// Réglages d'exécution (boucle de frames, capture, parallélisme).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Cadence cible de la boucle de frames (ms)
    pub frame_interval_ms: u64,
    /// Délai maximal d'attente de la capture du contenu (ms)
    pub capture_timeout_ms: u64,
    /// Nombre de particules à partir duquel la physique est découpée entre threads
    pub parallel_threshold: usize,
    /// 0 = nombre de cœurs disponibles
    pub worker_threads: usize,
    /// Taille de la fenêtre glissante du profiler
    pub profiler_samples: usize,
    /// Capacité du canal d'événements vers l'hôte
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            capture_timeout_ms: 3000,
            parallel_threshold: 4096,
            worker_threads: 0,
            profiler_samples: 120,
            event_capacity: 64,
        }
    }
}

impl RuntimeConfig {
    /// Nombre effectif de workers pour la passe physique.
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Configuration complète d'un effet, immuable pendant une exécution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlizeConfig {
    pub particle: ParticleConfig,
    pub emission: EmissionConfig,
    pub animation: AnimationConfig,
    pub disintegration: DisintegrationConfig,
    pub assembly: AssemblyConfig,
    pub runtime: RuntimeConfig,
    /// Graine optionnelle pour des exécutions reproductibles
    pub seed: Option<u64>,
}

impl ParticlizeConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Vérifie toutes les sections ; première erreur rencontrée.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.particle.validate()?;
        self.emission.validate()?;
        self.animation.validate()?;
        self.disintegration.validate()?;
        self.assembly.validate()?;
        anyhow::ensure!(
            self.runtime.frame_interval_ms > 0,
            "runtime.frame_interval_ms must be > 0"
        );
        anyhow::ensure!(
            self.runtime.event_capacity > 0,
            "runtime.event_capacity must be > 0"
        );
        Ok(())
    }

    // ---------------------------
    // Presets
    // ---------------------------

    /// Explosion omnidirectionnelle instantanée.
    pub fn explosion() -> Self {
        Self {
            emission: EmissionConfig::instant_explosion(),
            animation: AnimationConfig {
                duration_ms: 1500,
                ..AnimationConfig::default()
            },
            disintegration: DisintegrationConfig {
                explosion_strength: 3.0,
                turbulence_strength: 0.3,
                ..DisintegrationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Explosion dirigée selon `angle` (degrés).
    pub fn directional_burst(angle: f32) -> Self {
        Self {
            emission: EmissionConfig::instant_explosion(),
            animation: AnimationConfig {
                duration_ms: 1500,
                ..AnimationConfig::default()
            },
            disintegration: DisintegrationConfig {
                explosion_strength: 4.0,
                explosion_direction: angle,
                explosion_directionality: 0.8,
                turbulence_strength: 0.2,
                ..DisintegrationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Assemblage progressif suivant un motif.
    pub fn smooth_assembly(pattern: EmissionPattern) -> Self {
        Self {
            emission: EmissionConfig {
                pattern,
                duration_factor: 0.8,
                ..EmissionConfig::default()
            },
            animation: AnimationConfig {
                duration_ms: 2000,
                easing: Easing::EaseInOut,
                ..AnimationConfig::default()
            },
            assembly: AssemblyConfig {
                turbulence_strength: 0.1,
                ..AssemblyConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn vibrant_explosion() -> Self {
        Self {
            particle: ParticleConfig {
                size: 5.0,
                size_variation: 0.5,
                ..ParticleConfig::default()
            },
            emission: EmissionConfig {
                particle_count: 12_000,
                random_alphas: true,
                random_rotations: true,
                ..EmissionConfig::instant_explosion()
            },
            animation: AnimationConfig {
                duration_ms: 1800,
                add_oscillation: true,
                oscillation_strength: 0.3,
                oscillation_frequency: 4.0,
                ..AnimationConfig::default()
            },
            disintegration: DisintegrationConfig {
                explosion_strength: 3.5,
                turbulence_strength: 0.35,
                rotation_variation_range: 0.8,
                ..DisintegrationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Scintillement bleuté qui s'élève depuis le centre.
    pub fn magical_sparkle() -> Self {
        Self {
            particle: ParticleConfig {
                size: 3.0,
                size_variation: 0.5,
                tint: Some([0.0, 150.0 / 255.0, 1.0, 1.0]),
                tint_strength: 0.4,
                ..ParticleConfig::default()
            },
            emission: EmissionConfig {
                pattern: EmissionPattern::CenterOut,
                particle_count: 15_000,
                duration_factor: 0.7,
                random_alphas: true,
                ..EmissionConfig::default()
            },
            animation: AnimationConfig {
                duration_ms: 2500,
                ..AnimationConfig::default()
            },
            disintegration: DisintegrationConfig {
                explosion_strength: 2.0,
                explosion_direction: 270.0,
                explosion_directionality: 0.6,
                gravity: 0.05,
                turbulence_strength: 0.4,
                lifespan_variation_range: 0.4,
                ..DisintegrationConfig::default()
            },
            ..Self::default()
        }
    }
}

// Animation : horloge, courbes, progression par particule
pub mod animation;
pub use animation::{AnimationController, Clock, Easing, ManualClock, MonotonicClock};
// Configuration (toml + presets)
pub mod config;
pub use config::ParticlizeConfig;
// Contrôleur d'effet (capture + boucle de frames)
pub mod controller;
pub use controller::{ControllerEvent, ControllerState, ParticlizeController};
// Émission
pub mod emission;
pub use emission::EmissionController;
// Particules : stockage colonne, types, snapshots
pub mod particle;
pub use particle::{ParticleEffect, ParticleFrame, ParticleShape, ParticleStorage};
// Système de particules
pub mod particle_system;
pub use particle_system::ParticleSystem;
// Physique (désintégration / assemblage)
pub mod physics;
pub use physics::{ParticlePhysics, PhysicsEngine};
// Buffer de pixels
pub mod pixel_buffer;
pub use pixel_buffer::PixelBuffer;

// Profileur
pub mod profiler;
// Utilitaires
pub mod utils;

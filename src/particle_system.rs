use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::f32::consts::TAU;
use std::sync::Arc;

use crate::animation::AnimationController;
use crate::config::ParticlizeConfig;
use crate::emission::EmissionController;
use crate::particle::{
    Color, FrameBuffers, ParticleEffect, ParticleFrame, ParticleStorage, Vec2, Vec2Ext,
};
use crate::physics::{FrameContext, ParticlePhysics, PhysicsEngine};
use crate::pixel_buffer::PixelBuffer;
use crate::profiler::Profiler;

/// Alpha minimal d'un pixel pour produire une particule.
const MIN_PIXEL_ALPHA: f32 = 0.1;
/// Fréquence (en frames) du log des métriques.
const METRICS_LOG_INTERVAL: u64 = 120;

/// Source d'aléa injectable (graine fixe en test).
pub type BoxedRng = Box<dyn RngCore + Send>;

/// Pas d'échantillonnage de la grille de pixels pour viser `target` particules.
pub fn sampling_step(width: u32, height: u32, target: usize) -> usize {
    let area = width as f32 * height as f32;
    if area <= 0.0 || target == 0 {
        return 1;
    }
    let density = (target as f32 / area).sqrt();
    ((1.0 / density).round() as usize).max(1)
}

/// 🎆 Système de particules
///
/// Orchestre un effet complet : génération depuis un [`PixelBuffer`],
/// activation des particules selon leurs délais, physique de l'effet et
/// publication d'une frame immuable pour le rendu.
///
/// Une frame se déroule toujours dans cet ordre :
/// 1. `AnimationController::update(now)`
/// 2. activation des particules en attente dont le délai est atteint
/// 3. mise à jour physique de toutes les particules actives
/// 4. publication de la frame
pub struct ParticleSystem {
    config: ParticlizeConfig,
    rng: BoxedRng,

    storage: ParticleStorage,
    emission: EmissionController,
    animation: AnimationController,
    physics: Option<PhysicsEngine>,
    frames: FrameBuffers,
    profiler: Profiler,

    content_size: Vec2,
    frame: u64,
    finished: bool,
}

impl std::fmt::Debug for ParticleSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleSystem")
            .field("particles", &self.storage.len())
            .field("active", &self.storage.active_count())
            .field("pending", &self.storage.pending_count())
            .field("frame", &self.frame)
            .field("state", &self.animation.state())
            .finish()
    }
}

impl ParticleSystem {
    /// Valide la configuration ; l'aléa vient de `config.seed` ou de l'OS.
    pub fn new(config: ParticlizeConfig) -> anyhow::Result<Self> {
        let rng: BoxedRng = match config.seed {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(StdRng::from_rng(&mut rand::rng())),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: ParticlizeConfig, rng: BoxedRng) -> anyhow::Result<Self> {
        config.validate()?;

        let capacity = config.emission.particle_count;
        info!(
            "🎆 ParticleSystem created: capacity = {}, workers = {}",
            capacity,
            config.runtime.effective_workers()
        );

        Ok(Self {
            storage: ParticleStorage::new(capacity),
            emission: EmissionController::new(config.emission.clone()),
            animation: AnimationController::new(config.animation.clone()),
            physics: None,
            frames: FrameBuffers::new(capacity),
            profiler: Profiler::new(config.runtime.profiler_samples),
            content_size: Vec2::ZERO,
            frame: 0,
            finished: false,
            rng,
            config,
        })
    }

    // ---------------------------
    // Génération
    // ---------------------------

    /// Échantillonne le buffer, initialise les particules pour `effect`,
    /// calcule les délais d'émission et démarre l'animation à `now_ms`.
    ///
    /// Retourne le nombre de particules créées (0 pour un buffer vide ou transparent).
    pub fn generate_particles(
        &mut self,
        pixels: &PixelBuffer,
        effect: ParticleEffect,
        now_ms: u64,
    ) -> usize {
        self.storage.reset();
        self.emission.reset();
        self.animation.reset();
        self.frame = 0;
        self.finished = false;
        self.content_size = Vec2::new(pixels.width() as f32, pixels.height() as f32);

        self.profiler.profile_block("generation", || {
            sample_pixels(&mut self.storage, pixels, &self.config, &mut *self.rng)
        });

        let count = self.storage.len();
        for i in 0..count {
            match effect {
                ParticleEffect::Disintegration => {
                    init_disintegration_particle(&mut self.storage, i, &self.config, &mut *self.rng)
                }
                ParticleEffect::Assembly => {
                    init_assembly_particle(&mut self.storage, i, &self.config, &mut *self.rng)
                }
            }
            self.emission
                .apply_random_visual_properties(&mut self.storage, i, &mut *self.rng);
        }

        self.emission.calculate_delays(
            &mut self.storage,
            pixels.width(),
            pixels.height(),
            effect,
            &mut *self.rng,
        );

        let mut physics = PhysicsEngine::for_effect(effect, &self.config);
        physics.prepare(&self.storage, &mut *self.rng);
        self.physics = Some(physics);

        self.animation.start(now_ms, count, &mut *self.rng);
        self.frames.publish(&self.storage, self.frame);

        info!(
            "✨ {} particles generated from {}x{} buffer ({:?}): {} active, {} pending",
            count,
            pixels.width(),
            pixels.height(),
            effect,
            self.storage.active_count(),
            self.storage.pending_count()
        );
        count
    }

    // ---------------------------
    // Boucle de frames
    // ---------------------------

    /// Avance l'effet à `now_ms`. Retourne `true` tant qu'il faut demander des frames.
    pub fn update_animation(&mut self, now_ms: u64) -> bool {
        if self.finished {
            return false;
        }
        if self.storage.is_empty() {
            self.finished = true;
            return false;
        }

        let _frame_guard = self.profiler.frame();
        let running = self.animation.update(now_ms);

        if self.animation.is_completed() {
            // dernière frame à progression 1 pour toutes les particules
            self.step(1.0);
            self.finished = true;
            info!(
                "🏁 Effect finished after {} frames ({} particles still visible)",
                self.frame,
                self.storage.active_count()
            );
            return false;
        }

        if self.animation.is_paused() {
            return running;
        }

        let raw = self.animation.raw_progress();
        self.step(raw);

        if self.frame % METRICS_LOG_INTERVAL == 0 {
            crate::log_metrics!(self.profiler);
        }

        let alive = self.storage.active_count() + self.storage.pending_count() > 0;
        if !alive {
            self.finished = true;
            info!("🏁 All particles retired at frame {}", self.frame);
        }
        running && alive
    }

    /// Une frame : activation, physique, publication.
    fn step(&mut self, raw_progress: f32) {
        let activated = self.profiler.profile_block("emission", || {
            self.emission.activate_due(&mut self.storage, raw_progress)
        });

        if let Some(physics) = self.physics.as_mut() {
            let dt = self.animation.delta_time();
            physics.begin_frame(dt);

            let ctx = FrameContext {
                animation: &self.animation,
                dt,
                content_size: self.content_size,
            };
            let workers = self.config.runtime.effective_workers();
            let parallel =
                workers > 1 && self.storage.len() >= self.config.runtime.parallel_threshold;
            let physics = &*physics;
            let storage = &mut self.storage;

            let retired = self.profiler.profile_block("physics", || {
                update_physics(storage, physics, &ctx, workers, parallel)
            });
            self.storage.note_retired(retired);

            if activated > 0 || retired > 0 {
                debug!(
                    "Frame {}: {} activated, {} retired",
                    self.frame + 1,
                    activated,
                    retired
                );
            }
        }
        self.frame += 1;
        self.profiler
            .record_metric("active particles", self.storage.active_count());
        self.frames.publish(&self.storage, self.frame);
    }

    pub fn pause(&mut self, now_ms: u64) {
        self.animation.pause(now_ms);
    }

    pub fn resume(&mut self, now_ms: u64) {
        self.animation.resume(now_ms);
    }

    // ---------------------------
    // Lecture
    // ---------------------------

    /// Dernière frame publiée, immuable.
    pub fn particle_data(&self) -> Arc<ParticleFrame> {
        self.frames.front()
    }

    /// Progression lissée, pour le fondu du contenu d'origine.
    pub fn completion_percentage(&self) -> f32 {
        self.animation.eased_progress()
    }

    pub fn content_dimensions(&self) -> (u32, u32) {
        (self.content_size.x as u32, self.content_size.y as u32)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &ParticlizeConfig {
        &self.config
    }

    pub fn storage(&self) -> &ParticleStorage {
        &self.storage
    }

    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    pub fn emission(&self) -> &EmissionController {
        &self.emission
    }

    pub fn physics(&self) -> Option<&PhysicsEngine> {
        self.physics.as_ref()
    }

    pub fn profiler(&self) -> &Profiler {
        &self.profiler
    }
}

/// Parcourt la grille de pixels (x puis y) avec le pas adapté à la capacité.
fn sample_pixels(
    storage: &mut ParticleStorage,
    pixels: &PixelBuffer,
    config: &ParticlizeConfig,
    rng: &mut dyn RngCore,
) {
    if pixels.is_empty() {
        return;
    }
    let step = sampling_step(pixels.width(), pixels.height(), storage.capacity());
    let particle = &config.particle;
    let variation = particle.size_variation;
    let tint = particle.tint.map(Color::from_array);

    for x in (0..pixels.width()).step_by(step) {
        for y in (0..pixels.height()).step_by(step) {
            let Some(mut color) = pixels.pixel(x, y) else {
                continue;
            };
            if color.w <= MIN_PIXEL_ALPHA {
                continue;
            }
            if let Some(tint) = tint {
                let alpha = color.w;
                color = color.lerp(tint, particle.tint_strength);
                color.w = alpha;
            }
            let size = particle.size * rng.random_range(1.0 - variation..=1.0 + variation);
            if storage
                .create_particle(x as f32, y as f32, color, particle.shape, size)
                .is_none()
            {
                debug!(
                    "Particle capacity {} reached, sampling truncated at x = {}",
                    storage.capacity(),
                    x
                );
                return;
            }
        }
    }
}

/// Vitesse initiale de direction uniforme.
fn init_disintegration_particle(
    storage: &mut ParticleStorage,
    index: usize,
    config: &ParticlizeConfig,
    rng: &mut dyn RngCore,
) {
    storage.velocity[index] = Vec2::random_unit(rng) * config.particle.velocity_magnitude;
}

/// Point de départ éloigné de la cible, apparence atténuée.
fn init_assembly_particle(
    storage: &mut ParticleStorage,
    index: usize,
    config: &ParticlizeConfig,
    rng: &mut dyn RngCore,
) {
    let assembly = &config.assembly;
    let angle = rng.random_range(0.0..TAU);
    let distance = rng.random_range(assembly.start_distance_min..=assembly.start_distance_max);
    let offset = Vec2::from_angle(angle) * distance;

    storage.start_offset[index] = offset;
    storage.position[index] = storage.original[index] + offset;
    storage.velocity[index] = Vec2::ZERO;
    storage.alphas[index] = rng.random_range(0.3..=0.5);
    storage.scales[index] = rng.random_range(0.4..=0.6);
}

/// Passe physique, découpée entre `workers` threads au-delà du seuil.
/// Retourne le nombre de particules retirées.
fn update_physics(
    storage: &mut ParticleStorage,
    physics: &PhysicsEngine,
    ctx: &FrameContext<'_>,
    workers: usize,
    parallel: bool,
) -> usize {
    let n = storage.len();
    if !parallel {
        let mut chunks = storage.chunks_mut(n);
        for chunk in chunks.iter_mut() {
            physics.update_chunk(chunk, ctx);
        }
        return chunks.iter().map(|c| c.retired()).sum();
    }

    let mut chunks = storage.chunks_mut(n.div_ceil(workers));
    let outcome = crossbeam::thread::scope(|scope| {
        for chunk in chunks.iter_mut() {
            scope.spawn(move |_| physics.update_chunk(chunk, ctx));
        }
    });
    if let Err(panic) = outcome {
        std::panic::resume_unwind(panic);
    }
    chunks.iter().map(|c| c.retired()).sum()
}

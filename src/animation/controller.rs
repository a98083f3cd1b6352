#[cfg(debug_assertions)]
use log::debug;
use log::info;
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::AnimationConfig;
use crate::particle::ParticleEffect;

/// Pas de temps maximal transmis à la physique (s), évite les sauts après un blocage.
pub const MAX_DELTA_TIME: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// Valeurs aléatoires par particule, tirées une fois au démarrage.
///
/// Tableaux parallèles indexés par le slot de la particule dans le stockage.
#[derive(Debug, Default, Clone)]
pub struct ParticleVariations {
    pub time_offsets: Vec<f32>,
    pub alpha_factors: Vec<f32>,
    pub scale_factors: Vec<f32>,
    pub fade_in_factors: Vec<f32>,
    pub fade_out_factors: Vec<f32>,
    pub phases: Vec<f32>,
}

impl ParticleVariations {
    fn fill<R: Rng + ?Sized>(&mut self, config: &AnimationConfig, count: usize, rng: &mut R) {
        self.clear();
        self.reserve(count);

        let tv = config.timing_variation;
        let av = config.alpha_variation;
        let sv = config.scale_variation;
        for _ in 0..count {
            self.time_offsets.push(if config.randomize_timings {
                rng.random_range(-tv..=tv)
            } else {
                0.0
            });
            self.alpha_factors.push(if config.randomize_alpha {
                rng.random_range(1.0 - av..=1.0 + av)
            } else {
                1.0
            });
            self.scale_factors.push(if config.randomize_scale {
                rng.random_range(1.0 - sv..=1.0 + sv)
            } else {
                1.0
            });
            self.fade_in_factors.push(rng.random_range(0.9..=1.1));
            self.fade_out_factors.push(rng.random_range(0.9..=1.1));
            self.phases.push(rng.random_range(0.0..TAU));
        }
    }

    fn clear(&mut self) {
        self.time_offsets.clear();
        self.alpha_factors.clear();
        self.scale_factors.clear();
        self.fade_in_factors.clear();
        self.fade_out_factors.clear();
        self.phases.clear();
    }

    fn reserve(&mut self, count: usize) {
        self.time_offsets.reserve(count);
        self.alpha_factors.reserve(count);
        self.scale_factors.reserve(count);
        self.fade_in_factors.reserve(count);
        self.fade_out_factors.reserve(count);
        self.phases.reserve(count);
    }

    #[inline]
    fn get(values: &[f32], index: usize, fallback: f32) -> f32 {
        values.get(index).copied().unwrap_or(fallback)
    }
}

/// Horloge de l'effet : progression brute / lissée, pauses, répétitions
/// et valeurs visuelles par particule.
#[derive(Debug)]
pub struct AnimationController {
    config: AnimationConfig,
    state: AnimationState,

    start_ms: u64,
    last_frame_ms: u64,
    pause_start_ms: u64,
    total_paused_ms: u64,

    raw_progress: f32,
    eased_progress: f32,
    delta_time: f32,

    /// -1 = infini
    remaining_repeats: i32,
    cycle: u64,

    variations: ParticleVariations,
}

impl AnimationController {
    pub fn new(config: AnimationConfig) -> Self {
        let remaining_repeats = config.repeat_count;
        Self {
            config,
            state: AnimationState::Idle,
            start_ms: 0,
            last_frame_ms: 0,
            pause_start_ms: 0,
            total_paused_ms: 0,
            raw_progress: 0.0,
            eased_progress: 0.0,
            delta_time: 0.0,
            remaining_repeats,
            cycle: 0,
            variations: ParticleVariations::default(),
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Démarre un cycle à `now_ms` et tire les variations de `particle_count` particules.
    pub fn start<R: Rng + ?Sized>(&mut self, now_ms: u64, particle_count: usize, rng: &mut R) {
        info!(
            "🚀 Animation started: {} ms, {} particles, repeat = {}",
            self.config.duration_ms, particle_count, self.config.repeat_count
        );
        self.state = AnimationState::Running;
        self.start_ms = now_ms;
        self.last_frame_ms = now_ms;
        self.pause_start_ms = 0;
        self.total_paused_ms = 0;
        self.raw_progress = 0.0;
        self.eased_progress = 0.0;
        self.delta_time = 0.0;
        self.remaining_repeats = self.config.repeat_count;
        self.cycle = 0;
        self.variations.fill(&self.config, particle_count, rng);
    }

    pub fn pause(&mut self, now_ms: u64) {
        if self.state == AnimationState::Running {
            self.state = AnimationState::Paused;
            self.pause_start_ms = now_ms;
            info!("⏸️ Animation paused at progress {:.3}", self.eased_progress);
        }
    }

    pub fn resume(&mut self, now_ms: u64) {
        if self.state == AnimationState::Paused {
            self.total_paused_ms += now_ms.saturating_sub(self.pause_start_ms);
            self.last_frame_ms = now_ms;
            self.state = AnimationState::Running;
            info!("▶️ Animation resumed at progress {:.3}", self.eased_progress);
        }
    }

    /// Remet le contrôleur au repos. Les variations tirées sont conservées.
    pub fn reset(&mut self) {
        self.state = AnimationState::Idle;
        self.raw_progress = 0.0;
        self.eased_progress = 0.0;
        self.delta_time = 0.0;
    }

    /// Avance l'horloge. Retourne `false` quand il ne faut plus demander de frames.
    pub fn update(&mut self, now_ms: u64) -> bool {
        match self.state {
            AnimationState::Idle | AnimationState::Completed => return false,
            AnimationState::Paused => {
                self.delta_time = 0.0;
                return true;
            }
            AnimationState::Running => {}
        }

        // dt mesuré avant de mémoriser la frame courante
        self.delta_time =
            (now_ms.saturating_sub(self.last_frame_ms) as f32 / 1000.0).min(MAX_DELTA_TIME);
        self.last_frame_ms = now_ms;

        let duration = self.config.duration_ms.max(1);
        let elapsed = now_ms
            .saturating_sub(self.start_ms)
            .saturating_sub(self.total_paused_ms);

        if elapsed >= duration {
            let wraps = elapsed / duration;
            let can_repeat = match self.remaining_repeats {
                -1 => true,
                n if n > 0 && wraps <= n as u64 => {
                    self.remaining_repeats = n - wraps as i32;
                    true
                }
                _ => false,
            };

            if !can_repeat {
                self.raw_progress = 1.0;
                self.eased_progress = 1.0;
                self.state = AnimationState::Completed;
                info!("✅ Animation completed after {} cycle(s)", self.cycle + 1);
                return false;
            }

            // le reste écoulé est conservé pour ne pas perdre de temps au bouclage
            self.start_ms += wraps * duration;
            self.cycle += wraps;
            let remainder = elapsed - wraps * duration;
            self.raw_progress = remainder as f32 / duration as f32;
            self.eased_progress = self.config.easing.transform(self.raw_progress);
            #[cfg(debug_assertions)]
            debug!(
                "Animation repeating (cycle {}, remaining repeats {})",
                self.cycle, self.remaining_repeats
            );
            return true;
        }

        self.raw_progress = (elapsed as f32 / duration as f32).clamp(0.0, 1.0);
        self.eased_progress = self.config.easing.transform(self.raw_progress);
        true
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running | AnimationState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.state == AnimationState::Paused
    }

    pub fn is_completed(&self) -> bool {
        self.state == AnimationState::Completed
    }

    pub fn raw_progress(&self) -> f32 {
        self.raw_progress
    }

    pub fn eased_progress(&self) -> f32 {
        self.eased_progress
    }

    /// Pas de temps de la dernière frame (s), borné à [`MAX_DELTA_TIME`].
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn remaining_repeats(&self) -> i32 {
        self.remaining_repeats
    }

    pub fn variations(&self) -> &ParticleVariations {
        &self.variations
    }

    // ---------------------------
    // Valeurs par particule
    // ---------------------------

    /// Progression propre à la particule : progression lissée + décalage, bornée.
    /// Vaut 1 pour toutes les particules une fois l'animation terminée.
    #[inline]
    pub fn particle_progress(&self, index: usize) -> f32 {
        if self.state == AnimationState::Completed {
            return 1.0;
        }
        let offset = ParticleVariations::get(&self.variations.time_offsets, index, 0.0);
        (self.eased_progress + offset).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn particle_alpha(&self, index: usize, effect: ParticleEffect) -> f32 {
        let p = self.particle_progress(index);
        let v = &self.variations;
        let alpha_factor = ParticleVariations::get(&v.alpha_factors, index, 1.0);
        match effect {
            ParticleEffect::Disintegration => {
                let fade_out = ParticleVariations::get(&v.fade_out_factors, index, 1.0);
                ((1.0 - p * fade_out) * alpha_factor).clamp(0.0, 1.0)
            }
            ParticleEffect::Assembly => {
                let fade_in = ParticleVariations::get(&v.fade_in_factors, index, 1.0);
                (p * fade_in * alpha_factor).clamp(0.0, 1.0)
            }
        }
    }

    /// Désintégration : 1.0 → 0.7, assemblage : 0.5 → 1.0, modulés par le facteur tiré.
    #[inline]
    pub fn particle_scale(&self, index: usize, effect: ParticleEffect) -> f32 {
        let p = self.particle_progress(index);
        let factor = ParticleVariations::get(&self.variations.scale_factors, index, 1.0);
        match effect {
            ParticleEffect::Disintegration => (1.0 - p * 0.3) * factor,
            ParticleEffect::Assembly => (0.5 + p * 0.5) * factor,
        }
    }

    /// Oscillation ∈ [-1, 1] basée sur la progression brute et la phase de la particule.
    #[inline]
    pub fn particle_oscillation(&self, index: usize, frequency: f32) -> f32 {
        let phase = ParticleVariations::get(&self.variations.phases, index, 0.0);
        (self.raw_progress * frequency * TAU + phase).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn controller(duration_ms: u64, repeat_count: i32) -> AnimationController {
        AnimationController::new(AnimationConfig {
            duration_ms,
            repeat_count,
            ..AnimationConfig::default()
        })
    }

    #[test]
    fn delta_time_is_measured_before_frame_is_recorded() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut anim = controller(1000, 0);
        anim.start(0, 4, &mut rng);
        assert!(anim.update(16));
        assert!((anim.delta_time() - 0.016).abs() < 1e-6);
        assert!(anim.update(500));
        assert_eq!(anim.delta_time(), MAX_DELTA_TIME);
    }

    #[test]
    fn finite_repeat_decrements_then_completes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut anim = controller(100, 2);
        anim.start(0, 1, &mut rng);
        assert!(anim.update(110));
        assert_eq!(anim.remaining_repeats(), 1);
        assert!((anim.raw_progress() - 0.1).abs() < 1e-6);
        assert!(anim.update(210));
        assert_eq!(anim.remaining_repeats(), 0);
        assert!(!anim.update(310));
        assert!(anim.is_completed());
        assert_eq!(anim.eased_progress(), 1.0);
    }

    #[test]
    fn paused_time_is_not_counted() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut anim = controller(1000, 0);
        anim.start(0, 1, &mut rng);
        anim.update(200);
        anim.pause(200);
        assert!(anim.update(5000));
        assert_eq!(anim.delta_time(), 0.0);
        anim.resume(5000);
        anim.update(5300);
        assert!((anim.raw_progress() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn idle_controller_does_not_run() {
        let mut anim = controller(1000, 0);
        assert!(!anim.update(10));
        assert_eq!(anim.state(), AnimationState::Idle);
    }
}

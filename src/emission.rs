#[cfg(debug_assertions)]
use log::debug;
use itertools::{Itertools, MinMaxResult};
use rand::Rng;

use crate::config::{EmissionConfig, EmissionPattern, EmissionType};
use crate::particle::{ParticleEffect, ParticleStorage, Vec2};

/// Écart (relatif) en dessous duquel les valeurs de motif sont jugées identiques.
const DEGENERATE_RANGE: f32 = 1e-6;

/// Valeur brute du motif pour une position, dans [0,1] avant normalisation.
pub fn pattern_value(pattern: EmissionPattern, pos: Vec2, width: f32, height: f32) -> f32 {
    let width = width.max(1.0);
    let height = height.max(1.0);
    let center_distance = || {
        let half = Vec2::new(width, height) * 0.5;
        pos.distance(half) / half.length()
    };
    match pattern {
        EmissionPattern::LeftToRight => pos.x / width,
        EmissionPattern::RightToLeft => 1.0 - pos.x / width,
        EmissionPattern::TopToBottom => pos.y / height,
        EmissionPattern::BottomToTop => 1.0 - pos.y / height,
        EmissionPattern::CenterOut => center_distance(),
        EmissionPattern::OutsideIn => 1.0 - center_distance(),
    }
}

/// Calcule les délais d'émission et active les particules au bon moment.
///
/// Les particules en attente sont rangées par délai croissant : chaque frame
/// n'examine que celles qui deviennent actives.
#[derive(Debug)]
pub struct EmissionController {
    config: EmissionConfig,
    schedule: Vec<usize>,
    cursor: usize,
}

impl EmissionController {
    pub fn new(config: EmissionConfig) -> Self {
        Self {
            config,
            schedule: Vec::new(),
            cursor: 0,
        }
    }

    pub fn config(&self) -> &EmissionConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.schedule.clear();
        self.cursor = 0;
    }

    /// Applique les variations visuelles optionnelles à une particule fraîchement créée.
    pub fn apply_random_visual_properties<R: Rng + ?Sized>(
        &self,
        storage: &mut ParticleStorage,
        index: usize,
        rng: &mut R,
    ) {
        if index >= storage.len() {
            return;
        }
        if self.config.random_sizes {
            storage.sizes[index] *= rng.random_range(0.6..=1.4);
        }
        if self.config.random_alphas {
            storage.alphas[index] = rng.random_range(0.6..=1.0);
        }
        if self.config.randomize_colors {
            let shift = rng.random_range(-0.1..=0.1);
            let color = &mut storage.colors[index];
            color.x = (color.x + shift).clamp(0.0, 1.0);
            color.y = (color.y + shift).clamp(0.0, 1.0);
            color.z = (color.z + shift).clamp(0.0, 1.0);
        }
        if self.config.random_rotations {
            storage.rotations[index] = rng.random_range(0.0..360.0);
        }
    }

    /// Une particule de délai `delay` est active dès que la progression brute l'atteint.
    #[inline]
    pub fn should_activate(&self, delay: f32, raw_progress: f32) -> bool {
        self.config.emission_type == EmissionType::Instant || raw_progress >= delay
    }

    /// Calcule le délai de chaque particule, active celles de délai nul et
    /// prépare l'ordonnancement des autres.
    pub fn calculate_delays<R: Rng + ?Sized>(
        &mut self,
        storage: &mut ParticleStorage,
        width: u32,
        height: u32,
        effect: ParticleEffect,
        rng: &mut R,
    ) {
        self.reset();
        let n = storage.len();

        if self.config.emission_type == EmissionType::Instant {
            for i in 0..n {
                storage.delays[i] = 0.0;
                storage.activate_particle(i);
            }
            return;
        }

        let (w, h) = (width as f32, height as f32);
        let pattern = self.config.pattern;
        for i in 0..n {
            storage.delays[i] = pattern_value(pattern, storage.original[i], w, h);
        }

        let (min, max) = match storage.delays[..n].iter().copied().minmax() {
            MinMaxResult::NoElements => return,
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let range = max - min;
        let degenerate = range <= DEGENERATE_RANGE;

        for i in 0..n {
            let delay = if degenerate {
                0.0
            } else {
                let mut normalized = (storage.delays[i] - min) / range;
                if self.config.randomize_delays {
                    normalized = (normalized * rng.random_range(0.7..=1.3)).clamp(0.0, 1.0);
                }
                let value = match effect {
                    ParticleEffect::Disintegration => normalized,
                    ParticleEffect::Assembly => 1.0 - normalized,
                };
                value * self.config.duration_factor
            };
            storage.delays[i] = delay;

            if delay <= 0.0 {
                storage.activate_particle(i);
            }
        }

        self.schedule = storage.pending_indices().collect();
        self.schedule
            .sort_by(|&a, &b| storage.delays[a].total_cmp(&storage.delays[b]));

        #[cfg(debug_assertions)]
        debug!(
            "Emission delays computed ({:?}, {:?}): {} immediate, {} scheduled",
            pattern,
            effect,
            storage.active_count(),
            self.schedule.len()
        );
    }

    /// Active les particules en attente dont le délai est atteint. Retourne le nombre activé.
    pub fn activate_due(&mut self, storage: &mut ParticleStorage, raw_progress: f32) -> usize {
        let start = self.cursor;
        while let Some(&index) = self.schedule.get(self.cursor) {
            if !self.should_activate(storage.delays[index], raw_progress) {
                break;
            }
            storage.activate_particle(index);
            self.cursor += 1;
        }
        self.cursor - start
    }

    /// Particules encore en file d'attente d'activation.
    pub fn scheduled_remaining(&self) -> usize {
        self.schedule.len() - self.cursor
    }
}

#[cfg(debug_assertions)]
use log::debug;

use crate::particle::vector2::{Color, Vec2};
use crate::particle::ParticleShape;

/// Stockage colonne (SoA) à capacité fixe de toutes les particules d'un effet.
///
/// # Rôle
/// Chaque attribut vit dans son propre vecteur, indexé par le slot de la particule.
/// Les buffers sont alloués une seule fois à `capacity` ; `reset()` les réutilise.
///
/// # Cycle de vie d'un slot
/// `create_particle` → *pending* → `activate_particle` → *active* →
/// `deactivate_particle` → retiré (ni active ni pending). Une particule retirée
/// n'est jamais réactivée pendant la même exécution.
#[derive(Debug)]
pub struct ParticleStorage {
    capacity: usize,
    len: usize,
    active_count: usize,
    pending_count: usize,

    /// Position d'origine (pixel échantillonné, cible de l'assemblage)
    pub original: Vec<Vec2>,
    pub position: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
    /// Décalage de départ de l'assemblage (position initiale = original + offset)
    pub start_offset: Vec<Vec2>,
    /// RGBA dans [0,1]
    pub colors: Vec<Color>,
    pub sizes: Vec<f32>,
    pub alphas: Vec<f32>,
    pub scales: Vec<f32>,
    /// Degrés
    pub rotations: Vec<f32>,
    pub shapes: Vec<ParticleShape>,
    /// Délai d'émission ∈ [0,1] (fraction de la progression brute)
    pub delays: Vec<f32>,
    active: Vec<bool>,
    pending: Vec<bool>,
}

impl ParticleStorage {
    pub fn new(capacity: usize) -> Self {
        #[cfg(debug_assertions)]
        debug!("ParticleStorage initialized with capacity {}", capacity);

        Self {
            capacity,
            len: 0,
            active_count: 0,
            pending_count: 0,
            original: vec![Vec2::ZERO; capacity],
            position: vec![Vec2::ZERO; capacity],
            velocity: vec![Vec2::ZERO; capacity],
            start_offset: vec![Vec2::ZERO; capacity],
            colors: vec![Color::ONE; capacity],
            sizes: vec![0.0; capacity],
            alphas: vec![0.0; capacity],
            scales: vec![0.0; capacity],
            rotations: vec![0.0; capacity],
            shapes: vec![ParticleShape::default(); capacity],
            delays: vec![0.0; capacity],
            active: vec![false; capacity],
            pending: vec![false; capacity],
        }
    }

    /// Crée une particule en attente. `None` si la capacité est atteinte.
    pub fn create_particle(
        &mut self,
        x: f32,
        y: f32,
        color: Color,
        shape: ParticleShape,
        size: f32,
    ) -> Option<usize> {
        if self.len >= self.capacity {
            return None;
        }
        let i = self.len;
        let pos = Vec2::new(x, y);
        self.original[i] = pos;
        self.position[i] = pos;
        self.velocity[i] = Vec2::ZERO;
        self.start_offset[i] = Vec2::ZERO;
        self.colors[i] = color;
        self.sizes[i] = size;
        self.alphas[i] = 1.0;
        self.scales[i] = 1.0;
        self.rotations[i] = 0.0;
        self.shapes[i] = shape;
        self.delays[i] = 0.0;
        self.active[i] = false;
        self.pending[i] = true;

        self.len += 1;
        self.pending_count += 1;
        Some(i)
    }

    /// Passe une particule *pending* à *active*. Sans effet sinon (ou hors bornes).
    pub fn activate_particle(&mut self, index: usize) {
        if index < self.len && self.pending[index] {
            self.pending[index] = false;
            self.active[index] = true;
            self.pending_count -= 1;
            self.active_count += 1;
        }
    }

    /// Retire une particule (ni active, ni pending). Idempotent, sans effet hors bornes.
    pub fn deactivate_particle(&mut self, index: usize) {
        if index >= self.len {
            return;
        }
        if self.active[index] {
            self.active[index] = false;
            self.active_count -= 1;
        }
        if self.pending[index] {
            self.pending[index] = false;
            self.pending_count -= 1;
        }
    }

    /// Vide le stockage sans réallouer.
    pub fn reset(&mut self) {
        self.active[..self.len].fill(false);
        self.pending[..self.len].fill(false);
        self.len = 0;
        self.active_count = 0;
        self.pending_count = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        index < self.len && self.active[index]
    }

    #[inline]
    pub fn is_pending(&self, index: usize) -> bool {
        index < self.len && self.pending[index]
    }

    /// Indices actifs, dans l'ordre d'insertion (évaluation paresseuse).
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.active[i])
    }

    /// Indices en attente, dans l'ordre d'insertion (évaluation paresseuse).
    pub fn pending_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(move |&i| self.pending[i])
    }

    /// Découpe les colonnes mutables en vues disjointes de `chunk_len` particules.
    pub fn chunks_mut(&mut self, chunk_len: usize) -> Vec<ParticleChunkMut<'_>> {
        let n = self.len;
        let chunk_len = chunk_len.max(1);

        let mut original = &self.original[..n];
        let mut start_offset = &self.start_offset[..n];
        let mut position = &mut self.position[..n];
        let mut velocity = &mut self.velocity[..n];
        let mut alphas = &mut self.alphas[..n];
        let mut scales = &mut self.scales[..n];
        let mut rotations = &mut self.rotations[..n];
        let mut active = &mut self.active[..n];

        let mut chunks = Vec::with_capacity(n.div_ceil(chunk_len));
        let mut offset = 0;
        while offset < n {
            let take = chunk_len.min(n - offset);
            let (original_head, original_tail) = original.split_at(take);
            original = original_tail;
            let (offset_head, offset_tail) = start_offset.split_at(take);
            start_offset = offset_tail;

            chunks.push(ParticleChunkMut {
                offset,
                original: original_head,
                start_offset: offset_head,
                position: take_front(&mut position, take),
                velocity: take_front(&mut velocity, take),
                alphas: take_front(&mut alphas, take),
                scales: take_front(&mut scales, take),
                rotations: take_front(&mut rotations, take),
                active: take_front(&mut active, take),
                retired: 0,
            });
            offset += take;
        }
        chunks
    }

    /// Prend en compte les particules retirées via des [`ParticleChunkMut`].
    pub fn note_retired(&mut self, retired: usize) {
        self.active_count = self.active_count.saturating_sub(retired);
    }
}

fn take_front<'a, T>(slice: &mut &'a mut [T], n: usize) -> &'a mut [T] {
    let (head, tail) = std::mem::take(slice).split_at_mut(n);
    *slice = tail;
    head
}

/// Vue mutable sur une plage contiguë de particules.
///
/// Les indices locaux vont de `0` à `len()` ; `global_index` retrouve le slot
/// du stockage. Deux vues issues du même découpage ne se recouvrent jamais,
/// elles peuvent donc être traitées par des threads différents.
#[derive(Debug)]
pub struct ParticleChunkMut<'a> {
    offset: usize,
    pub original: &'a [Vec2],
    pub start_offset: &'a [Vec2],
    pub position: &'a mut [Vec2],
    pub velocity: &'a mut [Vec2],
    pub alphas: &'a mut [f32],
    pub scales: &'a mut [f32],
    pub rotations: &'a mut [f32],
    active: &'a mut [bool],
    retired: usize,
}

impl<'a> ParticleChunkMut<'a> {
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    #[inline]
    pub fn global_index(&self, local: usize) -> usize {
        self.offset + local
    }

    #[inline]
    pub fn is_active(&self, local: usize) -> bool {
        self.active.get(local).copied().unwrap_or(false)
    }

    /// Retire une particule active locale ; comptabilisée via [`ParticleChunkMut::retired`].
    #[inline]
    pub fn deactivate(&mut self, local: usize) {
        if local >= self.active.len() {
            return;
        }
        if self.active[local] {
            self.active[local] = false;
            self.retired += 1;
        }
    }

    /// Nombre de particules actives retirées dans cette vue.
    pub fn retired(&self) -> usize {
        self.retired
    }
}

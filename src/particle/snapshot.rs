use bytemuck::{Pod, Zeroable};
use memoffset::offset_of;
use std::mem;
use std::sync::Arc;

use crate::particle::ParticleStorage;

/// Attributs d'une particule tels que transmis au renderer.
///
/// Layout C compact, directement uploadable dans un buffer d'instances.
///
/// # Attributs d'instance
///
/// | Location | Type    | Champs     |
/// |:--------:|:--------|:-----------|
/// | `0`      | `vec2`  | `pos`      |
/// | `1`      | `vec4`  | `color`    |
/// | `2`      | `float` | `size`     |
/// | `3`      | `float` | `alpha`    |
/// | `4`      | `float` | `scale`    |
/// | `5`      | `float` | `rotation` |
/// | `6`      | `uint`  | `shape`    |
/// | `7`      | `uint`  | `active`   |
///
/// **Stride total** : `12 × 4 = 48 octets`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub pos: [f32; 2],
    pub color: [f32; 4],
    pub size: f32,
    pub alpha: f32,
    pub scale: f32,
    /// Degrés
    pub rotation: f32,
    /// 0 = cercle, 1 = carré, 2 = forme libre
    pub shape: u32,
    /// 1 si la particule est à dessiner
    pub active: u32,
}

/// Description d'un attribut d'instance (location, composantes, offset en octets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceAttribute {
    pub location: u32,
    pub name: &'static str,
    pub components: u32,
    pub offset: usize,
}

impl ParticleInstance {
    pub const STRIDE: usize = mem::size_of::<Self>();

    /// Table des attributs pour configurer un vertex layout côté hôte.
    pub fn attributes() -> [InstanceAttribute; 8] {
        [
            InstanceAttribute { location: 0, name: "pos", components: 2, offset: offset_of!(Self, pos) },
            InstanceAttribute { location: 1, name: "color", components: 4, offset: offset_of!(Self, color) },
            InstanceAttribute { location: 2, name: "size", components: 1, offset: offset_of!(Self, size) },
            InstanceAttribute { location: 3, name: "alpha", components: 1, offset: offset_of!(Self, alpha) },
            InstanceAttribute { location: 4, name: "scale", components: 1, offset: offset_of!(Self, scale) },
            InstanceAttribute { location: 5, name: "rotation", components: 1, offset: offset_of!(Self, rotation) },
            InstanceAttribute { location: 6, name: "shape", components: 1, offset: offset_of!(Self, shape) },
            InstanceAttribute { location: 7, name: "active", components: 1, offset: offset_of!(Self, active) },
        ]
    }
}

/// Image immuable de l'état des particules pour une frame.
#[derive(Debug, Clone, Default)]
pub struct ParticleFrame {
    /// Numéro de frame de la simulation
    pub frame: u64,
    pub active_count: usize,
    pub instances: Vec<ParticleInstance>,
}

impl ParticleFrame {
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Vue octets prête pour un upload GPU.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    pub fn active_instances(&self) -> impl Iterator<Item = &ParticleInstance> {
        self.instances.iter().filter(|p| p.active != 0)
    }

    fn fill_from(&mut self, storage: &ParticleStorage, frame: u64) {
        let n = storage.len();
        self.frame = frame;
        self.active_count = storage.active_count();
        self.instances.clear();
        self.instances.extend((0..n).map(|i| ParticleInstance {
            pos: storage.position[i].to_array(),
            color: storage.colors[i].to_array(),
            size: storage.sizes[i],
            alpha: storage.alphas[i],
            scale: storage.scales[i],
            rotation: storage.rotations[i],
            shape: storage.shapes[i].id(),
            active: storage.is_active(i) as u32,
        }));
    }
}

/// Double buffer de frames.
///
/// Le lecteur garde un `Arc<ParticleFrame>` immuable ; l'écrivain remplit le
/// tampon arrière, dont l'allocation est réutilisée dès qu'aucun lecteur ne le
/// retient plus.
#[derive(Debug, Default)]
pub struct FrameBuffers {
    front: Arc<ParticleFrame>,
    back: Arc<ParticleFrame>,
}

impl FrameBuffers {
    pub fn new(capacity: usize) -> Self {
        let empty = || ParticleFrame {
            instances: Vec::with_capacity(capacity),
            ..ParticleFrame::default()
        };
        Self {
            front: Arc::new(empty()),
            back: Arc::new(empty()),
        }
    }

    /// Dernière frame publiée.
    pub fn front(&self) -> Arc<ParticleFrame> {
        Arc::clone(&self.front)
    }

    /// Copie l'état du stockage dans le tampon arrière puis l'échange avec l'avant.
    pub fn publish(&mut self, storage: &ParticleStorage, frame: u64) {
        match Arc::get_mut(&mut self.back) {
            Some(back) => back.fill_from(storage, frame),
            None => {
                // tampon encore détenu par un lecteur : nouvelle allocation
                let mut fresh = ParticleFrame {
                    instances: Vec::with_capacity(storage.len()),
                    ..ParticleFrame::default()
                };
                fresh.fill_from(storage, frame);
                self.back = Arc::new(fresh);
            }
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::vector2::Color;
    use crate::particle::ParticleShape;

    #[test]
    fn instance_layout_is_tightly_packed() {
        assert_eq!(ParticleInstance::STRIDE, 48);
        let attributes = ParticleInstance::attributes();
        assert_eq!(attributes[1].offset, 8);
        assert_eq!(attributes[7].offset, 44);
    }

    #[test]
    fn reader_keeps_its_frame_while_writer_publishes() {
        let mut storage = ParticleStorage::new(2);
        storage.create_particle(1.0, 2.0, Color::ONE, ParticleShape::Square, 3.0);
        storage.activate_particle(0);

        let mut buffers = FrameBuffers::new(2);
        buffers.publish(&storage, 1);
        let held = buffers.front();
        assert_eq!(held.count(), 1);
        assert_eq!(held.instances[0].shape, 1);

        storage.position[0].x = 50.0;
        buffers.publish(&storage, 2);
        buffers.publish(&storage, 3);

        assert_eq!(held.frame, 1);
        assert_eq!(held.instances[0].pos, [1.0, 2.0]);
        assert_eq!(buffers.front().instances[0].pos, [50.0, 2.0]);
        assert_eq!(buffers.front().as_bytes().len(), 48);
    }
}

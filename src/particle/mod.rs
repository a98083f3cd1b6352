pub mod particle_type;
pub use self::particle_type::{ParticleEffect, ParticleShape};

pub mod snapshot;
pub use self::snapshot::{FrameBuffers, InstanceAttribute, ParticleFrame, ParticleInstance};

pub mod storage;
pub use self::storage::{ParticleChunkMut, ParticleStorage};

pub mod vector2;
pub use self::vector2::{Color, Vec2, Vec2Ext};

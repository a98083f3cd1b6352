pub mod clock;
pub use self::clock::{Clock, ManualClock, MonotonicClock};

pub mod controller;
pub use self::controller::{AnimationController, AnimationState, ParticleVariations};

pub mod easing;
pub use self::easing::{CustomEasing, Easing};

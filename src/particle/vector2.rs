use rand::Rng;
use std::f32::consts::TAU;

pub use glam::{Vec2, Vec4 as Color};

/// Petites extensions de `glam::Vec2` utilisées par la génération et la physique.
pub trait Vec2Ext {
    /// Vecteur unitaire de direction uniforme.
    fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2;

    /// Vecteur unitaire orienté selon un angle en degrés (0 = droite, 90 = bas).
    fn from_degrees(degrees: f32) -> Vec2;
}

impl Vec2Ext for Vec2 {
    fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
        Vec2::from_angle(rng.random_range(0.0..TAU))
    }

    fn from_degrees(degrees: f32) -> Vec2 {
        Vec2::from_angle(degrees.to_radians())
    }
}

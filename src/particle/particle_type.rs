use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Forme de rendu d'une particule (identifiant transmis au renderer)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleShape {
    #[default]
    Circle = 0,
    Square = 1,
    /// Forme libre dessinée par l'hôte (triangle par défaut)
    Custom = 2,
}

impl ParticleShape {
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn description(&self) -> &'static str {
        match self {
            ParticleShape::Circle => "Circle particle",
            ParticleShape::Square => "Square particle",
            ParticleShape::Custom => "Custom particle",
        }
    }
}

/// Effet joué sur le contenu capturé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleEffect {
    /// Le contenu explose et s'efface
    #[default]
    Disintegration,
    /// Les particules convergent pour reformer le contenu
    Assembly,
}

impl FromStr for ParticleEffect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disintegration" | "disintegrate" => Ok(ParticleEffect::Disintegration),
            "assembly" | "assemble" => Ok(ParticleEffect::Assembly),
            other => anyhow::bail!("unknown particle effect '{other}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_ids_match_renderer_convention() {
        assert_eq!(ParticleShape::Circle.id(), 0);
        assert_eq!(ParticleShape::Square.id(), 1);
        assert_eq!(ParticleShape::Custom.id(), 2);
    }

    #[test]
    fn effect_parsing() {
        assert_eq!(
            "Assembly".parse::<ParticleEffect>().unwrap(),
            ParticleEffect::Assembly
        );
        assert!("melt".parse::<ParticleEffect>().is_err());
    }
}

use anyhow::Context;
use image::RgbaImage;

use crate::particle::Color;

/// Buffer de pixels capturé : RGBA8, ligne par ligne, alpha non prémultiplié.
///
/// Les composantes sont stockées dans [0,255] ; [`PixelBuffer::pixel`] les
/// renvoie normalisées dans [0,1].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Construit un buffer depuis des octets RGBA bruts (`width * height * 4`).
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            data.len() == expected,
            "pixel buffer {}x{} expects {} bytes, got {}",
            width,
            height,
            expected,
            data.len()
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer uni de la couleur donnée (RGBA8).
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Charge une image depuis le disque (tout format supporté par `image`).
    pub fn open(path: &str) -> anyhow::Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to load image '{path}'"))?
            .to_rgba8();
        Ok(Self::from(img))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Couleur normalisée du pixel (x, y). `None` hors du buffer.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[i..i + 4];
        Some(Color::new(
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        ))
    }

    /// Écrit un pixel RGBA8 ; sans effet hors du buffer.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_is_normalized_row_major() {
        let mut buffer = PixelBuffer::filled(3, 2, [0, 0, 0, 0]);
        buffer.set_pixel(2, 1, [255, 51, 0, 255]);
        let c = buffer.pixel(2, 1).unwrap();
        assert_eq!(c.x, 1.0);
        assert!((c.y - 0.2).abs() < 1e-6);
        assert_eq!(c.w, 1.0);
        assert_eq!(buffer.as_raw()[(3 + 2) * 4], 255);
        assert!(buffer.pixel(3, 0).is_none());
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(PixelBuffer::from_rgba8(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn converts_from_image_crate() {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
        let buffer = PixelBuffer::from(img);
        assert_eq!((buffer.width(), buffer.height()), (4, 3));
        assert_eq!(buffer.pixel(3, 2).unwrap().w, 1.0);
    }
}

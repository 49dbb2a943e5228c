//! HSL colours and colour ranges.
//!
//! Emitters store colour in HSL space so that hue can be interpolated
//! independently of saturation and lightness. Renderers that want RGB call
//! [`Colour::to_rgb`].

use glam::Vec3;

/// A colour in HSL space.
///
/// - `h` - hue in degrees, `[0, 360)`
/// - `s` - saturation, `[0, 1]`
/// - `l` - lightness, `[0, 1]`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Colour {
    /// Hue in degrees.
    pub h: f32,
    /// Saturation.
    pub s: f32,
    /// Lightness.
    pub l: f32,
}

impl Colour {
    /// Create a colour from hue, saturation and lightness.
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Convert to RGB with channels in `[0, 1]`.
    pub fn to_rgb(self) -> Vec3 {
        let h = self.h.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * self.l - 1.0).abs()) * self.s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = self.l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Vec3::new(r + m, g + m, b + m)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.h.is_finite() && self.s.is_finite() && self.l.is_finite()
    }
}

impl From<Colour> for Vec3 {
    fn from(c: Colour) -> Self {
        Vec3::new(c.h, c.s, c.l)
    }
}

impl From<Vec3> for Colour {
    fn from(v: Vec3) -> Self {
        Colour::new(v.x, v.y, v.z)
    }
}

/// A range of colours sampled component-wise.
///
/// A range whose `min` and `max` are equal always yields that colour.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColourRange {
    /// Lower corner in HSL space.
    pub min: Colour,
    /// Upper corner in HSL space.
    pub max: Colour,
}

impl ColourRange {
    /// Create a range between two colours.
    pub const fn new(min: Colour, max: Colour) -> Self {
        Self { min, max }
    }

    /// Linear blend between `min` and `max`, one factor per component.
    pub(crate) fn lerp(&self, t: Vec3) -> Colour {
        let min = Vec3::from(self.min);
        let max = Vec3::from(self.max);
        Colour::from(min + (max - min) * t)
    }
}

impl From<Colour> for ColourRange {
    fn from(c: Colour) -> Self {
        Self { min: c, max: c }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_primary_hues_to_rgb() {
        assert!(close(Colour::new(0.0, 1.0, 0.5).to_rgb(), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(Colour::new(120.0, 1.0, 0.5).to_rgb(), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(Colour::new(240.0, 1.0, 0.5).to_rgb(), Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_greyscale_ignores_hue() {
        assert!(close(Colour::new(200.0, 0.0, 0.6).to_rgb(), Vec3::splat(0.6)));
    }

    #[test]
    fn test_fixed_range_lerp() {
        let c = Colour::new(50.0, 0.8, 0.5);
        let range = ColourRange::from(c);
        assert_eq!(range.lerp(Vec3::new(0.3, 0.9, 0.1)), c);
    }
}

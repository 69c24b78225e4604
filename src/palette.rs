use plotters::style::RGBColor;

/// ColorBrewer "Set2", the qualitative palette used for brands
pub const SET2: [RGBColor; 8] = [
    RGBColor(102, 194, 165),
    RGBColor(252, 141, 98),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
    RGBColor(179, 179, 179),
];

/// ColorBrewer "YlGnBu" anchors, light to dark
const YLGNBU: [(u8, u8, u8); 9] = [
    (255, 255, 217),
    (237, 248, 177),
    (199, 233, 180),
    (127, 205, 187),
    (65, 182, 196),
    (29, 145, 192),
    (34, 94, 168),
    (37, 52, 148),
    (8, 29, 88),
];

const UNKNOWN: RGBColor = RGBColor(120, 120, 120);

/// Fixed brand to colour assignment.
///
/// Built once from the full dataset so a brand keeps its colour whatever the
/// filters leave on screen.
#[derive(Clone, Debug, Default)]
pub struct BrandPalette {
    brands: Vec<String>,
}

impl BrandPalette {
    pub fn new(mut brands: Vec<String>) -> Self {
        brands.sort();
        brands.dedup();
        BrandPalette { brands }
    }

    pub fn color(&self, brand: &str) -> RGBColor {
        match self.brands.iter().position(|b| b == brand) {
            Some(i) => SET2[i % SET2.len()],
            None => UNKNOWN,
        }
    }

    pub fn hex(&self, brand: &str) -> String {
        to_hex(self.color(brand))
    }

    pub fn brands(&self) -> &[String] {
        &self.brands
    }
}

pub fn to_hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Sequential colour for `t` in `[0, 1]`; values outside are clamped
pub fn ylgnbu(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (YLGNBU.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(YLGNBU.len() - 1);
    let frac = scaled - lo as f64;

    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (a, b) = (YLGNBU[lo], YLGNBU[hi]);
    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Whether dark text is readable on `color`
pub fn is_light(color: RGBColor) -> bool {
    let luma = 0.299 * color.0 as f64 + 0.587 * color.1 as f64 + 0.114 * color.2 as f64;
    luma > 140.0
}

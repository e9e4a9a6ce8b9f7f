//! Reference palettes and nearest-color matching
//!
//! A [`Palette`] is an ordered list of RGB colors. [`Palette::nearest`] picks a
//! member by squared Euclidean distance in RGB space; on ties the color reached
//! last in iteration order wins, so palette order is part of the output.

use image::Rgb;

use super::error::{EffectError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Self {
        Self { colors }
    }

    pub fn from_triples(triples: &[(u8, u8, u8)]) -> Self {
        Self::new(triples.iter().map(|&(r, g, b)| Rgb([r, g, b])).collect())
    }

    /// Build a palette from a comma-separated list such as `#FFFFFF,#000000`
    pub fn from_hex_list(list: &str) -> Result<Self> {
        let colors = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(parse_hex_color)
            .collect::<Result<Vec<_>>>()?;

        if colors.is_empty() {
            return Err(EffectError::EmptyPalette);
        }
        Ok(Self::new(colors))
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: &Rgb<u8>) -> bool {
        self.colors.contains(color)
    }

    /// Closest palette color to `color`.
    ///
    /// A candidate replaces the running best when its distance is less than
    /// or *equal* to it, so the last color tied for the minimum is returned.
    pub fn nearest(&self, color: Rgb<u8>) -> Result<Rgb<u8>> {
        let mut candidates = self.colors.iter();
        let first = candidates.next().ok_or(EffectError::EmptyPalette)?;

        let mut best = *first;
        let mut best_distance = squared_distance(color, *first);

        for &candidate in candidates {
            let distance = squared_distance(color, candidate);
            if distance <= best_distance {
                best = candidate;
                best_distance = distance;
            }
        }

        Ok(best)
    }
}

/// Sum of squared per-channel differences over R, G, B.
#[inline]
pub fn squared_distance(a: Rgb<u8>, b: Rgb<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Parse a `#RRGGBB` color (hex digits are case-insensitive).
pub fn parse_hex_color(hex: &str) -> Result<Rgb<u8>> {
    let invalid = || EffectError::InvalidHexColor(hex.to_string());

    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

const PALETTE_1: [(u8, u8, u8); 8] = [
    (13, 43, 69),
    (32, 60, 86),
    (84, 78, 104),
    (141, 105, 122),
    (208, 129, 89),
    (255, 170, 94),
    (255, 212, 163),
    (255, 236, 214),
];

const PALETTE_2: [(u8, u8, u8); 4] = [
    (48, 0, 48),
    (96, 40, 120),
    (248, 144, 32),
    (248, 240, 136),
];

const PALETTE_3: [(u8, u8, u8); 16] = [
    (26, 28, 44),
    (93, 39, 93),
    (177, 62, 83),
    (239, 125, 87),
    (255, 205, 117),
    (167, 240, 112),
    (56, 183, 100),
    (37, 113, 121),
    (41, 54, 111),
    (59, 93, 201),
    (65, 166, 246),
    (115, 239, 247),
    (244, 244, 244),
    (148, 176, 194),
    (86, 108, 134),
    (51, 60, 87),
];

const PALETTE_4: [(u8, u8, u8); 4] = [
    (44, 33, 55),
    (118, 68, 98),
    (237, 180, 161),
    (169, 104, 104),
];

const PALETTE_5: [(u8, u8, u8); 15] = [
    (7, 5, 5),
    (33, 25, 25),
    (82, 58, 42),
    (138, 107, 62),
    (193, 156, 77),
    (234, 219, 116),
    (160, 179, 53),
    (83, 124, 68),
    (66, 60, 86),
    (89, 111, 175),
    (107, 185, 182),
    (251, 250, 249),
    (184, 170, 176),
    (121, 112, 126),
    (148, 91, 40),
];

const PALETTE_6: [(u8, u8, u8); 16] = [
    (140, 143, 174),
    (88, 69, 99),
    (62, 33, 55),
    (154, 99, 72),
    (215, 155, 125),
    (245, 237, 186),
    (192, 199, 65),
    (100, 125, 52),
    (228, 148, 58),
    (157, 48, 59),
    (210, 100, 113),
    (112, 55, 127),
    (126, 196, 193),
    (52, 133, 157),
    (23, 67, 75),
    (31, 14, 28),
];

const PALETTE_7: [(u8, u8, u8); 13] = [
    (94, 96, 110),
    (34, 52, 209),
    (12, 126, 69),
    (68, 170, 204),
    (138, 54, 34),
    (235, 138, 96),
    (0, 0, 0),
    (92, 46, 120),
    (226, 61, 105),
    (170, 92, 61),
    (255, 217, 63),
    (181, 181, 181),
    (255, 255, 255),
];

const PALETTE_8: [(u8, u8, u8); 8] = [
    (21, 25, 26),
    (138, 76, 88),
    (217, 98, 117),
    (230, 184, 193),
    (69, 107, 115),
    (75, 151, 166),
    (165, 189, 194),
    (255, 245, 247),
];

/// Read-only set of the built-in palettes, keyed "1" to "8".
#[derive(Debug, Clone)]
pub struct PaletteRegistry {
    entries: Vec<(String, Palette)>,
}

impl PaletteRegistry {
    pub fn builtin() -> Self {
        let tables: [&[(u8, u8, u8)]; 8] = [
            &PALETTE_1, &PALETTE_2, &PALETTE_3, &PALETTE_4, &PALETTE_5, &PALETTE_6, &PALETTE_7,
            &PALETTE_8,
        ];

        let entries = tables
            .iter()
            .enumerate()
            .map(|(i, table)| ((i + 1).to_string(), Palette::from_triples(table)))
            .collect();

        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Palette> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, palette)| palette)
    }

    pub fn require(&self, key: &str) -> Result<&Palette> {
        self.get(key)
            .ok_or_else(|| EffectError::UnknownPalette(key.to_string()))
    }

    /// Palettes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Palette)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Palettes, and the mapping from escape time to color.
//!
//! A palette has four anchor colors.  `center` paints the points that
//! never escaped.  The escaping points are spread over three bands on a
//! logarithmic scale of their escape time: the fastest escapes fade in
//! from black toward `far`, slower ones blend from `far` to `middle`,
//! and the slowest, the ones hugging the boundary of the set, blend
//! from `middle` to `close`.
//!
//! Palettes come either from the built-in preset table or from a JSON
//! palette file, an array of objects such as:
//!
//! ```json
//! [{ "name": "classic", "center": "#000000", "far": "#ff0000",
//!    "middle": "#ffff00", "close": "#ffffff",
//!    "panel": "#202020", "symbols": "#ffffff" }]
//! ```
//!
//! `panel` and `symbols` are accent colors for a surrounding interface
//! and are carried along untouched.  `alpha` is optional and defaults to
//! fully opaque.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};
use num::clamp;
use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::errors::{Error, Result};

/// An 8-bit-per-channel RGB triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses `#rrggbb`.  The leading hash is optional and the digits
    /// may be either case.
    pub fn from_hex(s: &str) -> Result<Rgb> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColor(s.to_string()));
        }
        let channel = |at: usize| {
            u8::from_str_radix(&digits[at..at + 2], 16)
                .map_err(|_| Error::InvalidColor(s.to_string()))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn channels(self) -> [f64; 3] {
        [f64::from(self.0), f64::from(self.1), f64::from(self.2)]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        Rgb::from_hex(&hex).map_err(de::Error::custom)
    }
}

fn opaque() -> u8 {
    255
}

/// A named set of anchor colors.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Palette {
    /// The name the palette is selected by.
    pub name: String,
    /// Interior points.
    pub center: Rgb,
    /// Points that escape fastest.
    pub far: Rgb,
    /// Points of middling escape time.
    pub middle: Rgb,
    /// Points that escape slowest, next to the set.
    pub close: Rgb,
    /// Alpha written with every pixel.
    #[serde(default = "opaque")]
    pub alpha: u8,
    /// Interface accent color; not used when rendering.
    #[serde(default)]
    pub panel: String,
    /// Interface text color; not used when rendering.
    #[serde(default)]
    pub symbols: String,
}

// name, center, far, middle, close, panel, symbols
type Preset = (&'static str, Rgb, Rgb, Rgb, Rgb, &'static str, &'static str);

const PRESETS: [Preset; 3] = [
    (
        "classic",
        Rgb(0, 0, 0),
        Rgb(255, 0, 0),
        Rgb(255, 255, 0),
        Rgb(255, 255, 255),
        "#3a0000",
        "#ffffff",
    ),
    (
        "matrix",
        Rgb(0, 0, 0),
        Rgb(0, 96, 0),
        Rgb(0, 255, 0),
        Rgb(200, 255, 200),
        "#001a00",
        "#00ff00",
    ),
    (
        "acva",
        Rgb(0, 0, 0),
        Rgb(0, 64, 128),
        Rgb(0, 200, 255),
        Rgb(224, 255, 255),
        "#00202a",
        "#00ffff",
    ),
];

impl Palette {
    /// Looks up one of the built-in palettes by name.
    pub fn preset(name: &str) -> Option<Palette> {
        PRESETS
            .iter()
            .find(|p| p.0 == name)
            .map(|&(found, center, far, middle, close, panel, symbols)| Palette {
                name: found.to_string(),
                center,
                far,
                middle,
                close,
                alpha: opaque(),
                panel: panel.to_string(),
                symbols: symbols.to_string(),
            })
    }

    /// The same palette with a different alpha.
    pub fn with_alpha(self, alpha: u8) -> Palette {
        Palette { alpha, ..self }
    }
}

fn blend(from: [f64; 3], to: [f64; 3], by: f64, alpha: u8) -> [u8; 4] {
    let mut out = [0, 0, 0, alpha];
    for i in 0..3 {
        let v = from[i] + (to[i] - from[i]) * by;
        out[i] = clamp(v.round(), 0.0, 255.0) as u8;
    }
    out
}

/// Maps an escape time to an RGBA color.
///
/// The band index is `3 * ln(count) / ln(max_iterations - 1)`.  A count
/// of zero, or a cap of two or less (where the denominator is not
/// positive), takes band index zero, the darkest end of the `far` band,
/// so the logarithm never produces an infinity or NaN.  Channels are
/// clamped, as the index can overshoot 3 slightly near the cap.
pub fn color_for(count: u32, max_iterations: u32, palette: &Palette) -> [u8; 4] {
    if count >= max_iterations {
        let Rgb(r, g, b) = palette.center;
        return [r, g, b, palette.alpha];
    }

    let denominator = (f64::from(max_iterations) - 1.0).ln();
    let t = if count == 0 || denominator <= 0.0 {
        0.0
    } else {
        3.0 * f64::from(count).ln() / denominator
    };

    let far = palette.far.channels();
    let middle = palette.middle.channels();
    let close = palette.close.channels();
    if t < 1.0 {
        blend([0.0; 3], far, t, palette.alpha)
    } else if t < 2.0 {
        blend(far, middle, t - 1.0, palette.alpha)
    } else {
        blend(middle, close, t - 2.0, palette.alpha)
    }
}

/// An ordered collection of palettes.  The first one is the default.
#[derive(Clone, Debug)]
pub struct PaletteSet {
    palettes: Vec<Palette>,
}

impl PaletteSet {
    /// The built-in presets, "classic" first.
    pub fn builtin() -> PaletteSet {
        PaletteSet {
            palettes: PRESETS
                .iter()
                .filter_map(|p| Palette::preset(p.0))
                .collect(),
        }
    }

    /// Reads a JSON array of palettes.
    pub fn from_reader<R: Read>(reader: R) -> Result<PaletteSet> {
        let palettes: Vec<Palette> = serde_json::from_reader(reader)?;
        if palettes.is_empty() {
            return Err(Error::InvalidParameter(
                "palette data contains no palettes".to_string(),
            ));
        }
        debug!("parsed {} palettes", palettes.len());
        Ok(PaletteSet { palettes })
    }

    /// Reads a JSON palette file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<PaletteSet> {
        let file = File::open(path.as_ref())?;
        let set = PaletteSet::from_reader(BufReader::new(file))?;
        info!(
            "loaded {} palettes from {}",
            set.palettes.len(),
            path.as_ref().display()
        );
        Ok(set)
    }

    /// The first palette in the set.
    pub fn default_palette(&self) -> &Palette {
        &self.palettes[0]
    }

    /// Finds a palette by name.
    pub fn get(&self, name: &str) -> Result<&Palette> {
        self.palettes
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::UnknownPalette(name.to_string()))
    }

    /// Every palette, in file order.
    pub fn iter(&self) -> impl Iterator<Item = &Palette> {
        self.palettes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Palette {
        Palette::preset("classic").unwrap()
    }

    #[test]
    fn hex_parses_with_and_without_hash() {
        assert_eq!(Rgb::from_hex("#ff8000").unwrap(), Rgb(255, 128, 0));
        assert_eq!(Rgb::from_hex("00FFaa").unwrap(), Rgb(0, 255, 170));
        assert_eq!(Rgb(1, 2, 255).to_string(), "#0102ff");
    }

    #[test]
    fn hex_rejects_garbage() {
        for bad in &["", "#fff", "#gg0000", "#1234567", "#ff00é"] {
            match Rgb::from_hex(bad) {
                Err(Error::InvalidColor(_)) => {}
                other => panic!("{:?} parsed as {:?}", bad, other),
            }
        }
    }

    #[test]
    fn interior_is_center_color() {
        let mut p = classic();
        p.center = Rgb(10, 20, 30);
        assert_eq!(color_for(100, 100, &p), [10, 20, 30, 255]);
        assert_eq!(color_for(2, 2, &p), [10, 20, 30, 255]);
    }

    #[test]
    fn zero_count_is_black() {
        assert_eq!(color_for(0, 100, &classic()), [0, 0, 0, 255]);
    }

    #[test]
    fn tiny_caps_do_not_divide_by_zero() {
        assert_eq!(color_for(1, 2, &classic()), [0, 0, 0, 255]);
        assert_eq!(color_for(0, 1, &classic()), [0, 0, 0, 255]);
    }

    #[test]
    fn bands_follow_the_anchors() {
        let p = classic();
        // t = 3 ln(2) / ln(99), inside the far band
        let [r, g, b, _] = color_for(2, 100, &p);
        assert!(r > 0 && r < 255);
        assert_eq!((g, b), (0, 0));
        // t lands between 1 and 2: red, partly yellow
        let [r, g, b, _] = color_for(8, 100, &p);
        assert_eq!((r, b), (255, 0));
        assert!(g > 0);
        // t above 2: yellow fading to white
        let [r, g, b, _] = color_for(60, 100, &p);
        assert_eq!((r, g), (255, 255));
        assert!(b > 0);
    }

    #[test]
    fn channels_stay_in_range_near_the_cap() {
        let mut p = classic();
        p.middle = Rgb(255, 0, 255);
        p.close = Rgb(0, 255, 0);
        for cap in 2..300 {
            for count in 0..=cap {
                let c = color_for(count, cap, &p);
                assert_eq!(c[3], 255);
            }
        }
        // count = cap - 1 gives t exactly 3
        assert_eq!(color_for(99, 100, &p), [0, 255, 0, 255]);
    }

    #[test]
    fn alpha_comes_from_the_palette() {
        let p = classic().with_alpha(128);
        assert_eq!(color_for(5, 100, &p)[3], 128);
        assert_eq!(color_for(100, 100, &p)[3], 128);
    }

    #[test]
    fn presets_are_looked_up_by_name() {
        let set = PaletteSet::builtin();
        assert_eq!(set.default_palette().name, "classic");
        assert_eq!(set.get("matrix").unwrap().middle, Rgb(0, 255, 0));
        assert_eq!(set.get("acva").unwrap().center, Rgb(0, 0, 0));
        assert!(Palette::preset("sepia").is_none());
        match set.get("sepia") {
            Err(Error::UnknownPalette(name)) => assert_eq!(name, "sepia"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn palette_json_loads() {
        let json = r##"[
            {"name": "ember", "center": "#101010", "far": "#800000",
             "middle": "#ff8000", "close": "#ffff80",
             "panel": "#000000", "symbols": "#ffffff"},
            {"name": "ghost", "center": "000000", "far": "404040",
             "middle": "808080", "close": "FFFFFF", "alpha": 200}
        ]"##;
        let set = PaletteSet::from_reader(json.as_bytes()).unwrap();
        assert_eq!(set.iter().count(), 2);
        assert_eq!(set.default_palette().name, "ember");
        assert_eq!(set.default_palette().alpha, 255);
        assert_eq!(set.default_palette().panel, "#000000");
        let ghost = set.get("ghost").unwrap();
        assert_eq!(ghost.alpha, 200);
        assert_eq!(ghost.close, Rgb(255, 255, 255));
        assert_eq!(ghost.symbols, "");
    }

    #[test]
    fn shipped_palette_file_matches_presets() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/palettes/palettes.json");
        let set = PaletteSet::from_path(path).unwrap();
        for name in &["classic", "matrix", "acva"] {
            assert_eq!(set.get(name).unwrap(), &Palette::preset(name).unwrap());
        }
        assert_eq!(set.get("glass").unwrap().alpha, 160);
    }

    #[test]
    fn palette_json_rejects_bad_colors_and_empty_sets() {
        let bad = r##"[{"name": "x", "center": "#zzzzzz", "far": "#000000",
                       "middle": "#000000", "close": "#000000"}]"##;
        assert!(PaletteSet::from_reader(bad.as_bytes()).is_err());
        assert!(PaletteSet::from_reader("[]".as_bytes()).is_err());
        assert!(PaletteSet::from_reader("{".as_bytes()).is_err());
    }
}

use std::collections::HashMap;
use std::str::FromStr;

use palette::Srgb;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Colour-blind friendly palette (Wong, Nature Methods 2011)
// ---------------------------------------------------------------------------

pub const WONG_PALETTE: [&str; 8] = [
    "#000000", "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7",
];

/// Parse a `#rrggbb` literal. Only used on the constants in this module.
fn hex(code: &str) -> Srgb<u8> {
    Srgb::<u8>::from_str(code).unwrap_or_else(|_| Srgb::new(128, 128, 128))
}

/// Format a colour as a lowercase `#rrggbb` string.
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

// ---------------------------------------------------------------------------
// ModelRegistry: model name → stable palette slot
// ---------------------------------------------------------------------------

/// Assigns every model a slot in first-seen order and maps slots onto the
/// palette cyclically, so a model keeps its colour across re-renders of the
/// same input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRegistry {
    order: Vec<String>,
    slots: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Register `model` if unseen and return its slot.
    pub fn register(&mut self, model: &str) -> usize {
        if let Some(&slot) = self.slots.get(model) {
            return slot;
        }
        let slot = self.order.len();
        self.order.push(model.to_string());
        self.slots.insert(model.to_string(), slot);
        slot
    }

    pub fn slot(&self, model: &str) -> Option<usize> {
        self.slots.get(model).copied()
    }

    /// Models in slot order.
    pub fn models(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Palette colour for `model`; unregistered models get grey.
    pub fn color_for(&self, model: &str) -> Srgb<u8> {
        match self.slot(model) {
            Some(slot) => hex(WONG_PALETTE[slot % WONG_PALETTE.len()]),
            None => Srgb::new(128, 128, 128),
        }
    }

    /// Legend entries (model → colour) in slot order.
    pub fn legend_entries(&self) -> Vec<(String, Srgb<u8>)> {
        self.order
            .iter()
            .map(|m| (m.clone(), self.color_for(m)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for relative scores
// ---------------------------------------------------------------------------

/// Linear three-stop colour scale, interpolated in sRGB and clamped at both
/// ends of the domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DivergingScale {
    pub domain_min: f64,
    pub domain_mid: f64,
    pub domain_max: f64,
    #[serde(serialize_with = "serialize_stops")]
    pub range: [Srgb<u8>; 3],
}

impl Default for DivergingScale {
    /// -50 % green, 0 white, +50 % blue.
    fn default() -> Self {
        DivergingScale {
            domain_min: -0.5,
            domain_mid: 0.0,
            domain_max: 0.5,
            range: [hex("#76b900"), hex("#ffffff"), hex("#0072CE")],
        }
    }
}

impl DivergingScale {
    pub fn color_for(&self, value: f64) -> Srgb<u8> {
        let [low, mid, high] = self.range.map(|c| c.into_format::<f32>());
        let mixed = if value <= self.domain_mid {
            let t = unit_fraction(value, self.domain_min, self.domain_mid);
            lerp(low, mid, t)
        } else {
            let t = unit_fraction(value, self.domain_mid, self.domain_max);
            lerp(mid, high, t)
        };
        mixed.into_format::<u8>()
    }
}

fn lerp(from: Srgb<f32>, to: Srgb<f32>, t: f32) -> Srgb<f32> {
    Srgb::new(
        from.red + (to.red - from.red) * t,
        from.green + (to.green - from.green) * t,
        from.blue + (to.blue - from.blue) * t,
    )
}

/// Position of `value` between `from` and `to`, clamped to `[0, 1]`.
fn unit_fraction(value: f64, from: f64, to: f64) -> f32 {
    let span = to - from;
    if span.abs() < f64::EPSILON || value.is_nan() {
        return 1.0;
    }
    ((value - from) / span).clamp(0.0, 1.0) as f32
}

fn serialize_stops<S: serde::Serializer>(
    stops: &[Srgb<u8>; 3],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeSeq;
    let mut seq = serializer.serialize_seq(Some(stops.len()))?;
    for stop in stops {
        seq.serialize_element(&to_hex(*stop))?;
    }
    seq.end()
}

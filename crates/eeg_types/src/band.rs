//! Physiological frequency bands and per-band power results

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A named frequency interval of brain activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrequencyBand {
    pub name: &'static str,
    /// Lower edge in Hz (inclusive)
    pub low_hz: f64,
    /// Upper edge in Hz (inclusive)
    pub high_hz: f64,
    /// Color used by renderers for this band
    pub display_color: &'static str,
}

impl FrequencyBand {
    /// Human readable range, e.g. `"8-13 Hz"`.
    pub fn range_label(&self) -> String {
        format!("{}-{} Hz", self.low_hz, self.high_hz)
    }

    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.low_hz && freq_hz <= self.high_hz
    }
}

/// The five bands in declaration order. Dominant-band ties resolve to the
/// earliest entry of this table.
pub const FREQUENCY_BANDS: [FrequencyBand; 5] = [
    FrequencyBand { name: "Delta", low_hz: 0.5, high_hz: 4.0, display_color: "#FF6B6B" },
    FrequencyBand { name: "Theta", low_hz: 4.0, high_hz: 8.0, display_color: "#4ECDC4" },
    FrequencyBand { name: "Alpha", low_hz: 8.0, high_hz: 13.0, display_color: "#45B7D1" },
    FrequencyBand { name: "Beta", low_hz: 13.0, high_hz: 30.0, display_color: "#96CEB4" },
    FrequencyBand { name: "Gamma", low_hz: 30.0, high_hz: 100.0, display_color: "#FFEAA7" },
];

/// Power of one band as reported to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandPower {
    pub power: f64,
    #[serde(rename = "range")]
    pub range_label: String,
    pub color: &'static str,
}

/// Band powers keyed by band name, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BandPowerResult {
    entries: Vec<(&'static str, BandPower)>,
}

impl BandPowerResult {
    pub fn new() -> Self {
        Self { entries: Vec::with_capacity(FREQUENCY_BANDS.len()) }
    }

    /// Record the power of `band`. Negative or non-finite powers are stored as 0.
    pub fn insert(&mut self, band: &FrequencyBand, power: f64) {
        let power = if power.is_finite() && power > 0.0 { power } else { 0.0 };
        let entry = BandPower {
            power,
            range_label: band.range_label(),
            color: band.display_color,
        };
        match self.entries.iter_mut().find(|(name, _)| *name == band.name) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((band.name, entry)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&BandPower> {
        self.entries
            .iter()
            .find(|(band, _)| *band == name)
            .map(|(_, power)| power)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &BandPower)> + '_ {
        self.entries.iter().map(|(name, power)| (*name, power))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_power(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p.power).sum()
    }

    /// Band with the maximum power; the first-seen maximum wins.
    pub fn dominant_band(&self) -> Option<&'static str> {
        let mut best: Option<(&'static str, f64)> = None;
        for (name, power) in &self.entries {
            match best {
                Some((_, max)) if power.power <= max => {}
                _ => best = Some((*name, power.power)),
            }
        }
        best.map(|(name, _)| name)
    }
}

// Serialized as a JSON object whose keys follow declaration order.
impl Serialize for BandPowerResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, power) in &self.entries {
            map.serialize_entry(name, power)?;
        }
        map.end()
    }
}

//! Rendering collaborators fed by the band powers.

use eeg_types::BandPowerResult;

/// Turns band powers into a presentation artifact.
///
/// Renderers see only the band powers and the subject label. A render
/// failure never fails the analysis.
pub trait BandPowerRenderer {
    fn name(&self) -> &'static str;

    fn render(&self, band_powers: &BandPowerResult, subject_label: &str) -> anyhow::Result<String>;
}

/// Caption listing each band's share of the total power, e.g.
/// `"Delta: 10.0%  Theta: 20.0%  ..."`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionRenderer;

impl BandPowerRenderer for CaptionRenderer {
    fn name(&self) -> &'static str {
        "caption"
    }

    fn render(&self, band_powers: &BandPowerResult, _subject_label: &str) -> anyhow::Result<String> {
        let total = band_powers.total_power();
        let parts: Vec<String> = band_powers
            .iter()
            .map(|(name, power)| {
                let pct = if total > 0.0 { power.power / total * 100.0 } else { 0.0 };
                format!("{}: {:.1}%", name, pct)
            })
            .collect();
        Ok(parts.join("  "))
    }
}

/// Download name for the artwork of a recording, from the part of its
/// file name before the first dot.
pub fn artwork_filename(eeg_filename: &str) -> String {
    let stem = eeg_filename.split('.').next().unwrap_or_default();
    format!("brain_wave_art_{}.png", stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eeg_types::FREQUENCY_BANDS;

    fn powers(values: [f64; 5]) -> BandPowerResult {
        let mut result = BandPowerResult::new();
        for (band, power) in FREQUENCY_BANDS.iter().zip(values) {
            result.insert(band, power);
        }
        result
    }

    #[test]
    fn test_caption_percentages() {
        let caption = CaptionRenderer
            .render(&powers([1.0, 2.0, 5.0, 1.0, 1.0]), "Brain Wave Art")
            .unwrap();
        assert_eq!(
            caption,
            "Delta: 10.0%  Theta: 20.0%  Alpha: 50.0%  Beta: 10.0%  Gamma: 10.0%"
        );
    }

    #[test]
    fn test_caption_with_no_power() {
        let caption = CaptionRenderer.render(&powers([0.0; 5]), "x").unwrap();
        assert_eq!(caption, "Delta: 0.0%  Theta: 0.0%  Alpha: 0.0%  Beta: 0.0%  Gamma: 0.0%");
    }

    #[test]
    fn test_artwork_filename() {
        assert_eq!(artwork_filename("session1.eeg"), "brain_wave_art_session1.png");
        assert_eq!(artwork_filename("a.b.eeg"), "brain_wave_art_a.png");
        assert_eq!(artwork_filename("upload.eeg"), "brain_wave_art_upload.png");
    }
}

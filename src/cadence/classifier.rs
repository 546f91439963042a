use std::fmt;

use crate::config::ClassifierConfig;
use crate::error::{CadenceError, Result};

/// One half-open rate interval `[lower, upper)` and its label
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Position in ascending order, starting at 0
    pub index: usize,
    pub label: String,
    pub lower: f32,
    /// `None` for the final, unbounded band
    pub upper: Option<f32>,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "{} [{}, {})", self.label, self.lower, upper),
            None => write!(f, "{} [{}, inf)", self.label, self.lower),
        }
    }
}

/// Maps a rate to one of a contiguous, ordered set of bands
///
/// The bands cover `[0, +inf)` without gaps or overlaps, so every rate maps
/// to exactly one band. There is no hysteresis: the same rate always yields
/// the same band.
#[derive(Debug, Clone)]
pub struct StateClassifier {
    bands: Vec<Band>,
}

impl StateClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let mut bands = Vec::with_capacity(config.bands.len() + 1);
        let mut lower = 0.0;

        for (index, band) in config.bands.iter().enumerate() {
            if band.label.is_empty() {
                return Err(CadenceError::Config(format!(
                    "classifier band {} has an empty label",
                    index
                )));
            }
            if !band.upper.is_finite() || band.upper <= lower {
                return Err(CadenceError::Config(format!(
                    "classifier band '{}' upper bound {} must be finite and above {}",
                    band.label, band.upper, lower
                )));
            }
            bands.push(Band {
                index,
                label: band.label.clone(),
                lower,
                upper: Some(band.upper),
            });
            lower = band.upper;
        }

        if config.final_label.is_empty() {
            return Err(CadenceError::Config(
                "classifier final_label must not be empty".to_string(),
            ));
        }
        bands.push(Band {
            index: bands.len(),
            label: config.final_label.clone(),
            lower,
            upper: None,
        });

        Ok(Self { bands })
    }

    /// Return the band containing `rate`
    ///
    /// Negative and NaN rates are treated as zero.
    pub fn classify(&self, rate: f32) -> &Band {
        let rate = if rate > 0.0 { rate } else { 0.0 };
        self.bands
            .iter()
            .find(|band| band.upper.is_none_or(|upper| rate < upper))
            .unwrap_or(&self.bands[self.bands.len() - 1])
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BandConfig;

    fn classifier() -> StateClassifier {
        StateClassifier::new(&ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn test_default_bands() {
        let c = classifier();
        assert_eq!(c.classify(0.0).label, "still");
        assert_eq!(c.classify(9.99).label, "still");
        assert_eq!(c.classify(10.0).label, "shuffling");
        assert_eq!(c.classify(100.0).label, "walking");
        assert_eq!(c.classify(139.9).label, "brisk");
        assert_eq!(c.classify(140.0).label, "running");
        assert_eq!(c.classify(10_000.0).label, "running");
        assert_eq!(c.classify(f32::INFINITY).label, "running");
    }

    #[test]
    fn test_bands_are_contiguous() {
        let c = classifier();
        let bands = c.bands();
        assert_eq!(bands[0].lower, 0.0);
        for pair in bands.windows(2) {
            assert_eq!(pair[0].upper, Some(pair[1].lower));
        }
        assert!(bands.last().unwrap().upper.is_none());
    }

    #[test]
    fn test_total_and_non_overlapping() {
        let c = classifier();
        for i in 0..4000 {
            let rate = i as f32 * 0.1;
            let matching = c
                .bands()
                .iter()
                .filter(|b| rate >= b.lower && b.upper.is_none_or(|u| rate < u))
                .count();
            assert_eq!(matching, 1, "rate {} matched {} bands", rate, matching);

            let band = c.classify(rate);
            assert!(rate >= band.lower);
        }
    }

    #[test]
    fn test_negative_and_nan_map_to_first_band() {
        let c = classifier();
        assert_eq!(c.classify(-5.0).index, 0);
        assert_eq!(c.classify(f32::NAN).index, 0);
    }

    #[test]
    fn test_single_unbounded_band() {
        let config = ClassifierConfig {
            bands: vec![],
            final_label: "any".to_string(),
        };
        let c = StateClassifier::new(&config).unwrap();
        assert_eq!(c.classify(0.0).label, "any");
        assert_eq!(c.classify(500.0).label, "any");
    }

    #[test]
    fn test_rejects_unordered_bounds() {
        let config = ClassifierConfig {
            bands: vec![
                BandConfig {
                    label: "a".to_string(),
                    upper: 50.0,
                },
                BandConfig {
                    label: "b".to_string(),
                    upper: 50.0,
                },
            ],
            final_label: "c".to_string(),
        };
        assert!(StateClassifier::new(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_bound_and_empty_label() {
        let zero = ClassifierConfig {
            bands: vec![BandConfig {
                label: "a".to_string(),
                upper: 0.0,
            }],
            final_label: "b".to_string(),
        };
        assert!(StateClassifier::new(&zero).is_err());

        let unnamed = ClassifierConfig {
            bands: vec![],
            final_label: String::new(),
        };
        assert!(StateClassifier::new(&unnamed).is_err());
    }

    #[test]
    fn test_display() {
        let c = classifier();
        assert_eq!(c.bands()[0].to_string(), "still [0, 10)");
        assert_eq!(c.bands()[4].to_string(), "running [140, inf)");
    }
}

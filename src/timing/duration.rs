use serde::{Deserialize, Serialize};

use crate::error::{ReelError, Result};

/// Fraction of a clip's duration used for its entry cross-fade
pub const FADE_RATIO: f64 = 0.3;

/// Upper bound on the cross-fade length, in seconds
pub const FADE_MAX: f64 = 0.7;

/// Seconds-per-image above which the fade is saturated at [`FADE_MAX`]
pub const FADE_SWITCH: f64 = FADE_MAX / FADE_RATIO;

/// Cross-fade length model: `fade(sec_per) = min(sec_per * ratio, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeModel {
    pub ratio: f64,
    pub max: f64,
}

impl Default for FadeModel {
    fn default() -> Self {
        Self {
            ratio: FADE_RATIO,
            max: FADE_MAX,
        }
    }
}

impl FadeModel {
    pub fn new(ratio: f64, max: f64) -> Self {
        Self { ratio, max }
    }

    /// Seconds-per-image where the linear regime ends
    pub fn switch_point(&self) -> f64 {
        self.max / self.ratio
    }

    /// Cross-fade length for clips of `sec_per` seconds (zero for non-positive input)
    pub fn fade_for(&self, sec_per: f64) -> f64 {
        if !(sec_per > 0.0) {
            return 0.0;
        }
        (sec_per * self.ratio).min(self.max)
    }

    /// Total video length for `n` clips of `sec_per` seconds each.
    ///
    /// With transitions every clip after the first overlaps the previous one
    /// by `fade_for(sec_per)`.
    pub fn total_for(&self, n: usize, sec_per: f64, transitions: bool) -> Result<f64> {
        check_count(n)?;
        if !(sec_per > 0.0) {
            return Err(ReelError::invalid("sec_per", format!("must be > 0, got {}", sec_per)));
        }

        if !transitions || n == 1 {
            return Ok(n as f64 * sec_per);
        }

        let fade = self.fade_for(sec_per);
        Ok(n as f64 * sec_per - (n - 1) as f64 * fade)
    }

    /// Inverse of [`FadeModel::total_for`]: the per-clip duration that yields `total`.
    pub fn sec_per_for_total(&self, n: usize, total: f64, transitions: bool) -> Result<f64> {
        check_count(n)?;
        if !(total > 0.0) {
            return Err(ReelError::invalid(
                "total_duration",
                format!("must be > 0, got {}", total),
            ));
        }

        if !transitions || n == 1 {
            return Ok(total / n as f64);
        }

        let n_f = n as f64;
        let overlaps = (n - 1) as f64;

        // Linear regime: total = sec_per * (n - (n-1) * ratio)
        let linear = total / (n_f - overlaps * self.ratio);
        if linear <= self.switch_point() {
            return Ok(linear);
        }

        // Saturated regime: total = n * sec_per - (n-1) * max
        Ok((total + overlaps * self.max) / n_f)
    }
}

fn check_count(n: usize) -> Result<()> {
    if n == 0 {
        return Err(ReelError::invalid("n", "frame count must be >= 1"));
    }
    Ok(())
}

/// [`FadeModel::fade_for`] with the default constants
pub fn fade_for(sec_per: f64) -> f64 {
    FadeModel::default().fade_for(sec_per)
}

/// [`FadeModel::total_for`] with the default constants
pub fn total_for(n: usize, sec_per: f64, transitions: bool) -> Result<f64> {
    FadeModel::default().total_for(n, sec_per, transitions)
}

/// [`FadeModel::sec_per_for_total`] with the default constants
pub fn sec_per_for_total(n: usize, total: f64, transitions: bool) -> Result<f64> {
    FadeModel::default().sec_per_for_total(n, total, transitions)
}

/// Which duration is authoritative for a build
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationSpec {
    /// Seconds per image; the total is derived
    PerFrame(f64),
    /// Total video length; seconds per image is back-solved
    Total(f64),
}

impl DurationSpec {
    /// A given total always wins over `sec_per`
    pub fn from_options(sec_per: f64, total: Option<f64>) -> Self {
        match total {
            Some(total) => Self::Total(total),
            None => Self::PerFrame(sec_per),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::PerFrame(sec_per) if !(sec_per > 0.0 && sec_per.is_finite()) => {
                Err(ReelError::invalid(
                    "sec_per",
                    format!("must be > 0 when total_duration is not set, got {}", sec_per),
                ))
            }
            Self::Total(total) if !(total > 0.0 && total.is_finite()) => Err(ReelError::invalid(
                "total_duration",
                format!("must be > 0, got {}", total),
            )),
            _ => Ok(()),
        }
    }

    /// Effective seconds per image for `n` images
    pub fn resolve_sec_per(&self, n: usize, transitions: bool, model: &FadeModel) -> Result<f64> {
        self.validate()?;
        match *self {
            Self::PerFrame(sec_per) => {
                check_count(n)?;
                Ok(sec_per)
            }
            Self::Total(total) => model.sec_per_for_total(n, total, transitions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn test_round_trip_duration_law() {
        let samples: Vec<f64> = (1..=100).map(|i| i as f64 * 0.1).collect();
        for n in 1..=50 {
            for &sec_per in &samples {
                for transitions in [true, false] {
                    let total = total_for(n, sec_per, transitions).unwrap();
                    let back = sec_per_for_total(n, total, transitions).unwrap();
                    assert!(
                        (back - sec_per).abs() < TOL,
                        "n={} sec_per={} transitions={} -> {}",
                        n,
                        sec_per,
                        transitions,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_round_trip_near_switch_point() {
        for sec_per in [FADE_SWITCH - 1e-3, FADE_SWITCH, FADE_SWITCH + 1e-3, 0.001] {
            let total = total_for(7, sec_per, true).unwrap();
            let back = sec_per_for_total(7, total, true).unwrap();
            assert!((back - sec_per).abs() < TOL);
        }
    }

    #[test]
    fn test_fade_saturation_boundary() {
        assert!((fade_for(2.333) - 0.7).abs() < 1e-3);
        assert_eq!(fade_for(10.0), 0.7);
        assert!((fade_for(1.0) - 0.3).abs() < 1e-12);
        assert_eq!(fade_for(0.0), 0.0);
        assert_eq!(fade_for(-1.0), 0.0);
    }

    #[test]
    fn test_total_without_transitions() {
        assert_eq!(total_for(3, 1.0, false).unwrap(), 3.0);
        assert_eq!(total_for(1, 4.0, true).unwrap(), 4.0);
    }

    #[test]
    fn test_total_with_transitions() {
        // 3 clips of 1s, fade 0.3s, two overlaps
        let total = total_for(3, 1.0, true).unwrap();
        assert!((total - 2.4).abs() < 1e-12);

        // saturated: 3 clips of 5s, fade 0.7s
        let total = total_for(3, 5.0, true).unwrap();
        assert!((total - 13.6).abs() < 1e-12);
    }

    #[test]
    fn test_ten_second_total_with_three_images() {
        let sec_per = sec_per_for_total(3, 10.0, true).unwrap();
        let total = total_for(3, sec_per, true).unwrap();
        assert!((total - 10.0).abs() < 1e-9);
        // 10s over 3 images lands in the saturated regime
        assert!(sec_per > FADE_SWITCH);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(total_for(0, 1.0, true).is_err());
        assert!(total_for(3, 0.0, true).is_err());
        assert!(total_for(3, -2.0, false).is_err());
        assert!(sec_per_for_total(0, 10.0, true).is_err());
        assert!(sec_per_for_total(3, 0.0, true).is_err());

        let err = sec_per_for_total(3, -1.0, false).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_total_duration_wins() {
        let spec = DurationSpec::from_options(4.0, Some(9.0));
        assert_eq!(spec, DurationSpec::Total(9.0));

        let sec_per = spec.resolve_sec_per(3, false, &FadeModel::default()).unwrap();
        assert!((sec_per - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sec_per_ignored_when_total_given() {
        // a bad sec_per does not matter once total_duration is authoritative
        let spec = DurationSpec::from_options(0.0, Some(6.0));
        assert!(spec.validate().is_ok());

        let spec = DurationSpec::from_options(0.0, None);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_custom_fade_model() {
        let model = FadeModel::new(0.5, 1.0);
        assert_eq!(model.switch_point(), 2.0);
        let total = model.total_for(4, 3.0, true).unwrap();
        assert!((total - 9.0).abs() < 1e-12);
        let back = model.sec_per_for_total(4, total, true).unwrap();
        assert!((back - 3.0).abs() < TOL);
    }
}

use crate::error::MatchError;

/// Relative importance of each category in the combined score.
///
/// Course overlap is the primary signal, so courses always carry the
/// largest weight. Spots and times stay within [`SPOT_TIME_TOLERANCE`] of
/// each other. The three weights sum to 1.
pub const SPOT_TIME_TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    pub courses: f64,
    pub spots: f64,
    pub times: f64,
}

impl MatchWeights {
    pub const DEFAULT: MatchWeights = MatchWeights {
        courses: 0.6,
        spots: 0.2,
        times: 0.2,
    };

    pub fn new(courses: f64, spots: f64, times: f64) -> Result<Self, MatchError> {
        let all = [courses, spots, times];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MatchError::InvalidInput(
                "weights must be finite and non-negative".into(),
            ));
        }
        if (courses + spots + times - 1.0).abs() > 1e-9 {
            return Err(MatchError::InvalidInput("weights must sum to 1".into()));
        }
        if courses <= spots || courses <= times {
            return Err(MatchError::InvalidInput(
                "course weight must be the largest".into(),
            ));
        }
        if (spots - times).abs() > SPOT_TIME_TOLERANCE + 1e-9 {
            return Err(MatchError::InvalidInput(format!(
                "spot and time weights must be within {} of each other",
                SPOT_TIME_TOLERANCE
            )));
        }
        Ok(Self {
            courses,
            spots,
            times,
        })
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_course_dominant() {
        let w = MatchWeights::default();
        assert!(w.courses > w.spots && w.courses > w.times);
        assert!((w.courses + w.spots + w.times - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_weights() {
        assert!(MatchWeights::new(0.5, 0.5, 0.5).is_err());
        assert!(MatchWeights::new(0.2, 0.6, 0.2).is_err());
        assert!(MatchWeights::new(1.2, -0.1, -0.1).is_err());
        assert!(MatchWeights::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(MatchWeights::new(0.5, 0.25, 0.25).is_ok());
    }

    #[test]
    fn spots_and_times_stay_balanced() {
        assert!(MatchWeights::new(0.6, 0.4, 0.0).is_err());
        assert!(MatchWeights::new(0.7, 0.25, 0.05).is_err());
        assert!(MatchWeights::new(0.6, 0.25, 0.15).is_ok());
        assert!(MatchWeights::new(0.4, 0.3, 0.3).is_ok());
        assert!(MatchWeights::new(0.4, 0.4, 0.2).is_err());
    }
}

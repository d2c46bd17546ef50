use crate::OsError;

/// Absolute/relative tolerance pair.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, OsError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(OsError::NonFinite { what, value: v })
    }
}

/// Check every value of a slice, reporting the first offender.
pub fn ensure_all_finite(values: &[f64], what: &'static str) -> Result<(), OsError> {
    values
        .iter()
        .try_for_each(|v| ensure_finite(*v, what).map(|_| ()))
}

/// Format a real the way IDF text expects: integral values keep no
/// trailing fraction, everything else uses the shortest round-trip form.
pub fn format_real(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(f64::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_flags_infinity() {
        assert!(ensure_all_finite(&[1.0, 2.0], "v").is_ok());
        assert!(ensure_all_finite(&[1.0, f64::INFINITY], "v").is_err());
        assert!(ensure_all_finite(&[f64::NEG_INFINITY], "v").is_err());
    }

    #[test]
    fn format_real_trims_integral() {
        assert_eq!(format_real(8760.0), "8760");
        assert_eq!(format_real(-2.0), "-2");
        assert_eq!(format_real(0.5), "0.5");
        assert_eq!(format_real(1e9), "1000000000");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn format_real_round_trips(v in -1.0e9_f64..1.0e9_f64) {
            let text = format_real(v);
            let back: f64 = text.parse().unwrap();
            prop_assert!(nearly_equal(back, v, Tolerances::default()));
        }
    }
}

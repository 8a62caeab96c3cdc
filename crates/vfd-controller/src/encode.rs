use crate::{Result, VfdError};

/// Upper bound of the frequency set-point, in percent of maximum frequency.
pub const FREQ_PERCENT_MAX: f32 = 100.0;

const PERCENT_SCALE: f32 = 100.0;

/// Scale a set-point percentage to its register value (0.01 % per count, 0..=10000).
///
/// NaN and anything outside `0.0..=100.0` is rejected.
pub fn percent_to_raw(percent: f32) -> Result<u16> {
    if !(0.0..=FREQ_PERCENT_MAX).contains(&percent) {
        return Err(VfdError::OutOfRange(percent));
    }
    Ok((percent * PERCENT_SCALE).round() as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_points() -> anyhow::Result<()> {
        assert_eq!(percent_to_raw(0.0)?, 0);
        assert_eq!(percent_to_raw(100.0)?, 10_000);
        assert_eq!(percent_to_raw(37.5)?, 3750);
        assert_eq!(percent_to_raw(0.01)?, 1);
        Ok(())
    }

    #[test]
    fn test_full_range_stays_in_bounds() -> anyhow::Result<()> {
        for hundredths in 0..=10_000u16 {
            let percent = f32::from(hundredths) / 100.0;
            let raw = percent_to_raw(percent)?;
            assert!(raw <= 10_000);
            assert_eq!(raw, hundredths);
        }
        Ok(())
    }

    #[test]
    fn test_rejects_out_of_range() {
        for bad in [-0.01, -100.0, 100.01, 1000.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(percent_to_raw(bad), Err(VfdError::OutOfRange(_))));
        }
    }
}

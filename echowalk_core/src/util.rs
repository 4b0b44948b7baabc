//! Small numeric helpers shared by the alert and speech paths.

/// Number of centimetres in one metre.
pub const CM_PER_M: f32 = 100.0;

/// Values this close below a whole centimetre count as that centimetre.
const CM_EPSILON: f32 = 1e-4;

/// Convert metres to whole centimetres, truncating toward zero.
/// Non-finite or negative inputs map to 0.
#[inline]
pub fn truncate_cm(distance_m: f32) -> u32 {
    if !distance_m.is_finite() || distance_m <= 0.0 {
        return 0;
    }
    let cm = (distance_m * CM_PER_M + CM_EPSILON).trunc();
    if cm >= u32::MAX as f32 {
        u32::MAX
    } else {
        cm as u32
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_cm;

    #[test]
    fn truncates_not_rounds() {
        assert_eq!(truncate_cm(0.8), 80);
        assert_eq!(truncate_cm(1.239), 123);
        assert_eq!(truncate_cm(1.999), 199);
        assert_eq!(truncate_cm(0.1), 10);
    }

    #[test]
    fn clamps_bad_inputs() {
        assert_eq!(truncate_cm(-1.0), 0);
        assert_eq!(truncate_cm(f32::NAN), 0);
        assert_eq!(truncate_cm(f32::INFINITY), 0);
    }
}

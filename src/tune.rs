//! Fixed-point tuning math for the DDC/DUC signal paths.
//!
//! Everything here is pure: the channel controllers call into this module
//! to turn requested frequencies and ratios into exact register values.

use crate::Error;

/// Phase-accumulator span of the 32-bit NCO, `2^32`.
const TUNING_SCALE: f64 = 4_294_967_296.0;

/// Empirical headroom factor in the CIC gain compensation.
///
/// Chosen against a known-good hardware configuration so that full-scale
/// baseband input does not clip in the CIC stages. Changing it changes
/// on-air transmit amplitude; do not re-derive.
const CIC_HEADROOM: f64 = 1.65;

/// Largest ratio the CIC stage itself runs at. Anything above this is
/// handled by the fixed halfband stages, which have flat gain.
const CIC_MAX_RATIO: u32 = 128;

/// The set of decimation/interpolation ratios the hardware accepts.
///
/// Shared read-only by the DDC and DUC controllers; the same table applies
/// to both decimation and interpolation.
#[derive(Clone, Copy, Debug)]
pub struct RateTable {
    rates: &'static [u32],
}

impl RateTable {
    /// The ratios the DSP fabric supports: powers of two from 4 to 1024.
    pub const fn hardware() -> Self {
        Self {
            rates: &[4, 8, 16, 32, 64, 128, 256, 512, 1024],
        }
    }

    /// Check whether a ratio is supported.
    pub fn contains(&self, rate: u32) -> bool {
        self.rates.contains(&rate)
    }

    /// All supported ratios, ascending.
    pub fn rates(&self) -> &'static [u32] {
        self.rates
    }
}

/// Result of tuning the NCO: the register word plus the frequency that the
/// hardware will actually produce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    /// 32-bit phase-increment word. Negative frequencies are stored in
    /// two's complement.
    pub word: u32,
    /// Nearest frequency representable by the phase accumulator, in Hz.
    pub actual_freq: f64,
}

/// Compute the NCO phase-increment word for `freq` on a `clock_freq`
/// master clock.
///
/// The requested frequency must satisfy `|freq| <= clock_freq / 2`;
/// anything outside that returns [`Error::FreqRange`].
///
/// Tuning is lossy: callers must use [`Tuning::actual_freq`] rather than
/// assume the request was hit exactly. The error is at most one LSB of
/// tuning resolution, `clock_freq / 2^32`. Requesting exactly
/// `+clock_freq/2` lands on the word `0x8000_0000`, which reads back as
/// `-clock_freq/2`; the NCO treats both as the same point.
pub fn tune(freq: f64, clock_freq: f64) -> Result<Tuning, Error> {
    let limit = clock_freq / 2.0;
    if !(-limit..=limit).contains(&freq) {
        return Err(Error::FreqRange { freq, limit });
    }

    // Round half away from zero, matching the register semantics the
    // hardware was calibrated against.
    let word = ((freq / clock_freq) * TUNING_SCALE).round() as i64 as u32;

    // Read back through the signed domain so negative tunings map to
    // negative frequencies instead of aliases near the clock rate.
    let actual_freq = (word as i32 as f64 / TUNING_SCALE) * clock_freq;

    Ok(Tuning { word, actual_freq })
}

/// Compute the transmit IQ scale compensating CIC interpolation gain.
///
/// The CIC filter's gain grows with the cube of its ratio, so the digital
/// scale must shrink to match or transmit amplitude would vary with the
/// interpolation setting. Ratios above 128 are first reduced by the fixed
/// halfband stages, which need no compensation.
pub fn cic_comp_scale(interp: u32) -> i16 {
    let mut cic_ratio = interp;
    while cic_ratio > CIC_MAX_RATIO {
        cic_ratio /= 2;
    }

    let gain = f64::from(cic_ratio).powi(3);
    let shift = gain.log2().ceil();
    let scale = (4096.0 * 2f64.powf(shift)) / (CIC_HEADROOM * gain);

    scale.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

/// Pack I and Q scale factors into one 32-bit register word, I in the
/// upper half and Q in the lower.
pub fn iq_scale_word(i: i16, q: i16) -> u32 {
    (u32::from(i as u16) << 16) | u32::from(q as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_resolution() {
        let clock = 100e6;
        let lsb = clock / TUNING_SCALE;
        for freq in [0.0, 1.0, 25e6, 49.999e6, -25e6, -49.999e6, 12.3456789e6] {
            let t = tune(freq, clock).unwrap();
            assert!(
                (t.actual_freq - freq).abs() <= lsb,
                "freq {freq}: actual {} off by more than one LSB",
                t.actual_freq
            );
        }
    }

    #[test]
    fn tuning_idempotent() {
        let clock = 100e6;
        for freq in [0.0, 25e6, -12.5e6, 3.14159e6] {
            let first = tune(freq, clock).unwrap();
            let second = tune(first.actual_freq, clock).unwrap();
            assert_eq!(first.word, second.word);
            assert_eq!(first.actual_freq, second.actual_freq);
        }
    }

    #[test]
    fn tuning_quarter_clock() {
        let t = tune(25e6, 100e6).unwrap();
        assert_eq!(t.word, 0x4000_0000);
        assert_eq!(t.actual_freq, 25e6);
    }

    #[test]
    fn negative_tuning_is_twos_complement() {
        let t = tune(-25e6, 100e6).unwrap();
        assert_eq!(t.word, 0xC000_0000);
        assert_eq!(t.actual_freq, -25e6);
    }

    #[test]
    fn nyquist_edge_aliases() {
        // +clock/2 and -clock/2 are the same NCO point.
        let t = tune(50e6, 100e6).unwrap();
        assert_eq!(t.word, 0x8000_0000);
        assert_eq!(t.actual_freq, -50e6);
        let t = tune(-50e6, 100e6).unwrap();
        assert_eq!(t.word, 0x8000_0000);
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(matches!(
            tune(51e6, 100e6),
            Err(Error::FreqRange { .. })
        ));
        assert!(matches!(
            tune(-51e6, 100e6),
            Err(Error::FreqRange { .. })
        ));
    }

    #[test]
    fn iq_word_round_trips() {
        for (i, q) in [
            (0i16, 0i16),
            (1024, 1024),
            (i16::MAX, i16::MIN),
            (-1, 1),
            (-32768, 32767),
        ] {
            let word = iq_scale_word(i, q);
            assert_eq!((word >> 16) as u16 as i16, i);
            assert_eq!(word as u16 as i16, q);
        }
    }

    #[test]
    fn iq_word_layout() {
        assert_eq!(iq_scale_word(1024, 1024), 0x0400_0400);
        assert_eq!(iq_scale_word(-1, 0), 0xFFFF_0000);
    }

    #[test]
    fn cic_scale_reference() {
        // Reference value from a known-good hardware configuration:
        // ratio 16 -> gain 4096 -> 4096 * 4096 / (1.65 * 4096) = 2482.4...
        assert_eq!(cic_comp_scale(16), 2482);
    }

    #[test]
    fn cic_scale_positive_in_range() {
        for rate in RateTable::hardware().rates() {
            let scale = cic_comp_scale(*rate);
            assert!(scale > 0, "ratio {rate} gave scale {scale}");
        }
    }

    #[test]
    fn cic_halfband_reduction() {
        // 1024 reduces through the halfbands to a CIC ratio of 128, so it
        // must compensate the same gain as 128 itself.
        assert_eq!(cic_comp_scale(1024), cic_comp_scale(128));
        assert_eq!(cic_comp_scale(256), cic_comp_scale(128));
    }

    #[test]
    fn rate_table_membership() {
        let rates = RateTable::hardware();
        assert!(rates.contains(4));
        assert!(rates.contains(1024));
        assert!(!rates.contains(3));
        assert!(!rates.contains(48));
        assert!(!rates.contains(2048));
    }
}

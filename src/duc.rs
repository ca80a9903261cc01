use tracing::debug;

use crate::consts::{
    DEFAULT_INTERP, REG_DSP_TX_FREQ, REG_DSP_TX_INTERP_RATE, REG_DSP_TX_SCALE_IQ,
};
use crate::tune::{self, RateTable};
use crate::{Error, Link, Transport, lock};

/// The transmit-path channel controller: digital up-conversion.
///
/// Mirrors [`Ddc`](crate::Ddc) for interpolation and tuning, with one
/// extra step: every interpolation change recomputes the CIC gain
/// compensation and writes the matching IQ scale, keeping transmit
/// amplitude constant across interpolation settings. There is no
/// stream-command surface; the transmit path is host-paced.
pub struct Duc<T: Transport> {
    link: Link<T>,
    clock_freq: f64,
    rates: RateTable,
    interp: u32,
    freq: f64,
}

impl<T: Transport> Duc<T> {
    /// Bring the transmit DSP to its default configuration.
    pub(crate) fn new(link: Link<T>, clock_freq: f64, rates: RateTable) -> Result<Self, Error> {
        let mut duc = Self {
            link,
            clock_freq,
            rates,
            interp: DEFAULT_INTERP,
            freq: 0.0,
        };
        duc.write_interp_config()?;
        Ok(duc)
    }

    /// Channel name, as used by the property facade.
    pub fn name(&self) -> &'static str {
        "duc0"
    }

    /// IF rate: the master clock frequency, in Hz.
    pub fn if_rate(&self) -> f64 {
        self.clock_freq
    }

    /// Baseband sample rate before interpolation, in Hz.
    pub fn bb_rate(&self) -> f64 {
        self.clock_freq / f64::from(self.interp)
    }

    /// Current interpolation ratio.
    pub fn interp(&self) -> u32 {
        self.interp
    }

    /// Current tuned frequency, in Hz.
    ///
    /// This is the frequency the hardware actually produces, not the last
    /// requested value; see [`Duc::set_freq`].
    pub fn freq(&self) -> f64 {
        self.freq
    }

    /// Interpolation ratios the hardware accepts, ascending.
    pub fn interp_rates(&self) -> &'static [u32] {
        self.rates.rates()
    }

    /// Set the interpolation ratio.
    ///
    /// Recomputes the CIC gain compensation for the new ratio and writes
    /// both the interpolation and IQ scale registers. Ratios outside the
    /// rate table are rejected with [`Error::InvalidRate`] before any
    /// register write.
    pub fn set_interp(&mut self, interp: u32) -> Result<(), Error> {
        if !self.rates.contains(interp) {
            return Err(Error::InvalidRate { rate: interp });
        }
        self.interp = interp;
        self.write_interp_config()
    }

    fn write_interp_config(&mut self) -> Result<(), Error> {
        let scale = tune::cic_comp_scale(self.interp);
        debug!(interp = self.interp, scale, "updating tx interpolation");
        let word = tune::iq_scale_word(scale, scale);
        let mut link = lock(&self.link);
        link.poke32(REG_DSP_TX_INTERP_RATE, self.interp)?;
        link.poke32(REG_DSP_TX_SCALE_IQ, word)?;
        Ok(())
    }

    /// Tune the transmit NCO.
    ///
    /// Returns the frequency actually achieved, which also replaces the
    /// requested value in channel state. The difference is at most one LSB
    /// of tuning resolution (`clock_freq / 2^32`).
    pub fn set_freq(&mut self, freq: f64) -> Result<f64, Error> {
        let tuning = tune::tune(freq, self.clock_freq)?;
        debug!(
            freq,
            actual = tuning.actual_freq,
            word = tuning.word,
            "tuning tx nco"
        );
        self.freq = tuning.actual_freq;
        lock(&self.link).poke32(REG_DSP_TX_FREQ, tuning.word)?;
        Ok(tuning.actual_freq)
    }
}

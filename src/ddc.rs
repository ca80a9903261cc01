use tracing::debug;

use crate::consts::{
    DEFAULT_DECIM, DEFAULT_RX_SCALE_IQ, REG_DSP_RX_DECIM_RATE, REG_DSP_RX_FREQ,
    REG_DSP_RX_SCALE_IQ,
};
use crate::stream::{self, StreamCommand};
use crate::tune::{self, RateTable};
use crate::{Error, Link, Transport, lock};

/// The receive-path channel controller: digital down-conversion.
///
/// Owns the DDC's decimation ratio and tuned frequency, validates every
/// request against the rate table and the Nyquist range before touching
/// hardware, and converts accepted requests into register writes over the
/// shared control link.
///
/// Failed validation leaves both channel state and hardware untouched. A
/// transport failure partway through a multi-register update leaves the
/// shadow state reflecting the request even though the hardware may not;
/// re-issue the setter to resynchronize.
pub struct Ddc<T: Transport> {
    link: Link<T>,
    clock_freq: f64,
    rates: RateTable,
    decim: u32,
    freq: f64,
}

impl<T: Transport> Ddc<T> {
    /// Bring the receive DSP to its default configuration.
    ///
    /// Writes the default decimation and IQ scale, then issues an
    /// immediate stop command in case the hardware was left streaming by a
    /// prior session.
    pub(crate) fn new(link: Link<T>, clock_freq: f64, rates: RateTable) -> Result<Self, Error> {
        let mut ddc = Self {
            link,
            clock_freq,
            rates,
            decim: DEFAULT_DECIM,
            freq: 0.0,
        };
        ddc.write_decim_config()?;
        ddc.issue_stream_cmd(StreamCommand::stop_continuous())?;
        Ok(ddc)
    }

    /// Channel name, as used by the property facade.
    pub fn name(&self) -> &'static str {
        "ddc0"
    }

    /// IF rate: the master clock frequency, in Hz.
    pub fn if_rate(&self) -> f64 {
        self.clock_freq
    }

    /// Baseband sample rate after decimation, in Hz.
    pub fn bb_rate(&self) -> f64 {
        self.clock_freq / f64::from(self.decim)
    }

    /// Current decimation ratio.
    pub fn decim(&self) -> u32 {
        self.decim
    }

    /// Current tuned frequency, in Hz.
    ///
    /// This is the frequency the hardware actually produces, not the last
    /// requested value; see [`Ddc::set_freq`].
    pub fn freq(&self) -> f64 {
        self.freq
    }

    /// Decimation ratios the hardware accepts, ascending.
    pub fn decim_rates(&self) -> &'static [u32] {
        self.rates.rates()
    }

    /// Set the decimation ratio.
    ///
    /// Ratios outside the rate table are rejected with
    /// [`Error::InvalidRate`] before any register write.
    pub fn set_decim(&mut self, decim: u32) -> Result<(), Error> {
        if !self.rates.contains(decim) {
            return Err(Error::InvalidRate { rate: decim });
        }
        self.decim = decim;
        self.write_decim_config()
    }

    fn write_decim_config(&mut self) -> Result<(), Error> {
        debug!(decim = self.decim, "updating rx decimation");
        let scale = tune::iq_scale_word(DEFAULT_RX_SCALE_IQ, DEFAULT_RX_SCALE_IQ);
        let mut link = lock(&self.link);
        link.poke32(REG_DSP_RX_DECIM_RATE, self.decim)?;
        link.poke32(REG_DSP_RX_SCALE_IQ, scale)?;
        Ok(())
    }

    /// Tune the receive NCO.
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
            "tuning rx nco"
        );
        self.freq = tuning.actual_freq;
        lock(&self.link).poke32(REG_DSP_RX_FREQ, tuning.word)?;
        Ok(tuning.actual_freq)
    }

    /// Issue a streaming command and wait for the device acknowledgement.
    ///
    /// One blocking request/reply exchange. A reply without the expected
    /// acknowledgement id fails with [`Error::ProtocolMismatch`], after
    /// which the device's streaming state must be assumed unknown.
    pub fn issue_stream_cmd(&mut self, cmd: StreamCommand) -> Result<(), Error> {
        debug!(?cmd, "issuing stream command");
        let reply = lock(&self.link).exchange(cmd.to_frame())?;
        stream::check_stream_ack(&reply)
    }
}

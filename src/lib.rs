/*!

Digital tuning core for an FPGA-based SDR's receive and transmit signal
paths. It turns "set frequency / set decimation / start streaming"
requests into the exact integer register values and control messages the
hardware expects: 32-bit NCO phase-increment words, CIC gain-compensation
scales, packed IQ scale registers, and stream-command frames.

The crate owns the math and the channel state; it does *not* own the
device link. Register writes and control exchanges go through the
[`Transport`] trait, which the surrounding driver implements over whatever
carries traffic to the board (Ethernet, USB, shared memory).

Entry point is [`Dsp::new`], which takes the transport and the master
clock frequency and brings both channels to a known default configuration
(including killing any streaming left over from a prior session). From
there, either use the typed controllers directly ([`Dsp::ddc_mut`],
[`Dsp::duc_mut`]) or drive everything through the string-keyed property
surface ([`Dsp::get`], [`Dsp::set`]) as a generic property store would:

```
use std::io;
use tunewave::{CtrlFrame, Dsp, Transport, Value};

// A loopback link that drops register writes and acknowledges every
// stream command.
struct Loopback;
impl Transport for Loopback {
    fn poke32(&mut self, _addr: u32, _val: u32) -> io::Result<()> {
        Ok(())
    }
    fn exchange(&mut self, _request: CtrlFrame) -> io::Result<CtrlFrame> {
        Ok(CtrlFrame::stream_cmd_ack())
    }
}

# fn main() -> anyhow::Result<()> {
let mut dsp = Dsp::new(Loopback, 100e6)?;

dsp.set("ddc0", "decim", Value::Rate(16))?;
assert_eq!(dsp.get("ddc0", "bb_rate")?, Value::Double(6.25e6));

// Tuning is lossy: read back the frequency actually achieved.
let Value::Double(actual) = dsp.set("ddc0", "freq", Value::Double(25e6))? else {
    unreachable!()
};
assert!((actual - 25e6).abs() <= 100e6 / 2f64.powi(32));
# Ok(())
# }
```

All tuning math is also exposed as pure functions ([`tune`],
[`cic_comp_scale`], [`iq_scale_word`]) for callers that want the numbers
without a device attached.

*/

#![warn(missing_docs)]

mod consts;
mod ddc;
mod duc;
mod error;
mod props;
mod stream;
mod tune;

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use crate::ddc::Ddc;
pub use crate::duc::Duc;
pub use crate::error::Error;
pub use crate::props::Value;
pub use crate::stream::{CtrlFrame, StreamCommand, StreamMode, TimeSpec};
pub use crate::tune::{RateTable, Tuning, cic_comp_scale, iq_scale_word, tune};

/// The device control link this core drives.
///
/// Implemented by the surrounding driver over the actual wire. Both
/// methods block until the operation completes or fails; there is no
/// cancellation. Timeouts, framing, and retransmission are the
/// transport's business, not this crate's: a transport that gives up
/// should return an [`io::Error`], which propagates opaquely.
pub trait Transport {
    /// Write a 32-bit value to a device register. Fire-and-forget: no
    /// acknowledgement is modeled.
    fn poke32(&mut self, addr: u32, val: u32) -> io::Result<()>;

    /// Perform one blocking request/reply control exchange.
    fn exchange(&mut self, request: CtrlFrame) -> io::Result<CtrlFrame>;
}

/// Shared, serialized handle to the device control link.
///
/// The DDC and DUC are logically independent but share one physical link,
/// so both controllers hold a clone of this and take the lock around each
/// register write or command exchange.
pub(crate) type Link<T> = Arc<Mutex<T>>;

pub(crate) fn lock<T>(link: &Link<T>) -> MutexGuard<'_, T> {
    // A poisoned lock only means another control call panicked mid-write.
    // The link itself carries no state worth protecting, so keep going.
    link.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A device's DSP control core: one DDC and one DUC sharing a control
/// link.
///
/// Owns both channel controllers and exposes them two ways: typed access
/// through [`Dsp::ddc_mut`]/[`Dsp::duc_mut`], and the string-keyed
/// property surface ([`Dsp::get`], [`Dsp::set`], [`Dsp::keys`]) for a
/// generic property store. Channel ids are `"ddc0"` and `"duc0"`.
pub struct Dsp<T: Transport> {
    ddc: Ddc<T>,
    duc: Duc<T>,
}

impl<T: Transport> Dsp<T> {
    /// Take ownership of a control link and bring both channels to their
    /// default configuration.
    ///
    /// Both channels come up with ratio 16 and frequency 0 Hz, and the
    /// receive path is issued a stop command in case the hardware was
    /// left streaming. `clock_freq` is the master clock in Hz, immutable
    /// for the life of the device.
    pub fn new(transport: T, clock_freq: f64) -> Result<Self, Error> {
        Self::with_link(Arc::new(Mutex::new(transport)), clock_freq)
    }

    pub(crate) fn with_link(link: Link<T>, clock_freq: f64) -> Result<Self, Error> {
        let rates = RateTable::hardware();
        let ddc = Ddc::new(link.clone(), clock_freq, rates)?;
        let duc = Duc::new(link, clock_freq, rates)?;
        Ok(Self { ddc, duc })
    }

    /// The receive channel controller.
    pub fn ddc(&self) -> &Ddc<T> {
        &self.ddc
    }

    /// The receive channel controller, mutably.
    pub fn ddc_mut(&mut self) -> &mut Ddc<T> {
        &mut self.ddc
    }

    /// The transmit channel controller.
    pub fn duc(&self) -> &Duc<T> {
        &self.duc
    }

    /// The transmit channel controller, mutably.
    pub fn duc_mut(&mut self) -> &mut Duc<T> {
        &mut self.duc
    }

    /// Read a named property of a channel.
    pub fn get(&self, channel: &str, key: &str) -> Result<Value, Error> {
        match channel {
            "ddc0" => props::ddc_get(&self.ddc, key),
            "duc0" => props::duc_get(&self.duc, key),
            other => Err(Error::UnknownChannel {
                channel: other.into(),
            }),
        }
    }

    /// Write a named property of a channel.
    ///
    /// Returns the value actually applied, which can differ from the
    /// request: a `freq` write reports the frequency the hardware will
    /// really produce.
    pub fn set(&mut self, channel: &str, key: &str, value: Value) -> Result<Value, Error> {
        match channel {
            "ddc0" => props::ddc_set(&mut self.ddc, key, value),
            "duc0" => props::duc_set(&mut self.duc, key, value),
            other => Err(Error::UnknownChannel {
                channel: other.into(),
            }),
        }
    }

    /// The property keys a channel recognizes.
    pub fn keys(&self, channel: &str) -> Result<&'static [&'static str], Error> {
        match channel {
            "ddc0" => Ok(props::DDC_KEYS),
            "duc0" => Ok(props::DUC_KEYS),
            other => Err(Error::UnknownChannel {
                channel: other.into(),
            }),
        }
    }
}

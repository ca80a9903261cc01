//! String-keyed property surface over the typed channel controllers.
//!
//! This is the only place string keys appear: a generic property store can
//! traverse a channel through [`get`](crate::Dsp::get) and
//! [`set`](crate::Dsp::set) without knowing anything about DDC/DUC
//! internals, while everything below this module stays strongly typed.

use crate::ddc::Ddc;
use crate::duc::Duc;
use crate::stream::StreamCommand;
use crate::{Error, Transport};

/// A property value, as exchanged with the generic property store.
///
/// The variant set is closed: every readable or writable channel
/// attribute maps to exactly one of these.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A channel name.
    Str(String),
    /// A frequency or rate, in Hz.
    Double(f64),
    /// A decimation or interpolation ratio.
    Rate(u32),
    /// The list of supported ratios, ascending.
    Rates(Vec<u32>),
    /// A streaming command (write-only, receive path).
    Stream(StreamCommand),
}

/// Keys the receive channel recognizes. `stream_cmd` is write-only.
pub(crate) const DDC_KEYS: &[&str] = &[
    "name",
    "if_rate",
    "bb_rate",
    "decim",
    "decims",
    "freq",
    "stream_cmd",
];

/// Keys the transmit channel recognizes.
pub(crate) const DUC_KEYS: &[&str] = &["name", "if_rate", "bb_rate", "interp", "interps", "freq"];

pub(crate) fn ddc_get<T: Transport>(ddc: &Ddc<T>, key: &str) -> Result<Value, Error> {
    match key {
        "name" => Ok(Value::Str(ddc.name().into())),
        "if_rate" => Ok(Value::Double(ddc.if_rate())),
        "bb_rate" => Ok(Value::Double(ddc.bb_rate())),
        "decim" => Ok(Value::Rate(ddc.decim())),
        "decims" => Ok(Value::Rates(ddc.decim_rates().to_vec())),
        "freq" => Ok(Value::Double(ddc.freq())),
        _ => Err(Error::UnknownKey { key: key.into() }),
    }
}

pub(crate) fn ddc_set<T: Transport>(
    ddc: &mut Ddc<T>,
    key: &str,
    value: Value,
) -> Result<Value, Error> {
    match (key, value) {
        ("decim", Value::Rate(rate)) => {
            ddc.set_decim(rate)?;
            Ok(Value::Rate(rate))
        }
        ("freq", Value::Double(freq)) => Ok(Value::Double(ddc.set_freq(freq)?)),
        ("stream_cmd", Value::Stream(cmd)) => {
            ddc.issue_stream_cmd(cmd)?;
            Ok(Value::Stream(cmd))
        }
        ("decim", _) => Err(Error::ValueType { key: "decim" }),
        ("freq", _) => Err(Error::ValueType { key: "freq" }),
        ("stream_cmd", _) => Err(Error::ValueType { key: "stream_cmd" }),
        (key, _) => Err(Error::UnknownKey { key: key.into() }),
    }
}

pub(crate) fn duc_get<T: Transport>(duc: &Duc<T>, key: &str) -> Result<Value, Error> {
    match key {
        "name" => Ok(Value::Str(duc.name().into())),
        "if_rate" => Ok(Value::Double(duc.if_rate())),
        "bb_rate" => Ok(Value::Double(duc.bb_rate())),
        "interp" => Ok(Value::Rate(duc.interp())),
        "interps" => Ok(Value::Rates(duc.interp_rates().to_vec())),
        "freq" => Ok(Value::Double(duc.freq())),
        _ => Err(Error::UnknownKey { key: key.into() }),
    }
}

pub(crate) fn duc_set<T: Transport>(
    duc: &mut Duc<T>,
    key: &str,
    value: Value,
) -> Result<Value, Error> {
    match (key, value) {
        ("interp", Value::Rate(rate)) => {
            duc.set_interp(rate)?;
            Ok(Value::Rate(rate))
        }
        ("freq", Value::Double(freq)) => Ok(Value::Double(duc.set_freq(freq)?)),
        ("interp", _) => Err(Error::ValueType { key: "interp" }),
        ("freq", _) => Err(Error::ValueType { key: "freq" }),
        (key, _) => Err(Error::UnknownKey { key: key.into() }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::Dsp;
    use crate::testing::MockLink;

    fn new_dsp() -> (Dsp<MockLink>, Arc<Mutex<MockLink>>) {
        let link = Arc::new(Mutex::new(MockLink::default()));
        let dsp = Dsp::with_link(link.clone(), 100e6).unwrap();
        (dsp, link)
    }

    #[test]
    fn key_enumeration() {
        let (dsp, _link) = new_dsp();
        assert_eq!(dsp.keys("ddc0").unwrap(), DDC_KEYS);
        assert_eq!(dsp.keys("duc0").unwrap(), DUC_KEYS);
        assert!(matches!(
            dsp.keys("ddc1"),
            Err(Error::UnknownChannel { .. })
        ));
    }

    #[test]
    fn names() {
        let (dsp, _link) = new_dsp();
        assert_eq!(dsp.get("ddc0", "name").unwrap(), Value::Str("ddc0".into()));
        assert_eq!(dsp.get("duc0", "name").unwrap(), Value::Str("duc0".into()));
    }

    #[test]
    fn unknown_key_rejected_without_side_effect() {
        let (mut dsp, link) = new_dsp();
        let pokes_before = link.lock().unwrap().pokes.len();
        assert!(matches!(
            dsp.get("ddc0", "gain"),
            Err(Error::UnknownKey { .. })
        ));
        assert!(matches!(
            dsp.set("ddc0", "gain", Value::Double(1.0)),
            Err(Error::UnknownKey { .. })
        ));
        // interp is a DUC key, not a DDC key.
        assert!(matches!(
            dsp.set("ddc0", "interp", Value::Rate(8)),
            Err(Error::UnknownKey { .. })
        ));
        // stream_cmd is write-only.
        assert!(matches!(
            dsp.get("ddc0", "stream_cmd"),
            Err(Error::UnknownKey { .. })
        ));
        assert_eq!(link.lock().unwrap().pokes.len(), pokes_before);
    }

    #[test]
    fn mistyped_value_rejected() {
        let (mut dsp, _link) = new_dsp();
        assert!(matches!(
            dsp.set("ddc0", "decim", Value::Double(16.0)),
            Err(Error::ValueType { key: "decim" })
        ));
        assert!(matches!(
            dsp.set("duc0", "freq", Value::Rate(1)),
            Err(Error::ValueType { key: "freq" })
        ));
    }

    #[test]
    fn duc_has_no_stream_cmd() {
        let (mut dsp, _link) = new_dsp();
        let cmd = StreamCommand::start_continuous();
        assert!(matches!(
            dsp.set("duc0", "stream_cmd", Value::Stream(cmd)),
            Err(Error::UnknownKey { .. })
        ));
    }

    #[test]
    fn end_to_end_configuration() {
        let (mut dsp, link) = new_dsp();

        dsp.set("ddc0", "decim", Value::Rate(16)).unwrap();
        assert_eq!(dsp.get("ddc0", "bb_rate").unwrap(), Value::Double(6.25e6));
        assert_eq!(dsp.get("ddc0", "if_rate").unwrap(), Value::Double(100e6));

        let applied = dsp.set("ddc0", "freq", Value::Double(25e6)).unwrap();
        let Value::Double(actual) = applied else {
            panic!("freq set must return a Double");
        };
        assert!((actual - 25e6).abs() <= 100e6 / 2f64.powi(32));
        assert!(actual.abs() <= 50e6);
        assert_eq!(dsp.get("ddc0", "freq").unwrap(), Value::Double(actual));

        // Stop, then start: both must be acknowledged.
        let stop = StreamCommand::stop_continuous();
        dsp.set("ddc0", "stream_cmd", Value::Stream(stop)).unwrap();
        let start = StreamCommand::start_continuous();
        dsp.set("ddc0", "stream_cmd", Value::Stream(start)).unwrap();

        let link = link.lock().unwrap();
        // Init stop + explicit stop + start.
        assert_eq!(link.requests.len(), 3);
        let stop_frame = &link.requests[1];
        assert_eq!(stop_frame.continuous, 0);
        assert_eq!(stop_frame.num_samps, 0);
        let start_frame = &link.requests[2];
        assert_eq!(start_frame.continuous, 1);
        assert_eq!(start_frame.now, 1);
    }

    #[test]
    fn duc_interp_readback() {
        let (mut dsp, _link) = new_dsp();
        dsp.set("duc0", "interp", Value::Rate(256)).unwrap();
        assert_eq!(dsp.get("duc0", "interp").unwrap(), Value::Rate(256));
        assert_eq!(
            dsp.get("duc0", "interps").unwrap(),
            Value::Rates(vec![4, 8, 16, 32, 64, 128, 256, 512, 1024])
        );
        assert_eq!(
            dsp.get("duc0", "bb_rate").unwrap(),
            Value::Double(100e6 / 256.0)
        );
    }
}

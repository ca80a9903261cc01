/// An error from operating the DSP control core.
///
/// Some errors are recoverable:
///
/// - `Io` is a failed operation on the device control link, surfaced
///   opaquely from the transport. Whether a retry makes sense depends on
///   the transport.
/// - `InvalidRate`, `FreqRange`, `UnknownKey`, `UnknownChannel`, and
///   `ValueType` all mean the request was rejected before anything was
///   written to hardware; channel state is unchanged and the request can
///   simply be corrected and repeated.
/// - `ProtocolMismatch` means the device replied to a stream command with
///   an unexpected identifier. The streaming state is unknown at that
///   point; re-query or re-issue the command.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Underlying transport I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The requested decimation/interpolation ratio is not supported.
    #[error("rate {rate} is not a supported decimation/interpolation ratio")]
    InvalidRate {
        /// The rejected ratio.
        rate: u32,
    },

    /// The requested tuning frequency is outside the Nyquist range.
    #[error("frequency {freq} Hz out of range (+/-{limit} Hz)")]
    #[allow(missing_docs)]
    FreqRange { freq: f64, limit: f64 },

    /// A property get/set used a key the channel does not recognize.
    #[error("unknown property key {key:?}")]
    UnknownKey {
        /// The unrecognized key.
        key: String,
    },

    /// A property get/set named a channel that does not exist.
    #[error("unknown channel {channel:?}")]
    UnknownChannel {
        /// The unrecognized channel id.
        channel: String,
    },

    /// A property set used a recognized key but the wrong value variant.
    #[error("wrong value type for property key {key:?}")]
    ValueType {
        /// The key whose value was mistyped.
        key: &'static str,
    },

    /// A control reply did not carry the expected acknowledgement id.
    #[error("control reply id 0x{actual:x} does not match expected ack 0x{expected:x}")]
    #[allow(missing_docs)]
    ProtocolMismatch { expected: u32, actual: u32 },
}

//! Streaming control commands for the receive path.
//!
//! A [`StreamCommand`] describes what the caller wants the receive path to
//! do (start, stop, deliver a fixed number of samples). It is encoded into
//! a [`CtrlFrame`] and sent as one blocking request/reply exchange over the
//! device control link; the reply must carry the acknowledgement id or the
//! whole call fails with [`Error::ProtocolMismatch`].

use tracing::warn;

use crate::Error;
use crate::consts::{CTRL_ID_STREAM_CMD, CTRL_ID_STREAM_CMD_ACK};

/// How the receive path should stream samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamMode {
    /// Stream continuously until told to stop.
    StartContinuous,
    /// Stop a continuous stream.
    StopContinuous,
    /// Deliver the requested number of samples, then stop.
    NumSampsAndDone,
    /// Deliver the requested number of samples, with another command to
    /// follow (the device keeps its timing chain armed).
    NumSampsAndMore,
}

/// A device timestamp: whole seconds plus master-clock ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct TimeSpec {
    pub secs: u32,
    pub ticks: u32,
}

/// A request to change the streaming state of the receive path.
///
/// Constructed by the caller and consumed by one command exchange; nothing
/// here is persisted in channel state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamCommand {
    /// What streaming behavior to request.
    pub mode: StreamMode,
    /// Apply immediately instead of waiting for `time`.
    pub stream_now: bool,
    /// When to apply the command, if not `stream_now`.
    pub time: TimeSpec,
    /// Sample count for the finite modes.
    pub num_samps: u32,
}

impl StreamCommand {
    /// An immediate start-continuous command.
    pub fn start_continuous() -> Self {
        Self {
            mode: StreamMode::StartContinuous,
            stream_now: true,
            time: TimeSpec::default(),
            num_samps: 0,
        }
    }

    /// An immediate stop-continuous command.
    pub fn stop_continuous() -> Self {
        Self {
            mode: StreamMode::StopContinuous,
            stream_now: true,
            time: TimeSpec::default(),
            num_samps: 0,
        }
    }

    /// Encode this command as a control frame, in network byte order.
    pub fn to_frame(self) -> CtrlFrame {
        let mut frame = CtrlFrame {
            id: CTRL_ID_STREAM_CMD.to_be(),
            now: self.stream_now as u8,
            continuous: 0,
            chain: 0,
            reserved: 0,
            secs: self.time.secs.to_be(),
            ticks: self.time.ticks.to_be(),
            num_samps: self.num_samps.to_be(),
        };
        match self.mode {
            StreamMode::StartContinuous => frame.continuous = 1,
            // A stop must never carry a residual sample count.
            StreamMode::StopContinuous => frame.num_samps = 0,
            StreamMode::NumSampsAndDone => {}
            StreamMode::NumSampsAndMore => frame.chain = 1,
        }
        frame
    }
}

/// One control-link frame, as it travels on the wire.
///
/// All multi-byte fields are big-endian: the values stored here are
/// already byte-swapped at construction, so the struct can be sent (or
/// received) as raw bytes without further conversion.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Zeroable, bytemuck::Pod)]
pub struct CtrlFrame {
    /// Command or acknowledgement identifier.
    pub id: u32,
    /// 1 to apply immediately, 0 to wait for the timestamp.
    pub now: u8,
    /// 1 for continuous streaming.
    pub continuous: u8,
    /// 1 if another command follows this one.
    pub chain: u8,
    reserved: u8,
    /// Timestamp seconds.
    pub secs: u32,
    /// Timestamp ticks.
    pub ticks: u32,
    /// Sample count for the finite modes.
    pub num_samps: u32,
}

impl CtrlFrame {
    /// The frame a device sends to acknowledge a stream command.
    ///
    /// Transports that frame their own replies can use this in tests or
    /// loopback implementations.
    pub fn stream_cmd_ack() -> Self {
        Self {
            id: CTRL_ID_STREAM_CMD_ACK.to_be(),
            ..bytemuck::Zeroable::zeroed()
        }
    }

    /// The frame's command identifier, in host byte order.
    pub fn id(&self) -> u32 {
        u32::from_be(self.id)
    }

    /// Raw bytes of this frame as sent on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Check a control reply against the stream-command acknowledgement id.
pub(crate) fn check_stream_ack(reply: &CtrlFrame) -> Result<(), Error> {
    let actual = reply.id();
    if actual != CTRL_ID_STREAM_CMD_ACK {
        warn!(actual, expected = CTRL_ID_STREAM_CMD_ACK, "bad stream command ack");
        return Err(Error::ProtocolMismatch {
            expected: CTRL_ID_STREAM_CMD_ACK,
            actual,
        });
    }
    Ok(())
}

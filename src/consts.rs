//! Register map and control-protocol constants for the DSP control core.

// RX DSP register block.
pub(crate) const REG_DSP_RX_FREQ: u32 = 0xD000;
pub(crate) const REG_DSP_RX_SCALE_IQ: u32 = 0xD004;
pub(crate) const REG_DSP_RX_DECIM_RATE: u32 = 0xD008;

// TX DSP register block.
pub(crate) const REG_DSP_TX_FREQ: u32 = 0xE000;
pub(crate) const REG_DSP_TX_SCALE_IQ: u32 = 0xE004;
pub(crate) const REG_DSP_TX_INTERP_RATE: u32 = 0xE008;

/// Control-message id for issuing a stream command.
pub(crate) const CTRL_ID_STREAM_CMD: u32 = 0x53;
/// Control-message id the device replies with after applying a stream command.
pub(crate) const CTRL_ID_STREAM_CMD_ACK: u32 = 0x73;

pub(crate) const DEFAULT_DECIM: u32 = 16;
pub(crate) const DEFAULT_INTERP: u32 = 16;

/// IQ scale applied to the receive path; the DDC has no ratio-dependent
/// gain stage, so this never changes with decimation.
pub(crate) const DEFAULT_RX_SCALE_IQ: i16 = 1024;

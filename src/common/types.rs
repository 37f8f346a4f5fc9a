// src/common/types.rs

use alloc::vec::Vec;

// --- Decode Metadata ---

/// How the raw bytes of a response payload are interpreted.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DataInterpreter {
    /// Little-endian integer, up to 4 bytes. Sign comes from [`DecodeSpec::is_signed`].
    UInt32,
    /// Same as `UInt32`; [`DecodeSpec::is_signed`] decides the sign.
    Int32,
    /// Four little-endian `f32` values in w, x, y, z order.
    SensorFusionQuaternion,
    /// Raw bytes, passed through untouched.
    ByteArray,
}

/// Unit scaling applied to integer values after decoding.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Converter {
    /// Values are delivered as decoded.
    Default,
    /// Integers are divided by the factor and delivered as [`DataValue::Float`].
    Scale(f32),
}

/// Decode metadata attached to every signal.
///
/// For processor outputs this must describe what the firmware actually
/// emits for the processor type; a mismatch corrupts every downstream sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DecodeSpec {
    pub interpreter: DataInterpreter,
    /// Number of channels in one sample. 0 = take whatever the payload holds.
    pub channel_count: u8,
    /// Bytes per channel.
    pub channel_size: u8,
    /// Bytes to skip at the start of the payload.
    pub offset: u8,
    pub is_signed: bool,
    pub converter: Converter,
}

impl DecodeSpec {
    pub const fn new(
        interpreter: DataInterpreter,
        channel_count: u8,
        channel_size: u8,
        is_signed: bool,
        offset: u8,
    ) -> Self {
        DecodeSpec {
            interpreter,
            channel_count,
            channel_size,
            offset,
            is_signed,
            converter: Converter::Default,
        }
    }

    /// Conservative default for id-indexed sub-signals: unsigned, no length or offset.
    pub const fn id_signal() -> Self {
        Self::new(DataInterpreter::UInt32, 0, 0, false, 0)
    }

    /// Single unsigned byte, as used by the status registers.
    pub const fn status_byte() -> Self {
        Self::new(DataInterpreter::UInt32, 1, 1, false, 0)
    }

    /// Four signed 4-byte channels holding a w, x, y, z quaternion.
    pub const fn quaternion() -> Self {
        Self::new(DataInterpreter::SensorFusionQuaternion, 4, 4, true, 0)
    }

    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.converter = converter;
        self
    }

    pub fn set_channel_attr(&mut self, channel_count: u8, channel_size: u8) {
        self.channel_count = channel_count;
        self.channel_size = channel_size;
    }

    /// Total sample length in bytes; 0 when the length is unspecified.
    pub fn length(&self) -> usize {
        usize::from(self.channel_count) * usize::from(self.channel_size)
    }

    /// Decodes one sample from `payload`.
    pub fn decode(&self, payload: &[u8]) -> Result<DataValue, DecodeError> {
        let offset = usize::from(self.offset);
        let body = payload.get(offset..).ok_or(DecodeError::TooShort {
            needed: offset,
            got: payload.len(),
        })?;

        match self.interpreter {
            // is_signed picks the sign for both integer interpreters
            DataInterpreter::UInt32 | DataInterpreter::Int32 => {
                let raw = take_int_bytes(body, self.length())?;
                let value = if self.is_signed {
                    DataValue::Int32(sign_extend(read_u32_le(raw), raw.len()))
                } else {
                    DataValue::UInt32(read_u32_le(raw))
                };
                Ok(self.convert(value))
            }
            DataInterpreter::SensorFusionQuaternion => {
                let needed = if self.length() == 0 { 16 } else { self.length() };
                if needed < 16 || body.len() < needed {
                    return Err(DecodeError::TooShort { needed: needed.max(16), got: body.len() });
                }
                let channel = |i: usize| {
                    let mut bytes = [0u8; 4];
                    bytes.copy_from_slice(&body[i * 4..i * 4 + 4]);
                    f32::from_le_bytes(bytes)
                };
                Ok(DataValue::Quaternion(Quaternion {
                    w: channel(0),
                    x: channel(1),
                    y: channel(2),
                    z: channel(3),
                }))
            }
            DataInterpreter::ByteArray => {
                let len = match self.length() {
                    0 => body.len(),
                    n if n <= body.len() => n,
                    n => return Err(DecodeError::TooShort { needed: n, got: body.len() }),
                };
                Ok(DataValue::Bytes(body[..len].to_vec()))
            }
        }
    }

    fn convert(&self, value: DataValue) -> DataValue {
        match (self.converter, value) {
            (Converter::Scale(factor), DataValue::UInt32(v)) => DataValue::Float(v as f32 / factor),
            (Converter::Scale(factor), DataValue::Int32(v)) => DataValue::Float(v as f32 / factor),
            (_, value) => value,
        }
    }
}

// Integer payloads carry 1..=4 bytes. An unspecified length takes up to 4.
fn take_int_bytes(body: &[u8], length: usize) -> Result<&[u8], DecodeError> {
    let len = if length == 0 { body.len().min(4) } else { length.min(4) };
    if len == 0 || body.len() < len {
        return Err(DecodeError::TooShort { needed: len.max(1), got: body.len() });
    }
    Ok(&body[..len])
}

#[inline]
fn read_u32_le(bytes: &[u8]) -> u32 {
    bytes.iter().rev().fold(0u32, |acc, b| (acc << 8) | u32::from(*b))
}

#[inline]
fn sign_extend(raw: u32, len: usize) -> i32 {
    let shift = 32 - 8 * len as u32;
    ((raw << shift) as i32) >> shift
}

// --- Decoded Values ---

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One decoded sample.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    UInt32(u32),
    Int32(i32),
    Float(f32),
    Quaternion(Quaternion),
    Bytes(Vec<u8>),
}

/// Payload did not hold enough bytes for the signal's decode spec.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Payload too short: needed {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },
}

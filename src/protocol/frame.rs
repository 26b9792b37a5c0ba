//! MT frame
//!
//! A frame is the unit exchanged with the co-processor: a length, two command
//! bytes and an opaque payload.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use super::{
    CommandType, Error, FRAME_HEADER_LEN, MAX_PAYLOAD_SIZE, Result, Subsystem, types,
};

/// MT frame
///
/// # Wire Format
///
/// ```text
/// +--------+--------+--------+------------------+
/// | len    | cmd0   | cmd1   | attrs (len)      |
/// +--------+--------+--------+------------------+
///   type = cmd0 & 0xE0, subsystem = cmd0 & 0x1F
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct MtFrame {
    cmd0: u8,
    cmd1: u8,
    attrs: Bytes,
}

impl MtFrame {
    /// Create a frame, rejecting payloads that do not fit the length byte.
    pub fn new(cmd0: u8, cmd1: u8, attrs: impl Into<Bytes>) -> Result<Self> {
        let attrs = attrs.into();
        if attrs.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge {
                size: attrs.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self { cmd0, cmd1, attrs })
    }

    /// Create a frame from its type and subsystem.
    pub fn build(
        kind: CommandType,
        subsystem: Subsystem,
        cmd1: u8,
        attrs: impl Into<Bytes>,
    ) -> Result<Self> {
        Self::new(types::cmd0(kind, subsystem), cmd1, attrs)
    }

    /// Raw cmd0 byte
    #[must_use]
    pub const fn cmd0(&self) -> u8 {
        self.cmd0
    }

    /// Raw cmd1 byte (opcode)
    #[must_use]
    pub const fn cmd1(&self) -> u8 {
        self.cmd1
    }

    /// Payload
    #[must_use]
    pub const fn attrs(&self) -> &Bytes {
        &self.attrs
    }

    /// Take ownership of the payload
    #[must_use]
    pub fn into_attrs(self) -> Bytes {
        self.attrs
    }

    /// Payload length as carried on the wire
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u8 {
        // Bounded by MAX_PAYLOAD_SIZE at construction.
        self.attrs.len() as u8
    }

    /// Whether the payload is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Frame type, if the type bits are valid
    #[must_use]
    pub fn command_type(&self) -> Option<CommandType> {
        CommandType::from_cmd0(self.cmd0)
    }

    /// Subsystem, if known
    #[must_use]
    pub fn subsystem(&self) -> Option<Subsystem> {
        Subsystem::from_cmd0(self.cmd0)
    }

    /// Whether this frame is a synchronous response
    #[must_use]
    pub fn is_srsp(&self) -> bool {
        self.command_type() == Some(CommandType::Srsp)
    }

    /// Encode to the transport-neutral layout
    #[must_use]
    pub fn encode(&self) -> Bytes {
        encode_frame(self)
    }
}

impl fmt::Debug for MtFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MtFrame")
            .field("cmd0", &format_args!("{:#04x}", self.cmd0))
            .field("cmd1", &format_args!("{:#04x}", self.cmd1))
            .field("attrs", &HexSlice(&self.attrs))
            .finish()
    }
}

/// Lower-case hex rendering used by frame tracing.
pub(crate) struct HexSlice<'a>(pub(crate) &'a [u8]);

impl fmt::Display for HexSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for HexSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{self}]")
    }
}

/// Encode a frame as `[len][cmd0][cmd1][attrs]`
///
/// No checksum is added; integrity belongs to the transport framing.
#[must_use]
pub fn encode_frame(frame: &MtFrame) -> Bytes {
    let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + frame.attrs.len());
    buf.put_u8(frame.len());
    buf.put_u8(frame.cmd0);
    buf.put_u8(frame.cmd1);
    buf.put_slice(&frame.attrs);
    buf.freeze()
}

/// Decode `(len, cmd0, cmd1)` from the start of `bytes`
///
/// The caller then pulls exactly `len` more bytes as the payload.
pub fn decode_frame_header(bytes: &[u8]) -> Result<(u8, u8, u8)> {
    match bytes {
        [len, cmd0, cmd1, ..] => Ok((*len, *cmd0, *cmd1)),
        _ => Err(Error::BufferTooSmall {
            needed: FRAME_HEADER_LEN,
            got: bytes.len(),
        }),
    }
}

/// Decode a complete frame produced by [`encode_frame`]
pub fn decode_frame(bytes: &[u8]) -> Result<MtFrame> {
    let (len, cmd0, cmd1) = decode_frame_header(bytes)?;
    let total = FRAME_HEADER_LEN + usize::from(len);
    if bytes.len() < total {
        return Err(Error::BufferTooSmall {
            needed: total,
            got: bytes.len(),
        });
    }
    MtFrame::new(
        cmd0,
        cmd1,
        Bytes::copy_from_slice(&bytes[FRAME_HEADER_LEN..total]),
    )
}

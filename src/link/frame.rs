//! Command frame encoding and decoding.
//!
//! Every frame on the wire starts with a 1-Byte command tag; the rest of the frame is determined
//! entirely by that tag. There are no length fields, so the decoder insists that the delivered
//! length matches the command exactly. The codec is the only trust boundary against malformed or
//! replayed bursts: anything it rejects is dropped by the dispatcher without a state change.

use crate::bytes::{ByteReader, ByteWriter, FromBytes};
use crate::link::{MAX_PAYLOAD, MTU};
use crate::phy::Channel;
use crate::security::LinkKey;
use crate::Error;

enum_with_unknown! {
    /// The command tag transmitted as Byte 0 of every frame.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum CommandCode(u8) {
        /// Broadcast by an unpaired Sender looking for a Receiver.
        Search = 1,
        /// Unicast answer to `Search`, carrying a freshly generated link key.
        SearchReply = 2,
        /// Sent by the Sender when link quality degrades.
        HopRequest = 3,
        /// Unicast answer to `HopRequest`, carrying the proposed channel.
        HopReply = 4,
        /// Opaque application payload.
        Data = 5,
    }
}

/// A decoded view of a received command frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Frame<'a> {
    /// `SEARCH`: 1 Byte, no payload.
    Search,

    /// `SEARCH_REPLY`: the Receiver's freshly generated link key.
    SearchReply {
        /// Key to use for the link once pairing commits.
        key: LinkKey,
    },

    /// `HOP_REQUEST`: 1 Byte, no payload.
    HopRequest,

    /// `HOP_REPLY`: the channel the Receiver proposes to move to.
    HopReply {
        /// Proposed channel, already validated to be in range.
        channel: Channel,
    },

    /// `DATA`: 1 to 249 Bytes of opaque application payload.
    Data {
        /// The payload, borrowed from the receive buffer for the duration of the upcall.
        payload: &'a [u8],
    },
}

impl<'a> Frame<'a> {
    /// Returns the command tag of this frame.
    pub fn code(&self) -> CommandCode {
        match self {
            Frame::Search => CommandCode::Search,
            Frame::SearchReply { .. } => CommandCode::SearchReply,
            Frame::HopRequest => CommandCode::HopRequest,
            Frame::HopReply { .. } => CommandCode::HopReply,
            Frame::Data { .. } => CommandCode::Data,
        }
    }
}

impl<'a> FromBytes<'a> for Frame<'a> {
    fn from_bytes(bytes: &mut ByteReader<'a>) -> Result<Self, Error> {
        let frame = match CommandCode::from(bytes.read_u8()?) {
            CommandCode::Search => Frame::Search,
            CommandCode::SearchReply => Frame::SearchReply {
                key: LinkKey::from_bytes(bytes)?,
            },
            CommandCode::HopRequest => Frame::HopRequest,
            CommandCode::HopReply => {
                let channel = Channel::from_raw(bytes.read_u8()?).ok_or(Error::InvalidValue)?;
                Frame::HopReply { channel }
            }
            CommandCode::Data => {
                let payload = bytes.read_rest();
                if payload.is_empty() || payload.len() > MAX_PAYLOAD {
                    return Err(Error::InvalidLength);
                }
                Frame::Data { payload }
            }
            CommandCode::Unknown(_) => return Err(Error::InvalidValue),
        };

        // Frame lengths are fixed per command; trailing bytes mean the frame is not what its tag
        // claims.
        if !bytes.is_empty() {
            return Err(Error::IncompleteParse);
        }

        Ok(frame)
    }
}

/// An encoded command frame, ready to be handed to the radio.
pub struct FrameBuf {
    buf: [u8; MTU],
    len: u8,
}

impl FrameBuf {
    /// Builds a `SEARCH` frame.
    pub fn search() -> Self {
        Self::tag_only(CommandCode::Search)
    }

    /// Builds a `SEARCH_REPLY` frame carrying `key`.
    pub fn search_reply(key: &LinkKey) -> Self {
        let mut frame = Self::tag_only(CommandCode::SearchReply);
        frame.buf[1..1 + LinkKey::SIZE].copy_from_slice(key.raw());
        frame.len = 1 + LinkKey::SIZE as u8;
        frame
    }

    /// Builds a `HOP_REQUEST` frame.
    pub fn hop_request() -> Self {
        Self::tag_only(CommandCode::HopRequest)
    }

    /// Builds a `HOP_REPLY` frame proposing `channel`.
    pub fn hop_reply(channel: Channel) -> Self {
        let mut frame = Self::tag_only(CommandCode::HopReply);
        frame.buf[1] = channel.number();
        frame.len = 2;
        frame
    }

    /// Builds a `DATA` frame around `payload`.
    ///
    /// Fails with `Error::PayloadTooLarge` when `payload` is empty or longer than the 249 Bytes
    /// left in a frame after the tag.
    pub fn data(payload: &[u8]) -> Result<Self, Error> {
        if payload.is_empty() || payload.len() > MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge);
        }

        let mut frame = FrameBuf {
            buf: [0; MTU],
            len: 0,
        };
        let mut writer = ByteWriter::new(&mut frame.buf);
        writer.write_u8(CommandCode::Data.into())?;
        writer.write_slice(payload)?;
        frame.len = (MTU - writer.space_left()) as u8;
        Ok(frame)
    }

    fn tag_only(code: CommandCode) -> Self {
        let mut frame = FrameBuf {
            buf: [0; MTU],
            len: 1,
        };
        frame.buf[0] = code.into();
        frame
    }

    /// Returns the on-wire bytes of this frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }
}

//! Physical layer interactions.
//!
//! Don't expect to see much code here: Most of this layer is hardware.
//!
//! The bridge operates on the 13 overlapping 2.4 GHz channels commonly available to short-range
//! radios, numbered 1 to 13 with ascending center frequencies in 5 MHz steps. Both endpoints must
//! occupy the same channel to communicate; they start out on channel 7 and move in lockstep when
//! the link degrades (see [`link::hop`]).
//!
//! [`link::hop`]: ../link/hop/index.html

use core::fmt;

use bitflags::bitflags;

/// Lowest usable channel number.
pub const MIN_CHANNEL: u8 = 1;

/// Highest usable channel number.
pub const MAX_CHANNEL: u8 = 13;

/// One of the 13 radio channels.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Channel(u8);

impl Channel {
    /// The channel both endpoints start on after boot.
    pub const INITIAL: Self = Channel(7);

    /// Creates a `Channel` from a raw channel number.
    ///
    /// # Panics
    ///
    /// This will panic if `number` is not a valid channel number. Valid numbers are 1..=13.
    pub fn new(number: u8) -> Self {
        assert!(MIN_CHANNEL <= number && number <= MAX_CHANNEL);
        Channel(number)
    }

    /// Creates a `Channel` from a raw channel number, returning `None` for out-of-range values.
    ///
    /// Use this for numbers arriving over the air.
    pub fn from_raw(number: u8) -> Option<Self> {
        if MIN_CHANNEL <= number && number <= MAX_CHANNEL {
            Some(Channel(number))
        } else {
            None
        }
    }

    /// Returns the channel number.
    ///
    /// The returned value is always in range 1..=13.
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Returns the center frequency of this channel in MHz.
    pub fn freq(&self) -> u16 {
        2412 + u16::from(self.0 - 1) * 5
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

bitflags! {
    /// Capabilities a radio is configured with at startup.
    ///
    /// Both bridge roles configure the radio as [`Capabilities::COMBO`]: the Sender must receive
    /// discovery replies and hop replies, the Receiver must transmit them.
    ///
    /// [`Capabilities::COMBO`]: #associatedconstant.COMBO
    pub struct Capabilities: u8 {
        /// The radio will transmit frames.
        const SEND = 1 << 0;
        /// The radio will receive frames.
        const RECEIVE = 1 << 1;
        /// Both directions at once.
        const COMBO = Self::SEND.bits | Self::RECEIVE.bits;
    }
}

enum_with_unknown! {
    /// Completion status reported by the radio for a transmitted frame.
    ///
    /// For unicast frames this reflects the link-level acknowledgement from the addressed peer.
    /// For broadcasts there is no confirmed recipient and the status is informational only.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum TxStatus(u8) {
        /// The frame was acknowledged (status code 0).
        Acked = 0,
    }
}

impl TxStatus {
    /// Returns whether the frame was acknowledged by the addressed peer.
    pub fn is_acked(&self) -> bool {
        *self == TxStatus::Acked
    }
}

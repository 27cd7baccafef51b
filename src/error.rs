use core::fmt;

/// Errors returned by the bridge link layer.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Frame length does not match what its command tag requires.
    ///
    /// The wire is lossy and may deliver truncated or padded bursts; frames failing this check
    /// are dropped without a state change.
    InvalidLength,

    /// Invalid value supplied for a field (eg. an out-of-range channel).
    InvalidValue,

    /// Unexpectedly reached EOF while reading or writing data.
    ///
    /// This is returned when a value does not fit into a fixed-size buffer, and also when
    /// reaching EOF prematurely while decoding.
    Eof,

    /// Parsing didn't consume the entire buffer.
    IncompleteParse,

    /// A payload handed to the transmit surface is empty or exceeds the space left in a frame.
    PayloadTooLarge,

    /// The operation requires a paired peer, but none is known yet.
    NotPaired,

    /// The radio substrate rejected its initial configuration. Fatal at startup.
    RadioInitFailed,

    /// The radio substrate rejected a channel change.
    ///
    /// Fatal when switching to the initial channel at startup; during a hop it leaves the two
    /// endpoints split until the next hop exchange.
    ChannelSetFailed,

    /// The radio substrate rejected the peer/key registration. Fatal at startup.
    PeerRegisterFailed,

    /// The radio substrate did not accept a frame for transmission.
    SendRejected,

    /// The blob store failed to read the peer record. Fatal during pairing bootstrap.
    StoreReadFailed,

    /// The blob store failed to persist the peer record (including short writes). Fatal during
    /// pairing bootstrap.
    StoreWriteFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::InvalidLength => "frame length does not match command",
            Error::InvalidValue => "invalid value for field",
            Error::Eof => "end of buffer",
            Error::IncompleteParse => "excess data in buffer",
            Error::PayloadTooLarge => "payload empty or too large for a frame",
            Error::NotPaired => "no paired peer",
            Error::RadioInitFailed => "radio initialization failed",
            Error::ChannelSetFailed => "channel change rejected by radio",
            Error::PeerRegisterFailed => "peer registration rejected by radio",
            Error::SendRejected => "frame not accepted for transmission",
            Error::StoreReadFailed => "failed to read peer record",
            Error::StoreWriteFailed => "failed to persist peer record",
        })
    }
}

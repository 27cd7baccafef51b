//! The bridge link layer.
//!
//! Two endpoints — a [`Sender`] and a [`Receiver`] — cooperate over an unreliable datagram radio.
//! Everything they exchange is a *command frame*: a 1-Byte tag followed by a tag-determined body,
//! at most [`MTU`] Bytes in total.
//!
//! ```notrust
//! +-------+----------------------------+
//! |  Tag  |            Body            |
//! | (1 B) |  (fixed per tag, 0-249 B)  |
//! +-------+----------------------------+
//! ```
//!
//! | Tag | Name         | Total length | Body                    | Direction           |
//! |-----|--------------|--------------|-------------------------|---------------------|
//! | 1   | SEARCH       | 1            | —                       | Sender → broadcast  |
//! | 2   | SEARCH_REPLY | 17           | freshly generated key   | Receiver → Sender   |
//! | 3   | HOP_REQUEST  | 1            | —                       | Sender → Receiver   |
//! | 4   | HOP_REPLY    | 2            | proposed channel        | Receiver → Sender   |
//! | 5   | DATA         | 2..=250      | opaque application data | Sender → Receiver   |
//!
//! # Pairing
//!
//! While unpaired, the Sender broadcasts SEARCH every 500 ms and the Receiver listens. The
//! Receiver answers each SEARCH with a unicast SEARCH_REPLY carrying a freshly generated link
//! key. The commit points are deliberately asymmetric:
//!
//! * the **Sender** commits when the reply arrives — it now knows the Receiver's address and the
//!   key;
//! * the **Receiver** commits when the radio reports the reply *acknowledged* — it now knows the
//!   Sender saw the key.
//!
//! If the Sender misses a reply, its next SEARCH simply produces a new reply with a new key, and
//! the last acknowledged key wins. Both sides persist the resulting [`Peer`] record, so later
//! boots skip discovery entirely.
//!
//! # Channel hops
//!
//! The Sender tracks unicast ack success ([`quality`]); when the estimate degrades it transmits
//! HOP_REQUEST. The Receiver owns the channel state ([`hop`]), proposes the next channel in a
//! HOP_REPLY, and switches only after that reply has been acknowledged — switching earlier would
//! leave the reply unheard on the old channel. The Sender switches the moment the reply arrives.
//!
//! # Concurrency
//!
//! The whole layer runs in one logical context. The platform forwards the radio's two upcalls to
//! the role's `on_sent`/`on_received` methods and drives `idle` from its main loop; the substrate
//! guarantees (or [`queue`] restores) that these never overlap. There is exactly one role
//! instance per endpoint — the radio is a process-wide singleton, constructed by the platform and
//! moved into the role at startup.
//!
//! [`Sender`]: struct.Sender.html
//! [`Receiver`]: struct.Receiver.html
//! [`MTU`]: constant.MTU.html
//! [`Peer`]: peer/struct.Peer.html
//! [`quality`]: quality/index.html
//! [`hop`]: hop/index.html
//! [`queue`]: queue/index.html

mod device_address;
pub mod frame;
pub mod hop;
pub mod peer;
pub mod quality;
pub mod queue;
mod receiver;
mod sender;

pub use self::device_address::DeviceAddress;
pub use self::receiver::{PayloadSink, Receiver};
pub use self::sender::{LinkMonitor, Sender};

use crate::config::Config;
use crate::phy::{Capabilities, Channel};
use crate::security::LinkKey;
use crate::time::Duration;
use crate::Error;

use self::peer::Peer;

/// Maximum size of a single frame accepted by the radio substrate, in Bytes.
pub const MTU: usize = 250;

/// Maximum application payload in a DATA frame: the MTU minus the command tag.
pub const MAX_PAYLOAD: usize = MTU - 1;

/// Cadence of the Sender's discovery broadcasts.
pub const SEARCH_INTERVAL: Duration = Duration::from_millis(500);

/// Trait for the datagram radio substrate.
///
/// The platform implements this once per radio. All methods are synchronous accept/reject; the
/// per-frame outcome of a send and all received frames arrive later through the role's
/// `on_sent`/`on_received` upcalls, which the platform glue forwards.
pub trait Radio {
    /// Configures the radio's transfer directions.
    ///
    /// Both roles use [`Capabilities::COMBO`]. Failure is fatal at startup.
    ///
    /// [`Capabilities::COMBO`]: ../phy/struct.Capabilities.html#associatedconstant.COMBO
    fn configure(&mut self, capabilities: Capabilities) -> Result<(), Error>;

    /// Tunes the radio to `channel`.
    fn set_channel(&mut self, channel: Channel) -> Result<(), Error>;

    /// Registers `addr` as a known peer using `key` for payload encryption.
    ///
    /// Unicast traffic to and from unregistered peers is not encrypted; registration happens
    /// exactly once per boot, right after pairing commits or the persisted peer is restored.
    fn add_peer(&mut self, addr: &DeviceAddress, key: &LinkKey) -> Result<(), Error>;

    /// Hands `frame` to the radio for transmission to `dest`.
    ///
    /// `Ok` means accepted for transmission, not delivered; the eventual link-level outcome is
    /// reported through the `on_sent` upcall. `dest` may be [`DeviceAddress::BROADCAST`], in
    /// which case the completion status has no confirmed recipient.
    ///
    /// [`DeviceAddress::BROADCAST`]: struct.DeviceAddress.html#associatedconstant.BROADCAST
    fn try_send(&mut self, dest: &DeviceAddress, frame: &[u8]) -> Result<(), Error>;
}

/// Pairing progress of this endpoint.
///
/// Transitions are monotonic per boot: once `Paired`, an endpoint does not return to `Unpaired`
/// until it reboots. The reset operation only removes the *persisted* record and leaves the
/// running session alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PairingState {
    /// No peer is known; the role-specific discovery procedure is running.
    Unpaired,
    /// A peer is known, registered with the radio, and persisted.
    Paired,
}

/// The substrate shared by both roles: radio bring-up, the peer record, and pairing state.
pub struct BridgeCore<C: Config> {
    radio: C::Radio,
    timer: C::Timer,
    store: C::Store,
    peer: Option<Peer>,
    state: PairingState,
}

impl<C: Config> BridgeCore<C> {
    /// Brings up the link layer substrate.
    ///
    /// Configures the radio for both directions, tunes it to the initial channel, and restores
    /// the persisted peer record if one exists — in that case the returned core is already
    /// `Paired` and the peer is registered with the radio before any traffic happens. All
    /// failures here are fatal; the entry point should halt with the diagnostic.
    pub fn new(radio: C::Radio, timer: C::Timer, store: C::Store) -> Result<Self, Error> {
        let mut core: BridgeCore<C> = BridgeCore {
            radio,
            timer,
            store,
            peer: None,
            state: PairingState::Unpaired,
        };

        core.radio.configure(Capabilities::COMBO)?;
        core.radio.set_channel(Channel::INITIAL)?;

        if let Some(peer) = Peer::load(&core.store)? {
            core.radio.add_peer(peer.addr(), peer.key())?;
            info!("restored peer {:?}", peer.addr());
            core.peer = Some(peer);
            core.state = PairingState::Paired;
        }

        Ok(core)
    }

    /// Returns the current pairing state.
    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Returns whether a peer is known.
    pub fn is_paired(&self) -> bool {
        self.state == PairingState::Paired
    }

    /// Returns the paired peer, if any.
    pub fn peer(&self) -> Option<&Peer> {
        self.peer.as_ref()
    }

    /// Commits a freshly discovered peer: persists it, registers it with the radio, and enters
    /// `Paired`.
    ///
    /// Failures are fatal — without the blob the next boot silently disagrees with the
    /// counterpart about being paired, and without registration the link cannot encrypt. The
    /// record is persisted *before* the radio learns the key, so a failed or short write never
    /// leaves the substrate holding a registration the pairing state has no record of. If
    /// registration fails after a successful write, the next boot retries it from the restored
    /// blob.
    pub(crate) fn commit_peer(&mut self, peer: Peer) -> Result<(), Error> {
        peer.store(&mut self.store)?;
        self.radio.add_peer(peer.addr(), peer.key())?;
        info!("paired with {:?}", peer.addr());
        self.peer = Some(peer);
        self.state = PairingState::Paired;
        Ok(())
    }

    /// Removes the persisted peer record, forcing rediscovery on the next boot.
    ///
    /// The running session keeps its peer and state; the operation is idempotent.
    pub fn reset(&mut self) -> Result<(), Error> {
        Peer::erase(&mut self.store)
    }
}

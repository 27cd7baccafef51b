//! The Receiver role: answering discovery, deciding hops, and delivering payloads.

use crate::bytes::{ByteReader, FromBytes};
use crate::config::Config;
use crate::link::frame::{Frame, FrameBuf};
use crate::link::hop::ChannelHopper;
use crate::link::peer::Peer;
use crate::link::{BridgeCore, DeviceAddress, PairingState, Radio};
use crate::phy::{Channel, TxStatus};
use crate::portal::{ConfigPortal, PortalRequest};
use crate::security::LinkKey;
use crate::utils::HexSlice;
use crate::Error;

/// Consumer of the application payloads carried in DATA frames.
pub trait PayloadSink {
    /// Called once per valid DATA frame with its 1 to 249 payload Bytes.
    ///
    /// The slice borrows the substrate's receive buffer and is only valid for the duration of
    /// the call.
    fn on_data(&mut self, payload: &[u8]);
}

/// Any `FnMut(&[u8])` closure works as a sink.
impl<F: FnMut(&[u8])> PayloadSink for F {
    fn on_data(&mut self, payload: &[u8]) {
        self(payload)
    }
}

/// A unicast whose completion upcall carries a commit decision.
///
/// The Receiver changes state strictly on send-acks: pairing commits when the discovery reply is
/// acked, a hop commits when the hop reply is acked. Only one such unicast is ever in flight at
/// a time, because the upcalls are serialized with the processing that emits them.
enum PendingAck {
    /// A SEARCH_REPLY went out; on ack, adopt this peer.
    Pairing(Peer),
    /// A HOP_REPLY went out; on ack, switch to this channel.
    Hop(Channel),
}

/// The receiving endpoint of the bridge.
///
/// There must be exactly one role instance per endpoint; the radio substrate is a process-wide
/// singleton and is owned by this struct for the lifetime of the process.
pub struct Receiver<C: Config> {
    core: BridgeCore<C>,
    rng: C::Rng,
    hopper: ChannelHopper,
    pending: Option<PendingAck>,
}

impl<C: Config> Receiver<C> {
    /// Brings up the Receiver.
    ///
    /// `rng` feeds link-key generation; see [`security`] for the choice of source. See
    /// [`BridgeCore::new`] for the startup work.
    ///
    /// [`security`]: ../security/index.html
    /// [`BridgeCore::new`]: struct.BridgeCore.html#method.new
    pub fn new(
        radio: C::Radio,
        timer: C::Timer,
        store: C::Store,
        rng: C::Rng,
    ) -> Result<Self, Error> {
        Ok(Receiver {
            core: BridgeCore::new(radio, timer, store)?,
            rng,
            hopper: ChannelHopper::new(),
            pending: None,
        })
    }

    /// Returns the shared core, for inspecting pairing state and issuing a reset.
    pub fn core(&mut self) -> &mut BridgeCore<C> {
        &mut self.core
    }

    /// Returns the channel this Receiver currently occupies.
    pub fn current_channel(&self) -> Channel {
        self.hopper.current()
    }

    /// Services one iteration of the main loop.
    ///
    /// The Receiver is passive on the radio — all its transmissions are answers — so this only
    /// gives the config portal a slice of CPU time.
    pub fn idle<P: ConfigPortal>(&mut self, portal: &mut P) {
        if let Some(PortalRequest::Reset) = portal.poll() {
            if let Err(e) = self.core.reset() {
                warn!("portal reset failed: {}", e);
            }
        }
    }

    /// Processes a received frame.
    ///
    /// This is the Receiver's receive dispatcher: while unpaired only SEARCH is meaningful,
    /// afterwards HOP_REQUEST and DATA. Everything else — malformed frames included — is dropped
    /// without a state change.
    pub fn on_received<S: PayloadSink>(
        &mut self,
        src: &DeviceAddress,
        bytes: &[u8],
        sink: &mut S,
    ) -> Result<(), Error> {
        let frame = match Frame::from_bytes(&mut ByteReader::new(bytes)) {
            Ok(frame) => frame,
            Err(e) => {
                trace!("dropping frame from {:?}: {} ({:?})", src, e, HexSlice(bytes));
                return Ok(());
            }
        };

        match (self.core.state(), frame) {
            (PairingState::Unpaired, Frame::Search) => {
                self.answer_search(src);
                Ok(())
            }
            (PairingState::Paired, Frame::HopRequest) => {
                self.answer_hop_request(src);
                Ok(())
            }
            (PairingState::Paired, Frame::Data { payload }) => {
                sink.on_data(payload);
                Ok(())
            }
            (state, frame) => {
                trace!("dropping {:?} in state {:?}", frame.code(), state);
                Ok(())
            }
        }
    }

    /// Processes a send-completion upcall from the radio.
    ///
    /// This is where the Receiver's commits happen: an acked SEARCH_REPLY completes pairing, an
    /// acked HOP_REPLY switches the channel. A failed ack abandons the pending commit — the
    /// Sender evidently did not hear the reply, so the Receiver stays put and waits for the next
    /// SEARCH or HOP_REQUEST.
    pub fn on_sent(&mut self, peer: &DeviceAddress, status: TxStatus) -> Result<(), Error> {
        let _ = peer;

        match self.pending.take() {
            Some(PendingAck::Pairing(new_peer)) => {
                if status.is_acked() {
                    self.core.commit_peer(new_peer)
                } else {
                    debug!("search reply not acked, staying unpaired");
                    Ok(())
                }
            }
            Some(PendingAck::Hop(next)) => {
                if status.is_acked() {
                    self.commit_hop(next);
                } else {
                    debug!("hop reply not acked, staying on {:?}", self.hopper.current());
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Answers a discovery broadcast with a freshly generated key.
    ///
    /// Every SEARCH gets its own key: if an earlier reply was lost or its ack failed, the key it
    /// carried must not linger, and the last *acknowledged* key is the one both sides agree on.
    fn answer_search(&mut self, src: &DeviceAddress) {
        let key = LinkKey::generate(&mut self.rng);
        debug!("<- SEARCH from {:?}, answering", src);

        let reply = FrameBuf::search_reply(&key);
        match self.core.radio.try_send(src, reply.as_bytes()) {
            Ok(()) => self.pending = Some(PendingAck::Pairing(Peer::new(*src, key))),
            Err(e) => warn!("search reply rejected: {}", e),
        }
    }

    /// Answers a hop request with the next channel of the walk.
    ///
    /// The channel state must not change yet: the reply still has to reach the Sender on the
    /// *current* channel. The switch happens in [`on_sent`] once the ack proves the reply left.
    ///
    /// [`on_sent`]: #method.on_sent
    fn answer_hop_request(&mut self, src: &DeviceAddress) {
        let candidate = self.hopper.propose();
        debug!("<- HOP_REQUEST, proposing {:?}", candidate);

        let reply = FrameBuf::hop_reply(candidate);
        match self.core.radio.try_send(src, reply.as_bytes()) {
            Ok(()) => self.pending = Some(PendingAck::Hop(candidate)),
            Err(e) => warn!("hop reply rejected: {}", e),
        }
    }

    /// Switches to an acknowledged hop candidate.
    ///
    /// When the radio refuses the switch, the channel state stays unchanged — but the Sender has
    /// already hopped by now, so the two endpoints are split until a later hop exchange finds
    /// them again. This is the accepted trade-off for keeping the protocol at one round-trip.
    fn commit_hop(&mut self, next: Channel) {
        match self.core.radio.set_channel(next) {
            Ok(()) => {
                self.hopper.commit(next);
                info!("hopped to {:?}", next);
            }
            Err(e) => warn!("channel switch to {:?} failed: {}", next, e),
        }
    }
}

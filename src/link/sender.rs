//! The Sender role: discovery broadcasts, the transmit surface, and hop triggering.

use crate::bytes::{ByteReader, FromBytes};
use crate::config::Config;
use crate::link::frame::{Frame, FrameBuf};
use crate::link::peer::Peer;
use crate::link::quality::LinkQuality;
use crate::link::{BridgeCore, DeviceAddress, PairingState, Radio, SEARCH_INTERVAL};
use crate::phy::TxStatus;
use crate::portal::{ConfigPortal, PortalRequest};
use crate::time::{Instant, Timer};
use crate::utils::HexSlice;
use crate::Error;

/// Hook notified when the Sender considers the link degraded.
///
/// The notification fires right before the hop request is transmitted. Implementations must not
/// block; typical uses are lighting an LED or bumping a statistics counter.
pub trait LinkMonitor {
    /// Called with the estimate that fell below the hop threshold.
    fn on_low_quality(&mut self, quality: f32) {
        let _ = quality;
    }
}

/// No monitoring.
impl LinkMonitor for () {}

/// The transmitting endpoint of the bridge.
///
/// There must be exactly one role instance per endpoint; the radio substrate is a process-wide
/// singleton and is owned by this struct for the lifetime of the process.
pub struct Sender<C: Config> {
    core: BridgeCore<C>,
    quality: LinkQuality,
    last_search: Option<Instant>,
}

impl<C: Config> Sender<C> {
    /// Brings up the Sender.
    ///
    /// See [`BridgeCore::new`] for the startup work; when a persisted peer is restored, the
    /// Sender starts out `Paired` and never broadcasts.
    ///
    /// [`BridgeCore::new`]: struct.BridgeCore.html#method.new
    pub fn new(radio: C::Radio, timer: C::Timer, store: C::Store) -> Result<Self, Error> {
        Ok(Sender {
            core: BridgeCore::new(radio, timer, store)?,
            quality: LinkQuality::new(),
            last_search: None,
        })
    }

    /// Returns the shared core, for inspecting pairing state and issuing a reset.
    pub fn core(&mut self) -> &mut BridgeCore<C> {
        &mut self.core
    }

    /// Returns the current link quality estimate.
    pub fn quality(&self) -> f32 {
        self.quality.get()
    }

    /// Services one iteration of the main loop.
    ///
    /// Keeps the discovery broadcast cadence while unpaired and gives the config portal a slice
    /// of CPU time. Call this continuously; nothing in here blocks.
    pub fn idle<P: ConfigPortal>(&mut self, portal: &mut P) {
        self.update();

        if let Some(PortalRequest::Reset) = portal.poll() {
            if let Err(e) = self.core.reset() {
                warn!("portal reset failed: {}", e);
            }
        }
    }

    /// Emits a discovery broadcast when one is due.
    ///
    /// The cadence is poll-based: this checks the monotonic clock and sends at most one SEARCH
    /// per 500 ms window. Does nothing once paired.
    pub fn update(&mut self) {
        if self.core.is_paired() {
            return;
        }

        let now = self.core.timer.now();
        let due = match self.last_search {
            Some(at) => now.duration_since(at) >= SEARCH_INTERVAL,
            None => true,
        };
        if !due {
            return;
        }

        self.last_search = Some(now);
        trace!("-> SEARCH (broadcast)");
        let frame = FrameBuf::search();
        if let Err(e) = self
            .core
            .radio
            .try_send(&DeviceAddress::BROADCAST, frame.as_bytes())
        {
            warn!("search broadcast rejected: {}", e);
        }
    }

    /// Hands an application payload of 1 to 249 Bytes to the radio.
    ///
    /// `Ok` means the radio accepted the frame for transmission — not that the peer received it.
    /// Delivery is best-effort: the per-frame ack outcome only feeds the link quality estimate
    /// and is not reported back here.
    pub fn send(&mut self, payload: &[u8]) -> Result<(), Error> {
        let peer_addr = match self.core.peer() {
            Some(peer) => *peer.addr(),
            None => return Err(Error::NotPaired),
        };

        let frame = FrameBuf::data(payload)?;
        self.core.radio.try_send(&peer_addr, frame.as_bytes()).map_err(|e| {
            debug!("data frame rejected by radio: {}", e);
            e
        })
    }

    /// Processes a send-completion upcall from the radio.
    ///
    /// Broadcast completions are informational only. Unicast completions feed the quality
    /// estimator; when the estimate degrades, `monitor` is notified and a HOP_REQUEST goes out.
    /// The estimate restarts at 1.0 *only* when the radio accepted that request — a rejected
    /// request leaves the estimate degraded so the next completion retries.
    pub fn on_sent<M: LinkMonitor>(&mut self, peer: &DeviceAddress, status: TxStatus, monitor: &mut M) {
        if peer.is_broadcast() {
            trace!("broadcast send complete: {:?}", status);
            return;
        }
        if !self.core.is_paired() {
            return;
        }

        self.quality.record(status.is_acked());
        if !self.quality.is_degraded() {
            return;
        }

        debug!("link degraded (quality {}), requesting hop", self.quality.get());
        monitor.on_low_quality(self.quality.get());

        let frame = FrameBuf::hop_request();
        match self.core.radio.try_send(peer, frame.as_bytes()) {
            Ok(()) => self.quality.reset(),
            Err(e) => warn!("hop request rejected: {}", e),
        }
    }

    /// Processes a received frame.
    ///
    /// This is the Sender's receive dispatcher: while unpaired only SEARCH_REPLY is meaningful,
    /// afterwards only HOP_REPLY. Everything else — malformed frames included — is dropped
    /// without a state change. The only errors surfaced are pairing-bootstrap failures
    /// (registration and persistence), which are fatal.
    pub fn on_received(&mut self, src: &DeviceAddress, bytes: &[u8]) -> Result<(), Error> {
        let frame = match Frame::from_bytes(&mut ByteReader::new(bytes)) {
            Ok(frame) => frame,
            Err(e) => {
                trace!("dropping frame from {:?}: {} ({:?})", src, e, HexSlice(bytes));
                return Ok(());
            }
        };

        match (self.core.state(), frame) {
            (PairingState::Unpaired, Frame::SearchReply { key }) => {
                debug!("<- SEARCH_REPLY from {:?}", src);
                self.core.commit_peer(Peer::new(*src, key))
            }
            (PairingState::Paired, Frame::HopReply { channel }) => {
                debug!("<- HOP_REPLY, following to {:?}", channel);
                // The Receiver switches after our radio acked its reply, which may already have
                // happened; switching here closes the gap as fast as this side can.
                if let Err(e) = self.core.radio.set_channel(channel) {
                    warn!("failed to follow hop to {:?}: {}", channel, e);
                }
                Ok(())
            }
            (state, frame) => {
                trace!("dropping {:?} in state {:?}", frame.code(), state);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::peer::{PEER_BLOB, PEER_BLOB_LEN};
    use crate::phy::Channel;
    use crate::security::LinkKey;
    use crate::store::BlobStore;
    use crate::testutil::{CountingMonitor, MemStore, MockRadio, MockTimer, ScriptedPortal, TestConfig};
    use crate::time::Duration;

    fn unpaired_sender() -> Sender<TestConfig> {
        Sender::new(MockRadio::new(), MockTimer::new(), MemStore::new()).unwrap()
    }

    fn paired_sender() -> Sender<TestConfig> {
        let mut sender = unpaired_sender();
        let key = LinkKey::from_bytes_exact([7; 16]);
        sender
            .on_received(
                &DeviceAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
                FrameBuf::search_reply(&key).as_bytes(),
            )
            .unwrap();
        assert!(sender.core.is_paired());
        sender.core.radio.sent.clear();
        sender
    }

    #[test]
    fn searches_on_a_500ms_cadence() {
        let mut sender = unpaired_sender();

        sender.update();
        sender.update();
        assert_eq!(sender.core.radio.sent.len(), 1);
        assert_eq!(sender.core.radio.sent[0].0, DeviceAddress::BROADCAST);
        assert_eq!(sender.core.radio.sent[0].1, vec![1]);

        sender.core.timer.advance(Duration::from_millis(499));
        sender.update();
        assert_eq!(sender.core.radio.sent.len(), 1);

        sender.core.timer.advance(Duration::from_millis(1));
        sender.update();
        assert_eq!(sender.core.radio.sent.len(), 2);
    }

    #[test]
    fn pairing_commits_on_search_reply() {
        let mut sender = unpaired_sender();
        let src = DeviceAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        let key = LinkKey::from_bytes_exact(*b"fedcba9876543210");

        sender
            .on_received(&src, FrameBuf::search_reply(&key).as_bytes())
            .unwrap();

        assert!(sender.core.is_paired());
        assert_eq!(sender.core.peer().unwrap().addr(), &src);
        assert_eq!(sender.core.radio.peers, vec![(src, key)]);

        // The blob starts with the Receiver's address, followed by the key.
        let mut blob = [0; PEER_BLOB_LEN];
        let len = sender.core.store.read(PEER_BLOB, &mut blob).unwrap();
        assert_eq!(len, PEER_BLOB_LEN);
        assert_eq!(&blob[..6], src.raw());
        assert_eq!(&blob[6..], key.raw());

        // Paired: the cadence stops.
        sender.core.timer.advance(Duration::from_secs(5));
        sender.update();
        assert!(sender.core.radio.sent.is_empty());
    }

    #[test]
    fn warm_boot_never_searches() {
        let mut store = MemStore::new();
        let mut blob = vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];
        blob.extend_from_slice(&[0x42; 16]);
        store.write(PEER_BLOB, &blob).unwrap();

        let mut sender: Sender<TestConfig> =
            Sender::new(MockRadio::new(), MockTimer::new(), store).unwrap();
        assert!(sender.core.is_paired());
        assert_eq!(sender.core.radio.peers.len(), 1);

        for _ in 0..10 {
            sender.core.timer.advance(Duration::from_secs(1));
            sender.update();
        }
        assert!(sender.core.radio.sent.is_empty());
    }

    #[test]
    fn send_frames_the_payload() {
        let mut sender = paired_sender();
        sender.send(b"ping").unwrap();

        assert_eq!(sender.core.radio.sent.len(), 1);
        let (dest, frame) = &sender.core.radio.sent[0];
        assert_eq!(dest, sender.core.peer().unwrap().addr());
        assert_eq!(frame[0], 5);
        assert_eq!(&frame[1..], b"ping");
    }

    #[test]
    fn send_rejects_bad_payload_sizes() {
        let mut sender = paired_sender();
        assert_eq!(sender.send(&[]), Err(Error::PayloadTooLarge));
        assert_eq!(sender.send(&[0; 250]), Err(Error::PayloadTooLarge));

        sender.send(&[0x33; 249]).unwrap();
        assert_eq!(sender.core.radio.sent[0].1.len(), 250);
    }

    #[test]
    fn send_requires_pairing() {
        let mut sender = unpaired_sender();
        assert_eq!(sender.send(b"early"), Err(Error::NotPaired));
    }

    #[test]
    fn quality_decay_triggers_exactly_one_hop_request() {
        let mut sender = paired_sender();
        let peer = *sender.core.peer().unwrap().addr();
        let mut monitor = CountingMonitor::new();

        for _ in 0..40 {
            sender.on_sent(&peer, TxStatus::from(1), &mut monitor);
            if monitor.calls == 1 && sender.quality() == 1.0 {
                // The accepted request restarted the estimate the moment it was handed over.
                break;
            }
        }
        // 0.99^29 < 0.75, so the trigger fires within the 40 failures.
        assert_eq!(monitor.calls, 1);

        for _ in 0..5 {
            sender.on_sent(&peer, TxStatus::from(1), &mut monitor);
        }
        // The reset keeps the estimate healthy; no second request goes out.
        assert_eq!(monitor.calls, 1);
        let hops = sender
            .core
            .radio
            .sent
            .iter()
            .filter(|(_, frame)| frame == &vec![3])
            .count();
        assert_eq!(hops, 1);
    }

    #[test]
    fn rejected_hop_request_retries_on_next_completion() {
        let mut sender = paired_sender();
        let peer = *sender.core.peer().unwrap().addr();
        sender.core.radio.accept_sends = false;

        for _ in 0..40 {
            sender.on_sent(&peer, TxStatus::from(1), &mut ());
        }
        // Still degraded: every emission was rejected, so no reset happened.
        assert!(sender.quality() < 0.75);

        sender.core.radio.accept_sends = true;
        sender.on_sent(&peer, TxStatus::from(1), &mut ());
        assert_eq!(sender.quality(), 1.0);
    }

    #[test]
    fn broadcast_completions_do_not_feed_the_estimator() {
        let mut sender = paired_sender();
        for _ in 0..1_000 {
            sender.on_sent(&DeviceAddress::BROADCAST, TxStatus::from(1), &mut ());
        }
        assert_eq!(sender.quality(), 1.0);
    }

    #[test]
    fn follows_hop_reply() {
        let mut sender = paired_sender();
        let peer = *sender.core.peer().unwrap().addr();
        sender.core.radio.channels.clear();

        sender
            .on_received(&peer, FrameBuf::hop_reply(Channel::new(8)).as_bytes())
            .unwrap();
        assert_eq!(sender.core.radio.channels, vec![Channel::new(8)]);
    }

    #[test]
    fn drops_wrong_state_and_malformed_frames() {
        let mut sender = unpaired_sender();
        // Well-formed but meaningless while unpaired.
        sender
            .on_received(&DeviceAddress::new([1; 6]), &[4, 9])
            .unwrap();
        sender
            .on_received(&DeviceAddress::new([1; 6]), &[5, 1, 2, 3])
            .unwrap();
        assert!(!sender.core.is_paired());

        let mut sender = paired_sender();
        // A stray SEARCH_REPLY must not re-pair or change the key.
        let before = *sender.core.peer().unwrap();
        sender
            .on_received(
                &DeviceAddress::new([9; 6]),
                FrameBuf::search_reply(&LinkKey::from_bytes_exact([0; 16])).as_bytes(),
            )
            .unwrap();
        assert_eq!(sender.core.peer(), Some(&before));

        // Malformed garbage is ignored entirely.
        sender.on_received(&DeviceAddress::new([9; 6]), &[]).unwrap();
        sender
            .on_received(&DeviceAddress::new([9; 6]), &[0xfe, 1, 2])
            .unwrap();
    }

    #[test]
    fn idle_applies_portal_reset() {
        let mut sender = paired_sender();
        assert!(sender.core.store.exists(PEER_BLOB));

        let mut portal = ScriptedPortal::new(vec![None, Some(PortalRequest::Reset)]);
        sender.idle(&mut portal);
        assert!(sender.core.store.exists(PEER_BLOB));
        sender.idle(&mut portal);
        assert!(!sender.core.store.exists(PEER_BLOB));

        // The session itself is untouched.
        assert!(sender.core.is_paired());
    }
}

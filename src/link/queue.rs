//! An SPSC queue for deferring radio upcalls.
//!
//! The protocol assumes the platform serializes the radio's send-complete and receive upcalls
//! with the main loop. On platforms where the upcalls run in interrupt context instead, the
//! bodies must not touch the role directly; this queue carries the events into the loop, which
//! drains them and feeds the role's `on_sent`/`on_received` there.
//!
//! The queue is a fixed-capacity single-producer single-consumer ring: the upcall side only
//! pushes, the loop side only pops, and no locking is needed beyond what `heapless::spsc`
//! provides.

use heapless::consts::U4;
use heapless::spsc::{self, MultiCore};

use crate::link::{DeviceAddress, MTU};
use crate::phy::TxStatus;

/// A radio upcall captured for later processing.
pub enum LinkEvent {
    /// A send completed; `status` tells whether the addressed peer acknowledged it.
    Sent {
        /// Destination of the completed send.
        peer: DeviceAddress,
        /// Reported completion status.
        status: TxStatus,
    },

    /// A frame arrived. The bytes are copied out of the substrate's buffer, which is only valid
    /// for the duration of the upcall.
    Received {
        /// Source address of the frame.
        peer: DeviceAddress,
        /// Copied frame bytes.
        frame: RawFrame,
    },
}

/// An owned copy of a received frame.
pub struct RawFrame {
    buf: [u8; MTU],
    len: u8,
}

impl RawFrame {
    /// Copies `bytes` into an owned frame.
    ///
    /// Returns `None` when `bytes` exceeds the radio MTU; such input cannot have come from the
    /// substrate.
    pub fn copy_from(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > MTU {
            return None;
        }
        let mut frame = RawFrame {
            buf: [0; MTU],
            len: bytes.len() as u8,
        };
        frame.buf[..bytes.len()].copy_from_slice(bytes);
        Some(frame)
    }

    /// Returns the frame bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..usize::from(self.len)]
    }
}

/// A fixed-capacity event queue connecting the upcall context to the main loop.
pub struct EventQueue {
    inner: spsc::Queue<LinkEvent, U4, u8, MultiCore>,
}

impl EventQueue {
    /// Creates a new, empty queue.
    pub fn new() -> Self {
        EventQueue {
            inner: spsc::Queue(heapless::i::Queue::u8()),
        }
    }

    /// Splits the queue into the upcall-side producer and the loop-side consumer.
    pub fn split(&mut self) -> (EventProducer<'_>, EventConsumer<'_>) {
        let (p, c) = self.inner.split();
        (
            EventProducer {
                inner: p,
                dropped: 0,
            },
            EventConsumer { inner: c },
        )
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Upcall-side half of an [`EventQueue`].
///
/// [`EventQueue`]: struct.EventQueue.html
pub struct EventProducer<'a> {
    inner: spsc::Producer<'a, LinkEvent, U4, u8, MultiCore>,
    dropped: u32,
}

impl<'a> EventProducer<'a> {
    /// Enqueues an event, returning whether it fit.
    ///
    /// When the loop falls behind and the queue is full, the event is dropped and counted. The
    /// link layer tolerates lost events the same way it tolerates a lossy wire.
    pub fn push(&mut self, event: LinkEvent) -> bool {
        match self.inner.enqueue(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                false
            }
        }
    }

    /// Returns how many events were dropped because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Loop-side half of an [`EventQueue`].
///
/// [`EventQueue`]: struct.EventQueue.html
pub struct EventConsumer<'a> {
    inner: spsc::Consumer<'a, LinkEvent, U4, u8, MultiCore>,
}

impl<'a> EventConsumer<'a> {
    /// Dequeues the oldest pending event, if any.
    pub fn pop(&mut self) -> Option<LinkEvent> {
        self.inner.dequeue()
    }

    /// Returns whether an event is pending.
    pub fn has_events(&self) -> bool {
        self.inner.ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(byte: u8) -> LinkEvent {
        LinkEvent::Received {
            peer: DeviceAddress::new([byte; 6]),
            frame: RawFrame::copy_from(&[byte]).unwrap(),
        }
    }

    #[test]
    fn events_come_out_in_order() {
        let mut queue = EventQueue::new();
        let (mut producer, mut consumer) = queue.split();

        assert!(!consumer.has_events());
        assert!(producer.push(received(1)));
        assert!(producer.push(LinkEvent::Sent {
            peer: DeviceAddress::BROADCAST,
            status: TxStatus::Acked,
        }));

        match consumer.pop() {
            Some(LinkEvent::Received { frame, .. }) => assert_eq!(frame.as_bytes(), &[1]),
            _ => panic!("expected Received first"),
        }
        match consumer.pop() {
            Some(LinkEvent::Sent { peer, status }) => {
                assert!(peer.is_broadcast());
                assert!(status.is_acked());
            }
            _ => panic!("expected Sent second"),
        }
        assert!(consumer.pop().is_none());
    }

    #[test]
    fn overflow_drops_and_counts() {
        let mut queue = EventQueue::new();
        let (mut producer, mut consumer) = queue.split();

        let mut pushed = 0u32;
        for i in 0..10 {
            if producer.push(received(i)) {
                pushed += 1;
            }
        }
        assert!(pushed < 10);
        assert_eq!(producer.dropped(), 10 - pushed);

        let mut popped = 0;
        while consumer.pop().is_some() {
            popped += 1;
        }
        assert_eq!(popped, pushed);
    }

    #[test]
    fn oversized_frames_are_rejected() {
        assert!(RawFrame::copy_from(&[0; MTU]).is_some());
        assert!(RawFrame::copy_from(&[0; MTU + 1]).is_none());
    }
}

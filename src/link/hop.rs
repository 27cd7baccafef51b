//! Coordinated channel selection with direction memory.
//!
//! Only the Receiver holds channel state; the Sender follows its decisions. On each hop request
//! the Receiver proposes the next channel one step in its current direction, reflecting off the
//! band edges. The proposal is only committed once the reply has demonstrably left the radio
//! (send-ack) and the local channel switch succeeded — committing earlier would switch the
//! Receiver away from the channel the reply still has to be heard on.

use crate::phy::{Channel, MAX_CHANNEL, MIN_CHANNEL};

/// The Receiver's channel walk: current channel plus the direction of the next step.
#[derive(Debug)]
pub struct ChannelHopper {
    current: Channel,
    direction: i8,
}

impl ChannelHopper {
    /// Creates a hopper sitting on the initial channel, stepping upwards.
    pub fn new() -> Self {
        ChannelHopper {
            current: Channel::INITIAL,
            direction: 1,
        }
    }

    /// Returns the channel the Receiver currently occupies.
    pub fn current(&self) -> Channel {
        self.current
    }

    /// Computes the channel to propose for the next hop, without committing to it.
    ///
    /// One step in the current direction; a step past a band edge reflects to the channel one
    /// inside that edge instead. The result is always in range and never equal to the current
    /// channel.
    pub fn propose(&self) -> Channel {
        let next = i16::from(self.current.number()) + i16::from(self.direction);
        if next > i16::from(MAX_CHANNEL) {
            Channel::new(MAX_CHANNEL - 1)
        } else if next < i16::from(MIN_CHANNEL) {
            Channel::new(MIN_CHANNEL + 1)
        } else {
            Channel::new(next as u8)
        }
    }

    /// Commits a previously proposed channel after the hop reply was acknowledged and the radio
    /// accepted the switch.
    ///
    /// The direction becomes the sign of the committed step, which is what turns the walk around
    /// at the band edges.
    pub fn commit(&mut self, next: Channel) {
        self.direction = if next.number() >= self.current.number() {
            1
        } else {
            -1
        };
        self.current = next;
    }
}

impl Default for ChannelHopper {
    fn default() -> Self {
        Self::new()
    }
}

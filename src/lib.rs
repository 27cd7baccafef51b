//! A point-to-point 2.4 GHz link layer for remote-control bridges.
//!
//! Two endpoints, a [`Sender`] and a [`Receiver`], form a bidirectional bridge for low-latency
//! control data: the Sender pushes opaque payloads of up to 249 Bytes towards the Receiver, which
//! hands them to the application. On top of that narrow primitive, the crate implements:
//!
//! * a broadcast discovery handshake that exchanges a 6-Byte hardware address and a freshly
//!   generated 16-Byte link key, persisted so that subsequent boots skip discovery entirely,
//! * a strict codec for the five 1-Byte-tagged command frames used on the wire,
//! * an ack-success estimator on the Sender that requests a coordinated channel hop when link
//!   quality degrades, and a channel hopper on the Receiver that decides the new channel and
//!   switches only once its reply has demonstrably left the radio.
//!
//! # Using the crate
//!
//! The crate is hardware-agnostic: all platform services are traits, implemented once per board
//! and bundled in a [`Config`] type.
//!
//! * A microsecond-precision monotonic [`Timer`].
//! * A [`Radio`] that can send short unicast/broadcast datagrams on a selectable channel and
//!   reports send completion and reception through two upcalls.
//! * A [`BlobStore`] holding the persisted peer record between boots.
//! * An [`RngCore`] entropy source for key generation (a weak fallback seeded from the
//!   microsecond counter is provided in [`security`]).
//!
//! The platform glue forwards the radio's send-complete and receive callbacks to the role's
//! `on_sent`/`on_received` methods, and drives the role's `idle` method from its main loop. The
//! two upcall paths must be serialized with respect to each other and with the main loop; on
//! platforms that cannot guarantee this, defer them through [`link::queue::EventQueue`].
//!
//! [`Sender`]: link/struct.Sender.html
//! [`Receiver`]: link/struct.Receiver.html
//! [`Config`]: config/trait.Config.html
//! [`Timer`]: time/trait.Timer.html
//! [`Radio`]: link/trait.Radio.html
//! [`BlobStore`]: store/trait.BlobStore.html
//! [`RngCore`]: https://docs.rs/rand_core/0.5/rand_core/trait.RngCore.html
//! [`security`]: security/index.html

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

#[macro_use]
mod utils;
#[macro_use]
mod log;
pub mod bytes;
pub mod config;
mod error;
pub mod link;
pub mod phy;
pub mod portal;
pub mod security;
pub mod store;
#[cfg(test)]
mod testutil;
pub mod time;

pub use self::error::Error;

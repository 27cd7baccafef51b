//! Stack configuration trait.

use rand_core::RngCore;

use crate::link::Radio;
use crate::store::BlobStore;
use crate::time::Timer;

/// Trait for bridge stack configurations.
///
/// This trait defines the platform service types used throughout the link layer. Every
/// application must define a type implementing this trait and supply it to the role it hosts.
pub trait Config {
    /// A monotonic time source with microsecond resolution.
    type Timer: Timer;

    /// The datagram radio substrate.
    type Radio: Radio;

    /// The persistent blob store holding the peer record.
    type Store: BlobStore;

    /// Entropy source for link-key generation.
    ///
    /// Use the platform TRNG where one exists; [`MicroSeedRng`] is the documented-weak fallback.
    ///
    /// [`MicroSeedRng`]: ../security/struct.MicroSeedRng.html
    type Rng: RngCore;
}

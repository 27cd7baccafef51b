//! Link keys and their generation.
//!
//! Pairing exchanges a single 16-Byte symmetric key, generated by the Receiver and carried to the
//! Sender inside the discovery reply. The radio substrate uses it for per-peer payload
//! encryption; this crate never touches the cipher itself and only moves the key between the
//! wire, the blob store, and the radio's peer registration.
//!
//! Key generation goes through [`rand_core::RngCore`] so that platforms with a real TRNG can
//! plug it in via their [`Config`]. Where no such source exists, [`MicroSeedRng`] derives a
//! stream from the microsecond counter. That is *weak* entropy: an attacker observing the boot
//! can narrow the seed down considerably. It matches what the hardware offers, not what good
//! cryptography asks for.
//!
//! [`rand_core::RngCore`]: https://docs.rs/rand_core/0.5/rand_core/trait.RngCore.html
//! [`Config`]: ../config/trait.Config.html
//! [`MicroSeedRng`]: struct.MicroSeedRng.html

use core::fmt;

use rand_core::{impls, RngCore};

use crate::bytes::{ByteReader, ByteWriter, FromBytes, ToBytes};
use crate::time::Instant;
use crate::utils::HexSlice;
use crate::Error;

/// The 16-Byte symmetric key shared by a paired Sender and Receiver.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct LinkKey([u8; 16]);

impl LinkKey {
    /// Number of bytes in a link key.
    pub const SIZE: usize = 16;

    /// Creates a key from its raw bytes.
    pub fn from_bytes_exact(bytes: [u8; 16]) -> Self {
        LinkKey(bytes)
    }

    /// Generates a fresh key by drawing 16 bytes from `rng`.
    ///
    /// The Receiver calls this once per answered discovery broadcast, so an unacknowledged reply
    /// never pins the link to a key the Sender may or may not have seen.
    pub fn generate<R: RngCore>(rng: &mut R) -> Self {
        let mut bytes = [0; 16];
        rng.fill_bytes(&mut bytes);
        LinkKey(bytes)
    }

    /// Returns the raw bytes of this key.
    pub fn raw(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Debug for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkKey({:?})", HexSlice(&self.0[..]))
    }
}

impl<'a> FromBytes<'a> for LinkKey {
    fn from_bytes(bytes: &mut ByteReader<'a>) -> Result<Self, Error> {
        Ok(LinkKey(bytes.read_array()?))
    }
}

impl ToBytes for LinkKey {
    fn to_bytes(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error> {
        writer.write_slice(&self.0)
    }
}

/// A xorshift64* stream seeded from the microsecond counter.
///
/// This is the fallback entropy source for platforms without a TRNG. The seed space is the boot
/// time in microseconds, which is guessable; prefer a hardware RNG as [`Config::Rng`] where one
/// exists.
///
/// [`Config::Rng`]: ../config/trait.Config.html#associatedtype.Rng
pub struct MicroSeedRng {
    state: u64,
}

impl MicroSeedRng {
    /// Creates a generator seeded from the given point in time.
    ///
    /// Call this with `timer.now()` at first use, not at boot, so that variance in the time
    /// until the first discovery broadcast arrives is folded into the seed.
    pub fn new(seed: Instant) -> Self {
        // Spread the ~20 meaningful counter bits over the whole state word. A zero state would
        // make xorshift degenerate.
        let mut state = u64::from(seed.raw_micros()).wrapping_mul(0x2545_f491_4f6c_dd1d);
        if state == 0 {
            state = 0x9e37_79b9_7f4a_7c15;
        }
        MicroSeedRng { state }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }
}

impl RngCore for MicroSeedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

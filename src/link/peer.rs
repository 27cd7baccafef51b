//! The paired peer record and its persistence.
//!
//! A successful pairing produces exactly one record: the counterpart's hardware address and the
//! link key the Receiver generated for this bridge. The record is written verbatim as 22
//! contiguous Bytes (`addr[6] || key[16]`) to a fixed blob name and reloaded verbatim on later
//! boots, so the two endpoints find each other again without any radio traffic.

use crate::bytes::{ByteReader, ByteWriter, FromBytes, ToBytes};
use crate::link::DeviceAddress;
use crate::security::LinkKey;
use crate::store::BlobStore;
use crate::Error;

/// Name of the blob holding the persisted peer record.
pub const PEER_BLOB: &str = "peer";

/// Size of the persisted peer record: 6 address Bytes followed by 16 key Bytes.
pub const PEER_BLOB_LEN: usize = 22;

/// The remote endpoint this bridge is paired with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Peer {
    addr: DeviceAddress,
    key: LinkKey,
}

impl Peer {
    /// Creates a peer record from an address and the key agreed on during pairing.
    pub fn new(addr: DeviceAddress, key: LinkKey) -> Self {
        Peer { addr, key }
    }

    /// Returns the peer's hardware address.
    pub fn addr(&self) -> &DeviceAddress {
        &self.addr
    }

    /// Returns the link key shared with this peer.
    pub fn key(&self) -> &LinkKey {
        &self.key
    }

    /// Loads the persisted peer record, if any.
    ///
    /// A missing blob and a blob of the wrong size are both treated as "no peer" (the latter
    /// with a warning), which sends the role back into discovery. Only an actual store failure
    /// is reported as an error, since it makes the pairing state unknowable.
    pub fn load<S: BlobStore>(store: &S) -> Result<Option<Peer>, Error> {
        if !store.exists(PEER_BLOB) {
            return Ok(None);
        }

        let mut buf = [0; PEER_BLOB_LEN + 1];
        let len = store.read(PEER_BLOB, &mut buf)?;
        if len != PEER_BLOB_LEN {
            warn!("peer blob has {} bytes, expected {}; ignoring it", len, PEER_BLOB_LEN);
            return Ok(None);
        }

        let mut reader = ByteReader::new(&buf[..len]);
        let peer = Peer::from_bytes(&mut reader)?;
        Ok(Some(peer))
    }

    /// Persists this record, replacing any previous one.
    ///
    /// A short write leaves an unusable blob behind, so it is reported as `StoreWriteFailed`;
    /// the next boot will treat the truncated blob as absent and rediscover.
    pub fn store<S: BlobStore>(&self, store: &mut S) -> Result<(), Error> {
        let mut buf = [0; PEER_BLOB_LEN];
        self.to_bytes(&mut ByteWriter::new(&mut buf))?;

        let written = store.write(PEER_BLOB, &buf)?;
        if written != PEER_BLOB_LEN {
            warn!("short write persisting peer: {}/{} bytes", written, PEER_BLOB_LEN);
            return Err(Error::StoreWriteFailed);
        }
        Ok(())
    }

    /// Removes the persisted record, forcing rediscovery on the next boot.
    ///
    /// Calling this twice is equivalent to calling it once.
    pub fn erase<S: BlobStore>(store: &mut S) -> Result<(), Error> {
        store.remove(PEER_BLOB)
    }
}

impl<'a> FromBytes<'a> for Peer {
    fn from_bytes(bytes: &mut ByteReader<'a>) -> Result<Self, Error> {
        Ok(Peer {
            addr: DeviceAddress::from_bytes(bytes)?,
            key: LinkKey::from_bytes(bytes)?,
        })
    }
}

impl ToBytes for Peer {
    fn to_bytes(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error> {
        self.addr.to_bytes(writer)?;
        self.key.to_bytes(writer)
    }
}

//! In-memory implementations of the platform traits, for unit tests.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::config::Config;
use crate::link::{BridgeCore, DeviceAddress, LinkMonitor, Radio};
use crate::phy::{Capabilities, Channel};
use crate::portal::{ConfigPortal, PortalRequest};
use crate::security::{LinkKey, MicroSeedRng};
use crate::store::BlobStore;
use crate::time::{Duration, Instant, Timer};
use crate::Error;

/// A radio that records everything and can be told to fail.
pub struct MockRadio {
    /// Capabilities passed to `configure`, if it was called.
    pub capabilities: Option<Capabilities>,
    /// Every successful channel switch, in order.
    pub channels: Vec<Channel>,
    /// Every registered peer.
    pub peers: Vec<(DeviceAddress, LinkKey)>,
    /// Every accepted frame, with its destination.
    pub sent: Vec<(DeviceAddress, Vec<u8>)>,
    /// When `false`, `try_send` rejects frames.
    pub accept_sends: bool,
    /// When `true`, `configure` fails.
    pub fail_configure: bool,
    /// When `true`, `set_channel` fails.
    pub fail_set_channel: bool,
    /// When `true`, `add_peer` fails.
    pub fail_add_peer: bool,
}

impl MockRadio {
    pub fn new() -> Self {
        MockRadio {
            capabilities: None,
            channels: Vec::new(),
            peers: Vec::new(),
            sent: Vec::new(),
            accept_sends: true,
            fail_configure: false,
            fail_set_channel: false,
            fail_add_peer: false,
        }
    }
}

impl Radio for MockRadio {
    fn configure(&mut self, capabilities: Capabilities) -> Result<(), Error> {
        if self.fail_configure {
            return Err(Error::RadioInitFailed);
        }
        self.capabilities = Some(capabilities);
        Ok(())
    }

    fn set_channel(&mut self, channel: Channel) -> Result<(), Error> {
        if self.fail_set_channel {
            return Err(Error::ChannelSetFailed);
        }
        self.channels.push(channel);
        Ok(())
    }

    fn add_peer(&mut self, addr: &DeviceAddress, key: &LinkKey) -> Result<(), Error> {
        if self.fail_add_peer {
            return Err(Error::PeerRegisterFailed);
        }
        self.peers.push((*addr, *key));
        Ok(())
    }

    fn try_send(&mut self, dest: &DeviceAddress, frame: &[u8]) -> Result<(), Error> {
        if !self.accept_sends {
            return Err(Error::SendRejected);
        }
        self.sent.push((*dest, frame.to_vec()));
        Ok(())
    }
}

/// A manually advanced microsecond counter.
#[derive(Clone)]
pub struct MockTimer {
    micros: Rc<Cell<u32>>,
}

impl MockTimer {
    pub fn new() -> Self {
        MockTimer {
            micros: Rc::new(Cell::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.micros
            .set(self.micros.get().wrapping_add(by.as_micros()));
    }
}

impl Timer for MockTimer {
    fn now(&self) -> Instant {
        Instant::from_raw_micros(self.micros.get())
    }
}

/// A blob store backed by a map, with injectable failure modes.
pub struct MemStore {
    blobs: BTreeMap<String, Vec<u8>>,
    /// When `true`, `write` stores and reports one byte less than requested.
    pub short_writes: bool,
    /// When `true`, `read` fails.
    pub fail_reads: bool,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore {
            blobs: BTreeMap::new(),
            short_writes: false,
            fail_reads: false,
        }
    }

    /// Returns the raw stored bytes of a blob.
    pub fn raw(&self, name: &str) -> Option<&[u8]> {
        self.blobs.get(name).map(|v| &v[..])
    }
}

impl BlobStore for MemStore {
    fn exists(&self, name: &str) -> bool {
        self.blobs.contains_key(name)
    }

    fn read(&self, name: &str, buf: &mut [u8]) -> Result<usize, Error> {
        if self.fail_reads {
            return Err(Error::StoreReadFailed);
        }
        let blob = self.blobs.get(name).ok_or(Error::StoreReadFailed)?;
        let len = blob.len().min(buf.len());
        buf[..len].copy_from_slice(&blob[..len]);
        Ok(len)
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<usize, Error> {
        let stored = if self.short_writes && !bytes.is_empty() {
            &bytes[..bytes.len() - 1]
        } else {
            bytes
        };
        self.blobs.insert(name.to_string(), stored.to_vec());
        Ok(stored.len())
    }

    fn remove(&mut self, name: &str) -> Result<(), Error> {
        self.blobs.remove(name);
        Ok(())
    }
}

/// A portal that hands out a scripted sequence of poll results.
pub struct ScriptedPortal {
    script: Vec<Option<PortalRequest>>,
    next: usize,
}

impl ScriptedPortal {
    pub fn new(script: Vec<Option<PortalRequest>>) -> Self {
        ScriptedPortal { script, next: 0 }
    }
}

impl ConfigPortal for ScriptedPortal {
    fn poll(&mut self) -> Option<PortalRequest> {
        let request = self.script.get(self.next).cloned().flatten();
        self.next += 1;
        request
    }
}

/// Counts low-quality notifications.
pub struct CountingMonitor {
    pub calls: u32,
}

impl CountingMonitor {
    pub fn new() -> Self {
        CountingMonitor { calls: 0 }
    }
}

impl LinkMonitor for CountingMonitor {
    fn on_low_quality(&mut self, _quality: f32) {
        self.calls += 1;
    }
}

/// A sink that discards all payloads.
pub fn null_sink() -> impl FnMut(&[u8]) {
    |_| {}
}

/// The platform bundle used by the unit tests.
pub struct TestConfig;

impl Config for TestConfig {
    type Timer = MockTimer;
    type Radio = MockRadio;
    type Store = MemStore;
    type Rng = MicroSeedRng;
}

/// A freshly booted core on empty mocks.
pub fn mock_core() -> BridgeCore<TestConfig> {
    BridgeCore::new(MockRadio::new(), MockTimer::new(), MemStore::new()).unwrap()
}

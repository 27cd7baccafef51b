use core::fmt;

use crate::bytes::{ByteReader, ByteWriter, FromBytes, ToBytes};
use crate::Error;

/// A 6-Byte hardware address identifying a radio endpoint.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct DeviceAddress([u8; 6]);

impl DeviceAddress {
    /// The all-ones broadcast address.
    ///
    /// Only the Sender transmits to it, and only while unpaired, to find a Receiver willing to
    /// answer.
    pub const BROADCAST: Self = DeviceAddress([0xff; 6]);

    /// Creates a device address from 6 raw Bytes, in transmission order.
    pub fn new(bytes: [u8; 6]) -> Self {
        DeviceAddress(bytes)
    }

    /// Returns the raw bytes making up this address.
    pub fn raw(&self) -> &[u8; 6] {
        &self.0
    }

    /// Returns whether this is the all-ones broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl fmt::Debug for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Displayed MSB first, the way hardware addresses are usually printed.
        for (i, b) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl<'a> FromBytes<'a> for DeviceAddress {
    fn from_bytes(bytes: &mut ByteReader<'a>) -> Result<Self, Error> {
        Ok(DeviceAddress(bytes.read_array()?))
    }
}

impl ToBytes for DeviceAddress {
    fn to_bytes(&self, writer: &mut ByteWriter<'_>) -> Result<(), Error> {
        writer.write_slice(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_representation() {
        let addr = DeviceAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(format!("{:?}", addr), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn broadcast() {
        assert!(DeviceAddress::BROADCAST.is_broadcast());
        assert!(!DeviceAddress::new([0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]).is_broadcast());
    }
}

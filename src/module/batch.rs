//! Packet batches handed to a module's process callback
//!
//! The surrounding pipeline owns buffer management; this crate only needs a
//! byte buffer per packet and a way to read the head of the frame, where the
//! destination MAC lives.

use crate::constants::MAX_PKT_BURST;
use crate::mac;

/// A single packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    data: Vec<u8>,
}

impl Packet {
    /// Create a packet from its frame bytes
    #[inline]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Get the frame bytes
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Frame length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the frame is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// First 8 bytes of the head as a little-endian word; frames shorter
    /// than 8 bytes are zero-padded
    #[inline]
    pub fn head_u64(&self) -> u64 {
        let mut head = [0u8; 8];
        let n = self.data.len().min(8);
        head[..n].copy_from_slice(&self.data[..n]);
        u64::from_le_bytes(head)
    }

    /// Destination MAC of the frame in table-internal form
    #[inline]
    pub fn dst_mac(&self) -> u64 {
        mac::from_packet_head(self.head_u64())
    }
}

/// A bounded batch of packets
#[derive(Debug, Default)]
pub struct PacketBatch {
    pkts: Vec<Packet>,
}

impl PacketBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self {
            pkts: Vec::with_capacity(MAX_PKT_BURST),
        }
    }

    /// Append a packet; returns `false` once the batch holds
    /// `MAX_PKT_BURST` packets
    pub fn push(&mut self, pkt: Packet) -> bool {
        if self.pkts.len() >= MAX_PKT_BURST {
            return false;
        }
        self.pkts.push(pkt);
        true
    }

    /// Number of packets in the batch
    #[inline]
    pub fn len(&self) -> usize {
        self.pkts.len()
    }

    /// Check if the batch holds no packets
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pkts.is_empty()
    }

    /// Iterate over the packets
    pub fn iter(&self) -> std::slice::Iter<'_, Packet> {
        self.pkts.iter()
    }
}

impl IntoIterator for PacketBatch {
    type Item = Packet;
    type IntoIter = std::vec::IntoIter<Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.pkts.into_iter()
    }
}

impl<'a> IntoIterator for &'a PacketBatch {
    type Item = &'a Packet;
    type IntoIter = std::slice::Iter<'a, Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

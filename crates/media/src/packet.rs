//! Encoded (compressed) packets and the [PacketSource]s they're pulled from.

use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex, MutexGuard};

/// A unit of compressed data belonging to one stream.
///
/// A packet can be partially consumed by a decoder. The consumed bytes are
/// skipped by advancing an internal cursor, so [EncodedPacket::remaining]
/// always returns the bytes that still need to be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    data: Vec<u8>,
    offset: usize,
    pts: Option<i64>,
    dts: Option<i64>,
}

impl EncodedPacket {
    /// Create a packet with no timing information.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            offset: 0,
            pts: None,
            dts: None,
        }
    }

    /// Set the presentation timestamp (in stream time base units).
    pub fn with_pts(mut self, pts: Option<i64>) -> Self {
        self.pts = pts;
        self
    }

    /// Set the decoding timestamp (in stream time base units).
    pub fn with_dts(mut self, dts: Option<i64>) -> Self {
        self.dts = dts;
        self
    }

    pub fn pts(&self) -> Option<i64> {
        self.pts
    }

    pub fn dts(&self) -> Option<i64> {
        self.dts
    }

    /// The bytes that haven't been consumed yet.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    /// The number of bytes that haven't been consumed yet.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.offset
    }

    /// How far the cursor has advanced into the packet's data.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Mark `len` more bytes as consumed. Advancing past the end is clamped.
    pub fn advance(&mut self, len: usize) {
        self.offset = (self.offset + len).min(self.data.len());
    }
}

/// Where a stream pulls its [EncodedPacket]s from (usually a demuxer's
/// per-stream queue).
///
/// # Contract
///
/// - [PacketSource::pop] is destructive: the returned packet is owned by the
///   caller and is no longer in the source.
/// - A packet given to [PacketSource::prepend] must be the very next packet
///   returned by [PacketSource::pop].
pub trait PacketSource {
    /// Take the packet at the head of the source, if there is one.
    fn pop(&self) -> Option<EncodedPacket>;

    /// Give a packet back, putting it at the head of the source.
    fn prepend(&self, packet: EncodedPacket);
}

impl<S: PacketSource + ?Sized> PacketSource for &S {
    fn pop(&self) -> Option<EncodedPacket> {
        (**self).pop()
    }

    fn prepend(&self, packet: EncodedPacket) {
        (**self).prepend(packet)
    }
}

impl<S: PacketSource + ?Sized> PacketSource for Rc<S> {
    fn pop(&self) -> Option<EncodedPacket> {
        (**self).pop()
    }

    fn prepend(&self, packet: EncodedPacket) {
        (**self).prepend(packet)
    }
}

impl<S: PacketSource + ?Sized> PacketSource for Arc<S> {
    fn pop(&self) -> Option<EncodedPacket> {
        (**self).pop()
    }

    fn prepend(&self, packet: EncodedPacket) {
        (**self).prepend(packet)
    }
}

/// A FIFO [PacketSource] that a demuxer can fill from another owner (or
/// thread).
///
/// Unlike a bounded channel this never blocks: popping from an empty queue
/// just returns [None].
#[derive(Debug, Default)]
pub struct PacketQueue {
    packets: Mutex<VecDeque<EncodedPacket>>,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a packet to the back of the queue.
    pub fn push(&self, packet: EncodedPacket) {
        self.lock().push_back(packet);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every queued packet.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<EncodedPacket>> {
        // A panic while holding the lock can't leave a `VecDeque` in a broken
        // state, so poisoning is ignored.
        self.packets.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PacketSource for PacketQueue {
    fn pop(&self) -> Option<EncodedPacket> {
        self.lock().pop_front()
    }

    fn prepend(&self, packet: EncodedPacket) {
        self.lock().push_front(packet);
    }
}

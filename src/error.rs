//! Error types for pointpack
//!
//! One unified error enum for all packet and cache operations, grouped by
//! the three failure classes callers care about: malformed packets read
//! from (or about to be written to) storage, internal-consistency
//! violations, and plain I/O failures.

use thiserror::Error;

use crate::packet::PacketType;

/// Result type alias using PointpackError
pub type Result<T> = std::result::Result<T, PointpackError>;

/// Unified error type for pointpack operations
#[derive(Debug, Error)]
pub enum PointpackError {
    // -------------------------------------------------------------------------
    // I/O errors (propagated unchanged from the container file)
    // -------------------------------------------------------------------------
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Malformed packets (structural invariant violations in stored bytes)
    // -------------------------------------------------------------------------
    #[error("Wrong packet type: expected {expected:?}, got tag {actual}")]
    WrongPacketType { expected: PacketType, actual: u8 },

    #[error("Buffer too small for packet header: need {needed} bytes, have {available}")]
    TruncatedBuffer { needed: usize, available: usize },

    #[error("Packet length {length} is shorter than the {min}-byte header")]
    PacketTooShort { length: u32, min: u32 },

    #[error("Packet length {length} is not a multiple of 4")]
    UnalignedPacketLength { length: u32 },

    #[error("Packet length {length} exceeds containing buffer of {buffer} bytes")]
    LengthExceedsBuffer { length: u32, buffer: u32 },

    #[error("Declared packet length {length} exceeds the maximum packet size")]
    OversizedPacket { length: u32 },

    #[error("Data packet declares zero bytestreams")]
    NoBytestreams,

    #[error("Bytestream length table for {count} streams does not fit in packet length {length}")]
    BytestreamTableOverflow { count: u16, length: u32 },

    #[error("Bytestream {index} is {length} bytes, which cannot be encoded in 16 bits")]
    BytestreamTooLong { index: usize, length: usize },

    #[error("Data packet needs {needed} bytes but declares length {length} (slack is 3)")]
    PayloadSizeMismatch { needed: u32, length: u32 },

    #[error("Non-zero padding byte at packet offset {offset}")]
    NonZeroPadding { offset: u32 },

    #[error("Non-zero reserved byte at packet offset {offset}")]
    NonZeroReserved { offset: u32 },

    #[error("Index packet declares zero entries")]
    NoIndexEntries,

    #[error("Index packet declares {count} entries, more than the maximum of 2048")]
    TooManyIndexEntries { count: u16 },

    #[error("Index level {level} is deeper than the maximum of 5")]
    IndexLevelTooDeep { level: u8 },

    #[error("Index packet at level {level} holds only {count} entries (levels above 0 need 2)")]
    UnderfilledIndexNode { level: u8, count: u16 },

    #[error("Index packet length {length} cannot hold {count} entries")]
    IndexEntriesTruncated { count: u16, length: u32 },

    #[error("Index entry {index} does not strictly increase the chunk record number")]
    RecordNumbersOutOfOrder { index: usize },

    #[error("Index entry {index} does not strictly increase the chunk physical offset")]
    PhysicalOffsetsOutOfOrder { index: usize },

    // -------------------------------------------------------------------------
    // Internal-consistency errors (caller or core programming defects)
    // -------------------------------------------------------------------------
    #[error("Unknown packet type tag {tag}")]
    UnknownPacketType { tag: u8 },

    #[error("Packet offset 0 is the reserved empty-slot sentinel")]
    ZeroPacketOffset,

    #[error("Packet cache already holds an outstanding lock (count {lock_count})")]
    PacketAlreadyLocked { lock_count: u32 },

    #[error("Packet lock released with outstanding lock count {lock_count}, expected 1")]
    UnlockWithoutLock { lock_count: u32 },

    #[error("Packet cache needs at least one slot")]
    NoCacheSlots,

    #[error("Bytestream index {index} out of range for packet with {count} bytestreams")]
    BytestreamOutOfRange { index: u16, count: u16 },

    #[error("Bytestream {index} extent ends at {end}, past the packet length {length}")]
    BytestreamExtentOverrun { index: u16, end: u32, length: u32 },

    #[error("Index entry {index} out of range for packet with {count} entries")]
    IndexEntryOutOfRange { index: u16, count: u16 },
}

impl PointpackError {
    /// True for structural invariant violations in packet bytes: data read
    /// from storage (or assembled for write) that breaks the wire format.
    pub fn is_malformed(&self) -> bool {
        use PointpackError::*;
        matches!(
            self,
            WrongPacketType { .. }
                | TruncatedBuffer { .. }
                | PacketTooShort { .. }
                | UnalignedPacketLength { .. }
                | LengthExceedsBuffer { .. }
                | OversizedPacket { .. }
                | NoBytestreams
                | BytestreamTableOverflow { .. }
                | BytestreamTooLong { .. }
                | PayloadSizeMismatch { .. }
                | NonZeroPadding { .. }
                | NonZeroReserved { .. }
                | NoIndexEntries
                | TooManyIndexEntries { .. }
                | IndexLevelTooDeep { .. }
                | UnderfilledIndexNode { .. }
                | IndexEntriesTruncated { .. }
                | RecordNumbersOutOfOrder { .. }
                | PhysicalOffsetsOutOfOrder { .. }
        )
    }

    /// True for precondition violations by the core's callers or by the core
    /// itself. These indicate a programming defect, not bad data, and are
    /// never worth retrying.
    pub fn is_internal(&self) -> bool {
        use PointpackError::*;
        matches!(
            self,
            UnknownPacketType { .. }
                | ZeroPacketOffset
                | PacketAlreadyLocked { .. }
                | UnlockWithoutLock { .. }
                | NoCacheSlots
                | BytestreamOutOfRange { .. }
                | BytestreamExtentOverrun { .. }
                | IndexEntryOutOfRange { .. }
        )
    }
}

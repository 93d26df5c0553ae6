//! # Pointpack - packet codec and read cache for point-cloud containers
//!
//! A point-cloud container stores large numeric record data as a sequence
//! of fixed-capacity binary packets inside a checksummed file. This crate
//! is the chunk-level core under the record encoder/decoder and the
//! document tree: it decodes, validates, and caches those packets.
//!
//! - [`packet`] - the three wire formats (index, data, empty), their
//!   validators and canonical little-endian encoders
//! - [`cache`] - the bounded LRU packet buffer cache and its scoped lock
//! - [`io`] - the [`ContainerFile`] seam the cache reads through
//! - [`error`] - error types for packet and cache operations
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │   record encoder/decoder, compressed-vector   │
//! │   readers/writers (external)                  │
//! ├───────────────────────────────────────────────┤
//! │ PacketReadCache::lock(offset)                 │
//! │   ├─ hit:  bump slot age, pin slot            │
//! │   └─ miss: evict LRU slot, read, validate     │
//! │ PacketLock::packet() → Index │ Data │ Empty   │
//! ├───────────────────────────────────────────────┤
//! │ ContainerFile (checksummed file, external)    │
//! │   seek(offset, Logical) / read_exact          │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pointpack::{DataPacket, Packet, PacketReadCache, Result};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<()> {
//! // Assemble a data packet with two bytestreams at logical offset 4.
//! let packet = DataPacket::encode(0, &[b"cartesian-x".as_slice(), b"cartesian-y".as_slice()])?;
//! let mut file = vec![0u8; 4];
//! file.extend_from_slice(&packet);
//!
//! let cache = PacketReadCache::new(Cursor::new(file), 8)?;
//! let lock = cache.lock(4)?;
//! if let Packet::Data(data) = lock.packet()? {
//!     assert_eq!(data.bytestream(1)?, b"cartesian-y");
//! }
//! // Dropping the lock releases the slot for reuse.
//! # Ok(())
//! # }
//! ```
//!
//! The cache exposes direct views into reusable buffer slots, so it
//! enforces a single outstanding lock and is intentionally
//! single-threaded; wrap the whole cache in external mutual exclusion if
//! it must be shared.

pub mod cache;
pub mod error;
pub mod io;
pub mod packet;

// Re-export commonly used types
pub use cache::{PacketLock, PacketReadCache};
pub use error::{PointpackError, Result};
pub use io::{AddressSpace, ContainerFile};
pub use packet::{
    DataPacket, EmptyPacket, IndexEntry, IndexPacket, Packet, PacketHeader, PacketType,
    DATA_PACKET_MAX,
};

/// Pointpack crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

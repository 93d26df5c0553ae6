//! Packet read cache
//!
//! A bounded pool of preallocated packet buffers keyed by logical file
//! offset. All physical packet reads go through here: a consumer locks an
//! offset, receives a validated view of the packet in that slot, and the
//! slot stays pinned until the lock guard is dropped.
//!
//! The cache hands out direct views into reusable buffer slots, so it
//! allows at most one outstanding lock at a time: a second concurrent
//! view could alias a slot the next miss overwrites. The lock/unlock
//! vocabulary is logical slot reservation, not a concurrency primitive:
//! a cache instance is single-threaded and must not be shared across
//! threads without external mutual exclusion.
//!
//! Eviction is least-recently-used over a monotone use counter, with
//! ties broken by the lowest slot index. Offset 0 is reserved as the
//! empty-slot sentinel, which is why it is never a valid packet offset.

use std::cell::{Cell, Ref, RefCell};

use tracing::{debug, error, trace};

use crate::error::{PointpackError, Result};
use crate::io::{AddressSpace, ContainerFile};
use crate::packet::{
    DataPacket, EmptyPacket, IndexPacket, Packet, PacketHeader, PacketType, DATA_PACKET_MAX,
};

/// Offset value marking a slot that has never been populated.
const EMPTY_SLOT: u64 = 0;

struct CacheEntry {
    /// Logical offset of the cached packet, or [`EMPTY_SLOT`]
    logical_offset: u64,
    /// Fixed maximum-packet-size buffer, allocated once and reused
    buffer: Box<[u8]>,
    /// Use-counter value at the last access; smallest value is evicted
    last_used: u64,
    /// Validated declared length; meaningful only when the slot is populated
    packet_length: u32,
}

struct CacheState<F> {
    file: F,
    entries: Vec<CacheEntry>,
    use_count: u64,
    reads: u64,
}

/// Fixed-capacity LRU cache of decoded packets, reading through a
/// [`ContainerFile`].
///
/// The cache must outlive every [`PacketLock`] it issues; the guard's
/// borrow of the cache makes that a compile-time fact here.
pub struct PacketReadCache<F> {
    state: RefCell<CacheState<F>>,
    lock_count: Cell<u32>,
}

impl<F> std::fmt::Debug for PacketReadCache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketReadCache")
            .field("lock_count", &self.lock_count.get())
            .finish()
    }
}

impl<F: ContainerFile> PacketReadCache<F> {
    /// Create a cache with `slot_count` preallocated maximum-size packet
    /// buffers over `file`.
    pub fn new(file: F, slot_count: usize) -> Result<Self> {
        if slot_count == 0 {
            return Err(PointpackError::NoCacheSlots);
        }
        let entries = (0..slot_count)
            .map(|_| CacheEntry {
                logical_offset: EMPTY_SLOT,
                buffer: vec![0u8; DATA_PACKET_MAX].into_boxed_slice(),
                last_used: 0,
                packet_length: 0,
            })
            .collect();
        Ok(PacketReadCache {
            state: RefCell::new(CacheState {
                file,
                entries,
                use_count: 0,
                reads: 0,
            }),
            lock_count: Cell::new(0),
        })
    }

    /// Lock the packet at `offset`, reading and validating it on a miss.
    ///
    /// Fails with an internal-consistency error if `offset` is 0 or if a
    /// previously issued lock is still outstanding. The returned guard
    /// keeps the slot valid; obtain the packet view with
    /// [`PacketLock::packet`].
    pub fn lock(&self, offset: u64) -> Result<PacketLock<'_, F>> {
        let lock_count = self.lock_count.get();
        if lock_count > 0 {
            return Err(PointpackError::PacketAlreadyLocked { lock_count });
        }
        if offset == 0 {
            return Err(PointpackError::ZeroPacketOffset);
        }

        let mut state = self.state.borrow_mut();
        let slot = match state
            .entries
            .iter()
            .position(|entry| entry.logical_offset == offset)
        {
            Some(hit) => {
                trace!(offset, slot = hit, "packet cache hit");
                state.use_count += 1;
                let use_count = state.use_count;
                state.entries[hit].last_used = use_count;
                hit
            }
            None => {
                // First minimum wins, so ties go to the lowest slot index.
                let victim = state
                    .entries
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, entry)| entry.last_used)
                    .map(|(index, _)| index)
                    .unwrap_or(0);
                debug!(offset, slot = victim, "packet cache miss, evicting slot");
                Self::read_packet(&mut state, victim, offset)?;
                victim
            }
        };
        drop(state);

        self.lock_count.set(self.lock_count.get() + 1);
        Ok(PacketLock {
            cache: self,
            state: self.state.borrow(),
            slot,
        })
    }

    /// Populate `slot` with the packet at `offset`.
    ///
    /// The slot's offset is committed only after validation succeeds, so
    /// a failed read or a malformed packet never looks cached; the old
    /// offset is cleared first so an aborted fill cannot keep serving the
    /// evicted packet either.
    fn read_packet(state: &mut CacheState<F>, slot: usize, offset: u64) -> Result<()> {
        state.entries[slot].logical_offset = EMPTY_SLOT;

        // Phase one: the 4-byte common prefix tells us how much to read.
        let mut prefix = [0u8; PacketHeader::SIZE];
        state.file.seek(offset, AddressSpace::Logical)?;
        state.file.read_exact(&mut prefix)?;
        let header = PacketHeader::decode(&prefix)?;
        let length = header.length as usize;
        if length > DATA_PACKET_MAX {
            return Err(PointpackError::OversizedPacket {
                length: header.length,
            });
        }

        // Phase two: re-read the whole packet, prefix included, and run
        // the variant validator on it.
        state.file.seek(offset, AddressSpace::Logical)?;
        {
            let CacheState { file, entries, .. } = &mut *state;
            let entry = &mut entries[slot];
            file.read_exact(&mut entry.buffer[..length])?;
            Packet::parse(&entry.buffer[..length])?;
            entry.packet_length = header.length;
        }
        trace!(offset, length, "packet read and validated");

        state.use_count += 1;
        let use_count = state.use_count;
        let entry = &mut state.entries[slot];
        entry.logical_offset = offset;
        entry.last_used = use_count;
        state.reads += 1;
        Ok(())
    }
}

impl<F> PacketReadCache<F> {
    /// Number of buffer slots.
    pub fn slot_count(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Number of physical packet reads performed so far. Hits do not
    /// read, so this only advances on cache misses.
    pub fn physical_reads(&self) -> u64 {
        self.state.borrow().reads
    }

    // Called only from the lock guard's release path. The slot index is
    // accepted for per-slot accounting symmetry; the discipline today is
    // a single global outstanding-lock count.
    fn unlock(&self, slot: usize) -> Result<()> {
        let _ = slot;
        let lock_count = self.lock_count.get();
        if lock_count != 1 {
            return Err(PointpackError::UnlockWithoutLock { lock_count });
        }
        self.lock_count.set(0);
        Ok(())
    }
}

/// Scoped capability proving exclusive access to one cache slot.
///
/// Returned only by [`PacketReadCache::lock`]; not cloneable. Dropping
/// the guard releases the slot. A release failure is reported through
/// the log and deliberately not propagated, so scope-exit cleanup can
/// never become a new failure source on unwind paths.
pub struct PacketLock<'a, F> {
    cache: &'a PacketReadCache<F>,
    state: Ref<'a, CacheState<F>>,
    slot: usize,
}

impl<'a, F> PacketLock<'a, F> {
    /// View of the locked packet. The view borrows the guard, so it can
    /// never outlive the slot reservation.
    pub fn packet(&self) -> Result<Packet<'_>> {
        let entry = &self.state.entries[self.slot];
        let buf = &entry.buffer[..entry.packet_length as usize];
        // The fill path validated these bytes; an unknown tag here means
        // the slot was corrupted in memory.
        match PacketType::from_u8(buf[0])? {
            PacketType::Index => Ok(Packet::Index(IndexPacket::from_validated(buf))),
            PacketType::Data => Ok(Packet::Data(DataPacket::from_validated(buf))),
            PacketType::Empty => Ok(Packet::Empty(EmptyPacket::from_validated(buf))),
        }
    }

    /// Logical offset of the locked packet.
    pub fn offset(&self) -> u64 {
        self.state.entries[self.slot].logical_offset
    }
}

impl<'a, F> std::fmt::Debug for PacketLock<'a, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketLock")
            .field("slot", &self.slot)
            .finish()
    }
}

impl<F> Drop for PacketLock<'_, F> {
    fn drop(&mut self) {
        if let Err(err) = self.cache.unlock(self.slot) {
            error!(slot = self.slot, %err, "packet lock release failed");
        }
    }
}

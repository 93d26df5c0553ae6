//! File access seam for packet reads
//!
//! The packet cache never touches the disk directly; it reads through
//! [`ContainerFile`], the integrity-checked file abstraction owned by the
//! container layer. That layer interleaves checksum regions into the
//! physical byte stream, so a file position is meaningful in one of two
//! address spaces.

use std::io::{Read, Seek, SeekFrom};

use crate::error::Result;

/// Address space of a container file offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpace {
    /// Byte addresses with integrity-check regions skipped. Packet offsets
    /// live in this space.
    Logical,
    /// Raw byte addresses in the stored stream.
    Physical,
}

/// Seekable source of packet bytes.
///
/// Reads are driven in strictly sequential seek/read pairs; an
/// implementation may assume no other positioning happens between a `seek`
/// and the `read_exact` that follows it.
pub trait ContainerFile {
    /// Position the file at `offset` in the given address space.
    fn seek(&mut self, offset: u64, space: AddressSpace) -> Result<()>;

    /// Fill `buf` completely from the current position, or fail.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Any plain `Read + Seek` source is a container file whose logical and
/// physical spaces coincide: the degenerate layout with no interleaved
/// integrity regions. Checksummed readers implement [`ContainerFile`]
/// directly instead.
impl<T: Read + Seek> ContainerFile for T {
    fn seek(&mut self, offset: u64, _space: AddressSpace) -> Result<()> {
        Seek::seek(self, SeekFrom::Start(offset))?;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        Read::read_exact(self, buf)?;
        Ok(())
    }
}

//! Property-based tests for the packet codec
//!
//! Uses proptest to verify codec invariants across many random packets:
//! canonical encodings round-trip exactly, corruptions are rejected, and
//! the parser never panics on arbitrary bytes.

use pointpack::{DataPacket, EmptyPacket, IndexEntry, IndexPacket, Packet};
use proptest::prelude::*;

/// Strictly increasing entry lists, built from positive deltas.
fn index_entries() -> impl Strategy<Value = Vec<IndexEntry>> {
    prop::collection::vec((1u64..1_000, 1u64..100_000), 1..64).prop_map(|deltas| {
        let mut record = 0u64;
        let mut offset = 0u64;
        deltas
            .into_iter()
            .map(|(record_delta, offset_delta)| {
                record += record_delta;
                offset += offset_delta;
                IndexEntry {
                    chunk_record_number: record,
                    chunk_physical_offset: offset,
                }
            })
            .collect()
    })
}

fn bytestreams() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..300), 1..8)
}

proptest! {
    #[test]
    fn prop_data_packet_round_trip(flags in any::<u8>(), streams in bytestreams()) {
        let refs: Vec<&[u8]> = streams.iter().map(|s| s.as_slice()).collect();
        let bytes = DataPacket::encode(flags, &refs).unwrap();

        // Declared length is aligned and within the 3-byte slack of the
        // exact size.
        let exact = 6 + 2 * streams.len() + streams.iter().map(|s| s.len()).sum::<usize>();
        prop_assert_eq!(bytes.len() % 4, 0);
        prop_assert!(bytes.len() >= exact && bytes.len() <= exact + 3);

        let packet = DataPacket::parse(&bytes).unwrap();
        prop_assert_eq!(packet.flags(), flags);
        prop_assert_eq!(packet.bytestream_count() as usize, streams.len());
        for (i, stream) in streams.iter().enumerate() {
            prop_assert_eq!(packet.bytestream(i as u16).unwrap(), stream.as_slice());
        }

        // Decode-then-encode reproduces the original bytes exactly.
        let decoded: Vec<&[u8]> =
            (0..packet.bytestream_count()).map(|i| packet.bytestream(i).unwrap()).collect();
        prop_assert_eq!(DataPacket::encode(packet.flags(), &decoded).unwrap(), bytes);
    }

    #[test]
    fn prop_index_packet_round_trip(
        flags in any::<u8>(),
        level in 0u8..=5,
        entries in index_entries(),
    ) {
        // A single entry is only legal at the leaf level.
        prop_assume!(level == 0 || entries.len() >= 2);

        let bytes = IndexPacket::encode(flags, level, &entries).unwrap();
        let packet = IndexPacket::parse(&bytes).unwrap();

        prop_assert_eq!(packet.flags(), flags);
        prop_assert_eq!(packet.index_level(), level);
        let decoded: Vec<IndexEntry> = packet.entries().collect();
        prop_assert_eq!(&decoded, &entries);

        prop_assert_eq!(IndexPacket::encode(flags, level, &decoded).unwrap(), bytes);
    }

    #[test]
    fn prop_empty_packet_round_trip(words in 1u32..64) {
        let length = words * 4;
        let bytes = EmptyPacket::encode(length).unwrap();
        prop_assert_eq!(bytes.len() as u32, length);

        let packet = EmptyPacket::parse(&bytes).unwrap();
        prop_assert_eq!(packet.length, length);
        prop_assert_eq!(EmptyPacket::encode(packet.length).unwrap(), bytes);
    }

    #[test]
    fn prop_data_padding_corruption_rejected(
        streams in bytestreams(),
        dirt in 1u8..=255,
    ) {
        let refs: Vec<&[u8]> = streams.iter().map(|s| s.as_slice()).collect();
        let mut bytes = DataPacket::encode(0, &refs).unwrap();

        let exact = 6 + 2 * streams.len() + streams.iter().map(|s| s.len()).sum::<usize>();
        prop_assume!(bytes.len() > exact);

        let padding_at = bytes.len() - 1;
        bytes[padding_at] = dirt;
        prop_assert!(DataPacket::parse(&bytes).unwrap_err().is_malformed());
    }

    #[test]
    fn prop_index_order_corruption_rejected(
        entries in index_entries(),
        at in any::<prop::sample::Index>(),
    ) {
        prop_assume!(entries.len() >= 2);
        let bytes = IndexPacket::encode(0, 0, &entries).unwrap();

        // Duplicate one entry's record number into its successor.
        let i = at.index(entries.len() - 1);
        let mut corrupted = bytes;
        let dup = entries[i].chunk_record_number.to_le_bytes();
        corrupted[16 + 16 * (i + 1)..16 + 16 * (i + 1) + 8].copy_from_slice(&dup);

        prop_assert!(IndexPacket::parse(&corrupted).unwrap_err().is_malformed());
    }

    #[test]
    fn prop_parse_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..4096)) {
        // Ok or Err, never a panic.
        let _ = Packet::parse(&bytes);
    }

    #[test]
    fn prop_truncation_rejected(streams in bytestreams(), cut in any::<prop::sample::Index>()) {
        let refs: Vec<&[u8]> = streams.iter().map(|s| s.as_slice()).collect();
        let bytes = DataPacket::encode(0, &refs).unwrap();

        let keep = cut.index(bytes.len());
        prop_assert!(DataPacket::parse(&bytes[..keep]).is_err());
    }
}

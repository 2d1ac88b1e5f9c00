//! Property-based tests using proptest

use ad2cp_core::{
    checksum,
    constants::CHECKSUM_SEED,
    encoder::{encode_record, RecordBuilder},
    scan_bytes, ScanOptions,
};
use bytes::Bytes;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_zero_span_is_seed(len in 0usize..4096) {
        prop_assert_eq!(checksum(&vec![0u8; len]), CHECKSUM_SEED);
    }

    #[test]
    fn prop_pair_permutation_invariant(
        pairs in prop::collection::vec(any::<[u8; 2]>(), 0..256),
        seed in any::<u64>()
    ) {
        let forward: Vec<u8> = pairs.iter().flatten().copied().collect();

        // deterministic shuffle of whole pairs
        let mut shuffled = pairs.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            shuffled.swap(i, (state % (i as u64 + 1)) as usize);
        }
        let permuted: Vec<u8> = shuffled.iter().flatten().copied().collect();

        prop_assert_eq!(checksum(&forward), checksum(&permuted));
    }

    #[test]
    fn prop_single_bit_flip_changes_checksum(
        data in prop::collection::vec(any::<u8>(), 1..1024),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8
    ) {
        let mut flipped = data.clone();
        let i = index.index(flipped.len());
        flipped[i] ^= 1 << bit;
        prop_assert_ne!(checksum(&data), checksum(&flipped));
    }

    #[test]
    fn prop_odd_tail_adds_high_byte(
        data in prop::collection::vec(any::<u8>(), 0..512),
        last in any::<u8>()
    ) {
        let mut even = data.clone();
        if even.len() % 2 == 1 {
            even.pop();
        }
        let mut odd = even.clone();
        odd.push(last);
        prop_assert_eq!(
            checksum(&odd),
            checksum(&even).wrapping_add(u16::from(last) << 8)
        );
    }

    #[test]
    fn prop_round_trip_index(
        payloads in prop::collection::vec(
            (prop::collection::vec(any::<u8>(), 0..512), any::<bool>()),
            1..20
        )
    ) {
        let mut stream = Vec::new();
        for (payload, long) in &payloads {
            let mut builder = RecordBuilder::new(0x16).payload(Bytes::from(payload.clone()));
            if *long {
                builder = builder.long_header();
            }
            stream.extend_from_slice(&builder.build().unwrap());
        }

        let result = scan_bytes(&stream, &ScanOptions::default()).unwrap();

        prop_assert_eq!(result.len(), payloads.len());
        prop_assert_eq!(result.checksum_failures, 0);
        prop_assert!(!result.early_eof);
        prop_assert_eq!(result.used_12_byte_header, payloads.iter().any(|(_, long)| *long));
        for (entry, (payload, _)) in result.records.iter().zip(&payloads) {
            prop_assert_eq!(entry.length as usize, payload.len());
        }
        prop_assert!(result.offsets().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn prop_scan_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..8192)
    ) {
        // errors are fine; panics are not
        let _ = scan_bytes(&data, &ScanOptions::default());
        let _ = scan_bytes(&data, &ScanOptions::new().ignore_checksums(true));
    }

    #[test]
    fn prop_garbage_prefix_keeps_index(
        prefix in prop::collection::vec(0u8..0xA5, 0..64),
        count in 1usize..10
    ) {
        let mut stream = Vec::new();
        for i in 0..count {
            stream.extend_from_slice(&encode_record(0x15, &vec![i as u8; 8 + i]).unwrap());
        }
        let mut prefixed = prefix.clone();
        prefixed.extend_from_slice(&stream);

        let clean = scan_bytes(&stream, &ScanOptions::default()).unwrap();
        let result = scan_bytes(&prefixed, &ScanOptions::default()).unwrap();

        prop_assert_eq!(result.ids(), clean.ids());
        prop_assert_eq!(result.lengths(), clean.lengths());
        prop_assert!(!result.early_eof);
    }
}

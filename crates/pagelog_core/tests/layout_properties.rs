//! Property tests for the carving invariant and append accounting.

use pagelog_core::{PagePool, PoolConfig, PoolLayout};
use proptest::prelude::*;

fn alignment() -> impl Strategy<Value = usize> {
    prop_oneof![Just(8_usize), Just(16), Just(32), Just(64)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn layout_units_never_overlap(count in 1_usize..64, capacity in 1_usize..4096, align in alignment()) {
        let layout = PoolLayout::compute(count, capacity, align).unwrap();
        prop_assert_eq!(layout.page_capacity(), capacity.max(2));

        for i in 0..count {
            let buffer = layout.buffer_range(i);
            prop_assert_eq!(buffer.start % align, 0);
            prop_assert!(layout.descriptor_range(i).end <= buffer.start);
            prop_assert!(buffer.end < layout.unit_range(i).end);
            prop_assert!(layout.unit_range(i).end <= layout.total_size());
            if i + 1 < count {
                prop_assert!(layout.unit_range(i).end <= layout.descriptor_offset(i + 1));
            }
        }
    }

    #[test]
    fn live_pool_verifies(count in 1_usize..32, capacity in 1_usize..512, align in alignment()) {
        let config = PoolConfig::new(count, capacity).with_buffer_alignment(align);
        let pool = PagePool::with_config(&config).unwrap();
        let report = pool.verify_layout().unwrap();

        prop_assert_eq!(report.pages.len(), count);
        for page in pool.pages() {
            prop_assert_eq!(page.remaining(), capacity.max(2));
        }
    }

    #[test]
    fn appends_account_exactly(
        capacity in 2_usize..128,
        chunks in proptest::collection::vec(proptest::collection::vec(b'a'..=b'z', 0..40), 0..12),
        lines in proptest::collection::vec(any::<bool>(), 12),
    ) {
        let mut pool = PagePool::create(2, capacity).unwrap();
        let mut expected: Vec<u8> = Vec::new();

        for (chunk, line) in chunks.iter().zip(lines.iter()) {
            let remaining = capacity - expected.len();
            let consumed = if *line {
                pool.append_line(0, chunk).unwrap()
            } else {
                pool.append(0, chunk).unwrap()
            };

            if *line {
                let room = remaining.saturating_sub(1);
                let take = chunk.len().min(room);
                expected.extend_from_slice(&chunk[..take]);
                if remaining > 0 {
                    expected.push(b'\n');
                }
            } else {
                expected.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
            }

            prop_assert_eq!(consumed, remaining - pool.remaining(0).unwrap());
            prop_assert_eq!(pool.content(0).unwrap(), expected.as_slice());
        }

        // The neighbouring page never sees a byte.
        prop_assert!(pool.page(1).unwrap().is_empty());
        prop_assert!(pool.raw_buffer(1).unwrap().iter().all(|&b| b == 0));
        pool.verify_layout().unwrap();
    }
}

//! Property-based tests for address validation and page aggregation

use pageheat::config::{LoaderConfig, PidFilter};
use pageheat::pages::{GridProjection, PageTable, page_base, page_index};
use pageheat::trace::{MAX_PHYS_ADDR, TraceLoader, parse_phys_addr};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_hex_tokens_parse(addr in 0u64..=MAX_PHYS_ADDR, pad in 0usize..4, upper in any::<bool>()) {
        let digits = if upper { format!("{:X}", addr) } else { format!("{:x}", addr) };
        let token = format!("{}0x{}{}", " ".repeat(pad), digits, " ".repeat(pad));
        prop_assert_eq!(parse_phys_addr(&token), Ok(addr));
    }

    #[test]
    fn prop_above_cap_rejected(addr in (MAX_PHYS_ADDR + 1)..=u64::MAX) {
        let token = format!("0x{:x}", addr);
        prop_assert!(parse_phys_addr(&token).is_err());
    }

    #[test]
    fn prop_unprefixed_rejected(token in "[0-9a-fA-F]{1,12}") {
        prop_assert!(parse_phys_addr(&token).is_err());
    }

    #[test]
    fn prop_parse_never_panics(token in "\\PC{0,24}") {
        let _ = parse_phys_addr(&token);
    }

    #[test]
    fn prop_page_round_trip(addr in 0u64..=MAX_PHYS_ADDR) {
        let page = page_index(addr);
        prop_assert_eq!(page, addr >> 12);
        prop_assert_eq!(page_index(page_base(page)), page);
        prop_assert!(page < (1 << 28));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_aggregation_order_independent(
        addrs in prop::collection::vec(0u64..0x40_0000, 0..300),
        seed in any::<u64>(),
    ) {
        let forward = PageTable::from_addresses(addrs.iter().copied());

        // Deterministic shuffle driven by the seed
        let mut shuffled = addrs.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            shuffled.swap(i, (state % (i as u64 + 1)) as usize);
        }
        let reordered = PageTable::from_addresses(shuffled);

        prop_assert_eq!(&forward, &reordered);
        prop_assert_eq!(forward.total(), addrs.len() as u64);
        prop_assert_eq!(forward.iter().map(|(_, c)| c).sum::<u64>(), addrs.len() as u64);
        prop_assert!(forward.iter().all(|(_, c)| c >= 1));
    }

    #[test]
    fn prop_merge_equals_whole(
        addrs in prop::collection::vec(0u64..=MAX_PHYS_ADDR, 0..200),
        split in 0usize..200,
    ) {
        let split = split.min(addrs.len());
        let mut left = PageTable::from_addresses(addrs[..split].iter().copied());
        let right = PageTable::from_addresses(addrs[split..].iter().copied());
        left.merge(&right);
        prop_assert_eq!(left, PageTable::from_addresses(addrs.iter().copied()));
    }

    #[test]
    fn prop_grid_aliases_low_sixteen_bits(low in 0u64..0x1_0000, high_a in 0u64..0x1000, high_b in 0u64..0x1000) {
        prop_assume!(high_a != high_b);
        let p1 = (high_a << 16) | low;
        let p2 = (high_b << 16) | low;
        prop_assert_eq!(GridProjection::cell_of(p1), GridProjection::cell_of(p2));

        let mut table = PageTable::new();
        table.record_page(p1);
        table.record_page(p2);
        let (row, col) = GridProjection::cell_of(p1);
        prop_assert_eq!(table.grid().get(row, col), 2);
    }

    #[test]
    fn prop_ranking_sorted_with_stable_ties(
        pages in prop::collection::vec(0u64..64, 1..200),
        n in 1usize..80,
    ) {
        let mut table = PageTable::new();
        for p in &pages {
            table.record_page(*p);
        }
        let ranked = table.ranked(n);
        prop_assert_eq!(ranked.len(), n.min(table.len()));
        for pair in ranked.windows(2) {
            prop_assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].page < pair[1].page)
            );
        }
    }

    #[test]
    fn prop_loader_counts_partition_rows(
        rows in prop::collection::vec((0i64..4, prop_oneof![
            (0u64..=MAX_PHYS_ADDR).prop_map(|a| format!("0x{:x}", a)),
            Just("garbage".to_string()),
            Just("0x".to_string()),
            Just("0x10000000000".to_string()),
        ]), 1..100),
        filter in prop::collection::vec(0i64..4, 0..3),
    ) {
        let csv: String = rows.iter().map(|(pid, addr)| format!("{},{}\n", pid, addr)).collect();
        let pid_filter = PidFilter::new(filter.iter().copied());
        let loader = TraceLoader::new(LoaderConfig {
            address_col: 1,
            pid_col: 0,
            pid_filter: pid_filter.clone(),
            ..LoaderConfig::default()
        });

        let mut out = Vec::new();
        let stats = loader.scan(csv.as_bytes(), |a| out.push(a)).unwrap();

        let expected: Vec<u64> = rows
            .iter()
            .filter(|(pid, _)| pid_filter.as_ref().is_none_or(|f| f.contains(*pid)))
            .filter_map(|(_, addr)| parse_phys_addr(addr).ok())
            .collect();

        prop_assert_eq!(&out, &expected);
        prop_assert_eq!(stats.rows, rows.len() as u64);
        prop_assert_eq!(stats.accepted + stats.excluded(), stats.rows);
        prop_assert_eq!(PageTable::from_addresses(out).total(), stats.accepted);
    }
}

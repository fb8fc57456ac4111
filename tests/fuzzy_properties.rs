use proptest::prelude::*;
use tbm::fuzzy::{DEFAULT_THRESHOLD, edit_distance, match_score, matches, similarity};
use tbm::system::process::ProcessRecord;
use tbm::system::registry::{SortBy, filter_processes, sort_processes};

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{0,16}"
}

fn records_strategy() -> impl Strategy<Value = Vec<ProcessRecord>> {
    prop::collection::vec((1u32..5000, name_strategy(), 0u8..100), 0..40).prop_map(|rows| {
        rows.into_iter()
            .map(|(pid, name, cpu)| ProcessRecord {
                cpu_percent: f64::from(cpu),
                ..ProcessRecord::new(pid, name)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn distance_to_self_is_zero(s in name_strategy()) {
        prop_assert_eq!(edit_distance(&s, &s), 0);
    }

    #[test]
    fn distance_from_empty_is_length(s in name_strategy()) {
        prop_assert_eq!(edit_distance("", &s), s.chars().count());
        prop_assert_eq!(edit_distance(&s, ""), s.chars().count());
    }

    #[test]
    fn similarity_is_symmetric_and_bounded(a in name_strategy(), b in name_strategy()) {
        let ab = similarity(&a, &b);
        prop_assert_eq!(ab, similarity(&b, &a));
        prop_assert!((0.0..=1.0).contains(&ab));
    }

    #[test]
    fn empty_query_matches_everything(text in name_strategy()) {
        prop_assert!(matches(&text, "", DEFAULT_THRESHOLD));
    }

    #[test]
    fn substring_always_matches_and_outscores_similarity(
        prefix in "[a-z]{0,6}",
        needle in "[a-z]{1,6}",
        suffix in "[a-z]{0,6}",
    ) {
        let text = format!("{prefix}{needle}{suffix}");
        prop_assert!(matches(&text, &needle, DEFAULT_THRESHOLD));
        prop_assert!(match_score(&text, &needle) > 1.0);
    }

    #[test]
    fn empty_filter_is_identity(list in records_strategy()) {
        prop_assert_eq!(filter_processes(&list, "", DEFAULT_THRESHOLD), list);
    }

    #[test]
    fn filter_is_ranked_by_score(list in records_strategy(), query in "[a-z]{1,4}") {
        let hits = filter_processes(&list, &query, DEFAULT_THRESHOLD);
        prop_assert!(hits.len() <= list.len());
        for pair in hits.windows(2) {
            prop_assert!(match_score(&pair[0].name, &query) >= match_score(&pair[1].name, &query));
        }
        for hit in &hits {
            prop_assert!(matches(&hit.name, &query, DEFAULT_THRESHOLD));
        }
    }

    #[test]
    fn ascending_pid_and_name_sorts_are_ordered(list in records_strategy()) {
        let mut by_pid = list.clone();
        sort_processes(&mut by_pid, SortBy::Pid, false);
        prop_assert!(by_pid.windows(2).all(|w| w[0].pid <= w[1].pid));

        let mut by_name = list;
        sort_processes(&mut by_name, SortBy::Name, false);
        prop_assert!(by_name.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[test]
    fn cpu_sort_is_stable(list in records_strategy()) {
        // pid records the input position
        let mut sorted: Vec<ProcessRecord> = list
            .into_iter()
            .enumerate()
            .map(|(i, p)| ProcessRecord { pid: i as u32, ..p })
            .collect();
        sort_processes(&mut sorted, SortBy::Cpu, true);
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].cpu_percent >= pair[1].cpu_percent);
            if pair[0].cpu_percent == pair[1].cpu_percent {
                prop_assert!(pair[0].pid < pair[1].pid);
            }
        }
    }
}

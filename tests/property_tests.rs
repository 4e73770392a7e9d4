mod common;

use common::*;
use proptest::prelude::*;
use rangeraptor::{
    raptor::{
        AccessEgress, JourneyCriteria, JourneySet, ParetoComparator, Profile, RaptorRequest, Slack,
        merge_journey,
    },
    shared::{Cost, Duration, Time},
    transit::{Repository, TripTimes},
};

#[derive(Debug, Clone)]
struct PatternSpec {
    stops: Vec<usize>,
    hops: Vec<i32>,
    dwells: Vec<i32>,
    starts: Vec<i32>,
}

#[derive(Debug, Clone)]
struct NetworkSpec {
    stops: usize,
    patterns: Vec<PatternSpec>,
    transfers: Vec<(usize, usize, i32)>,
    slack: (i32, i32, i32),
    egress_minutes: i32,
}

fn pattern_strategy(stops: usize) -> impl Strategy<Value = PatternSpec> {
    (
        prop::sample::subsequence((0..stops).collect::<Vec<_>>(), 2..=4).prop_shuffle(),
        prop::collection::vec(1i32..10, 4),
        prop::collection::vec(0i32..3, 4),
        prop::collection::btree_set(0i32..120, 1..4),
    )
        .prop_map(|(stops, hops, dwells, starts)| PatternSpec {
            stops,
            hops,
            dwells,
            starts: starts.into_iter().collect(),
        })
}

fn network_strategy() -> impl Strategy<Value = NetworkSpec> {
    (4usize..8).prop_flat_map(|stops| {
        (
            Just(stops),
            prop::collection::vec(pattern_strategy(stops), 1..5),
            prop::collection::vec((0..stops, 0..stops, 1i32..6), 0..6),
            (0i32..60, 0i32..60, 0i32..180),
            0i32..4,
        )
            .prop_map(|(stops, patterns, transfers, slack, egress_minutes)| NetworkSpec {
                stops,
                patterns,
                transfers,
                slack,
                egress_minutes,
            })
    })
}

fn stop_id(stop: usize) -> String {
    format!("S{stop}")
}

fn build(spec: &NetworkSpec) -> Repository {
    let mut builder = Repository::builder(date(1));
    for stop in 0..spec.stops {
        builder.add_stop(&stop_id(stop), &stop_id(stop)).unwrap();
    }
    for (p, pattern) in spec.patterns.iter().enumerate() {
        let ids: Vec<String> = pattern.stops.iter().map(|&s| stop_id(s)).collect();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        let index = builder.add_pattern(&format!("P{p}"), &ids).unwrap();
        for (t, start) in pattern.starts.iter().enumerate() {
            let mut arrivals = Vec::new();
            let mut departures = Vec::new();
            let mut time = Time::from_hm(6, 0) + Duration::from_minutes(*start);
            for pos in 0..ids.len() {
                arrivals.push(time);
                time += Duration::from_minutes(pattern.dwells[pos]);
                departures.push(time);
                time += Duration::from_minutes(pattern.hops[pos]);
            }
            let trip = TripTimes::new(format!("P{p}-{t}"), arrivals, departures).unwrap();
            builder.add_trip(index, trip).unwrap();
        }
    }
    for &(from, to, minutes) in &spec.transfers {
        if from != to {
            builder
                .add_transfer(&stop_id(from), &stop_id(to), Duration::from_minutes(minutes))
                .unwrap();
        }
    }
    builder.build().unwrap()
}

fn slack(spec: &NetworkSpec) -> Slack {
    Slack {
        board: Duration::from_seconds(spec.slack.0),
        alight: Duration::from_seconds(spec.slack.1),
        transfer: Duration::from_seconds(spec.slack.2),
    }
}

/// A request from `origin` to stop 0 covering every trip of the network.
fn request(spec: &NetworkSpec, origin: usize) -> RaptorRequest {
    request_at(spec, origin, Time::from_hm(5, 0)).search_window(Duration::from_hours(4))
}

fn request_at(spec: &NetworkSpec, origin: usize, time: Time) -> RaptorRequest {
    RaptorRequest::depart_after(time)
        .access(AccessEgress::new(origin as u32, Duration::ZERO, Cost::ZERO))
        .egress(AccessEgress::new(
            0,
            Duration::from_minutes(spec.egress_minutes),
            Cost::from_seconds(3),
        ))
        .slack(slack(spec))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn heuristic_bounds_never_exceed_found_journeys(spec in network_strategy()) {
        let repository = build(&spec);
        let config = config();
        let search = config
            .search(&repository, request(&spec, 1).profile(Profile::MultiCriteria))
            .unwrap();
        let heuristics = search.context().heuristics().unwrap();

        for origin in 1..spec.stops {
            // exhaustive search over the whole service day
            let response = config.route(&repository, request(&spec, origin)).unwrap();
            for journey in &response.journeys {
                let origin = origin as u32;
                prop_assert!(heuristics.is_reachable(origin));
                prop_assert!(heuristics.min_duration(origin).unwrap() <= journey.duration());
                prop_assert!(heuristics.min_boardings(origin).unwrap() <= journey.transfers + 1);
                prop_assert!(heuristics.min_cost(origin).unwrap() <= journey.generalized_cost);
            }
        }
    }

    #[test]
    fn more_rounds_never_arrive_later(spec in network_strategy(), origin in 1usize..4, rounds in 0usize..3) {
        let repository = build(&spec);
        let config = config();
        let earliest = |max_transfers: usize| {
            config
                .route(&repository, request(&spec, origin).max_transfers(max_transfers))
                .unwrap()
                .journeys
                .iter()
                .map(|j| j.arrival_time)
                .min()
        };
        if let Some(fewer) = earliest(rounds) {
            let more = earliest(rounds + 1);
            prop_assert!(more.is_some_and(|more| more <= fewer));
        }
    }

    #[test]
    fn results_form_an_anti_chain(spec in network_strategy(), origin in 1usize..4) {
        let repository = build(&spec);
        let config = config();
        for profile in [Profile::Standard, Profile::MultiCriteria] {
            let search = config
                .search(&repository, request(&spec, origin).profile(profile))
                .unwrap();
            let criteria = search.journey_criteria();
            let journeys = search.run().unwrap().journeys;
            for (i, a) in journeys.iter().enumerate() {
                for (j, b) in journeys.iter().enumerate() {
                    prop_assert!(i == j || !criteria.covers(a, b), "{a} covers {b}");
                }
            }
        }
    }

    #[test]
    fn merge_order_does_not_change_results(
        spec in network_strategy(),
        origin in 1usize..4,
        keys in prop::collection::vec(any::<u32>(), 64),
    ) {
        let repository = build(&spec);
        let config = config();
        for profile in [Profile::Standard, Profile::MultiCriteria] {
            let request = request_at(&spec, origin, Time::from_hm(6, 20))
                .search_window(Duration::from_minutes(64))
                .profile(profile);
            let search = config.search(&repository, request).unwrap();
            let expected = search.run().unwrap().journeys;

            let instants = search.window().instants(config.tuning().iteration_step);
            let mut order: Vec<usize> = (0..instants.len()).collect();
            order.sort_by_key(|&i| keys[i % keys.len()]);

            let mut set = JourneySet::new(search.journey_criteria());
            for i in order {
                for journey in search.run_iteration(instants[i]).unwrap() {
                    merge_journey(&mut set, journey);
                }
            }
            let mut shuffled = set.into_vec();
            shuffled.sort();
            prop_assert_eq!(shuffled, expected);
        }
    }
}

#[test]
fn criteria_ignore_cost_for_standard_profile() {
    let criteria = JourneyCriteria {
        include_cost: false,
    };
    let repository = connection();
    let response = config()
        .route(
            &repository,
            RaptorRequest::depart_after(Time::from_hm(10, 0))
                .access(at(&repository, "A"))
                .egress(at(&repository, "C"))
                .search_window(Duration::from_minutes(1)),
        )
        .unwrap();
    let journey = &response.journeys[0];
    let mut cheaper = journey.clone();
    cheaper.generalized_cost = Cost::ZERO;
    assert!(criteria.covers(journey, &cheaper));
}

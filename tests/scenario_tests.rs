mod common;

use common::*;
use rangeraptor::{
    raptor::{self, AccessEgress, Leg, PassThroughPoints, Profile, RaptorRequest, Slack},
    shared::{Cost, Duration, Time},
    transit::{TripRef, TripTimes},
};

fn l1_request(profile: Profile) -> RaptorRequest {
    let repository = l1();
    RaptorRequest::depart_after(Time::from_hm(11, 25))
        .access(AccessEgress::new(
            stop(&repository, "A"),
            Duration::from_minutes(5),
            Cost::from_seconds(5),
        ))
        .egress(at(&repository, "C"))
        .profile(profile)
        .cost(ride_only_cost())
}

#[test]
fn single_pattern_gives_one_direct_journey() {
    let repository = l1();
    let config = config();
    for profile in [Profile::Standard, Profile::MultiCriteria] {
        let request = l1_request(profile).search_window(Duration::from_minutes(30));
        let response = config.route(&repository, request).unwrap();
        assert_eq!(response.journeys.len(), 1, "{profile:?}");

        let journey = &response.journeys[0];
        assert_eq!(journey.departure_time, Time::from_hm(11, 25));
        assert_eq!(journey.arrival_time, Time::from_hm(11, 50));
        assert_eq!(journey.transfers, 0);
        // access cost plus 20 minutes of riding
        assert_eq!(journey.generalized_cost, Cost::from_seconds(1205));
        assert_eq!(
            journey.legs,
            vec![
                Leg::Access {
                    stop: stop(&repository, "A"),
                    departure_time: Time::from_hm(11, 25),
                    arrival_time: Time::from_hm(11, 30),
                    cost: Cost::from_seconds(5),
                },
                Leg::Transit {
                    trip: TripRef {
                        pattern: 0,
                        trip: 0,
                        service_date: date(1),
                    },
                    board_stop: stop(&repository, "A"),
                    board_pos: 0,
                    alight_stop: stop(&repository, "C"),
                    alight_pos: 2,
                    departure_time: Time::from_hm(11, 30),
                    arrival_time: Time::from_hm(11, 50),
                },
                Leg::Egress {
                    stop: stop(&repository, "C"),
                    departure_time: Time::from_hm(11, 50),
                    arrival_time: Time::from_hm(11, 50),
                    cost: Cost::ZERO,
                },
            ]
        );
    }
}

#[test]
fn dynamic_window_is_sized_from_heuristics() {
    let repository = l1();
    let response = config()
        .route(&repository, l1_request(Profile::Standard))
        .unwrap();
    // 40m + 0.75 * 25m, rounded up to the 10 minute step
    assert_eq!(response.search_window.width, Duration::from_minutes(60));
    assert_eq!(response.iterations, 60);
    assert!(response.heuristics_used);
    assert_eq!(response.journeys.len(), 1);
}

#[test]
fn transfer_slack_pushes_boarding_to_next_trip() {
    let repository = connection();
    let config = config();
    let request = |transfer: Duration| {
        RaptorRequest::depart_after(Time::from_hm(10, 0))
            .access(at(&repository, "A"))
            .egress(at(&repository, "C"))
            .search_window(Duration::from_minutes(1))
            .slack(Slack {
                transfer,
                ..Default::default()
            })
    };

    let tight = config
        .route(&repository, request(Duration::from_minutes(2)))
        .unwrap();
    assert_eq!(tight.journeys.len(), 1);
    assert_eq!(tight.journeys[0].arrival_time, Time::from_hm(10, 30));

    let slow = config
        .route(&repository, request(Duration::from_minutes(3)))
        .unwrap();
    assert_eq!(slow.journeys.len(), 1);
    let journey = &slow.journeys[0];
    assert_eq!(journey.transfers, 1);
    assert_eq!(journey.arrival_time, Time::from_hm(10, 38));
    let boardings: Vec<Time> = journey.transit_legs().map(Leg::departure_time).collect();
    assert_eq!(boardings, vec![Time::from_hm(10, 0), Time::from_hm(10, 20)]);
}

#[test]
fn walking_transfer_pays_transfer_slack_on_top() {
    let mut builder = builder(&["A", "B", "D", "C"]);
    let p1 = builder.add_pattern("P1", &["A", "B"]).unwrap();
    trip(&mut builder, p1, "P1-1", "10:00 10:10");
    let p2 = builder.add_pattern("P2", &["D", "C"]).unwrap();
    trip(&mut builder, p2, "P2-1", "10:13 10:30");
    trip(&mut builder, p2, "P2-2", "10:20 10:38");
    builder
        .add_transfer("B", "D", Duration::from_minutes(2))
        .unwrap();
    let repository = builder.build().unwrap();

    let request = RaptorRequest::depart_after(Time::from_hm(10, 0))
        .access(at(&repository, "A"))
        .egress(at(&repository, "C"))
        .search_window(Duration::from_minutes(1))
        .slack(Slack {
            transfer: Duration::from_minutes(3),
            ..Default::default()
        });
    let response = config().route(&repository, request).unwrap();
    assert_eq!(response.journeys.len(), 1);
    let journey = &response.journeys[0];
    assert_eq!(journey.arrival_time, Time::from_hm(10, 38));
    assert!(matches!(
        journey.legs[2],
        Leg::Transfer {
            departure_time,
            arrival_time,
            ..
        } if departure_time == Time::from_hm(10, 10) && arrival_time == Time::from_hm(10, 12)
    ));
}

#[test]
fn pass_through_keeps_slower_journey_via_point() {
    let mut builder = builder(&["A", "B", "D"]);
    let fast = builder.add_pattern("FAST", &["A", "D"]).unwrap();
    trip(&mut builder, fast, "FAST-1", "10:00 10:20");
    let slow = builder.add_pattern("SLOW", &["A", "B", "D"]).unwrap();
    trip(&mut builder, slow, "SLOW-1", "10:00 10:15 10:40");
    let repository = builder.build().unwrap();
    let b = stop(&repository, "B");

    let request = || {
        RaptorRequest::depart_after(Time::from_hm(10, 0))
            .access(at(&repository, "A"))
            .egress(at(&repository, "D"))
            .search_window(Duration::from_minutes(10))
            .profile(Profile::MultiCriteria)
    };
    let config = config();

    let free = config.route(&repository, request()).unwrap();
    assert_eq!(free.journeys.len(), 1);
    assert_eq!(free.journeys[0].arrival_time, Time::from_hm(10, 20));

    let via_b = config
        .route(
            &repository,
            request().pass_through(PassThroughPoints::ordered(vec![vec![b]])),
        )
        .unwrap();
    assert_eq!(via_b.journeys.len(), 1);
    let journey = &via_b.journeys[0];
    assert_eq!(journey.arrival_time, Time::from_hm(10, 40));
    assert!(journey.visited_stops(&repository).contains(&b));
}

#[test]
fn disconnected_network_gives_no_journeys() {
    let mut builder = builder(&["A", "B", "C", "D"]);
    let ab = builder.add_pattern("AB", &["A", "B"]).unwrap();
    trip(&mut builder, ab, "AB-1", "10:00 10:10");
    let cd = builder.add_pattern("CD", &["C", "D"]).unwrap();
    trip(&mut builder, cd, "CD-1", "10:20 10:30");
    let repository = builder.build().unwrap();
    let config = config();

    let request = RaptorRequest::depart_after(Time::from_hm(9, 0))
        .access(at(&repository, "A"))
        .egress(at(&repository, "D"))
        .search_window(Duration::from_minutes(60));
    let standard = config.route(&repository, request.clone()).unwrap();
    assert!(standard.journeys.is_empty());
    assert_eq!(standard.iterations, 60);

    let mc = config
        .route(&repository, request.profile(Profile::MultiCriteria))
        .unwrap();
    assert!(mc.journeys.is_empty());
    assert!(mc.heuristics_used);
    assert_eq!(mc.iterations, 0, "heuristics skip every iteration");
}

#[test]
fn arrive_by_finds_latest_departure() {
    let repository = l1();
    let config = config();
    for profile in [Profile::Standard, Profile::MultiCriteria] {
        let request = RaptorRequest::arrive_by(Time::from_hm(12, 0))
            .access(AccessEgress::new(
                stop(&repository, "A"),
                Duration::from_minutes(5),
                Cost::from_seconds(5),
            ))
            .egress(at(&repository, "C"))
            .search_window(Duration::from_minutes(60))
            .profile(profile)
            .cost(ride_only_cost());
        let response = config.route(&repository, request).unwrap();
        assert_eq!(response.search_window.start(), Time::from_hm(11, 0));
        assert_eq!(response.journeys.len(), 1, "{profile:?}");
        let journey = &response.journeys[0];
        assert_eq!(journey.departure_time, Time::from_hm(11, 25));
        assert_eq!(journey.arrival_time, Time::from_hm(11, 50));
        assert_eq!(journey.generalized_cost, Cost::from_seconds(1205));
    }
}

#[test]
fn reverse_search_agrees_with_forward_search() {
    let repository = connection();
    let config = config();
    let slack = Slack {
        board: Duration::from_seconds(30),
        alight: Duration::from_seconds(30),
        transfer: Duration::from_minutes(2),
    };
    let forward = RaptorRequest::depart_after(Time::from_hm(9, 59))
        .access(at(&repository, "A"))
        .egress(at(&repository, "C"))
        .search_window(Duration::from_minutes(1))
        .slack(slack);
    let reverse = RaptorRequest::arrive_by(Time::from_hm(10, 40))
        .access(at(&repository, "A"))
        .egress(at(&repository, "C"))
        .search_window(Duration::from_minutes(1))
        .slack(slack);

    for profile in [Profile::Standard, Profile::MultiCriteria] {
        let forward = config
            .route(&repository, forward.clone().profile(profile))
            .unwrap();
        let reverse = config
            .route(&repository, reverse.clone().profile(profile))
            .unwrap();
        assert_eq!(forward.journeys.len(), 1);
        assert_eq!(forward.journeys, reverse.journeys, "{profile:?}");
        let journey = &forward.journeys[0];
        assert_eq!(journey.departure_time, Time::from_hms("09:59:30").unwrap());
        assert_eq!(journey.arrival_time, Time::from_hms("10:38:30").unwrap());
    }
}

#[test]
fn standard_cost_matches_multi_criteria_cost() {
    let repository = connection();
    let config = config();
    let request = |profile: Profile| {
        RaptorRequest::depart_after(Time::from_hm(9, 55))
            .access(AccessEgress::new(
                stop(&repository, "A"),
                Duration::from_minutes(2),
                Cost::from_seconds(20),
            ))
            .egress(AccessEgress::new(
                stop(&repository, "C"),
                Duration::from_minutes(1),
                Cost::from_seconds(7),
            ))
            .search_window(Duration::from_minutes(1))
            .slack(Slack {
                transfer: Duration::from_minutes(1),
                ..Default::default()
            })
            .profile(profile)
    };

    let standard = config.route(&repository, request(Profile::Standard)).unwrap();
    let mc = config
        .route(&repository, request(Profile::MultiCriteria))
        .unwrap();
    assert_eq!(standard.journeys.len(), 1);
    assert_eq!(standard.journeys, mc.journeys);

    // 20s access, two boardings at 60s, 10m + 18m riding, 1m wait at B, 7s egress
    let expected = Cost::from_seconds(20 + 60 + 600 + 60 + 60 + 1080 + 7);
    assert_eq!(mc.journeys[0].generalized_cost, expected);
    assert_eq!(mc.journeys[0].arrival_time, Time::from_hm(10, 31));
}

#[test]
fn multi_day_trip_is_found_through_its_offset() {
    let mut builder = builder(&["A", "B"]);
    let night = builder.add_pattern("NIGHT", &["A", "B"]).unwrap();
    builder
        .add_trip_on(
            night,
            TripTimes::parse("NIGHT-1", "00:10 00:30").unwrap(),
            &[date(1), date(2)],
        )
        .unwrap();
    let repository = builder.build().unwrap();

    let request = RaptorRequest::depart_after(Time::from_hm(23, 50))
        .access(at(&repository, "A"))
        .egress(at(&repository, "B"))
        .search_window(Duration::from_minutes(30));
    let response = config().route(&repository, request).unwrap();
    assert_eq!(response.journeys.len(), 1);
    let journey = &response.journeys[0];
    assert_eq!(journey.departure_time, Time::from_hm(24, 10));
    assert_eq!(journey.arrival_time, Time::from_hm(24, 30));
    let Leg::Transit { trip, .. } = &journey.legs[1] else {
        panic!("expected a transit leg, got {:?}", journey.legs[1]);
    };
    assert_eq!(trip.service_date, date(2));
}

#[test]
fn opening_hours_shift_the_access_leg() {
    let repository = l1();
    let request = RaptorRequest::depart_after(Time::from_hm(11, 0))
        .access(
            AccessEgress::new(stop(&repository, "A"), Duration::from_minutes(5), Cost::ZERO)
                .with_opening_hours(Time::from_hm(11, 0), Time::from_hm(11, 20)),
        )
        .egress(
            AccessEgress::new(stop(&repository, "C"), Duration::from_minutes(2), Cost::ZERO)
                .with_opening_hours(Time::from_hm(12, 0), Time::from_hm(13, 0)),
        )
        .search_window(Duration::from_minutes(30));
    let response = config().route(&repository, request).unwrap();
    assert_eq!(response.journeys.len(), 1);
    let journey = &response.journeys[0];
    // the access closes at 11:20 so it ends there, not at the 11:30 boarding
    assert_eq!(journey.departure_time, Time::from_hm(11, 15));
    // the egress opens at 12:00
    assert_eq!(journey.arrival_time, Time::from_hm(12, 2));
}

#[test]
fn closed_access_gives_no_journeys() {
    let repository = l1();
    let request = RaptorRequest::depart_after(Time::from_hm(11, 0))
        .access(
            AccessEgress::new(stop(&repository, "A"), Duration::from_minutes(5), Cost::ZERO)
                .with_opening_hours(Time::from_hm(6, 0), Time::from_hm(7, 0)),
        )
        .egress(at(&repository, "C"))
        .search_window(Duration::from_minutes(30));
    let response = config().route(&repository, request).unwrap();
    assert!(response.journeys.is_empty());
}

#[test]
fn max_transfers_limits_rounds() {
    let repository = connection();
    let request = RaptorRequest::depart_after(Time::from_hm(10, 0))
        .access(at(&repository, "A"))
        .egress(at(&repository, "C"))
        .search_window(Duration::from_minutes(1))
        .max_transfers(0);
    let response = config().route(&repository, request).unwrap();
    assert!(response.journeys.is_empty());
}

#[test]
fn errors_are_reported_before_searching() -> Result<(), raptor::Error> {
    let repository = l1();
    let config = config();
    let base = || {
        RaptorRequest::depart_after(Time::from_hm(11, 0))
            .access(at(&repository, "A"))
            .egress(at(&repository, "C"))
    };

    assert!(matches!(
        config.route(&repository, base().search_window(Duration::ZERO)),
        Err(raptor::Error::ZeroSearchWindow)
    ));
    assert!(matches!(
        config.route(&repository, base().max_transfers(50)),
        Err(raptor::Error::InvalidRequest(_))
    ));
    assert!(matches!(
        config.route(
            &repository,
            base().pass_through(PassThroughPoints::ordered(vec![vec![1]]))
        ),
        Err(raptor::Error::InvalidRequest(_))
    ));
    assert!(matches!(
        config.route(
            &repository,
            base()
                .profile(Profile::MultiCriteria)
                .pass_through(PassThroughPoints::ordered(vec![vec![]]))
        ),
        Err(raptor::Error::InvalidRequest(_))
    ));
    let unordered = PassThroughPoints::unordered((0..33).map(|_| vec![1]).collect());
    assert!(matches!(
        config.route(
            &repository,
            base().profile(Profile::MultiCriteria).pass_through(unordered)
        ),
        Err(raptor::Error::InvalidRequest(_))
    ));

    // a valid request still routes
    let response = config.route(&repository, base().search_window(Duration::from_minutes(30)))?;
    assert_eq!(response.journeys.len(), 1);
    Ok(())
}

#[test]
fn transit_errors_convert_into_raptor_errors() {
    let mut builder = builder(&["A"]);
    let error: raptor::Error = builder.add_pattern("X", &["A", "Z"]).unwrap_err().into();
    assert!(matches!(error, raptor::Error::Transit(_)));
}

/// LOOP visits B twice: A, B, C, B, D.
fn loop_network() -> rangeraptor::transit::Repository {
    let mut builder = builder(&["A", "B", "C", "D"]);
    let pattern = builder.add_pattern("LOOP", &["A", "B", "C", "B", "D"]).unwrap();
    trip(&mut builder, pattern, "LOOP-1", "10:00 10:10 10:20 10:30 10:40");
    builder.build().unwrap()
}

#[test]
fn loop_pattern_rides_back_to_a_visited_stop() {
    let repository = loop_network();
    let config = config();
    let depart_after = RaptorRequest::depart_after(Time::from_hm(10, 10))
        .access(at(&repository, "C"))
        .egress(at(&repository, "B"))
        .search_window(Duration::from_minutes(5));
    let arrive_by = RaptorRequest::arrive_by(Time::from_hm(10, 35))
        .access(at(&repository, "C"))
        .egress(at(&repository, "B"))
        .search_window(Duration::from_minutes(5));

    for request in [depart_after, arrive_by] {
        for profile in [Profile::Standard, Profile::MultiCriteria] {
            let response = config
                .route(&repository, request.clone().profile(profile))
                .unwrap();
            assert_eq!(response.journeys.len(), 1, "{profile:?}");
            let journey = &response.journeys[0];
            assert_eq!(journey.arrival_time, Time::from_hm(10, 30));
            assert_eq!(journey.transfers, 0);
            let rides: Vec<(u32, u32, u32, u32)> = journey
                .transit_legs()
                .filter_map(|leg| match leg {
                    Leg::Transit {
                        board_stop,
                        board_pos,
                        alight_stop,
                        alight_pos,
                        ..
                    } => Some((*board_stop, *board_pos, *alight_stop, *alight_pos)),
                    _ => None,
                })
                .collect();
            assert_eq!(
                rides,
                vec![(stop(&repository, "C"), 2, stop(&repository, "B"), 3)],
                "{profile:?}"
            );
        }
    }
}

#[test]
fn loop_pattern_rides_past_repeated_stop() {
    let repository = loop_network();
    let config = config();
    for profile in [Profile::Standard, Profile::MultiCriteria] {
        let request = RaptorRequest::depart_after(Time::from_hm(10, 5))
            .access(at(&repository, "B"))
            .egress(at(&repository, "D"))
            .search_window(Duration::from_minutes(5))
            .profile(profile);
        let response = config.route(&repository, request).unwrap();
        assert_eq!(response.journeys.len(), 1, "{profile:?}");
        let journey = &response.journeys[0];
        assert_eq!(journey.arrival_time, Time::from_hm(10, 40));
        assert_eq!(journey.transfers, 0);
        let legs: Vec<&Leg> = journey.transit_legs().collect();
        assert_eq!(legs.len(), 1);
        assert!(matches!(
            legs[0],
            Leg::Transit { board_stop, alight_pos: 4, .. } if *board_stop == stop(&repository, "B")
        ));
    }
}

#[test]
fn boarding_at_last_stop_of_pattern_goes_nowhere() {
    let repository = l1();
    let config = config();
    // C ends L1 going forward, A ends it going backward
    let depart_after = RaptorRequest::depart_after(Time::from_hm(11, 30))
        .access(at(&repository, "C"))
        .egress(at(&repository, "A"))
        .egress(at(&repository, "B"))
        .search_window(Duration::from_minutes(60));
    let arrive_by = RaptorRequest::arrive_by(Time::from_hm(12, 0))
        .access(at(&repository, "B"))
        .access(at(&repository, "C"))
        .egress(at(&repository, "A"))
        .search_window(Duration::from_minutes(60));

    for request in [depart_after, arrive_by] {
        for profile in [Profile::Standard, Profile::MultiCriteria] {
            let response = config
                .route(&repository, request.clone().profile(profile))
                .unwrap();
            assert!(response.journeys.is_empty(), "{profile:?}");
        }
    }
}

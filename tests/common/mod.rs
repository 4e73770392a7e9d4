#![allow(dead_code)]

use chrono::NaiveDate;
use rangeraptor::{
    raptor::{AccessEgress, CostParameters, RaptorConfig, RaptorTuningParameters},
    shared::{Cost, Duration, Time},
    transit::{Repository, RepositoryBuilder, TripTimes},
};

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

pub fn builder(stops: &[&str]) -> RepositoryBuilder {
    let mut builder = Repository::builder(date(1));
    for stop in stops {
        builder.add_stop(stop, stop).unwrap();
    }
    builder
}

pub fn trip(builder: &mut RepositoryBuilder, pattern: u32, id: &str, times: &str) {
    builder
        .add_trip(pattern, TripTimes::parse(id, times).unwrap())
        .unwrap();
}

pub fn stop(repository: &Repository, id: &str) -> u32 {
    repository.stop_idx(id).unwrap()
}

pub fn at(repository: &Repository, id: &str) -> AccessEgress {
    AccessEgress::new(stop(repository, id), Duration::ZERO, Cost::ZERO)
}

pub fn config() -> RaptorConfig {
    RaptorConfig::new(RaptorTuningParameters::default()).unwrap()
}

pub fn threaded_config(threads: usize) -> RaptorConfig {
    RaptorConfig::new(RaptorTuningParameters {
        search_thread_pool_size: threads,
        ..Default::default()
    })
    .unwrap()
}

/// Cost parameters where only riding costs anything.
pub fn ride_only_cost() -> CostParameters {
    CostParameters {
        board_cost: Cost::ZERO,
        ..Default::default()
    }
}

/// Pattern L1 over A, B, C with a single trip at 11:30, 11:40 and 11:50.
pub fn l1() -> Repository {
    let mut builder = builder(&["A", "B", "C"]);
    let l1 = builder.add_pattern("L1", &["A", "B", "C"]).unwrap();
    trip(&mut builder, l1, "L1-1", "11:30 11:40 11:50");
    builder.build().unwrap()
}

/// P1 runs A to B, arriving 10:10. P2 leaves B for C at 10:12 and 10:20.
pub fn connection() -> Repository {
    let mut builder = builder(&["A", "B", "C"]);
    let p1 = builder.add_pattern("P1", &["A", "B"]).unwrap();
    trip(&mut builder, p1, "P1-1", "10:00 10:10");
    let p2 = builder.add_pattern("P2", &["B", "C"]).unwrap();
    trip(&mut builder, p2, "P2-1", "10:12 10:30");
    trip(&mut builder, p2, "P2-2", "10:20 10:38");
    builder.build().unwrap()
}

/// `size` x `size` stops. Every row has an eastbound pattern and every column
/// a southbound one, each with a trip every 10 minutes from 06:00 to 10:00
/// and 3 minutes between stops. Neighbouring stops are also a 4 minute walk
/// apart.
pub fn grid(size: usize) -> Repository {
    let name = |row: usize, col: usize| format!("S{row}_{col}");
    let mut builder = Repository::builder(date(1));
    for row in 0..size {
        for col in 0..size {
            builder.add_stop(&name(row, col), &name(row, col)).unwrap();
        }
    }

    let mut lines: Vec<(String, Vec<String>)> = Vec::new();
    for i in 0..size {
        lines.push((format!("E{i}"), (0..size).map(|c| name(i, c)).collect()));
        lines.push((format!("S{i}"), (0..size).map(|r| name(r, i)).collect()));
    }
    for (id, stops) in &lines {
        let stops: Vec<&str> = stops.iter().map(String::as_str).collect();
        let pattern = builder.add_pattern(id, &stops).unwrap();
        for n in 0..=24 {
            let start = Time::from_hm(6, 0) + Duration::from_minutes(10 * n);
            let times: Vec<Time> = (0..stops.len())
                .map(|pos| start + Duration::from_minutes(3 * pos as i32))
                .collect();
            let trip = TripTimes::new(format!("{id}-{n}"), times.clone(), times).unwrap();
            builder.add_trip(pattern, trip).unwrap();
        }
    }

    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                let (a, b) = (name(row, col), name(row, col + 1));
                builder.add_transfer(&a, &b, Duration::from_minutes(4)).unwrap();
                builder.add_transfer(&b, &a, Duration::from_minutes(4)).unwrap();
            }
            if row + 1 < size {
                let (a, b) = (name(row, col), name(row + 1, col));
                builder.add_transfer(&a, &b, Duration::from_minutes(4)).unwrap();
                builder.add_transfer(&b, &a, Duration::from_minutes(4)).unwrap();
            }
        }
    }
    builder.build().unwrap()
}

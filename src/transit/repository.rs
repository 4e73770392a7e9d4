use crate::{
    shared::Duration,
    transit::{
        self, ScheduleRef, Stop, Transfer, TransitDataProvider, TripPattern, TripSchedule,
        TripTimes,
    },
};
use chrono::NaiveDate;
use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use tracing::debug;

type IdToIndex = HashMap<Arc<str>, u32>;

/// An immutable in-memory transit snapshot.
///
/// Times are seconds relative to midnight of `reference_date`; trips running on
/// other service dates are reached through schedule offsets.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    pub reference_date: NaiveDate,
    pub stops: Box<[Stop]>,
    pub patterns: Box<[TripPattern]>,

    stop_lookup: Arc<IdToIndex>,
    pattern_lookup: Arc<IdToIndex>,
    stop_to_patterns: Box<[Box<[u32]>]>,
    stop_to_transfers: Box<[Box<[Transfer]>]>,
    stop_from_transfers: Box<[Box<[Transfer]>]>,
}

impl Repository {
    pub fn builder(reference_date: NaiveDate) -> RepositoryBuilder {
        RepositoryBuilder::new(reference_date)
    }

    /// Get a stop with the given id.
    /// If no stop is found with the given id None is returned.
    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        let stop_index = self.stop_lookup.get(id)?;
        Some(&self.stops[*stop_index as usize])
    }

    pub fn stop_idx(&self, id: &str) -> Option<u32> {
        self.stop_lookup.get(id).copied()
    }

    pub fn pattern_by_id(&self, id: &str) -> Option<&TripPattern> {
        let pattern_index = self.pattern_lookup.get(id)?;
        Some(&self.patterns[*pattern_index as usize])
    }

    pub fn schedule_count(&self) -> usize {
        self.patterns.iter().map(|p| p.schedules.len()).sum()
    }
}

impl TransitDataProvider for Repository {
    fn stop_count(&self) -> usize {
        self.stops.len()
    }

    fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn patterns_by_stop(&self, stop: u32) -> &[u32] {
        &self.stop_to_patterns[stop as usize]
    }

    fn pattern(&self, index: u32) -> &TripPattern {
        &self.patterns[index as usize]
    }

    fn schedules(&self, pattern: u32) -> &[ScheduleRef] {
        &self.patterns[pattern as usize].schedules
    }

    fn transfers_from(&self, stop: u32) -> &[Transfer] {
        &self.stop_to_transfers[stop as usize]
    }

    fn transfers_to(&self, stop: u32) -> &[Transfer] {
        &self.stop_from_transfers[stop as usize]
    }
}

struct PatternDraft {
    id: Arc<str>,
    stops: Vec<u32>,
    trips: Vec<(TripTimes, Vec<NaiveDate>)>,
}

/// Collects stops, patterns, trips and transfers, then validates and indexes
/// them into a [`Repository`].
pub struct RepositoryBuilder {
    reference_date: NaiveDate,
    stops: Vec<Stop>,
    stop_lookup: IdToIndex,
    patterns: Vec<PatternDraft>,
    pattern_lookup: IdToIndex,
    transfers: Vec<Transfer>,
}

impl RepositoryBuilder {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            stops: Vec::new(),
            stop_lookup: HashMap::new(),
            patterns: Vec::new(),
            pattern_lookup: HashMap::new(),
            transfers: Vec::new(),
        }
    }

    pub fn add_stop(&mut self, id: &str, name: &str) -> Result<u32, transit::Error> {
        if self.stop_lookup.contains_key(id) {
            return Err(transit::Error::DuplicateStop(id.to_string()));
        }
        let index = self.stops.len() as u32;
        let id: Arc<str> = id.into();
        self.stop_lookup.insert(id.clone(), index);
        self.stops.push(Stop {
            index,
            id,
            name: name.into(),
        });
        Ok(index)
    }

    pub fn add_pattern(&mut self, id: &str, stop_ids: &[&str]) -> Result<u32, transit::Error> {
        if self.pattern_lookup.contains_key(id) {
            return Err(transit::Error::DuplicatePattern(id.to_string()));
        }
        if stop_ids.len() < 2 {
            return Err(transit::Error::PatternTooShort(id.to_string()));
        }
        let stops = stop_ids
            .iter()
            .map(|stop_id| self.resolve_stop(stop_id))
            .collect::<Result<Vec<_>, _>>()?;
        let index = self.patterns.len() as u32;
        let id: Arc<str> = id.into();
        self.pattern_lookup.insert(id.clone(), index);
        self.patterns.push(PatternDraft {
            id,
            stops,
            trips: Vec::new(),
        });
        Ok(index)
    }

    /// Adds a trip running on the reference date only.
    pub fn add_trip(&mut self, pattern: u32, times: TripTimes) -> Result<(), transit::Error> {
        let reference_date = self.reference_date;
        self.add_trip_on(pattern, times, &[reference_date])
    }

    pub fn add_trip_on(
        &mut self,
        pattern: u32,
        times: TripTimes,
        service_dates: &[NaiveDate],
    ) -> Result<(), transit::Error> {
        let draft = self
            .patterns
            .get_mut(pattern as usize)
            .ok_or(transit::Error::UnknownPattern(pattern))?;
        if times.len() != draft.stops.len() {
            return Err(transit::Error::TripLengthMismatch {
                pattern: draft.id.to_string(),
                trip: times.id.to_string(),
                expected: draft.stops.len(),
                actual: times.len(),
            });
        }
        draft.trips.push((times, service_dates.to_vec()));
        Ok(())
    }

    pub fn add_transfer(
        &mut self,
        from: &str,
        to: &str,
        duration: Duration,
    ) -> Result<(), transit::Error> {
        if duration.is_negative() {
            return Err(transit::Error::NegativeTransferDuration {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let from_stop_idx = self.resolve_stop(from)?;
        let to_stop_idx = self.resolve_stop(to)?;
        self.transfers.push(Transfer {
            from_stop_idx,
            to_stop_idx,
            duration,
        });
        Ok(())
    }

    pub fn build(self) -> Result<Repository, transit::Error> {
        let stop_count = self.stops.len();
        let mut stop_to_patterns: Vec<Vec<u32>> = vec![Vec::new(); stop_count];
        let mut patterns: Vec<TripPattern> = Vec::with_capacity(self.patterns.len());

        for (index, draft) in self.patterns.into_iter().enumerate() {
            let index = index as u32;
            let mut trips = Vec::with_capacity(draft.trips.len());
            let mut schedules = Vec::new();
            for (trip_idx, (times, dates)) in draft.trips.into_iter().enumerate() {
                for service_date in dates {
                    let days = (service_date - self.reference_date).num_days() as i32;
                    schedules.push(ScheduleRef {
                        trip: trip_idx as u32,
                        offset: Duration::from_days(days),
                        service_date,
                    });
                }
                trips.push(times);
            }
            schedules.sort_by(|a, b| schedule_order(&trips, a, b));
            check_no_overtaking(&draft.id, &trips, &schedules, index)?;

            for &stop in draft.stops.iter() {
                let serving = &mut stop_to_patterns[stop as usize];
                if serving.last() != Some(&index) {
                    serving.push(index);
                }
            }
            patterns.push(TripPattern {
                index,
                id: draft.id,
                stops: draft.stops.into(),
                trips: trips.into(),
                schedules: schedules.into(),
            });
        }

        let mut stop_to_transfers: Vec<Vec<Transfer>> = vec![Vec::new(); stop_count];
        let mut stop_from_transfers: Vec<Vec<Transfer>> = vec![Vec::new(); stop_count];
        for transfer in self.transfers.iter() {
            stop_to_transfers[transfer.from_stop_idx as usize].push(*transfer);
            stop_from_transfers[transfer.to_stop_idx as usize].push(*transfer);
        }

        let repository = Repository {
            reference_date: self.reference_date,
            stops: self.stops.into(),
            patterns: patterns.into(),
            stop_lookup: self.stop_lookup.into(),
            pattern_lookup: self.pattern_lookup.into(),
            stop_to_patterns: stop_to_patterns.into_iter().map(Into::into).collect(),
            stop_to_transfers: stop_to_transfers.into_iter().map(Into::into).collect(),
            stop_from_transfers: stop_from_transfers.into_iter().map(Into::into).collect(),
        };
        debug!(
            "Built transit snapshot for {} with {} stops, {} patterns, {} schedules and {} transfers",
            repository.reference_date,
            repository.stops.len(),
            repository.patterns.len(),
            repository.schedule_count(),
            self.transfers.len()
        );
        Ok(repository)
    }

    fn resolve_stop(&self, id: &str) -> Result<u32, transit::Error> {
        self.stop_lookup
            .get(id)
            .copied()
            .ok_or_else(|| transit::Error::UnknownStop(id.to_string()))
    }
}

/// The trip search binary-searches schedules at any stop position, which is
/// only valid when no trip overtakes another one in the same pattern.
/// Orders schedules by their shifted times at every position, departure
/// before arrival, so trips tied at the endpoints still line up.
fn schedule_order(trips: &[TripTimes], a: &ScheduleRef, b: &ScheduleRef) -> Ordering {
    let times = |s: &ScheduleRef| {
        let (trip, offset) = (&trips[s.trip as usize], s.offset);
        (0..trip.len()).map(move |pos| (trip.departure(pos) + offset, trip.arrival(pos) + offset))
    };
    times(a).cmp(times(b))
}

fn check_no_overtaking(
    pattern_id: &str,
    trips: &[TripTimes],
    schedules: &[ScheduleRef],
    pattern: u32,
) -> Result<(), transit::Error> {
    let view = |s: &ScheduleRef| {
        TripSchedule::new(pattern, s.trip, &trips[s.trip as usize], s.service_date)
            .with_offset(s.offset, s.service_date)
    };
    for pair in schedules.windows(2) {
        let (first, second) = (view(&pair[0]), view(&pair[1]));
        let overtakes = (0..first.times().len()).any(|pos| {
            first.departure(pos) > second.departure(pos) || first.arrival(pos) > second.arrival(pos)
        });
        if overtakes {
            return Err(transit::Error::OvertakingTrips {
                pattern: pattern_id.to_string(),
                first: first.times().id.to_string(),
                second: second.times().id.to_string(),
            });
        }
    }
    Ok(())
}

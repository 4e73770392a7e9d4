use crate::{
    raptor::{
        self, AccessEgress, CostParameters, Heuristics, LifeCyclePublisher,
        PassThroughPointsService, Profile, RaptorRequest, RaptorTuningParameters, SearchDirection,
        Slack,
    },
    shared::Duration,
    transit::TransitDataProvider,
};
use tracing::debug;

/// Everything one search needs, validated once and shared read-only by all of
/// its iterations and threads.
///
/// Access and egress are seen from the search's point of view: an arrive-by
/// search starts at the request's egress paths and ends at its access paths.
pub struct SearchContext<'a, T: TransitDataProvider> {
    transit: &'a T,
    request: RaptorRequest,
    max_rounds: usize,
    pass_through: PassThroughPointsService,
    lifecycle: LifeCyclePublisher,
    heuristics: Option<Heuristics>,
    egress_by_stop: Vec<Vec<usize>>,
}

impl<'a, T: TransitDataProvider> SearchContext<'a, T> {
    pub fn new(
        transit: &'a T,
        tuning: &RaptorTuningParameters,
        request: RaptorRequest,
    ) -> Result<Self, raptor::Error> {
        let stop_count = transit.stop_count();
        validate_request(&request, tuning, stop_count)?;

        let max_transfers = request
            .max_transfers
            .unwrap_or(tuning.max_number_of_transfers);
        let pass_through = PassThroughPointsService::new(
            request.pass_through.as_ref(),
            request.direction,
            stop_count,
        )?;
        let lifecycle = LifeCyclePublisher::new(request.observers.clone());

        let mut egress_by_stop = vec![Vec::new(); stop_count];
        let search_egress = match request.direction {
            SearchDirection::Forward => &request.egress,
            SearchDirection::Reverse => &request.access,
        };
        for (i, egress) in search_egress.iter().enumerate() {
            egress_by_stop[egress.stop as usize].push(i);
        }

        debug!(
            "Search context: {:?} at {}, {} access, {} egress, max {} transfers",
            request.direction,
            request.time,
            request.access.len(),
            request.egress.len(),
            max_transfers
        );

        Ok(Self {
            transit,
            request,
            max_rounds: max_transfers + 1,
            pass_through,
            lifecycle,
            heuristics: None,
            egress_by_stop,
        })
    }

    pub fn transit(&self) -> &'a T {
        self.transit
    }

    pub fn request(&self) -> &RaptorRequest {
        &self.request
    }

    pub fn direction(&self) -> SearchDirection {
        self.request.direction
    }

    pub fn profile(&self) -> Profile {
        self.request.profile
    }

    pub fn slack(&self) -> &Slack {
        &self.request.slack
    }

    pub fn cost(&self) -> &CostParameters {
        &self.request.cost
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub fn stop_count(&self) -> usize {
        self.transit.stop_count()
    }

    pub fn pass_through(&self) -> &PassThroughPointsService {
        &self.pass_through
    }

    pub fn lifecycle(&self) -> &LifeCyclePublisher {
        &self.lifecycle
    }

    pub fn heuristics(&self) -> Option<&Heuristics> {
        self.heuristics.as_ref()
    }

    pub(crate) fn set_heuristics(&mut self, heuristics: Heuristics) {
        self.heuristics = Some(heuristics);
    }

    /// Paths the search starts from.
    pub fn search_access(&self) -> &[AccessEgress] {
        match self.direction() {
            SearchDirection::Forward => &self.request.access,
            SearchDirection::Reverse => &self.request.egress,
        }
    }

    /// Paths the search ends with.
    pub fn search_egress(&self) -> &[AccessEgress] {
        match self.direction() {
            SearchDirection::Forward => &self.request.egress,
            SearchDirection::Reverse => &self.request.access,
        }
    }

    /// Indexes into [`SearchContext::search_egress`] of the paths leaving `stop`.
    pub fn egress_at(&self, stop: u32) -> &[usize] {
        &self.egress_by_stop[stop as usize]
    }
}

fn validate_request(
    request: &RaptorRequest,
    tuning: &RaptorTuningParameters,
    stop_count: usize,
) -> Result<(), raptor::Error> {
    let invalid = |msg: String| Err(raptor::Error::InvalidRequest(msg));

    if request.access.is_empty() {
        return invalid("at least one access path is required".into());
    }
    if request.egress.is_empty() {
        return invalid("at least one egress path is required".into());
    }
    for (kind, paths) in [("access", &request.access), ("egress", &request.egress)] {
        for path in paths {
            if path.stop as usize >= stop_count {
                return invalid(format!("{kind} path references unknown stop {}", path.stop));
            }
            if path.duration.is_negative() || path.cost.is_negative() {
                return invalid(format!(
                    "{kind} path to stop {} has a negative duration or cost",
                    path.stop
                ));
            }
            if let Some((open, close)) = path.opening_hours
                && close < open
            {
                return invalid(format!(
                    "{kind} path to stop {} closes at {close} before it opens at {open}",
                    path.stop
                ));
            }
        }
    }
    match request.search_window {
        Some(window) if window == Duration::ZERO => return Err(raptor::Error::ZeroSearchWindow),
        Some(window) if window.is_negative() => {
            return invalid(format!("search window {window} is negative"));
        }
        _ => {}
    }
    let slack = &request.slack;
    if slack.board.is_negative() || slack.alight.is_negative() || slack.transfer.is_negative() {
        return invalid("slack must not be negative".into());
    }
    request.cost.validate().or_else(invalid)?;
    if let Some(max_transfers) = request.max_transfers
        && max_transfers > tuning.max_number_of_transfers
    {
        return invalid(format!(
            "{max_transfers} transfers requested but at most {} are allowed",
            tuning.max_number_of_transfers
        ));
    }
    if request.pass_through.is_some() && request.profile == Profile::Standard {
        return invalid("pass-through points need the multi-criteria profile".into());
    }
    Ok(())
}

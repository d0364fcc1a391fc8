use crate::{
    Error, Result,
    algo::partition::PartitionPlan,
    progress::ProgressObserver,
    tour::cycle_length_indexed,
    waypoint::Waypoint,
};

/// Best tour found by one partition. `order` holds positions into the
/// planner's interior list, not global waypoint indices.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub partition: usize,
    pub order: Vec<usize>,
    pub length_m: f64,
    pub examined: u64,
}

/// One worker: owns its permutation buffer and local best exclusively and
/// walks a contiguous slice of the permutation space to completion. No state
/// is shared while it runs; the orchestrator reads the result after the join.
pub struct SearchPartition<'a> {
    waypoints: &'a [Waypoint],
    interior: &'a [usize],
    base_index: usize,
    plan: PartitionPlan,
    progress_interval: u64,
}

impl<'a> SearchPartition<'a> {
    pub fn new(
        waypoints: &'a [Waypoint],
        interior: &'a [usize],
        base_index: usize,
        plan: PartitionPlan,
        progress_interval: u64,
    ) -> Self {
        Self {
            waypoints,
            interior,
            base_index,
            plan,
            progress_interval,
        }
    }

    /// Examines every permutation in the assigned range and returns the
    /// shortest closed tour seen. Fails fast on a planner wiring bug.
    pub fn run(mut self, observer: &dyn ProgressObserver) -> Result<SearchResult> {
        let expected = self.waypoints.len().saturating_sub(1);
        if self.plan.start.len() != expected {
            return Err(Error::PartitionMismatch {
                partition: self.plan.index,
                expected,
                actual: self.plan.start.len(),
            });
        }
        if self.interior.len() != expected {
            return Err(Error::PartitionMismatch {
                partition: self.plan.index,
                expected,
                actual: self.interior.len(),
            });
        }

        // reused candidate buffer: global indices, base pinned at slot 0
        let mut candidate = Vec::with_capacity(self.waypoints.len());
        candidate.push(self.base_index);
        candidate.extend(self.plan.start.order().iter().map(|&pos| self.interior[pos]));

        let mut best_order = self.plan.start.order().to_vec();
        let mut best_m = f64::INFINITY;
        let mut examined: u64 = 0;

        loop {
            for (slot, &pos) in self.plan.start.order().iter().enumerate() {
                candidate[slot + 1] = self.interior[pos];
            }
            let length_m = cycle_length_indexed(self.waypoints, &candidate);
            examined += 1;

            if length_m < best_m {
                best_m = length_m;
                best_order.copy_from_slice(self.plan.start.order());
                observer.on_local_best(self.plan.index, best_m, &best_order);
            }

            if self.progress_interval > 0 && examined % self.progress_interval == 0 {
                observer.on_progress(self.plan.index, examined, self.plan.budget, best_m);
            }

            if examined >= self.plan.budget || !self.plan.start.advance() {
                break;
            }
        }

        Ok(SearchResult {
            partition: self.plan.index,
            order: best_order,
            length_m: best_m,
            examined,
        })
    }
}

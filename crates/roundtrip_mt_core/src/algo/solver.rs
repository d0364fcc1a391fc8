use std::thread;

use rayon::prelude::*;

use crate::{
    Error, Result, SolverInput, SolverOptions,
    algo::{
        partition::plan_partitions,
        search::{SearchPartition, SearchResult},
    },
    progress::{LogProgress, ProgressObserver},
    tour::Tour,
};

pub(crate) const MIN_TOUR_WAYPOINTS: usize = 2;
const THREAD_FALLBACK_PARALLELISM: usize = 2;
const THREAD_MIN_PARALLELISM: usize = 2;
const THREAD_RESERVED_CORES: usize = 1;

const ERR_NO_RESULTS: &str = "No results";
const ERR_INVALID_POINT: &str = "Input contains invalid lat/lng values";

/// Worker count used when the options leave it at 0: available cores minus
/// one reserve, never more than half the waypoint count (more workers than
/// that degenerates into single-permutation partitions).
pub fn default_worker_count(waypoint_count: usize) -> usize {
    let cores = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(THREAD_FALLBACK_PARALLELISM)
        .max(THREAD_MIN_PARALLELISM)
        - THREAD_RESERVED_CORES;
    cores.min(worker_cap(waypoint_count))
}

fn worker_cap(waypoint_count: usize) -> usize {
    (waypoint_count / 2).max(1)
}

/// Exhaustively search every ordering of the non-base waypoints and return
/// the globally shortest closed tour starting and ending at the base.
pub fn solve_roundtrip(input: SolverInput, options: SolverOptions) -> Result<Tour> {
    solve_roundtrip_with_observer(input, options, &LogProgress)
}

/// Same search with an explicit progress observer.
pub fn solve_roundtrip_with_observer(
    input: SolverInput,
    options: SolverOptions,
    observer: &dyn ProgressObserver,
) -> Result<Tour> {
    let n = input.waypoints.len();
    if n < MIN_TOUR_WAYPOINTS {
        return Err(Error::invalid_input(format!(
            "Need at least {MIN_TOUR_WAYPOINTS} waypoints for a round trip"
        )));
    }
    if input.base_index >= n {
        return Err(Error::invalid_input(format!(
            "base index {} out of range for {n} waypoints",
            input.base_index
        )));
    }
    if input.waypoints.iter().any(|w| !w.is_valid()) {
        return Err(Error::invalid_input(ERR_INVALID_POINT));
    }

    let workers = if options.workers == 0 {
        default_worker_count(n)
    } else {
        options.workers.min(worker_cap(n))
    };

    // global indices of the non-base waypoints, input order preserved
    let base_index = input.base_index;
    let interior: Vec<usize> = (0..n).filter(|&i| i != base_index).collect();

    let plans = plan_partitions(interior.len(), workers)?;
    let space: u128 = plans.iter().map(|p| u128::from(p.budget)).sum();

    log::info!(
        "solver: start n={n} base={base_index} workers={workers} partitions={} space={space}",
        plans.len()
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plans.len())
        .build()
        .map_err(|e| Error::other(format!("rayon pool: {e}")))?;

    let waypoints = &input.waypoints;
    let interior_ref = &interior;
    let progress_interval = options.progress_interval;

    let results: Vec<SearchResult> = pool.install(|| {
        plans
            .into_par_iter()
            .map(|plan| {
                let partition = plan.index;
                SearchPartition::new(waypoints, interior_ref, base_index, plan, progress_interval)
                    .run(observer)
                    .map_err(|err| Error::worker_failed(partition, err))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let examined: u128 = results.iter().map(|r| u128::from(r.examined)).sum();

    // strict improvement only, so ties go to the partition reduced first
    let mut best: Option<SearchResult> = None;
    for result in results {
        let replace = match &best {
            None => true,
            Some(current) => result.length_m < current.length_m,
        };
        if replace {
            best = Some(result);
        }
    }
    let best = best.ok_or_else(|| Error::other(ERR_NO_RESULTS))?;

    log::info!(
        "solver: complete examined={examined} winner={} best_tour_m={:.0}",
        best.partition,
        best.length_m
    );

    let mut route = Vec::with_capacity(n);
    route.push(input.waypoints[base_index].clone());
    route.extend(
        best.order
            .iter()
            .map(|&pos| input.waypoints[interior[pos]].clone()),
    );
    Ok(Tour {
        waypoints: route,
        length_m: best.length_m,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::{default_worker_count, solve_roundtrip, solve_roundtrip_with_observer};
    use crate::{
        Error, SolverInput, SolverOptions,
        permutation::Permutation,
        progress::ProgressObserver,
        tour::cycle_length_indexed,
        waypoint::Waypoint,
    };

    fn options_with_workers(workers: usize) -> SolverOptions {
        SolverOptions {
            workers,
            ..SolverOptions::default()
        }
    }

    fn unit_grid() -> Vec<Waypoint> {
        vec![
            Waypoint::new(0, "base", 0.0, 0.0),
            Waypoint::new(1, "a", 0.0, 1.0),
            Waypoint::new(2, "b", 1.0, 1.0),
            Waypoint::new(3, "c", 1.0, 0.0),
        ]
    }

    fn cities() -> Vec<Waypoint> {
        vec![
            Waypoint::new(1, "Berlin", 52.5200, 13.4050),
            Waypoint::new(2, "Munich", 48.1351, 11.5820),
            Waypoint::new(3, "Frankfurt", 50.1109, 8.6821),
            Waypoint::new(4, "Hamburg", 53.5511, 9.9937),
            Waypoint::new(5, "Cologne", 50.9375, 6.9603),
        ]
    }

    fn brute_force_best(waypoints: &[Waypoint], base: usize) -> f64 {
        let interior: Vec<usize> = (0..waypoints.len()).filter(|&i| i != base).collect();
        let mut perm = Permutation::identity(interior.len());
        let mut best = f64::INFINITY;
        loop {
            let mut candidate = vec![base];
            candidate.extend(perm.order().iter().map(|&pos| interior[pos]));
            best = best.min(cycle_length_indexed(waypoints, &candidate));
            if !perm.advance() {
                break;
            }
        }
        best
    }

    #[test]
    fn single_worker_matches_an_independent_brute_force() {
        let waypoints = cities();
        let expected = brute_force_best(&waypoints, 0);

        let tour = solve_roundtrip(
            SolverInput::new(waypoints, 0),
            options_with_workers(1),
        )
        .expect("solve");

        assert!((tour.length_m - expected).abs() < 1e-9);
    }

    #[test]
    fn optimum_is_invariant_across_worker_counts() {
        let reference = solve_roundtrip(
            SolverInput::new(cities(), 0),
            options_with_workers(1),
        )
        .expect("solve")
        .length_m;

        for workers in 2..=3 {
            let tour = solve_roundtrip(
                SolverInput::new(cities(), 0),
                options_with_workers(workers),
            )
            .expect("solve");
            assert_eq!(tour.length_m, reference, "workers={workers}");
        }
    }

    #[test]
    fn unit_grid_returns_the_perimeter_tour() {
        let waypoints = unit_grid();
        let expected = brute_force_best(&waypoints, 0);

        let tour = solve_roundtrip(
            SolverInput::new(waypoints, 0),
            options_with_workers(1),
        )
        .expect("solve");

        assert!((tour.length_m - expected).abs() < 1e-9);
        // first optimum in lexicographic order wins the tie with its mirror
        let numbers: Vec<u32> = tour.closed().map(|w| w.number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn route_starts_at_the_requested_base() {
        let tour = solve_roundtrip(
            SolverInput::new(cities(), 2),
            options_with_workers(2),
        )
        .expect("solve");

        assert_eq!(tour.waypoints[0].number, 3);
        assert_eq!(tour.waypoints.len(), 5);
    }

    #[test]
    fn fewer_than_two_waypoints_is_invalid() {
        let err = solve_roundtrip(
            SolverInput::new(vec![Waypoint::new(0, "base", 0.0, 0.0)], 0),
            SolverOptions::default(),
        )
        .expect_err("too small");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn out_of_range_base_index_is_invalid() {
        let err = solve_roundtrip(SolverInput::new(unit_grid(), 4), SolverOptions::default())
            .expect_err("bad base");
        assert!(err.to_string().contains("base index 4 out of range"));
    }

    #[test]
    fn invalid_coordinates_are_rejected() {
        let mut waypoints = unit_grid();
        waypoints[2].lat = 120.0;
        let err = solve_roundtrip(SolverInput::new(waypoints, 0), SolverOptions::default())
            .expect_err("bad point");
        assert!(err.to_string().contains("invalid lat/lng"));
    }

    #[test]
    fn oversized_worker_requests_are_clamped() {
        // 4 waypoints cap the pool at 2 workers; the solve must still succeed
        let tour = solve_roundtrip(
            SolverInput::new(unit_grid(), 0),
            options_with_workers(64),
        )
        .expect("solve");
        assert!(tour.length_m > 0.0);
    }

    #[test]
    fn observer_sees_at_least_one_local_best() {
        #[derive(Default)]
        struct Counting {
            local_best: AtomicUsize,
        }
        impl ProgressObserver for Counting {
            fn on_local_best(&self, _partition: usize, _length_m: f64, _order: &[usize]) {
                self.local_best.fetch_add(1, Ordering::Relaxed);
            }
        }

        let observer = Counting::default();
        solve_roundtrip_with_observer(
            SolverInput::new(unit_grid(), 0),
            options_with_workers(2),
            &observer,
        )
        .expect("solve");

        assert!(observer.local_best.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn default_worker_count_respects_the_waypoint_cap() {
        assert_eq!(default_worker_count(2), 1);
        assert!(default_worker_count(100) >= 1);
        assert!(default_worker_count(6) <= 3);
    }
}

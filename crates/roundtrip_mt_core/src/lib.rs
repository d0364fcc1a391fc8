//! Exact shortest-round-trip (closed tour) search over geographic waypoints.
//! Exhaustively enumerates orderings of the non-base waypoints, split into
//! disjoint permutation-rank ranges that run on a pool of parallel workers.

mod algo;
mod error;
mod io;
pub mod logging;
mod permutation;
pub mod progress;
mod tour;
mod waypoint;

pub(crate) use io::options;

pub use algo::partition::{PartitionPlan, plan_partitions};
pub use algo::search::{SearchPartition, SearchResult};
pub use algo::solver::{default_worker_count, solve_roundtrip, solve_roundtrip_with_observer};
pub use error::{Error, Result};
pub use io::input::{RecordDiagnostic, SolverInput, parse_waypoints};
pub use io::options::{LogFormat, LogLevel, SolverOptions};
pub use permutation::{MAX_INTERIOR_WAYPOINTS, Permutation, factorial};
pub use tour::{Tour, TourMetrics, cycle_length, cycle_length_indexed};
pub use waypoint::Waypoint;

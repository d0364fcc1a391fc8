use crate::waypoint::Waypoint;

/// Total length of the closed tour visiting `waypoints` in order, including
/// the wrap-around edge back to the first. Zero for fewer than two stops.
pub fn cycle_length(waypoints: &[Waypoint]) -> f64 {
    let n = waypoints.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| waypoints[i].distance_to(&waypoints[(i + 1) % n]))
        .sum()
}

/// Closed-tour length over an index ordering into `waypoints`. The hot path:
/// the search loop measures candidates without cloning a single waypoint.
pub fn cycle_length_indexed(waypoints: &[Waypoint], order: &[usize]) -> f64 {
    let n = order.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| waypoints[order[i]].distance_to(&waypoints[order[(i + 1) % n]]))
        .sum()
}

/// A solved closed tour. `waypoints` starts at the base; the closing edge
/// back to the base is implicit.
#[derive(Clone, Debug)]
pub struct Tour {
    pub waypoints: Vec<Waypoint>,
    pub length_m: f64,
}

impl Tour {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        let length_m = cycle_length(&waypoints);
        Self {
            waypoints,
            length_m,
        }
    }

    /// The tour as written to output: base first and repeated at the end.
    pub fn closed(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().chain(self.waypoints.first())
    }

    pub fn metrics(&self, threshold_factor: f64) -> TourMetrics {
        let n = self.waypoints.len();

        if n < 2 {
            log::info!("metrics: n < 2 so there's nothing to report");
            return TourMetrics::default();
        }

        let distances: Vec<f64> = (0..n)
            .map(|i| self.waypoints[i].distance_to(&self.waypoints[(i + 1) % n]))
            .collect();
        let total: f64 = distances.iter().sum();
        let average = total / (n as f64);
        let threshold = average * threshold_factor;
        let outliers = distances.iter().filter(|d| **d > threshold).count();
        let longest = distances.iter().copied().fold(0.0_f64, f64::max);

        log::info!(
            "metrics: n={n} total_m={total:.0} longest_m={longest:.0} avg_m={average:.0} outlier_threshold_m={threshold:.0} outliers={outliers}",
        );

        TourMetrics {
            longest,
            outliers,
            total,
            average,
            threshold,
        }
    }
}

#[derive(Debug, Default)]
pub struct TourMetrics {
    pub longest: f64,
    pub outliers: usize,
    pub total: f64,
    pub average: f64,
    pub threshold: f64,
}

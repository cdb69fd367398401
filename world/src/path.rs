//! Polyline path enemies follow from the spawn point to the base.

use glam::Vec2;

/// Ordered waypoints plus the cumulative distance reached at each one.
#[derive(Clone, Debug)]
pub(crate) struct PathModel {
    waypoints: Vec<Vec2>,
    offsets: Vec<f32>,
}

impl PathModel {
    pub(crate) fn new(waypoints: Vec<Vec2>) -> Self {
        let mut offsets = Vec::with_capacity(waypoints.len());
        let mut travelled = 0.0_f32;
        let mut previous: Option<Vec2> = None;
        for point in &waypoints {
            if let Some(previous) = previous {
                travelled += previous.distance(*point);
            }
            offsets.push(travelled);
            previous = Some(*point);
        }

        Self { waypoints, offsets }
    }

    pub(crate) fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Total distance from the first to the last waypoint.
    pub(crate) fn length(&self) -> f32 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    pub(crate) fn start(&self) -> Vec2 {
        self.waypoints.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Interpolates the position reached after travelling `distance`.
    ///
    /// The lookup is driven by cumulative distance, so an advance that spans
    /// one or more waypoints lands on the correct later segment instead of
    /// stopping at the corner.
    pub(crate) fn point_at(&self, distance: f32) -> Vec2 {
        let Some(last) = self.waypoints.last().copied() else {
            return Vec2::ZERO;
        };
        if distance <= 0.0 {
            return self.start();
        }
        if distance >= self.length() {
            return last;
        }

        // offsets[0] == 0 < distance < offsets[last], so 1 <= upper <= last.
        let upper = self.offsets.partition_point(|offset| *offset <= distance);
        let lower = upper - 1;
        let span = self.offsets[upper] - self.offsets[lower];
        if span <= f32::EPSILON {
            return self.waypoints[upper];
        }

        let fraction = (distance - self.offsets[lower]) / span;
        self.waypoints[lower].lerp(self.waypoints[upper], fraction)
    }

    /// Shortest distance from `point` to any segment of the path.
    pub(crate) fn clearance(&self, point: Vec2) -> f32 {
        match self.waypoints.as_slice() {
            [] => f32::INFINITY,
            [only] => point.distance(*only),
            points => points
                .windows(2)
                .map(|segment| distance_to_segment(point, segment[0], segment[1]))
                .fold(f32::INFINITY, f32::min),
        }
    }
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let along = end - start;
    let length_sq = along.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(start);
    }

    let t = ((point - start).dot(along) / length_sq).clamp(0.0, 1.0);
    point.distance(start + along * t)
}

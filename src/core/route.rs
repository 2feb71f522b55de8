use std::{fs::File, io::Read, path::Path};

use itertools::Itertools;
use serde::Deserialize;

use crate::{prelude::*, quantity::mechanics::Metres};

/// Stretch of road starting at [`Segment::start`] and ending at the next segment start.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    /// Distance from the route start.
    pub start: Metres,

    /// Heading in radians, clockwise from north.
    pub heading: f64,

    /// Road incline in radians, positive uphill.
    pub incline: f64,

    /// Index of the weather station covering the segment.
    pub weather_station: usize,
}

/// Route CSV row.
#[derive(Deserialize)]
struct Record {
    #[serde(rename = "distance")]
    distance_metres: f64,

    #[serde(rename = "heading")]
    heading_degrees: f64,

    #[serde(rename = "incline")]
    incline_degrees: f64,

    weather_station: usize,

    #[serde(default)]
    control_stop: bool,
}

#[must_use]
#[derive(Clone, Debug)]
pub struct Route {
    segments: Vec<Segment>,
    total_distance: Metres,

    /// Sorted control stop positions.
    control_stops: Vec<Metres>,
}

impl Route {
    pub fn try_new(
        segments: Vec<Segment>,
        total_distance: Metres,
        mut control_stops: Vec<Metres>,
    ) -> Result<Self> {
        let first = segments.first().context("the route has no segments")?;
        ensure!(first.start == Metres::ZERO, "the route must start at zero, got {}", first.start);
        for (left, right) in segments.iter().tuple_windows() {
            ensure!(
                left.start < right.start,
                "segment distances must be strictly increasing: {} followed by {}",
                left.start,
                right.start,
            );
        }
        let last = segments.last().context("the route has no segments")?;
        ensure!(
            total_distance > last.start,
            "the finish ({total_distance}) must be past the last segment start ({})",
            last.start,
        );
        control_stops.sort_unstable();
        Ok(Self { segments, total_distance, control_stops })
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
        Self::from_reader(file).with_context(|| format!("failed to load `{}`", path.display()))
    }

    /// Read the route CSV: each row starts a segment, the last row marks the finish.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let records: Vec<Record> =
            csv::Reader::from_reader(reader).deserialize().collect::<Result<_, _>>()?;
        let (finish, rows) = records.split_last().context("the route file is empty")?;
        let segments = rows
            .iter()
            .map(|record| Segment {
                start: Metres(record.distance_metres),
                heading: record.heading_degrees.to_radians(),
                incline: record.incline_degrees.to_radians(),
                weather_station: record.weather_station,
            })
            .collect_vec();
        let control_stops = records
            .iter()
            .filter(|record| record.control_stop)
            .map(|record| Metres(record.distance_metres))
            .collect_vec();
        let this = Self::try_new(segments, Metres(finish.distance_metres), control_stops)?;
        info!(
            n_segments = this.segments.len(),
            n_control_stops = this.control_stops.len(),
            total_distance = %this.total_distance,
            "loaded the route",
        );
        Ok(this)
    }

    pub const fn total_distance(&self) -> Metres {
        self.total_distance
    }

    /// Index of the segment containing the distance, clamped to the first and last segments.
    #[must_use]
    pub fn segment_index_at(&self, distance: Metres) -> usize {
        self.segments
            .partition_point(|segment| segment.start <= distance)
            .saturating_sub(1)
    }

    pub fn segment_at(&self, distance: Metres) -> &Segment {
        &self.segments[self.segment_index_at(distance)]
    }

    /// Where the segment containing the distance ends.
    pub fn segment_end_at(&self, distance: Metres) -> Metres {
        self.segments
            .get(self.segment_index_at(distance) + 1)
            .map_or(self.total_distance, |next| next.start)
    }

    /// Check whether a step over `(from, to]` passes a control stop.
    #[must_use]
    pub fn crosses_control_stop(&self, from: Metres, to: Metres) -> bool {
        let next_stop = self.control_stops.partition_point(|stop| *stop <= from);
        self.control_stops.get(next_stop).is_some_and(|stop| *stop <= to)
    }

    /// Highest weather station index referenced by the route.
    #[must_use]
    pub fn max_weather_station(&self) -> usize {
        self.segments.iter().map(|segment| segment.weather_station).max().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const CSV: &str = "\
distance,heading,incline,weather_station,control_stop
0,90,0,0,false
1000,180,2,0,true
2500,180,-1,1,false
4000,0,0,1,true
";

    fn route() -> Route {
        Route::from_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn load_csv() {
        let route = route();
        assert_eq!(route.segments.len(), 3);
        assert_eq!(route.total_distance(), Metres(4000.0));
        assert_eq!(route.control_stops, [Metres(1000.0), Metres(4000.0)]);
        assert_abs_diff_eq!(route.segments[0].heading, std::f64::consts::FRAC_PI_2);
        assert_abs_diff_eq!(route.segments[1].incline, 2.0_f64.to_radians());
        assert_eq!(route.max_weather_station(), 1);
    }

    #[test]
    fn segment_lookup() {
        let route = route();
        assert_eq!(route.segment_index_at(Metres(0.0)), 0);
        assert_eq!(route.segment_index_at(Metres(999.9)), 0);
        assert_eq!(route.segment_index_at(Metres(1000.0)), 1);
        assert_eq!(route.segment_index_at(Metres(3999.0)), 2);
    }

    #[test]
    fn segment_lookup_is_clamped() {
        let route = route();
        assert_eq!(route.segment_index_at(Metres(10_000.0)), 2);
        assert_eq!(route.segment_index_at(Metres(-5.0)), 0);
    }

    #[test]
    fn segment_end() {
        let route = route();
        assert_eq!(route.segment_end_at(Metres(500.0)), Metres(1000.0));
        assert_eq!(route.segment_end_at(Metres(1000.0)), Metres(2500.0));
        assert_eq!(route.segment_end_at(Metres(3000.0)), Metres(4000.0));
    }

    #[test]
    fn control_stop_crossing() {
        let route = route();
        assert!(route.crosses_control_stop(Metres(900.0), Metres(1000.0)));
        assert!(!route.crosses_control_stop(Metres(1000.0), Metres(1100.0)));
        assert!(!route.crosses_control_stop(Metres(0.0), Metres(999.0)));
        assert!(route.crosses_control_stop(Metres(0.0), Metres(4000.0)));
    }

    #[test]
    fn non_increasing_distances() {
        let csv = "distance,heading,incline,weather_station\n0,0,0,0\n100,0,0,0\n100,0,0,0\n";
        assert!(Route::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn single_row_has_no_segments() {
        let csv = "distance,heading,incline,weather_station\n0,0,0,0\n";
        assert!(Route::from_reader(csv.as_bytes()).is_err());
    }
}

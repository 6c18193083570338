//! Collision View Functions
//! Pure filter/aggregate functions backing each dashboard visualization.
//! Every function derives a new frame or owned summary; the input table is
//! never mutated.

use polars::prelude::*;
use thiserror::Error;

use super::loader::{
    CYCLISTS_INJURED, DATE_TIME, LATITUDE, LONGITUDE, MOTORISTS_INJURED, ON_STREET_NAME,
    PEDESTRIANS_INJURED, PERSONS_INJURED, PERSONS_KILLED,
};

/// Ranking length for the dangerous-streets view.
pub const TOP_STREET_COUNT: usize = 5;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Person category used to rank streets by injury count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffectedType {
    Pedestrians,
    Cyclists,
    Motorists,
}

impl AffectedType {
    pub const ALL: [AffectedType; 3] = [
        AffectedType::Pedestrians,
        AffectedType::Cyclists,
        AffectedType::Motorists,
    ];

    /// Count column backing this category.
    pub fn count_column(self) -> &'static str {
        match self {
            AffectedType::Pedestrians => PEDESTRIANS_INJURED,
            AffectedType::Cyclists => CYCLISTS_INJURED,
            AffectedType::Motorists => MOTORISTS_INJURED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AffectedType::Pedestrians => "Pedestrians",
            AffectedType::Cyclists => "Cyclists",
            AffectedType::Motorists => "Motorists",
        }
    }
}

/// One street in the danger ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreetRanking {
    pub street: String,
    pub injured: i64,
}

fn hour_component() -> Expr {
    col(DATE_TIME).dt().hour().cast(DataType::Int32)
}

/// (latitude, longitude) pairs of a table, rows with a missing coordinate
/// skipped.
pub fn coordinates(table: &DataFrame) -> Result<Vec<(f64, f64)>, ViewError> {
    let coords = table
        .clone()
        .lazy()
        .select([col(LATITUDE), col(LONGITUDE)])
        .drop_nulls(None)
        .collect()?;

    let lat = coords.column(LATITUDE)?.f64()?;
    let lon = coords.column(LONGITUDE)?.f64()?;
    let mut points = Vec::with_capacity(coords.height());
    for i in 0..coords.height() {
        if let (Some(lat), Some(lon)) = (lat.get(i), lon.get(i)) {
            points.push((lat, lon));
        }
    }
    Ok(points)
}

/// (latitude, longitude) pairs for rows with at least `min_injured` persons
/// injured. Order is not significant; rendered as a point cloud.
pub fn points_above_threshold(
    table: &DataFrame,
    min_injured: i64,
) -> Result<Vec<(f64, f64)>, ViewError> {
    let filtered = table
        .clone()
        .lazy()
        .filter(col(PERSONS_INJURED).gt_eq(lit(min_injured)))
        .collect()?;
    coordinates(&filtered)
}

/// Rows whose timestamp falls in the given clock hour (exact hour component,
/// not a rolling window). Rows without a parseable timestamp never match.
pub fn hour_slice(table: &DataFrame, hour: u8) -> Result<DataFrame, ViewError> {
    Ok(table
        .clone()
        .lazy()
        .filter(hour_component().eq(lit(hour as i32)))
        .collect()?)
}

/// Arithmetic mean (latitude, longitude) of a table, or `None` when the table
/// is empty. Callers must handle `None` instead of feeding NaN to a renderer.
pub fn mean_center(table: &DataFrame) -> Result<Option<(f64, f64)>, ViewError> {
    if table.height() == 0 {
        return Ok(None);
    }
    let lat = table.column(LATITUDE)?.f64()?.mean();
    let lon = table.column(LONGITUDE)?.f64()?.mean();
    Ok(lat.zip(lon))
}

/// Counts of collisions per minute within the half-open interval
/// `[hour, hour + 1)` by hour component. Bins with no events stay 0.
pub fn minute_histogram(table: &DataFrame, hour: u8) -> Result<[u32; 60], ViewError> {
    let filtered = table
        .clone()
        .lazy()
        .filter(
            hour_component()
                .gt_eq(lit(hour as i32))
                .and(hour_component().lt(lit(hour as i32 + 1))),
        )
        .select([col(DATE_TIME)
            .dt()
            .minute()
            .cast(DataType::UInt32)
            .alias("minute")])
        .collect()?;

    let minutes = filtered.column("minute")?.u32()?;
    let mut bins = [0u32; 60];
    for i in 0..filtered.height() {
        if let Some(minute) = minutes.get(i) {
            if let Some(bin) = bins.get_mut(minute as usize) {
                *bin += 1;
            }
        }
    }
    Ok(bins)
}

/// Up to [`TOP_STREET_COUNT`] streets ranked by the selected injury count,
/// descending. Rows missing the street name or the count are excluded; ties
/// keep input order. Operates on the hour-unfiltered table.
pub fn top_streets(
    table: &DataFrame,
    affected: AffectedType,
) -> Result<Vec<StreetRanking>, ViewError> {
    let count_col = affected.count_column();
    let ranked = table
        .clone()
        .lazy()
        .filter(col(count_col).gt_eq(lit(1)))
        .select([col(ON_STREET_NAME), col(count_col)])
        .drop_nulls(None)
        .sort_by_exprs(
            [col(count_col)],
            SortMultipleOptions {
                descending: vec![true],
                maintain_order: true,
                ..Default::default()
            },
        )
        .limit(TOP_STREET_COUNT as IdxSize)
        .collect()?;

    let streets = ranked.column(ON_STREET_NAME)?.str()?;
    let counts = ranked.column(count_col)?.cast(&DataType::Int64)?;
    let counts = counts.i64()?;
    let mut rankings = Vec::with_capacity(ranked.height());
    for i in 0..ranked.height() {
        if let (Some(street), Some(injured)) = (streets.get(i), counts.get(i)) {
            rankings.push(StreetRanking {
                street: street.to_string(),
                injured,
            });
        }
    }
    Ok(rankings)
}

/// Minimum and maximum timestamp year present in the table, or `None` when the
/// table is empty or holds no parseable timestamps. Derived from the
/// hour-unfiltered table; the year control clamps to this interval.
pub fn year_range(table: &DataFrame) -> Result<Option<(i32, i32)>, ViewError> {
    let bounds = table
        .clone()
        .lazy()
        .select([
            col(DATE_TIME).dt().year().min().alias("min_year"),
            col(DATE_TIME).dt().year().max().alias("max_year"),
        ])
        .collect()?;

    let min_year = bounds.column("min_year")?.i32()?.get(0);
    let max_year = bounds.column("max_year")?.i32()?.get(0);
    Ok(min_year.zip(max_year))
}

/// Rows with a recorded fatality count in the selected year, ascending by
/// timestamp. Missing counts are dropped (absent, not zero); operates on the
/// hour-unfiltered table.
pub fn killed_in_year(table: &DataFrame, year: i32) -> Result<DataFrame, ViewError> {
    Ok(table
        .clone()
        .lazy()
        .select([col(PERSONS_KILLED), col(DATE_TIME)])
        .drop_nulls(None)
        .sort_by_exprs([col(DATE_TIME)], SortMultipleOptions::default())
        .filter(col(DATE_TIME).dt().year().eq(lit(year)))
        .collect()?)
}

/// Total persons killed in a frame produced by [`killed_in_year`].
pub fn fatality_total(frame: &DataFrame) -> Result<i64, ViewError> {
    let killed = frame.column(PERSONS_KILLED)?.cast(&DataType::Int64)?;
    Ok(killed.i64()?.sum().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    /// Table with the canonical columns, timestamps given in epoch millis.
    fn table(rows: &[(Option<i64>, Option<f64>, Option<f64>, Option<i64>)]) -> DataFrame {
        let times: Vec<Option<i64>> = rows.iter().map(|r| r.0).collect();
        let lats: Vec<Option<f64>> = rows.iter().map(|r| r.1).collect();
        let lons: Vec<Option<f64>> = rows.iter().map(|r| r.2).collect();
        let injured: Vec<Option<i64>> = rows.iter().map(|r| r.3).collect();

        df!(
            DATE_TIME => times,
            LATITUDE => lats,
            LONGITUDE => lons,
            PERSONS_INJURED => injured,
        )
        .unwrap()
        .lazy()
        .with_columns([col(DATE_TIME).cast(DataType::Datetime(TimeUnit::Milliseconds, None))])
        .collect()
        .unwrap()
    }

    #[test]
    fn points_respect_threshold_and_shrink_as_it_rises() {
        let t = table(&[
            (Some(ts(2019, 9, 21, 13, 5)), Some(40.7), Some(-73.9), Some(0)),
            (Some(ts(2019, 9, 21, 13, 6)), Some(40.8), Some(-73.8), Some(2)),
            (Some(ts(2019, 9, 21, 14, 0)), Some(40.6), Some(-74.0), Some(5)),
        ]);

        let mut previous = usize::MAX;
        for min_injured in 0..=19 {
            let points = points_above_threshold(&t, min_injured).unwrap();
            assert!(points.len() <= previous);
            previous = points.len();
        }

        let points = points_above_threshold(&t, 2).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.contains(&(40.8, -73.8)));
        assert!(points.contains(&(40.6, -74.0)));
    }

    #[test]
    fn missing_injury_count_is_not_zero() {
        let t = table(&[
            (Some(ts(2019, 9, 21, 13, 5)), Some(40.7), Some(-73.9), None),
            (Some(ts(2019, 9, 21, 13, 6)), Some(40.8), Some(-73.8), Some(0)),
        ]);

        // At threshold 0 the absent count must not qualify.
        let points = points_above_threshold(&t, 0).unwrap();
        assert_eq!(points, vec![(40.8, -73.8)]);
    }

    #[test]
    fn hour_slice_matches_exact_hour() {
        let t = table(&[
            (Some(ts(2019, 9, 21, 13, 5)), Some(40.7), Some(-73.9), Some(1)),
            (Some(ts(2019, 9, 21, 13, 47)), Some(40.8), Some(-73.8), Some(1)),
            (Some(ts(2019, 9, 21, 14, 0)), Some(40.6), Some(-74.0), Some(1)),
            (None, Some(40.5), Some(-74.1), Some(1)),
        ]);

        let slice = hour_slice(&t, 13).unwrap();
        assert_eq!(slice.height(), 2);
        assert_eq!(hour_slice(&t, 3).unwrap().height(), 0);
    }

    #[test]
    fn mean_center_guards_empty_input() {
        let t = table(&[
            (Some(ts(2019, 9, 21, 13, 5)), Some(40.0), Some(-73.0), Some(1)),
            (Some(ts(2019, 9, 21, 13, 6)), Some(41.0), Some(-75.0), Some(1)),
        ]);

        let center = mean_center(&t).unwrap().unwrap();
        assert!((center.0 - 40.5).abs() < 1e-9);
        assert!((center.1 + 74.0).abs() < 1e-9);

        let empty = hour_slice(&t, 3).unwrap();
        assert_eq!(mean_center(&empty).unwrap(), None);
    }

    #[test]
    fn minute_histogram_bins_sum_to_slice_size() {
        let t = table(&[
            (Some(ts(2019, 9, 21, 13, 5)), Some(40.7), Some(-73.9), Some(1)),
            (Some(ts(2019, 9, 21, 13, 5)), Some(40.8), Some(-73.8), Some(1)),
            (Some(ts(2019, 9, 21, 13, 47)), Some(40.6), Some(-74.0), Some(1)),
            (Some(ts(2019, 9, 21, 14, 2)), Some(40.5), Some(-74.1), Some(1)),
        ]);

        let bins = minute_histogram(&t, 13).unwrap();
        assert_eq!(bins.len(), 60);
        assert_eq!(bins[5], 2);
        assert_eq!(bins[47], 1);
        assert_eq!(bins.iter().sum::<u32>(), 3);
        assert_eq!(
            bins.iter().sum::<u32>() as usize,
            hour_slice(&t, 13).unwrap().height()
        );

        let empty = minute_histogram(&t, 3).unwrap();
        assert!(empty.iter().all(|&count| count == 0));
    }

    fn street_table(rows: &[(Option<&str>, Option<i64>)]) -> DataFrame {
        let streets: Vec<Option<&str>> = rows.iter().map(|r| r.0).collect();
        let counts: Vec<Option<i64>> = rows.iter().map(|r| r.1).collect();
        df!(
            ON_STREET_NAME => streets,
            PEDESTRIANS_INJURED => counts,
        )
        .unwrap()
    }

    #[test]
    fn top_streets_ranks_descending_without_grouping() {
        let t = street_table(&[
            (Some("MAIN ST"), Some(3)),
            (Some("OAK AVE"), None),
            (Some("MAIN ST"), Some(1)),
            (None, Some(7)),
            (Some("BROADWAY"), Some(0)),
        ]);

        let ranked = top_streets(&t, AffectedType::Pedestrians).unwrap();
        assert_eq!(
            ranked,
            vec![
                StreetRanking {
                    street: "MAIN ST".to_string(),
                    injured: 3
                },
                StreetRanking {
                    street: "MAIN ST".to_string(),
                    injured: 1
                },
            ]
        );
    }

    #[test]
    fn top_streets_truncates_to_five() {
        let rows: Vec<(Option<&str>, Option<i64>)> = (0..8)
            .map(|i| (Some(["A", "B", "C", "D", "E", "F", "G", "H"][i]), Some(i as i64 + 1)))
            .collect();
        let t = street_table(&rows);

        let ranked = top_streets(&t, AffectedType::Pedestrians).unwrap();
        assert_eq!(ranked.len(), TOP_STREET_COUNT);
        assert!(ranked.windows(2).all(|w| w[0].injured >= w[1].injured));
        assert!(ranked.iter().all(|r| r.injured >= 1));
    }

    #[test]
    fn top_streets_empty_input_is_empty_not_error() {
        let t = street_table(&[]);
        assert!(top_streets(&t, AffectedType::Pedestrians).unwrap().is_empty());
    }

    fn fatality_table(rows: &[(Option<i64>, Option<i64>)]) -> DataFrame {
        let times: Vec<Option<i64>> = rows.iter().map(|r| r.0).collect();
        let killed: Vec<Option<i64>> = rows.iter().map(|r| r.1).collect();
        df!(
            DATE_TIME => times,
            PERSONS_KILLED => killed,
        )
        .unwrap()
        .lazy()
        .with_columns([col(DATE_TIME).cast(DataType::Datetime(TimeUnit::Milliseconds, None))])
        .collect()
        .unwrap()
    }

    #[test]
    fn year_range_matches_data() {
        let t = fatality_table(&[
            (Some(ts(2018, 3, 1, 8, 0)), Some(0)),
            (Some(ts(2021, 7, 4, 22, 30)), Some(1)),
            (Some(ts(2019, 1, 15, 6, 45)), Some(2)),
        ]);
        assert_eq!(year_range(&t).unwrap(), Some((2018, 2021)));

        let empty = fatality_table(&[]);
        assert_eq!(year_range(&empty).unwrap(), None);

        let unparsed = fatality_table(&[(None, Some(1))]);
        assert_eq!(year_range(&unparsed).unwrap(), None);
    }

    #[test]
    fn killed_in_year_sorts_and_drops_missing() {
        let t = fatality_table(&[
            (Some(ts(2019, 6, 2, 9, 0)), Some(1)),
            (Some(ts(2019, 1, 15, 6, 45)), Some(2)),
            (Some(ts(2019, 3, 3, 12, 0)), None),
            (Some(ts(2020, 3, 3, 12, 0)), Some(4)),
        ]);

        let frame = killed_in_year(&t, 2019).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.column(PERSONS_KILLED).unwrap().null_count(), 0);

        let times = frame
            .column(DATE_TIME)
            .unwrap()
            .cast(&DataType::Int64)
            .unwrap();
        let times = times.i64().unwrap();
        assert!(times.get(0).unwrap() <= times.get(1).unwrap());

        assert_eq!(fatality_total(&frame).unwrap(), 3);
        assert_eq!(killed_in_year(&t, 1999).unwrap().height(), 0);
    }
}

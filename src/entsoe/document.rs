//! `GL_MarketDocument` / `Acknowledgement_MarketDocument` parsing.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use quick_xml::{events::Event, name::LocalName, Reader};
use std::collections::BTreeMap;

use crate::domain::sources::psr_label;
use crate::domain::table::TimeSeriesTable;
use crate::error::{ForecastError, Result};
use crate::forecast::AGGREGATED_COLUMN;

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub position: u32,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub resolution_minutes: i64,
    pub points: Vec<Point>,
}

impl Period {
    /// Instant of each point; positions are 1-based.
    pub fn samples(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.points.iter().map(move |p| {
            let offset = Duration::minutes(self.resolution_minutes * (i64::from(p.position) - 1));
            (self.start + offset, p.quantity)
        })
    }
}

/// One `TimeSeries` element of a market document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationSeries {
    pub psr_type: Option<String>,
    /// Series reported against `outBiddingZone_Domain` measure consumption.
    pub consumption: bool,
    pub periods: Vec<Period>,
}

impl GenerationSeries {
    /// Column label: the production type, or the aggregate label when none is given.
    pub fn label(&self) -> String {
        match self.psr_type.as_deref() {
            Some(code) => psr_label(code).map(str::to_string).unwrap_or_else(|| code.to_string()),
            None => AGGREGATED_COLUMN.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct PendingPeriod {
    start: Option<DateTime<Utc>>,
    resolution_minutes: Option<i64>,
    points: Vec<Point>,
}

#[derive(Debug, Default)]
struct PendingPoint {
    position: Option<u32>,
    quantity: Option<f64>,
}

fn tag_name(name: LocalName<'_>) -> String {
    String::from_utf8_lossy(name.as_ref()).into_owned()
}

fn xml_error(err: quick_xml::Error) -> ForecastError {
    ForecastError::Parse(format!("malformed market document: {err}"))
}

/// `2023-08-15T22:00Z` style instants.
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%MZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ForecastError::Parse(format!("invalid instant '{text}': {e}")))
}

/// ISO-8601 `PTnM` / `PTnH` resolution in minutes.
pub fn parse_resolution(text: &str) -> Result<i64> {
    let invalid = || ForecastError::Parse(format!("unsupported resolution '{text}'"));
    let body = text.trim().strip_prefix("PT").ok_or_else(invalid)?;
    let (amount, factor) = if let Some(minutes) = body.strip_suffix('M') {
        (minutes, 1)
    } else if let Some(hours) = body.strip_suffix('H') {
        (hours, 60)
    } else {
        return Err(invalid());
    };
    let amount: i64 = amount.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }
    Ok(amount * factor)
}

/// Parses a market document into its time series. An acknowledgement document
/// (the platform's way of reporting "no data" and request errors) becomes
/// `RemoteFetch` carrying the reason text.
pub fn parse_document(xml: &str) -> Result<Vec<GenerationSeries>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut series = Vec::new();
    let mut current_series: Option<GenerationSeries> = None;
    let mut current_period: Option<PendingPeriod> = None;
    let mut current_point: Option<PendingPoint> = None;
    let mut acknowledgement = false;
    let mut reasons: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(e.local_name());
                match tag.as_str() {
                    "Acknowledgement_MarketDocument" => acknowledgement = true,
                    "TimeSeries" => current_series = Some(GenerationSeries::default()),
                    "Period" if current_series.is_some() => {
                        current_period = Some(PendingPeriod::default())
                    }
                    "Point" if current_period.is_some() => {
                        current_point = Some(PendingPoint::default())
                    }
                    "outBiddingZone_Domain.mRID" => {
                        if let Some(s) = current_series.as_mut() {
                            s.consumption = true;
                        }
                    }
                    _ => {}
                }
                path.push(tag);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(xml_error)?;
                let text = text.trim();
                let Some(tag) = path.last().map(String::as_str) else {
                    continue;
                };
                let parent = path.len().checked_sub(2).map(|i| path[i].as_str());
                match tag {
                    "text" if acknowledgement => reasons.push(text.to_string()),
                    "psrType" => {
                        if let Some(s) = current_series.as_mut() {
                            s.psr_type = Some(text.to_string());
                        }
                    }
                    "start" if parent == Some("timeInterval") => {
                        if let Some(p) = current_period.as_mut() {
                            p.start = Some(parse_instant(text)?);
                        }
                    }
                    "resolution" => {
                        if let Some(p) = current_period.as_mut() {
                            p.resolution_minutes = Some(parse_resolution(text)?);
                        }
                    }
                    "position" => {
                        if let Some(p) = current_point.as_mut() {
                            p.position = Some(text.parse().map_err(|_| {
                                ForecastError::Parse(format!("invalid position '{text}'"))
                            })?);
                        }
                    }
                    "quantity" => {
                        if let Some(p) = current_point.as_mut() {
                            p.quantity = Some(text.parse().map_err(|_| {
                                ForecastError::Parse(format!("invalid quantity '{text}'"))
                            })?);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let tag = tag_name(e.local_name());
                match tag.as_str() {
                    "Point" => {
                        if let (Some(point), Some(period)) =
                            (current_point.take(), current_period.as_mut())
                        {
                            if let (Some(position), Some(quantity)) = (point.position, point.quantity) {
                                period.points.push(Point { position, quantity });
                            }
                        }
                    }
                    "Period" => {
                        if let (Some(period), Some(s)) = (current_period.take(), current_series.as_mut())
                        {
                            let (Some(start), Some(resolution_minutes)) =
                                (period.start, period.resolution_minutes)
                            else {
                                return Err(ForecastError::Parse(
                                    "period without start or resolution".into(),
                                ));
                            };
                            s.periods.push(Period {
                                start,
                                resolution_minutes,
                                points: period.points,
                            });
                        }
                    }
                    "TimeSeries" => {
                        if let Some(s) = current_series.take() {
                            series.push(s);
                        }
                    }
                    _ => {}
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(xml_error(err)),
            _ => {}
        }
    }

    if acknowledgement {
        let reason = if reasons.is_empty() {
            "acknowledgement without reason".to_string()
        } else {
            reasons.join("; ")
        };
        return Err(ForecastError::RemoteFetch(reason));
    }
    Ok(series)
}

/// Pivots parsed series into a table indexed by local time in `tz`.
/// Consumption series are skipped when `generation_only` is set.
pub fn series_to_table(series: &[GenerationSeries], tz: Tz, generation_only: bool) -> Result<TimeSeriesTable> {
    let selected: Vec<&GenerationSeries> = series
        .iter()
        .filter(|s| !(generation_only && s.consumption))
        .collect();

    let mut columns: Vec<String> = Vec::new();
    for s in &selected {
        let label = s.label();
        if !columns.contains(&label) {
            columns.push(label);
        }
    }

    let mut rows: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();
    for s in &selected {
        let label = s.label();
        let Some(idx) = columns.iter().position(|c| *c == label) else {
            continue;
        };
        for period in &s.periods {
            for (timestamp, quantity) in period.samples() {
                rows.entry(timestamp).or_insert_with(|| vec![None; columns.len()])[idx] =
                    Some(quantity);
            }
        }
    }

    let mut table = TimeSeriesTable::new(columns);
    for (timestamp, values) in rows {
        table.push(timestamp.with_timezone(&tz), values)?;
    }
    Ok(table)
}

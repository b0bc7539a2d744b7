//! Readers for the simulation event log and the link network.
//!
//! Two formats are understood, chosen by file extension:
//!
//! - XML (`.xml`, `.xml.gz`): the simulation's own `output_events.xml` and
//!   `output_network.xml`.
//! - CSV (anything else): event columns `time,type,id,link,mode` and network
//!   columns `link_id,length`.
//!
//! Event types other than `entered link`, `left link`, `departure` and
//! `arrival` are skipped.

mod delimited;
mod xml;

pub use delimited::{CsvEventReader, parse_network_csv};
pub use xml::{XmlEventReader, parse_network_xml};

use std::io::{BufReader, Read};

use anyhow::{Context, Result, anyhow, bail};
use chrono::TimeDelta;
use serde::Deserialize;
use tracing::debug;

use crate::events::Event;
use crate::network::Network;

/// On-disk format of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xml,
}

impl InputFormat {
    /// Picks the format from a path or URL, ignoring a `.gz` suffix and any
    /// query string.
    pub fn from_source(source: &str) -> Self {
        let path = source.split(['?', '#']).next().unwrap_or(source);
        let path = path.strip_suffix(".gz").unwrap_or(path);

        if path.ends_with(".xml") {
            InputFormat::Xml
        } else {
            InputFormat::Csv
        }
    }
}

/// One raw event, before it is checked and typed.
///
/// `id` is the vehicle for link events and the person for trip events.
#[derive(Debug, Deserialize)]
struct EventRow {
    time: String,
    #[serde(rename = "type")]
    kind: String,
    id: Option<String>,
    link: Option<String>,
    mode: Option<String>,
}

/// Streams events out of a log in either format.
pub enum EventStream<R: Read> {
    Csv(CsvEventReader<R>),
    Xml(XmlEventReader<BufReader<R>>),
}

impl<R: Read> EventStream<R> {
    /// Entries whose event type is not tracked.
    pub fn skipped(&self) -> u64 {
        match self {
            EventStream::Csv(reader) => reader.skipped(),
            EventStream::Xml(reader) => reader.skipped(),
        }
    }
}

impl<R: Read> Iterator for EventStream<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            EventStream::Csv(reader) => reader.next(),
            EventStream::Xml(reader) => reader.next(),
        }
    }
}

/// Opens an event log in `format`.
pub fn read_events<R: Read>(source: R, format: InputFormat) -> Result<EventStream<R>> {
    Ok(match format {
        InputFormat::Csv => EventStream::Csv(CsvEventReader::new(source)?),
        InputFormat::Xml => EventStream::Xml(XmlEventReader::new(BufReader::new(source))),
    })
}

/// Loads link lengths from a network in `format`.
pub fn read_network<R: Read>(source: R, format: InputFormat) -> Result<Network> {
    match format {
        InputFormat::Csv => parse_network_csv(source),
        InputFormat::Xml => parse_network_xml(BufReader::new(source)),
    }
}

fn to_event(row: EventRow) -> Result<Option<Event>> {
    let kind = row.kind.as_str();
    if !matches!(kind, "entered link" | "left link" | "departure" | "arrival") {
        debug!(kind, "Skipping untracked event type");
        return Ok(None);
    }

    let time = parse_time(&row.time)?;
    let id = row.id.ok_or_else(|| anyhow!("'{kind}' event without id"))?;

    let event = match kind {
        "entered link" => Event::LinkEnter {
            time,
            vehicle: id,
            link: row
                .link
                .ok_or_else(|| anyhow!("'{kind}' event without link"))?,
        },
        "left link" => Event::LinkLeave {
            time,
            vehicle: id,
            link: row
                .link
                .ok_or_else(|| anyhow!("'{kind}' event without link"))?,
        },
        "departure" => Event::PersonDeparture {
            time,
            person: id,
            mode: row
                .mode
                .ok_or_else(|| anyhow!("'{kind}' event without mode"))?,
        },
        _ => Event::PersonArrival {
            time,
            person: id,
            mode: row.mode,
        },
    };

    Ok(Some(event))
}

/// Parses an event time given as decimal seconds or `HH:MM:SS`.
///
/// Hours may exceed 23 for events after midnight of the simulated day.
pub fn parse_time(value: &str) -> Result<f64> {
    if let Ok(seconds) = value.parse::<f64>() {
        if !seconds.is_finite() {
            bail!("Non-finite time '{value}'");
        }
        return Ok(seconds);
    }

    let parts: Vec<&str> = value.split(':').collect();
    let [h, m, s] = parts.as_slice() else {
        bail!("Unrecognised time '{value}'");
    };

    let hours: i64 = h
        .parse()
        .with_context(|| format!("Invalid hours in time '{value}'"))?;
    let minutes: i64 = m
        .parse()
        .with_context(|| format!("Invalid minutes in time '{value}'"))?;
    let seconds: f64 = s
        .parse()
        .with_context(|| format!("Invalid seconds in time '{value}'"))?;
    if !(0..60).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        bail!("Out of range time '{value}'");
    }

    let millis = (seconds * 1000.0).round() as i64;
    let delta = TimeDelta::try_hours(hours)
        .and_then(|d| d.checked_add(&TimeDelta::minutes(minutes)))
        .and_then(|d| d.checked_add(&TimeDelta::milliseconds(millis)))
        .ok_or_else(|| anyhow!("Time '{value}' out of range"))?;

    Ok(delta.num_milliseconds() as f64 / 1000.0)
}

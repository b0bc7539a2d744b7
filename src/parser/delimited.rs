use std::io::Read;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;

use super::{EventRow, to_event};
use crate::events::Event;
use crate::network::Network;

#[derive(Debug, Deserialize)]
struct LinkRow {
    link_id: String,
    length: f64,
}

/// Streams [`Event`]s out of a CSV event log, one row at a time.
pub struct CsvEventReader<R: Read> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    record: StringRecord,
    skipped: u64,
}

impl<R: Read> CsvEventReader<R> {
    pub fn new(source: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);
        let headers = reader
            .headers()
            .context("Failed to read event log header")?
            .clone();

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
            skipped: 0,
        })
    }

    /// Rows whose event type is not tracked.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn next_row(&mut self) -> Result<Option<(u64, EventRow)>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        let line = self.record.position().map_or(0, |p| p.line());
        let row = self
            .record
            .deserialize(Some(&self.headers))
            .with_context(|| format!("Malformed event at line {line}"))?;
        Ok(Some((line, row)))
    }
}

impl<R: Read> Iterator for CsvEventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (line, row) = match self.next_row() {
                Ok(Some(next)) => next,
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            };

            match to_event(row) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => self.skipped += 1,
                Err(e) => return Some(Err(e.context(format!("Invalid event at line {line}")))),
            }
        }
    }
}

/// Loads link lengths from a `link_id,length` CSV.
pub fn parse_network_csv<R: Read>(source: R) -> Result<Network> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);
    let mut links = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let row: LinkRow =
            result.with_context(|| format!("Malformed network link at row {}", index + 1))?;
        links.push((row.link_id, row.length));
    }

    Ok(links.into_iter().collect())
}

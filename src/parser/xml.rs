//! Streaming readers for `output_events.xml` and `output_network.xml`.
//!
//! Only `<event>` and `<link>` elements are inspected; everything else in the
//! documents (nodes, attributes blocks, comments) is passed over.

use std::io::BufRead;

use anyhow::{Context, Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use super::{EventRow, to_event};
use crate::events::Event;
use crate::network::Network;

/// Streams [`Event`]s out of an XML event log, one `<event>` at a time.
pub struct XmlEventReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    skipped: u64,
}

impl<R: BufRead> XmlEventReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            skipped: 0,
        }
    }

    /// `<event>` elements whose type is not tracked.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn next_row(&mut self) -> Result<Option<EventRow>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                XmlEvent::Empty(e) | XmlEvent::Start(e) if e.name().as_ref() == b"event" => {
                    return event_row(&e).map(Some);
                }
                XmlEvent::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    fn locate(&self, error: anyhow::Error, what: &str) -> anyhow::Error {
        let position = self.reader.buffer_position();
        error.context(format!("{what} near byte {position}"))
    }
}

impl<R: BufRead> Iterator for XmlEventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => return None,
                Err(e) => return Some(Err(self.locate(e, "Malformed event"))),
            };

            match to_event(row) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => self.skipped += 1,
                Err(e) => return Some(Err(self.locate(e, "Invalid event"))),
            }
        }
    }
}

/// Collects the attributes of one `<event>` into a raw row.
///
/// Link events name their vehicle, trip events their person; the leg mode
/// comes from `legMode`.
fn event_row(element: &BytesStart) -> Result<EventRow> {
    let mut time = None;
    let mut kind = None;
    let mut vehicle = None;
    let mut person = None;
    let mut link = None;
    let mut mode = None;

    for attr in element.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"time" => time = Some(value),
            b"type" => kind = Some(value),
            b"vehicle" => vehicle = Some(value),
            b"person" => person = Some(value),
            b"link" => link = Some(value),
            b"legMode" => mode = Some(value),
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| anyhow!("<event> without type"))?;
    let id = if matches!(kind.as_str(), "entered link" | "left link") {
        vehicle
    } else {
        person
    };

    Ok(EventRow {
        time: time.unwrap_or_default(),
        kind,
        id,
        link,
        mode,
    })
}

/// Loads link lengths from the `<link id=".." length="..">` elements of a
/// network document.
pub fn parse_network_xml<R: BufRead>(source: R) -> Result<Network> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut links = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            XmlEvent::Empty(e) | XmlEvent::Start(e) if e.name().as_ref() == b"link" => {
                let position = reader.buffer_position();
                let link = link_length(&e)
                    .with_context(|| format!("Malformed link near byte {position}"))?;
                links.push(link);
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    Ok(links.into_iter().collect())
}

fn link_length(element: &BytesStart) -> Result<(String, f64)> {
    let mut id = None;
    let mut length = None;

    for attr in element.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"id" => id = Some(attr.unescape_value()?.into_owned()),
            b"length" => length = Some(attr.unescape_value()?.parse::<f64>()?),
            _ => {}
        }
    }

    let id = id.ok_or_else(|| anyhow!("<link> without id"))?;
    let length = length.ok_or_else(|| anyhow!("<link> '{id}' without length"))?;
    Ok((id, length))
}

//! Simulation event model and in-order dispatch to handlers.

use anyhow::Result;

/// A single entry of the simulation event log.
///
/// Times are seconds since midnight of the simulated day.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A vehicle entered a network link.
    LinkEnter {
        time: f64,
        vehicle: String,
        link: String,
    },
    /// A vehicle left a network link.
    LinkLeave {
        time: f64,
        vehicle: String,
        link: String,
    },
    /// A person started a leg with the given mode.
    PersonDeparture {
        time: f64,
        person: String,
        mode: String,
    },
    /// A person finished a leg.
    PersonArrival {
        time: f64,
        person: String,
        mode: Option<String>,
    },
}

impl Event {
    pub fn time(&self) -> f64 {
        match self {
            Event::LinkEnter { time, .. }
            | Event::LinkLeave { time, .. }
            | Event::PersonDeparture { time, .. }
            | Event::PersonArrival { time, .. } => *time,
        }
    }
}

/// A reducer over the event stream.
///
/// Handlers receive every event and ignore the variants they do not track.
pub trait EventHandler {
    fn handle_event(&mut self, event: &Event);
}

/// Feeds every event, in source order, exactly once to each handler.
///
/// Returns the number of events delivered. The first read error from the
/// producer aborts the pass.
pub fn dispatch<I>(events: I, handlers: &mut [&mut dyn EventHandler]) -> Result<u64>
where
    I: IntoIterator<Item = Result<Event>>,
{
    let mut delivered = 0u64;

    for event in events {
        let event = event?;
        for handler in handlers.iter_mut() {
            handler.handle_event(&event);
        }
        delivered += 1;
    }

    Ok(delivered)
}

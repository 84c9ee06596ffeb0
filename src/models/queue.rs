use serde::{Deserialize, Serialize};
use tracing::debug;
use wasm_bindgen::prelude::*;

use crate::utils::round2;

/// One customer of a single-server FIFO queue.  All times are rounded to
/// two decimals for display.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRow {
    customer: usize,
    inter_arrival: f64,
    arrival: f64,
    service_start: f64,
    service_duration: f64,
    service_end: f64,
    sojourn: f64,
    wait: f64,
    average_sojourn: f64,
}

impl QueueRow {
    /// Column titles, in the order of `fields`.
    pub const HEADERS: [&'static str; 9] = [
        "Customer",
        "Inter-arrival",
        "Arrival",
        "Service start",
        "Service time",
        "Service end",
        "Time in system",
        "Wait",
        "Average time in system",
    ];

    /// The row as table cells, in display order.
    pub fn fields(&self) -> [f64; 9] {
        [
            self.customer as f64,
            self.inter_arrival,
            self.arrival,
            self.service_start,
            self.service_duration,
            self.service_end,
            self.sojourn,
            self.wait,
            self.average_sojourn,
        ]
    }

    /// The 1-based customer number.
    pub fn customer(&self) -> usize {
        self.customer
    }

    pub fn inter_arrival(&self) -> f64 {
        self.inter_arrival
    }

    /// The arrival clock of the customer.
    pub fn arrival(&self) -> f64 {
        self.arrival
    }

    pub fn service_start(&self) -> f64 {
        self.service_start
    }

    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    pub fn service_end(&self) -> f64 {
        self.service_end
    }

    /// Wait plus service.
    pub fn sojourn(&self) -> f64 {
        self.sojourn
    }

    pub fn wait(&self) -> f64 {
        self.wait
    }

    /// The running mean of the sojourn times of customers 1 through this one.
    pub fn average_sojourn(&self) -> f64 {
        self.average_sojourn
    }
}

/// The queue serves customers one at a time, in arrival order, with a
/// single server.  The state between customers is the arrival clock of the
/// previous customer, the time the server becomes free, and the running
/// average time in system.  The state is kept at full precision; only the
/// emitted rows are rounded.
///
/// The first customer's inter-arrival value is taken as its absolute
/// arrival clock.  Every later value is a gap after the previous arrival.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    served: usize,
    arrival_clock: f64,
    server_free_at: f64,
    average_sojourn: f64,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the next customer, and report its timings.
    pub fn serve(&mut self, inter_arrival: f64, service_duration: f64) -> QueueRow {
        let index = self.served;
        self.arrival_clock = if index == 0 {
            inter_arrival
        } else {
            self.arrival_clock + inter_arrival
        };
        let service_start = self.arrival_clock.max(self.server_free_at);
        let service_end = service_start + service_duration;
        let sojourn = service_end - self.arrival_clock;
        let wait = service_start - self.arrival_clock;
        self.average_sojourn = if index == 0 {
            sojourn
        } else {
            (self.average_sojourn * index as f64 + sojourn) / (index + 1) as f64
        };
        self.server_free_at = service_end;
        self.served += 1;
        QueueRow {
            customer: self.served,
            inter_arrival: round2(inter_arrival),
            arrival: round2(self.arrival_clock),
            service_start: round2(service_start),
            service_duration: round2(service_duration),
            service_end: round2(service_end),
            sojourn: round2(sojourn),
            wait: round2(wait),
            average_sojourn: round2(self.average_sojourn),
        }
    }
}

/// Simulate the queue over paired inter-arrival and service time
/// sequences.  The table has one row per pair, so the longer sequence is
/// cut to the length of the shorter one.
pub fn simulate(arrivals: &[f64], services: &[f64]) -> Vec<QueueRow> {
    let mut queue = Queue::new();
    let rows: Vec<QueueRow> = arrivals
        .iter()
        .zip(services.iter())
        .map(|(inter_arrival, service)| queue.serve(*inter_arrival, *service))
        .collect();
    debug!(customers = rows.len(), "simulated queue");
    rows
}

//! Trade extraction: converts fills into round-trip records.
//!
//! Post-processes fills after the bar loop completes. A round trip opens on
//! the buy that takes the position off zero and closes on the sell that
//! brings it back to zero; buys and partial sells in between accumulate.
//! A position still open at the end of the run is not reported.

use crate::domain::{Fill, RoundTrip, TradeSide};

struct OpenTrip {
    entry_bar: usize,
    entry_date: chrono::NaiveDate,
    quantity: u64,
    invested: f64,
    proceeds: f64,
    costs: f64,
}

pub fn extract_round_trips(fills: &[Fill]) -> Vec<RoundTrip> {
    let mut trips = Vec::new();
    let mut open: Option<OpenTrip> = None;
    let mut position: u64 = 0;

    for fill in fills {
        match fill.side {
            TradeSide::Buy => {
                let trip = open.get_or_insert_with(|| OpenTrip {
                    entry_bar: fill.bar_index,
                    entry_date: fill.date,
                    quantity: 0,
                    invested: 0.0,
                    proceeds: 0.0,
                    costs: 0.0,
                });
                trip.quantity += fill.quantity;
                trip.invested += fill.notional() + fill.cost;
                trip.costs += fill.cost;
                position += fill.quantity;
            }
            TradeSide::Sell => {
                let Some(trip) = open.as_mut() else {
                    continue;
                };
                trip.proceeds += fill.notional() - fill.cost;
                trip.costs += fill.cost;
                position = position.saturating_sub(fill.quantity);

                if position == 0 {
                    if let Some(trip) = open.take() {
                        trips.push(RoundTrip {
                            entry_bar: trip.entry_bar,
                            entry_date: trip.entry_date,
                            exit_bar: fill.bar_index,
                            exit_date: fill.date,
                            quantity: trip.quantity,
                            invested: trip.invested,
                            proceeds: trip.proceeds,
                            costs: trip.costs,
                            bars_held: fill.bar_index - trip.entry_bar,
                        });
                    }
                }
            }
        }
    }

    trips
}

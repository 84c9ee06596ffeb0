use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;

use crate::utils::round2;

/// The replenishment and cost parameters of a periodic-review inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPolicy {
    pub opening_inventory: f64,
    /// Quantity requested at every review
    pub order_quantity: f64,
    /// Reviews happen on periods that are multiples of this value, never on
    /// period 1.  Zero or less disables replenishment.
    pub reorder_period: i64,
    /// Storage capacity; a shipment is cut to the free space
    pub capacity: f64,
    /// Fixed cost of a shipment that delivers at least one unit
    pub order_cost: f64,
    /// Cost per unit of average inventory per period
    pub holding_cost: f64,
    /// Cost per unit of unmet demand
    pub shortage_cost: f64,
}

/// One period of the inventory table.  All values are rounded to two
/// decimals for display.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    period: usize,
    order_quantity: f64,
    received: f64,
    opening: f64,
    demand: f64,
    sales: f64,
    closing: f64,
    order_cost: f64,
    holding_cost: f64,
    shortage_cost: f64,
    total_cost: f64,
    average_cost: f64,
}

impl InventoryRow {
    /// Column titles, in the order of `fields`.
    pub const HEADERS: [&'static str; 12] = [
        "Period",
        "Order quantity",
        "Received",
        "Opening inventory",
        "Demand",
        "Sales",
        "Closing inventory",
        "Order cost",
        "Holding cost",
        "Shortage cost",
        "Total cost",
        "Average cost",
    ];

    /// The row as table cells, in display order.
    pub fn fields(&self) -> [f64; 12] {
        [
            self.period as f64,
            self.order_quantity,
            self.received,
            self.opening,
            self.demand,
            self.sales,
            self.closing,
            self.order_cost,
            self.holding_cost,
            self.shortage_cost,
            self.total_cost,
            self.average_cost,
        ]
    }

    /// The 1-based period number.
    pub fn period(&self) -> usize {
        self.period
    }

    /// The quantity requested this period, zero when no review happened.
    pub fn order_quantity(&self) -> f64 {
        self.order_quantity
    }

    pub fn received(&self) -> f64 {
        self.received
    }

    /// Inventory on hand after any receipt.
    pub fn opening(&self) -> f64 {
        self.opening
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    pub fn sales(&self) -> f64 {
        self.sales
    }

    pub fn closing(&self) -> f64 {
        self.closing
    }

    pub fn order_cost(&self) -> f64 {
        self.order_cost
    }

    pub fn holding_cost(&self) -> f64 {
        self.holding_cost
    }

    pub fn shortage_cost(&self) -> f64 {
        self.shortage_cost
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Cumulative total cost divided by the number of periods so far.
    pub fn average_cost(&self) -> f64 {
        self.average_cost
    }
}

/// The inventory steps through periods in order.  At the start of a review
/// period a shipment arrives, limited by free capacity, and then the
/// period's demand is served from stock.  Unmet demand is lost, not
/// backordered.  Closing inventory carries over as the next period's stock.
#[derive(Debug, Clone)]
pub struct Inventory {
    policy: InventoryPolicy,
    period: usize,
    on_hand: f64,
    cumulative_cost: f64,
}

impl Inventory {
    pub fn new(policy: InventoryPolicy) -> Self {
        Self {
            on_hand: policy.opening_inventory,
            policy,
            period: 0,
            cumulative_cost: 0.0,
        }
    }

    fn is_review_period(&self) -> bool {
        let reorder_period = self.policy.reorder_period;
        self.period > 1 && reorder_period > 0 && self.period as i64 % reorder_period == 0
    }

    /// Advance one period with the given demand, and report it.
    pub fn advance(&mut self, demand: f64) -> InventoryRow {
        self.period += 1;
        let mut order_quantity = 0.0;
        let mut received = 0.0;
        let mut order_cost = 0.0;
        if self.is_review_period() {
            order_quantity = self.policy.order_quantity.max(0.0);
            let free_space = (self.policy.capacity - self.on_hand).max(0.0);
            received = order_quantity.min(free_space);
            // A shipment with no room to deliver costs nothing
            if received > 0.0 {
                self.on_hand += received;
                order_cost = self.policy.order_cost;
            }
        }
        let opening = self.on_hand;
        let sales = opening.min(demand);
        let closing = opening - sales;
        let holding_cost = (opening + closing) / 2.0 * self.policy.holding_cost;
        let shortage_cost = (demand - sales).max(0.0) * self.policy.shortage_cost;
        let total_cost = order_cost + holding_cost + shortage_cost;
        self.cumulative_cost += total_cost;
        self.on_hand = closing;
        InventoryRow {
            period: self.period,
            order_quantity: round2(order_quantity),
            received: round2(received),
            opening: round2(opening),
            demand: round2(demand),
            sales: round2(sales),
            closing: round2(closing),
            order_cost: round2(order_cost),
            holding_cost: round2(holding_cost),
            shortage_cost: round2(shortage_cost),
            total_cost: round2(total_cost),
            average_cost: round2(self.cumulative_cost / self.period as f64),
        }
    }
}

/// Simulate one period per demand value.
pub fn simulate(demand: &[f64], policy: &InventoryPolicy) -> Vec<InventoryRow> {
    let mut inventory = Inventory::new(policy.clone());
    let rows: Vec<InventoryRow> = demand
        .iter()
        .map(|demand| inventory.advance(*demand))
        .collect();
    debug!(periods = rows.len(), "simulated inventory");
    rows
}

/// Read a comma-separated list of demand values.  Empty and malformed
/// tokens are skipped.
pub fn parse_demand(text: &str) -> Vec<f64> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<f64>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(token, "skipping malformed demand value");
                None
            }
        })
        .collect()
}

//! The models module provides the two simulation tables.  Each model is a
//! sequential recurrence over an input sequence: every row depends on the
//! state left by the previous row, so the tables are computed strictly in
//! order.
//!
//! The `queue` model is a single-server FIFO queue driven by inter-arrival
//! and service time sequences.  The `inventory` model is a periodic-review
//! inventory with capacity-limited replenishment, driven by a demand
//! sequence.

pub mod inventory;
pub mod queue;

pub use self::inventory::{Inventory, InventoryPolicy, InventoryRow};
pub use self::queue::{Queue, QueueRow};

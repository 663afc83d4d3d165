//! ordered-table: a fixed-capacity, linear-probing key-value table that
//! also tracks insertion/update order, so the oldest and newest entries are
//! available in O(1).
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep two coupled structures (a probed slot array and a doubly
//!   linked order list) consistent across insert, update and delete,
//!   without tombstones.
//! - Layers:
//!   - SlotStore (`probe`): `capacity` slots, each empty or holding an
//!     entry's digest plus its order-node handle. One probing routine,
//!     `locate`, serves lookup, insertion and relocation.
//!   - OrderList (`order_list`): entries in a generational `SlotMap`
//!     arena, linked head (oldest) to tail (newest) by handle.
//!   - OrderedTable (`ordered_table`): public facade composing both.
//!
//! Constraints
//! - Fixed capacity chosen at construction; inserting a new key into a
//!   full table fails with `TableError::TableFull` rather than growing.
//! - Single-threaded: `Send` but not `Sync`. Wrap in a `Mutex` if shared;
//!   a half-finished insert or cluster rehash is never a valid state.
//! - Reads never reorder. Updating an existing key moves it to the tail.
//!
//! Deletion without tombstones
//! - `remove` frees the key's slot, unlinks its node, then walks the
//!   cluster that follows and re-places every occupant through `locate`
//!   as if newly inserted. This closes the hole so every remaining key is
//!   again reachable from its home index. Relocation moves only the
//!   digest and handle; the order list is not touched.
//!
//! Hashing invariants
//! - Each slot stores the full `u64` digest computed once at insertion.
//!   Relocation uses the stored digest and never calls `K: Hash`/`K: Eq`.
//!   Probing compares digests before calling `K: Eq`.
//!
//! Full-table signal
//! - `locate` reports `Exhausted` only after visiting all `capacity`
//!   slots without an empty slot or an equal key, which happens exactly
//!   when the table is full and the key is absent.
//!
//! Reentrancy
//! - Public methods take a debug-only reentrancy guard while they may
//!   run user `Hash`/`Eq` code. Owned keys and values leaving the table
//!   are dropped after the guard is released.
//!
//! Logging
//! - Emits `tracing` events (`debug` on a full-table rejection, `trace`
//!   per cluster rehash). No subscriber is installed by this crate.

mod order_list;
mod ordered_table;
mod ordered_table_proptest;
mod probe;
mod reentrancy;

// Public surface
pub use ordered_table::{Iter, OrderedTable, TableError};

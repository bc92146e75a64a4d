//! holdline - shift-hold rotation tracker for fire department rosters
//!
//! A roster of firefighters, split across the A/B/C shifts, cycles through
//! mandatory holds. The [`rotation`] module owns the ordering rules, the
//! [`store`] persists roster and hold snapshots, the [`coordinator`] ties
//! the two together, and [`http_server`] + [`realtime`] expose the result
//! to connected clients.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod http_server;
pub mod observability;
pub mod realtime;
pub mod roster;
pub mod rotation;
pub mod store;

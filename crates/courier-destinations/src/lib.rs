//! # courier-destinations — the destination action catalog
//!
//! Each module is one third-party destination: its settings type, its
//! shared error factories, and its actions. Actions implement
//! [`courier_core::DestinationAction`] and fail only with classified
//! [`courier_core::ActionError`] values.
//!
//! ## Destinations
//!
//! | Module | Destination | Actions |
//! |--------|-------------|---------|
//! | [`segment`] | Segment tracking API (regional endpoints) | `send_track` |
//! | [`google_analytics_4`] | GA4 Measurement Protocol | `view_item` |
//!
//! The full production catalog is much larger; these modules establish the
//! pattern new destinations follow: validate settings, check cross-field
//! invariants, validate third-party domain rules, then issue exactly one
//! request through the shared transport.

pub mod google_analytics_4;
pub mod segment;

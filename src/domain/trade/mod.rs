//! Trade domain — executed-trade listings.

pub mod client;

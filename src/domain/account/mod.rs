//! Account domain — assets, positions, funds flow.

pub mod client;

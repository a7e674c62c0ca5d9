//! Tally End-to-End Test Suite
//!
//! Drives a simulated chain through admission, dispatch, and fee settlement
//! against a real account store, without a running node.
//!
//! Each test file can be run independently:
//!
//! ```bash
//! cargo test -p tally-e2e-tests --test fee_lifecycle -- --nocapture
//! cargo test -p tally-e2e-tests --test block_settlement -- --nocapture
//! ```

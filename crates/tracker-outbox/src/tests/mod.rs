//! Scenario tests for the delivery engine.
//!
//! - harness: scripted transport and tracker construction helpers
//! - publish: payload construction and first delivery attempt
//! - identify: user identification and storage reset
//! - retry: queue draining, expiry and the background scheduler


mod identify;

//! End-to-end tests for the relay engine

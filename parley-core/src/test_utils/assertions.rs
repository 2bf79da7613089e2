//! Custom assertions for relay tests

use crate::relay::Message;
use std::fmt::Debug;

/// Assert that a Result is Ok and return the value
pub fn assert_ok<T, E: Debug>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("Expected Ok, got Err: {:?}", e),
    }
}

/// Assert that a Result is Err and return the error
pub fn assert_err<T: Debug, E>(result: Result<T, E>) -> E {
    match result {
        Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
        Err(e) => e,
    }
}

/// Assert that `messages` carry exactly `expected` bodies, in order
pub fn assert_bodies(messages: &[Message], expected: &[&str]) {
    let bodies: Vec<&str> = messages.iter().map(|m| m.body.as_str()).collect();
    if bodies != expected {
        panic!("Expected bodies {:?}, got {:?}", expected, bodies);
    }
}

/// Assert every message still matches its digest
pub fn assert_all_intact(messages: &[Message]) {
    if let Some(bad) = messages.iter().find(|m| !m.verify_integrity()) {
        panic!("Message failed integrity check: {:?}", bad);
    }
}

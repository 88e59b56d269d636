//! Test case catalog
//!
//! The fixed, ordered list of scenarios run by a batch.

use serde::Serialize;
use std::fmt;

/// A named scenario pairing an input token with an expected outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub name: &'static str,
    pub description: &'static str,
    pub token: &'static str,
    pub expect_success: bool,
}

const CATALOG: [TestCase; 4] = [
    TestCase {
        name: "Valid Token",
        description: "Test with a valid OAuth token",
        token: "valid_token_12345",
        expect_success: true,
    },
    TestCase {
        name: "Invalid Token",
        description: "Test with an invalid token",
        token: "invalid_token",
        expect_success: false,
    },
    TestCase {
        name: "Empty Token",
        description: "Test with empty token",
        token: "",
        expect_success: false,
    },
    TestCase {
        name: "Malformed Token",
        description: "Test with malformed token",
        token: "abc123!@#",
        expect_success: false,
    },
];

/// All catalog cases in definition order
pub fn catalog() -> &'static [TestCase] {
    &CATALOG
}

/// Find a catalog case by name (case-insensitive)
pub fn find(name: &str) -> Option<&'static TestCase> {
    CATALOG
        .iter()
        .find(|case| case.name.eq_ignore_ascii_case(name.trim()))
}

impl TestCase {
    /// Token as displayed in results
    pub fn display_token(&self) -> &'static str {
        if self.token.is_empty() {
            "(empty)"
        } else {
            self.token
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expectation = if self.expect_success {
            "expect success"
        } else {
            "expect failure"
        };
        write!(f, "{} ({})", self.name, expectation)
    }
}

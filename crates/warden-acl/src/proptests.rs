//! Property-based tests for the access gate.

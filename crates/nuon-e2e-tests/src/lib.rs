//! End-to-end tests for the nuon loader live in `tests/`.

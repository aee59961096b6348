//! Property-based tests for kind normalization and batch budgeting.

//! Integration tests for the constraint system

// Worked scenarios from estimation practice
mod scenarios;

// Tests for the textual grammar
mod grammar_tests;

// Tests for the ConstraintCollection and ConstrainedModel
mod collection_tests;

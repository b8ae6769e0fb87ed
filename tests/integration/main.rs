//! Integration tests for hierarchical uploads against a scripted remote store

mod ordering;
mod retry;

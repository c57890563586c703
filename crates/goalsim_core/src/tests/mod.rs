//! Integration tests for the goal simulation engine
//!
//! Tests are organized by topic:
//! - `simulation` - Core trajectory mechanics and distribution properties
//! - `goals` - Goal-type specialization layers and derived metrics
//! - `parallel` - Chunked executor, seeding, and failure isolation

mod parallel;
mod simulation;

//! End-to-end pipeline tests
//!
//! Full runs from a directory tree to sink output.

mod test_outputs;
mod test_scenarios;

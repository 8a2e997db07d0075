//! Chunk assembly tests
//!
//! Framing, per-mode invariants and paged documents.

mod test_framing;

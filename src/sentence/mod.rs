//! Sentence boundary detection.
//!
//! Pure functions over `&str`. Offsets are UTF-8 byte offsets; every returned
//! offset lies on a `char` boundary.

mod detector;


pub use detector::{find_best_split_point, find_last_sentence_end, is_valid_chunk};

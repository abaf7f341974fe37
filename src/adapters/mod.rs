//! `Describer` implementations.
//!
//! - `live/`: calls the Gemini API
//! - `recording/`: wraps a live describer and writes each call to a cassette
//! - `replaying/`: answers from a cassette instead of the network

pub mod live;
pub mod recording;
pub mod replaying;

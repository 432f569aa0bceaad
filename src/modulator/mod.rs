//! One-bit delta modulation
//!
//! Turns signed 16-bit PCM into one decision per sample: 1 for a rising
//! step, 0 for a falling one. The canonical output keeps one decision per
//! byte; [`pack_bits`] offers the dense form.

pub mod bits;
pub mod encoder;

pub use bits::{pack_bits, unpack_bits};
pub use encoder::{DeltaModulator, AVERAGE_DIVISOR, AVERAGE_LIMIT, STRENGTH};

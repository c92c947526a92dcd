use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` that many workers can add into at once.
///
/// The value is stored as its IEEE-754 bit pattern in an `AtomicU64`. `add`
/// reads the current bits, computes the new sum and swaps it in only if the
/// bits are still the ones it read, retrying otherwise. Every delta is
/// applied exactly once; the final value is the sum of all deltas up to
/// rounding, and the order in which they land is not deterministic.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> AtomicF64 {
        AtomicF64 { bits: AtomicU64::new(value.to_bits()) }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Atomically adds `delta` and returns the new value.
    pub fn add(&self, delta: f64) -> f64 {
        let mut current = self.bits.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.bits.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Relaxed) {
                Ok(_) => return f64::from_bits(next),
                Err(observed) => current = observed,
            }
        }
    }

    pub fn into_inner(self) -> f64 {
        f64::from_bits(self.bits.into_inner())
    }
}

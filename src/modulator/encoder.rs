/// step added to or taken from the accumulator per sample
pub const STRENGTH: i32 = 127;

/// the running average moves by `charge / AVERAGE_DIVISOR` per sample
pub const AVERAGE_DIVISOR: i32 = 16;

/// running average is clamped to `[-AVERAGE_LIMIT, AVERAGE_LIMIT]`
pub const AVERAGE_LIMIT: i32 = 32767;

/// Greedy one-bit predictor.
///
/// Stateless between calls: every [`encode`](Self::encode) starts from a zero
/// accumulator and a zero running average.
#[derive(Debug, Clone, Copy)]
pub struct DeltaModulator {
    strength: i32,
}

impl DeltaModulator {
    pub fn new() -> Self {
        DeltaModulator { strength: STRENGTH }
    }

    /// encode samples, one 0/1 byte per sample
    pub fn encode(&self, samples: &[i16]) -> Vec<u8> {
        let mut state = ModulatorState::default();
        samples
            .iter()
            .map(|&sample| state.step(sample, self.strength))
            .collect()
    }

    /// encode samples, eight decisions per byte
    pub fn encode_packed(&self, samples: &[i16]) -> Vec<u8> {
        super::pack_bits(&self.encode(samples))
    }

    /// what the modulator emits for `len` samples of silence
    pub fn silence(&self, len: usize) -> Vec<u8> {
        self.encode(&vec![0; len])
    }
}

impl Default for DeltaModulator {
    fn default() -> Self {
        Self::new()
    }
}

/// per-call state
#[derive(Debug, Default)]
struct ModulatorState {
    accumulator: i32,
    running_average: i32,
}

impl ModulatorState {
    fn step(&mut self, sample: i16, strength: i32) -> u8 {
        // keeps -32768 inside the symmetric range; floor division
        let scaled = (i32::from(sample) * 32767).div_euclid(32768);
        let target = scaled - self.running_average;

        // ties fall
        let (bit, charge) = if target > self.accumulator {
            (1, strength)
        } else {
            (0, -strength)
        };
        self.accumulator += charge;

        // truncates toward zero
        self.running_average = (self.running_average + charge / AVERAGE_DIVISOR)
            .clamp(-AVERAGE_LIMIT, AVERAGE_LIMIT);

        bit
    }
}

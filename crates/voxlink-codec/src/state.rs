use crate::tables::{INDEX_TABLE, MAX_STEP_INDEX, STEP_TABLE};

/// Running predictor and step index for one ADPCM stream.
///
/// Both fields change together, once per 4-bit code. A state is created when
/// a recording or a reply starts and dropped when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecState {
    predictor: i16,
    step_index: u8,
}

impl CodecState {
    /// Create a state with an explicit starting point.
    ///
    /// `step_index` is clamped to `0..=88`.
    pub fn new(predictor: i16, step_index: u8) -> Self {
        Self {
            predictor,
            step_index: step_index.min(MAX_STEP_INDEX),
        }
    }

    /// Current predicted sample.
    pub fn predictor(&self) -> i16 {
        self.predictor
    }

    /// Current index into the step table.
    pub fn step_index(&self) -> u8 {
        self.step_index
    }

    /// Quantizer step for the next sample.
    pub fn step(&self) -> i32 {
        STEP_TABLE[usize::from(self.step_index)]
    }

    /// Apply one code: move the predictor by `diffq` in the direction of the
    /// sign bit, then adapt the step index.
    pub(crate) fn advance(&mut self, code: u8, diffq: i32) {
        let code = code & 0x0F;
        let predictor = if code & 8 != 0 {
            i32::from(self.predictor) - diffq
        } else {
            i32::from(self.predictor) + diffq
        };
        self.predictor = predictor.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;

        let index = i32::from(self.step_index) + i32::from(INDEX_TABLE[usize::from(code)]);
        self.step_index = index.clamp(0, i32::from(MAX_STEP_INDEX)) as u8;
    }
}

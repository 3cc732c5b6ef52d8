//! Fixed IMA-ADPCM lookup tables shared by the encoder and decoder.

/// Largest valid index into [`STEP_TABLE`].
pub const MAX_STEP_INDEX: u8 = 88;

/// Step-index adjustment per 4-bit code. The sign bit does not change the
/// adjustment, so the second half mirrors the first.
pub const INDEX_TABLE: [i8; 16] = [
    -1, -1, -1, -1, 2, 4, 6, 8, //
    -1, -1, -1, -1, 2, 4, 6, 8,
];

/// Quantizer step sizes, indexed by the stream's step index.
pub const STEP_TABLE: [i32; 89] = [
    7, 8, 9, 10, 11, 12, 13, 14, 16, 17, //
    19, 21, 23, 25, 28, 31, 34, 37, 41, 45, //
    50, 55, 60, 66, 73, 80, 88, 97, 107, 118, //
    130, 143, 157, 173, 190, 209, 230, 253, 279, 307, //
    337, 371, 408, 449, 494, 544, 598, 658, 724, 796, //
    876, 963, 1060, 1166, 1282, 1411, 1552, 1707, 1878, 2066, //
    2272, 2499, 2749, 3024, 3326, 3658, 4024, 4428, 4871, 5358, //
    5894, 6484, 7132, 7845, 8630, 9493, 10442, 11487, 12635, 13899, //
    15289, 16818, 18500, 20350, 22385, 24623, 27086, 29794, 32767,
];

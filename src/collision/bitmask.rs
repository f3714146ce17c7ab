use serde::{Deserialize, Serialize};

/// 32-cell occupancy mask along one world axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bitmask {
    bits: u32,
}

impl Bitmask {
    pub const FULL: Bitmask = Bitmask { bits: u32::MAX };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Cells are 1-based; out-of-range cells saturate onto the first or last bit.
    pub fn set_on(&mut self, cell: i32) {
        self.bits |= 1 << Self::shift(cell);
    }

    pub fn set_off(&mut self, cell: i32) {
        self.bits &= !(1 << Self::shift(cell));
    }

    pub fn is_on(&self, cell: i32) -> bool {
        self.bits & (1 << Self::shift(cell)) != 0
    }

    /// Sets every cell in the inclusive range.
    pub fn set_range(&mut self, from: i32, to: i32) {
        for cell in from..=to {
            self.set_on(cell);
        }
    }

    pub fn overlaps(&self, other: &Bitmask) -> bool {
        self.bits & other.bits != 0
    }

    fn shift(cell: i32) -> u32 {
        (cell - 1).clamp(0, 31) as u32
    }
}

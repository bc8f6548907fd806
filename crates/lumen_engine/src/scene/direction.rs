//! Movement direction bit set

use bitflags::bitflags;

bitflags! {
    /// Directions of a relative move, in the entity's own frame
    ///
    /// Opposing bits cancel: `FORWARD | BACKWARD` moves nowhere along the forward axis.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirectionMask: u8 {
        /// Along the entity's forward (-Z) axis
        const FORWARD = 1 << 0;
        /// Against the forward axis
        const BACKWARD = 1 << 1;
        /// Against the right axis
        const LEFT = 1 << 2;
        /// Along the entity's right (+X) axis
        const RIGHT = 1 << 3;
        /// Along the entity's up (+Y) axis
        const UP = 1 << 4;
        /// Against the up axis
        const DOWN = 1 << 5;
    }
}

impl DirectionMask {
    fn axis_sign(self, positive: Self, negative: Self) -> i8 {
        i8::from(self.contains(positive)) - i8::from(self.contains(negative))
    }

    /// Net sign (-1, 0 or 1) along the forward, right and up axes
    pub fn signs(self) -> [i8; 3] {
        [
            self.axis_sign(Self::FORWARD, Self::BACKWARD),
            self.axis_sign(Self::RIGHT, Self::LEFT),
            self.axis_sign(Self::UP, Self::DOWN),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposing_bits_cancel() {
        let mask = DirectionMask::FORWARD | DirectionMask::BACKWARD | DirectionMask::UP;
        assert_eq!(mask.signs(), [0, 0, 1]);
    }

    #[test]
    fn test_single_directions() {
        assert_eq!(DirectionMask::BACKWARD.signs(), [-1, 0, 0]);
        assert_eq!(DirectionMask::LEFT.signs(), [0, -1, 0]);
        assert_eq!(DirectionMask::empty().signs(), [0, 0, 0]);
    }
}

use crate::error::{RaffleError, RaffleError::*};
use crate::Degrees;

pub const FULL_TURN: Degrees = 360.0;
/// Pointer at the top of the wheel when 0° is "right" and angles grow clockwise.
pub const DEFAULT_POINTER_ANGLE: Degrees = 270.0;
pub const DEFAULT_EXTRA_SPINS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    pointer_angle: Degrees,
    extra_spins: u32,
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            pointer_angle: DEFAULT_POINTER_ANGLE,
            extra_spins: DEFAULT_EXTRA_SPINS,
        }
    }
}

impl Rotation {
    pub fn new(pointer_angle: Degrees, extra_spins: u32) -> Result<Self, RaffleError> {
        if !pointer_angle.is_finite() || !(0.0..FULL_TURN).contains(&pointer_angle) {
            return Err(InvalidConfig);
        }
        Ok(Self {
            pointer_angle,
            extra_spins,
        })
    }

    pub fn pointer_angle(&self) -> Degrees {
        self.pointer_angle
    }

    pub fn extra_spins(&self) -> u32 {
        self.extra_spins
    }

    /// Angle of the center of the wedge `index`, measured from the zero direction.
    pub fn wedge_center(pool_size: usize, index: usize) -> Result<Degrees, RaffleError> {
        if pool_size == 0 || index >= pool_size {
            return Err(InvalidIndex);
        }
        let wedge = FULL_TURN / pool_size as Degrees;
        Ok((index as Degrees + 0.5) * wedge)
    }

    /// Return the new accumulated rotation that brings the center of the wedge
    /// `index` under the pointer after `extra_spins` full turns.
    ///
    /// The result is never wrapped back into `[0, 360)`: the wheel always
    /// moves forward from `current_rotation`.
    pub fn target_rotation(
        &self,
        pool_size: usize,
        index: usize,
        current_rotation: Degrees,
    ) -> Result<Degrees, RaffleError> {
        let center = Self::wedge_center(pool_size, index)?;

        // center + current + base_delta ≡ pointer (mod 360)
        let base_delta = (self.pointer_angle - center - current_rotation).rem_euclid(FULL_TURN);
        // rem_euclid may round up to exactly 360 for tiny negative inputs
        let base_delta = if base_delta >= FULL_TURN { 0.0 } else { base_delta };

        Ok(current_rotation + base_delta + self.extra_spins as Degrees * FULL_TURN)
    }
}

pub fn compute_target_rotation(
    pool_size: usize,
    index: usize,
    current_rotation: Degrees,
    extra_spins: u32,
) -> Result<Degrees, RaffleError> {
    Rotation {
        pointer_angle: DEFAULT_POINTER_ANGLE,
        extra_spins,
    }
    .target_rotation(pool_size, index, current_rotation)
}

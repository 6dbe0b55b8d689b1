//! Velocity rules shared by the highway and motorway models.

use crate::choice::chance;
use rand::Rng;

/// Slowest a vehicle can go.
pub const MIN_VELOCITY: u32 = 0;
/// Fastest a vehicle can go, in cells per tick.
pub const MAX_VELOCITY: u32 = 5;

/// Speed up by one, saturating at [`MAX_VELOCITY`].
#[inline]
pub fn accelerate(velocity: u32) -> u32 {
    (velocity + 1).min(MAX_VELOCITY)
}

/// With probability `linger`, slow down by one (never below
/// [`MIN_VELOCITY`]).
#[inline]
pub fn linger<R: Rng + ?Sized>(rng: &mut R, velocity: u32, linger: f64) -> u32 {
    if chance(rng, linger) {
        velocity.saturating_sub(1).max(MIN_VELOCITY)
    } else {
        velocity
    }
}

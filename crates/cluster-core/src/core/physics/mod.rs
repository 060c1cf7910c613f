//! Electrostatics of dangling bond layouts on H-Si(100)-2x1.

pub mod params;
pub mod potentials;
pub mod surface;

#[macro_use]
mod macros;

pub mod electric;
pub mod energy;
pub mod mechanics;
pub mod power;
pub mod time;

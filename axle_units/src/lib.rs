//! Unit-tagged quantities shared across the calibration stack.
//!
//! Pressures, weights and temperatures travel as newtypes so a bag pressure
//! cannot be handed where a weight is expected, and a Celsius reading cannot
//! silently meet a Fahrenheit-fitted coefficient.
pub mod pressure;
pub mod temperature;

pub use pressure::{Pounds, Psi};
pub use temperature::{TempUnit, Temperature, UnknownTempUnit};

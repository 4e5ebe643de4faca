//! Thermistor conversion (hardware-independent)
//!
//! The probe sits in series with a known reference resistor and the ADC
//! samples the midpoint of the divider. The averaged ADC code is turned into
//! the probe's resistance, and the resistance into a temperature with the
//! three-coefficient Steinhart-Hart approximation.

use crate::config::MonitorConfig;

const KELVIN_OFFSET: f64 = 273.15;

/// Steinhart-Hart calibration coefficients of a probe model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteinhartHart {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl SteinhartHart {
    /// iGrill probe, hand-measured against a reference thermometer
    pub const IGRILL: Self = Self {
        a: 0.761793296025725e-3,
        b: 2.114881554906883e-4,
        c: 1.0244107975830052e-7,
    };

    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    /// Temperature in Kelvin for a probe resistance in ohms
    #[inline]
    pub fn kelvin(&self, resistance: f64) -> f64 {
        steinhart_temperature(self.a, self.b, self.c, resistance)
    }
}

impl Default for SteinhartHart {
    fn default() -> Self {
        Self::IGRILL
    }
}

/// Resistance of the probe from the averaged ADC code.
///
/// `full_scale` is the converter's maximum code (1023 for 10 bits).
/// `reading` must be non-zero.
pub fn resistance_from_reading(reading: f64, reference_ohms: f64, full_scale: f64) -> f64 {
    reference_ohms / (full_scale / reading - 1.0)
}

/// `1 / (a + b·ln(r) + c·ln(r)³)`, in Kelvin
pub fn steinhart_temperature(a: f64, b: f64, c: f64, resistance: f64) -> f64 {
    let ln_r = resistance.ln();
    1.0 / (a + b * ln_r + c * ln_r.powi(3))
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin_to_celsius(kelvin) * (9.0 / 5.0) + 32.0
}

/// Intermediate and final values of one conversion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    pub resistance: f64,
    pub kelvin: f64,
}

impl Estimate {
    pub fn celsius(&self) -> f64 {
        kelvin_to_celsius(self.kelvin)
    }

    pub fn fahrenheit(&self) -> f64 {
        kelvin_to_fahrenheit(self.kelvin)
    }
}

/// Divider and probe parameters needed to turn a reading into a temperature
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thermistor {
    reference_ohms: f64,
    full_scale: f64,
    coefficients: SteinhartHart,
}

impl Thermistor {
    pub const fn new(reference_ohms: f64, full_scale: f64, coefficients: SteinhartHart) -> Self {
        Self {
            reference_ohms,
            full_scale,
            coefficients,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            config.reference_ohms,
            f64::from(config.full_scale()),
            config.coefficients,
        )
    }

    /// Run the full conversion for a non-zero averaged reading
    pub fn estimate(&self, reading: f64) -> Estimate {
        let resistance = resistance_from_reading(reading, self.reference_ohms, self.full_scale);
        debug_assert!(
            resistance.is_finite() && resistance > 0.0,
            "reading {reading} gives resistance {resistance}"
        );

        Estimate {
            resistance,
            kelvin: self.coefficients.kelvin(resistance),
        }
    }
}

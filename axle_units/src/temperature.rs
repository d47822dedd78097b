use std::fmt;
use std::str::FromStr;

/// Temperature scale a reading (or a fitted coefficient) is expressed in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempUnit {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TempUnit {
    pub const fn as_str(self) -> &'static str {
        match self {
            TempUnit::Fahrenheit => "fahrenheit",
            TempUnit::Celsius => "celsius",
        }
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTempUnit(pub String);

impl fmt::Display for UnknownTempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown temperature unit '{}' (expected fahrenheit|celsius)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTempUnit {}

impl FromStr for TempUnit {
    type Err = UnknownTempUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fahrenheit" | "f" => Ok(TempUnit::Fahrenheit),
            "celsius" | "c" => Ok(TempUnit::Celsius),
            _ => Err(UnknownTempUnit(s.to_string())),
        }
    }
}

/// A temperature reading tagged with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub value: f64,
    pub unit: TempUnit,
}

impl Temperature {
    #[inline]
    pub const fn fahrenheit(value: f64) -> Self {
        Self {
            value,
            unit: TempUnit::Fahrenheit,
        }
    }

    #[inline]
    pub const fn celsius(value: f64) -> Self {
        Self {
            value,
            unit: TempUnit::Celsius,
        }
    }

    /// Numeric value expressed in `unit`.
    pub fn in_unit(self, unit: TempUnit) -> f64 {
        match (self.unit, unit) {
            (a, b) if a == b => self.value,
            (TempUnit::Celsius, TempUnit::Fahrenheit) => self.value * 9.0 / 5.0 + 32.0,
            (TempUnit::Fahrenheit, TempUnit::Celsius) => (self.value - 32.0) * 5.0 / 9.0,
            _ => self.value,
        }
    }

    pub fn to_unit(self, unit: TempUnit) -> Temperature {
        Temperature {
            value: self.in_unit(unit),
            unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_scales() {
        assert!((Temperature::celsius(100.0).in_unit(TempUnit::Fahrenheit) - 212.0).abs() < 1e-9);
        assert!((Temperature::fahrenheit(32.0).in_unit(TempUnit::Celsius)).abs() < 1e-9);
        assert_eq!(Temperature::fahrenheit(71.5).in_unit(TempUnit::Fahrenheit), 71.5);
    }

    #[test]
    fn parses_unit_names() {
        assert_eq!("F".parse::<TempUnit>().unwrap(), TempUnit::Fahrenheit);
        assert_eq!(" celsius ".parse::<TempUnit>().unwrap(), TempUnit::Celsius);
        assert!("kelvin".parse::<TempUnit>().is_err());
    }
}

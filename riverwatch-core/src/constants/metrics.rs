//! Plausible Ranges per Water-Quality Metric
//!
//! Values outside these ranges cannot come from a working probe in a river:
//! they are either physically impossible (pH 15) or far outside what the
//! deployed hardware reports (water at 55 °C).

// ===== pH =====

/// Lower end of the pH scale.
pub const PH_MIN: f64 = 0.0;

/// Upper end of the pH scale.
pub const PH_MAX: f64 = 14.0;

// ===== DISSOLVED OXYGEN =====

/// Dissolved oxygen saturation cannot be negative.
pub const DO_PERCENT_MIN: f64 = 0.0;

/// Supersaturation beyond 120 % is not seen in flowing river water.
pub const DO_PERCENT_MAX: f64 = 120.0;

// ===== TEMPERATURE =====

/// Coldest plausible water temperature (°C), probe in ice.
pub const WATER_TEMP_MIN_C: f64 = -10.0;

/// Warmest plausible river water temperature (°C).
pub const WATER_TEMP_MAX_C: f64 = 50.0;

// ===== CONDUCTIVITY =====

/// Conductivity has no upper bound worth enforcing, only a floor.
pub const CONDUCTIVITY_MIN: f64 = 0.0;

// ===== OXIDATION-REDUCTION POTENTIAL =====

/// Lower ORP limit (mV).
pub const ORP_MIN_MV: f64 = -500.0;

/// Upper ORP limit (mV).
pub const ORP_MAX_MV: f64 = 500.0;

// ===== SALINITY =====

/// Salinity floor (PSU).
pub const SALINITY_MIN: f64 = 0.0;

/// Salinity ceiling (PSU); above seawater, impossible for a river.
pub const SALINITY_MAX: f64 = 50.0;

// ===== LOGGER POWER =====

/// Cable supply voltage floor (V).
pub const CABLE_POWER_MIN_V: f64 = 0.0;

/// Cable supply voltage ceiling (V).
pub const CABLE_POWER_MAX_V: f64 = 15.0;

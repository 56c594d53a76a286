mod minor_units;
mod secret;

pub mod op;

pub use minor_units::{MinorUnits, MinorUnitsConversionError, CLPNY_CURRENCY_CODE};
pub use secret::Secret;

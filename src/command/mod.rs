//! Voice command translation.
//!
//! Maps the free-text slots of a voice intent onto the closed vocabularies
//! the devices understand:
//!
//! ```text
//! ("luz", "Cocina", "encender") ──► luz_cocina = ON
//! ("door", "main", "open")      ──► puerta_main = OPEN
//! ("thermostat", _, _)          ──► UnrecognizedDevice
//! ```
//!
//! Everything here is pure: no storage or network access.

mod translator;
mod vocabulary;

pub use translator::{
    command_value, device_attribute, normalize_location, read_state, translate, DeviceReading,
    ShadowCommand, TranslateError, DEFAULT_LOCATION,
};
pub use vocabulary::{Action, CanonicalCommand, DeviceType};

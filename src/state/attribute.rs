use std::fmt;

/// Device type used when the key's first segment is empty
pub const UNKNOWN_TYPE: &str = "unknown";

/// Location used when the key has no second segment
pub const GENERAL_LOCATION: &str = "general";

/// Attribute key decomposed into device type and location.
///
/// Keys have the form `<type>_<location>`, e.g. "luz_sala". Decomposition is
/// lexical only: segments past the second are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    pub device_type: String,
    pub location: String,
}

impl AttributeKey {
    pub fn new(device_type: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            device_type: device_type.into(),
            location: location.into(),
        }
    }

    /// Split a raw attribute key on `_`.
    ///
    /// # Examples
    ///
    /// ```
    /// use domotica::state::AttributeKey;
    ///
    /// let key = AttributeKey::parse("puerta_principal");
    /// assert_eq!(key.device_type, "puerta");
    /// assert_eq!(key.location, "principal");
    ///
    /// let key = AttributeKey::parse("luz");
    /// assert_eq!(key.location, "general");
    /// ```
    pub fn parse(key: &str) -> Self {
        let mut parts = key.split('_');

        let device_type = parts
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_TYPE);
        let location = parts
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(GENERAL_LOCATION);

        Self::new(device_type, location)
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.device_type, self.location)
    }
}

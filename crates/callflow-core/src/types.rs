use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A value held in the session variable store or carried by an event
///
/// This is a wrapper around a JSON value. The store performs no coercion;
/// callers interpret the value with the typed accessors below.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Variable {
    /// The inner JSON value
    pub value: serde_json::Value,
}

impl Variable {
    /// Create a new variable from a JSON value
    #[inline]
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Create a null variable
    #[inline]
    pub fn null() -> Self {
        Self {
            value: serde_json::Value::Null,
        }
    }

    /// Get the inner JSON value
    #[inline]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Take ownership of the inner JSON value
    #[inline]
    pub fn into_value(self) -> serde_json::Value {
        self.value
    }

    /// Check if the variable is null
    #[inline]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Try to read the variable as a string
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Try to read the variable as an integer
    ///
    /// Numeric strings are accepted as well, the way call-flow scripts
    /// compare values converted from text.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.value {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to read the variable as a float
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Try to read the variable as a boolean
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    /// Try to convert the variable to a specific type
    pub fn to<T>(&self) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.value.clone())
    }

    /// Create a variable from a serializable value
    pub fn from_serializable<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize,
    {
        Ok(Self::new(serde_json::to_value(value)?))
    }
}

impl From<&str> for Variable {
    fn from(s: &str) -> Self {
        Self::new(serde_json::Value::String(s.to_string()))
    }
}

impl From<String> for Variable {
    fn from(s: String) -> Self {
        Self::new(serde_json::Value::String(s))
    }
}

impl From<i64> for Variable {
    fn from(n: i64) -> Self {
        Self::new(serde_json::Value::from(n))
    }
}

impl From<bool> for Variable {
    fn from(b: bool) -> Self {
        Self::new(serde_json::Value::Bool(b))
    }
}

impl From<serde_json::Value> for Variable {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

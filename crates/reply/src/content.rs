use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::fmt;

/// The body of a [`Response`](crate::Response), resolved to bytes at emission.
pub enum Content {
    /// Written as is.
    Bytes(Bytes),
    /// Written as UTF-8.
    Text(String),
    /// A value with a string conversion, written as its `Display` output.
    Display(Box<dyn fmt::Display + Send + Sync>),
    /// Any other value, written as its `Debug` output.
    Debug(Box<dyn fmt::Debug + Send + Sync>),
}

impl Content {
    pub fn display<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Self::Display(Box::new(value))
    }

    pub fn debug<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        Self::Debug(Box::new(value))
    }

    /// The bytes this content is emitted as.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            Self::Display(value) => Bytes::from(value.to_string()),
            Self::Debug(value) => Bytes::from(format!("{value:?}")),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Display(value) => f.debug_tuple("Display").field(&format_args!("{value}")).finish(),
            Self::Debug(value) => f.debug_tuple("Debug").field(value).finish(),
        }
    }
}

/// Lets content set through the [`Responder`](crate::Responder) surface feed the JSON and XML encoders.
impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bytes(bytes) => serializer.serialize_bytes(bytes),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Display(value) => serializer.collect_str(value),
            Self::Debug(value) => serializer.collect_str(&format_args!("{value:?}")),
        }
    }
}

impl From<Bytes> for Content {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Content {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Point {
        x: i32,
        y: i32,
    }

    struct Celsius(f32);

    impl fmt::Display for Celsius {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:.1}°C", self.0)
        }
    }

    #[test]
    fn resolves_each_kind_to_bytes() {
        assert_eq!(Content::from(vec![0xde, 0xad]).to_bytes().as_ref(), [0xde, 0xad]);
        assert_eq!(Content::from("Hello, World!").to_bytes(), "Hello, World!");
        assert_eq!(Content::display(Celsius(21.5)).to_bytes(), "21.5°C");
        assert_eq!(Content::debug(Point { x: 1, y: -2 }).to_bytes(), "Point { x: 1, y: -2 }");
    }

    #[test]
    fn serializes_as_json_scalars() {
        assert_eq!(serde_json::to_string(&Content::from("hi")).unwrap(), r#""hi""#);
        assert_eq!(serde_json::to_string(&Content::display(Celsius(0.0))).unwrap(), r#""0.0°C""#);
        assert_eq!(serde_json::to_string(&Content::from(vec![1u8, 2])).unwrap(), "[1,2]");
    }
}

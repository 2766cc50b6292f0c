use serde::de::DeserializeOwned;

/// Outcome of decoding a raw store value into a typed one.
#[derive(Debug)]
pub enum Decoded<T> {
    /// Key not present (or expired).
    Absent,
    /// Key present but the payload does not decode as `T`.
    Malformed(serde_json::Error),
    /// The store could not be read; the stored value is unknown.
    Unavailable,
    Present(T),
}

impl<T: DeserializeOwned> Decoded<T> {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => Decoded::Absent,
            Some(text) => match serde_json::from_str(text) {
                Ok(value) => Decoded::Present(value),
                Err(e) => Decoded::Malformed(e),
            },
        }
    }
}

impl<T> Decoded<T> {
    pub fn present(self) -> Option<T> {
        match self {
            Decoded::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Decoded::Absent)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Decoded::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinguishes_absent_malformed_present() {
        assert!(Decoded::<Vec<String>>::from_raw(None).is_absent());
        assert!(matches!(
            Decoded::<Vec<String>>::from_raw(Some("{not json")),
            Decoded::Malformed(_)
        ));
        assert!(matches!(
            Decoded::<Vec<String>>::from_raw(Some("{\"a\":1}")),
            Decoded::Malformed(_)
        ));
        assert_eq!(
            Decoded::<Vec<String>>::from_raw(Some(r#"["a","b"]"#)).present(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }
}

use crate::error::{ButtonError, Result};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawElement {
    Fill,
    Bitmap,
    Icon,
    Text,
    Border,
}

impl DrawElement {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(DrawElement::Fill),
            2 => Some(DrawElement::Bitmap),
            3 => Some(DrawElement::Icon),
            4 => Some(DrawElement::Text),
            5 => Some(DrawElement::Border),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            DrawElement::Fill => 1,
            DrawElement::Bitmap => 2,
            DrawElement::Icon => 3,
            DrawElement::Text => 4,
            DrawElement::Border => 5,
        }
    }
}

/// Layering sequence of the compositing pipeline
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawOrder(Vec<DrawElement>);

impl DrawOrder {
    /// Default for buttons with an icon layer
    pub fn five_element() -> Self {
        Self(vec![
            DrawElement::Fill,
            DrawElement::Bitmap,
            DrawElement::Border,
            DrawElement::Icon,
            DrawElement::Text,
        ])
    }

    /// Default for level-driven buttons
    pub fn legacy() -> Self {
        Self(vec![
            DrawElement::Fill,
            DrawElement::Bitmap,
            DrawElement::Border,
            DrawElement::Text,
        ])
    }

    /// Decode a descriptor of two-digit element codes, e.g. `"0102030405"`
    pub fn parse(descriptor: &str) -> Result<Self> {
        let invalid = || ButtonError::InvalidDrawOrder(descriptor.to_string());
        let bytes = descriptor.trim().as_bytes();
        if bytes.is_empty() || bytes.len() % 2 != 0 || bytes.len() > 10 {
            return Err(invalid());
        }

        let mut elements = Vec::with_capacity(bytes.len() / 2);
        for pair in bytes.chunks(2) {
            let code = std::str::from_utf8(pair)
                .ok()
                .and_then(|s| s.parse::<u8>().ok())
                .ok_or_else(invalid)?;
            let element = DrawElement::from_code(code).ok_or_else(invalid)?;
            if elements.contains(&element) {
                return Err(invalid());
            }
            elements.push(element);
        }
        Ok(Self(elements))
    }

    pub fn elements(&self) -> &[DrawElement] {
        &self.0
    }
}

impl fmt::Display for DrawOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.0 {
            write!(f, "{:02}", element.code())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_descriptor() {
        let order = DrawOrder::parse("0504030201").unwrap();
        assert_eq!(
            order.elements(),
            &[
                DrawElement::Border,
                DrawElement::Text,
                DrawElement::Icon,
                DrawElement::Bitmap,
                DrawElement::Fill
            ]
        );
        assert_eq!(order.to_string(), "0504030201");
    }

    #[test]
    fn test_invalid_codes_rejected() {
        assert!(matches!(
            DrawOrder::parse("0106"),
            Err(ButtonError::InvalidDrawOrder(_))
        ));
        assert!(DrawOrder::parse("010").is_err());
        assert!(DrawOrder::parse("0101").is_err());
        assert!(DrawOrder::parse("").is_err());
        assert!(DrawOrder::parse("01020304050").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(DrawOrder::five_element().to_string(), "0102050304");
        assert_eq!(DrawOrder::legacy().elements().len(), 4);
        assert!(!DrawOrder::legacy().elements().contains(&DrawElement::Icon));
    }
}

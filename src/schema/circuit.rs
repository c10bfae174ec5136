//! Authoritative circuit metadata
//!
//! Circuit info carries the rotation needed to orient a raw trace into the
//! conventional on-screen layout, plus the numbered corners with their exit
//! direction. Both angles are degrees, counter-clockwise positive.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Circuit metadata published alongside a session
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct CircuitInfo {
    /// Rotation in degrees (positive = counter-clockwise)
    pub rotation: f64,
    /// Numbered corners in circuit order
    pub corners: Vec<Corner>,
}

/// One numbered corner
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Corner {
    /// Corner number
    pub number: u32,
    /// Letter suffix for split corners ("13a")
    pub letter: Option<String>,
    pub x: f64,
    pub y: f64,
    /// Exit direction in degrees
    pub angle: f64,
}

impl Corner {
    /// Display label: number followed by the optional letter
    pub fn label(&self) -> String {
        match self.letter.as_deref().map(str::trim) {
            Some(letter) if !letter.is_empty() => format!("{}{}", self.number, letter),
            _ => self.number.to_string(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_include_letter_suffix() {
        let plain = Corner { number: 4, ..Default::default() };
        let split = Corner { number: 13, letter: Some("a".to_string()), ..Default::default() };
        let blank = Corner { number: 7, letter: Some(" ".to_string()), ..Default::default() };
        assert_eq!(plain.label(), "4");
        assert_eq!(split.label(), "13a");
        assert_eq!(blank.label(), "7");
    }

    #[test]
    fn deserializes_pascal_case() {
        let yaml = "Rotation: 92.0\nCorners:\n  - Number: 1\n    Letter: ''\n    X: 10.5\n    Y: -4.0\n    Angle: 270.0\n";
        let info: CircuitInfo = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(info.rotation, 92.0);
        assert_eq!(info.corners.len(), 1);
        assert_eq!(info.corners[0].position(), Point::new(10.5, -4.0));
        assert_eq!(info.corners[0].label(), "1");
    }
}

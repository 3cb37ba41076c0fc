//! Chart annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Drawing kind of a horizontal price level.
pub const HORIZONTAL_LINE: &str = "hline";

/// A drawing on a symbol's chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingObject {
    /// Identifier.
    pub id: String,
    /// Symbol the drawing belongs to.
    pub symbol: String,
    /// Shape: line, hline, rectangle, ellipse, fibonacci, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Colour name or hex code.
    pub color: String,
    /// Anchor points.
    pub points: Vec<Point>,
    /// Optional label.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl DrawingObject {
    /// A horizontal line at `price`.
    pub fn horizontal_line(symbol: &str, price: f64, now: DateTime<Utc>) -> Self {
        DrawingObject {
            id: format!("drawing_{}", now.timestamp_millis()),
            symbol: symbol.to_string(),
            kind: HORIZONTAL_LINE.to_string(),
            color: String::from("yellow"),
            points: vec![Point { x: 0.0, y: price }],
            text: format!("{:.2}", price),
            created_at: now,
        }
    }

    /// Price of a horizontal line, `None` for other shapes.
    pub fn level(&self) -> Option<f64> {
        if self.kind != HORIZONTAL_LINE {
            return None;
        }
        self.points.first().map(|p| p.y)
    }
}

/// A point of a drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Timestamp or bar index.
    pub x: f64,
    /// Price level.
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_omitted() {
        let mut drawing = DrawingObject::horizontal_line("AAPL", 101.5, Utc::now());
        assert_eq!(drawing.level(), Some(101.5));
        drawing.text.clear();
        let value = serde_json::to_value(&drawing).unwrap();
        assert!(value.get("text").is_none());
        assert_eq!(value["type"], "hline");

        drawing.kind = "rectangle".into();
        assert_eq!(drawing.level(), None);
    }
}

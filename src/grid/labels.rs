//! Cell label addressing.
//!
//! Cells can be named board-style: a column letter followed by a 1-based
//! row number. `"A1"` is (0, 0), `"D12"` is (3, 11).

use super::map::{GridMap, Position};
use crate::error::{MargaError, Result};

/// Widest map that single-letter columns can name
pub const MAX_LABEL_COLUMNS: usize = 26;

/// Bounds-checked bijection between cell labels and positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LabelCodec {
    width: usize,
    height: usize,
}

impl LabelCodec {
    /// Create a codec for a `width` x `height` map.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width > MAX_LABEL_COLUMNS {
            return Err(MargaError::InvalidLabel(format!(
                "{} columns cannot be labelled (max {})",
                width, MAX_LABEL_COLUMNS
            )));
        }
        Ok(Self { width, height })
    }

    /// Create a codec matching a map's dimensions.
    pub fn for_map(map: &GridMap) -> Result<Self> {
        Self::new(map.width(), map.height())
    }

    /// Encode a position as a label.
    pub fn encode(&self, pos: Position) -> Result<String> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.height
        {
            return Err(MargaError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        let column = (b'A' + pos.x as u8) as char;
        Ok(format!("{}{}", column, pos.y + 1))
    }

    /// Decode a label (case-insensitive column letter) into a position.
    pub fn decode(&self, label: &str) -> Result<Position> {
        let invalid = || MargaError::InvalidLabel(label.to_string());

        let trimmed = label.trim();
        let mut chars = trimmed.chars();
        let column = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !column.is_ascii_uppercase() {
            return Err(invalid());
        }
        let row_str = chars.as_str();
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: usize = row_str.parse().map_err(|_| invalid())?;

        let x = (column as u8 - b'A') as usize;
        if x >= self.width || row == 0 || row > self.height {
            return Err(invalid());
        }
        Ok(Position::new(x as i32, row as i32 - 1))
    }

    /// Encode every position of a path.
    pub fn encode_path(&self, path: &[Position]) -> Result<Vec<String>> {
        path.iter().map(|&p| self.encode(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> LabelCodec {
        LabelCodec::new(4, 12).unwrap()
    }

    #[test]
    fn test_reference_labels() {
        let c = codec();
        assert_eq!(c.decode("A1").unwrap(), Position::new(0, 0));
        assert_eq!(c.decode("D12").unwrap(), Position::new(3, 11));
        assert_eq!(c.encode(Position::new(0, 0)).unwrap(), "A1");
        assert_eq!(c.encode(Position::new(3, 11)).unwrap(), "D12");
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(codec().decode("b7").unwrap(), Position::new(1, 6));
    }

    #[test]
    fn test_every_cell_roundtrips() {
        let c = codec();
        let map = GridMap::new(4, 12);
        for pos in map.positions() {
            let label = c.encode(pos).unwrap();
            assert_eq!(c.decode(&label).unwrap(), pos);
        }
    }

    #[test]
    fn test_rejects_malformed_and_out_of_range() {
        let c = codec();
        for bad in ["", "A", "1A", "A0", "A13", "E1", "A1x", "#3", "A-1"] {
            assert!(
                matches!(c.decode(bad), Err(MargaError::InvalidLabel(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(matches!(
            c.encode(Position::new(4, 0)),
            Err(MargaError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_too_wide_for_letters() {
        assert!(LabelCodec::new(27, 3).is_err());
        assert!(LabelCodec::new(26, 3).is_ok());
    }
}

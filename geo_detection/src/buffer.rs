use serde::{Deserialize, Serialize};

use crate::{Error, Reference, Result};

/// A dense `rows x 2` buffer of coordinates, row-major, the shape numeric array libraries expect
/// for a route. The reference of the coordinates travels with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteBuffer {
    values: Vec<f64>,
    reference: Reference,
}

impl RouteBuffer {
    pub const COLUMNS: usize = 2;

    pub fn from_rows(rows: Vec<[f64; 2]>, reference: Reference) -> Self {
        Self {
            values: rows.into_iter().flatten().collect(),
            reference,
        }
    }

    /// `shape` is (rows, columns). Only 2 columns make sense.
    pub fn from_flat(values: Vec<f64>, shape: (usize, usize), reference: Reference) -> Result<Self> {
        let (rows, columns) = shape;
        if columns != Self::COLUMNS {
            return Err(Error::InvalidCoordinates { len: columns });
        }
        if values.len() != rows * columns {
            return Err(Error::BufferShape {
                len: values.len(),
                rows,
                columns,
            });
        }
        Ok(Self { values, reference })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), Self::COLUMNS)
    }

    pub fn rows(&self) -> usize {
        self.values.len() / Self::COLUMNS
    }

    pub fn row(&self, idx: usize) -> Option<[f64; 2]> {
        let start = idx.checked_mul(Self::COLUMNS)?;
        let end = start.checked_add(Self::COLUMNS)?;
        match self.values.get(start..end) {
            Some([x, y]) => Some([*x, *y]),
            _ => None,
        }
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.values
            .chunks_exact(Self::COLUMNS)
            .map(|pair| [pair[0], pair[1]])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn reference(&self) -> Reference {
        self.reference
    }

    /// Appends rows of zeroes at the bottom until there are `target_rows`. Never removes rows.
    pub fn zero_pad_rows(&mut self, target_rows: usize) {
        if target_rows > self.rows() {
            self.values.resize(target_rows * Self::COLUMNS, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_at_the_bottom() {
        let mut buffer = RouteBuffer::from_rows(vec![[1.0, 2.0], [3.0, 4.0]], Reference::Cartesian);
        buffer.zero_pad_rows(4);
        assert_eq!(buffer.shape(), (4, 2));
        assert_eq!(buffer.as_slice(), &[1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(buffer.row(3), Some([0.0, 0.0]));
        assert_eq!(buffer.row(4), None);
        assert_eq!(buffer.row(usize::MAX), None);

        buffer.zero_pad_rows(1);
        assert_eq!(buffer.rows(), 4);
    }

    #[test]
    fn flat_shape_is_checked() {
        assert!(RouteBuffer::from_flat(vec![0.0; 6], (3, 2), Reference::default()).is_ok());
        assert_eq!(
            RouteBuffer::from_flat(vec![0.0; 6], (2, 3), Reference::default()),
            Err(Error::InvalidCoordinates { len: 3 })
        );
        assert!(RouteBuffer::from_flat(vec![0.0; 5], (3, 2), Reference::default()).is_err());
    }
}

use std::error::Error;
use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Array2<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> Array2<T> {
    pub fn from_shape_vec(shape: (usize, usize), data: Vec<T>) -> Result<Self, ShapeError> {
        let (rows, cols) = shape;
        if data.len() != rows * cols {
            return Err(ShapeError {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        let start = self.offset(row, 0);
        &self.data[start..start + self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<T>
    where
        T: Clone,
    {
        assert!(col < self.cols, "column index out of bounds");
        (0..self.rows).map(|row| self[(row, col)].clone()).collect()
    }
}

impl<T: Clone> Array2<T> {
    /// Build a matrix from column vectors of equal length.
    pub fn from_columns(nrows: usize, columns: &[Vec<T>]) -> Result<Self, ShapeError> {
        let cols = columns.len();
        let mut data = Vec::with_capacity(nrows * cols);
        for row in 0..nrows {
            for column in columns {
                match column.get(row) {
                    Some(v) => data.push(v.clone()),
                    None => {
                        return Err(ShapeError {
                            rows: nrows,
                            cols,
                            len: column.len(),
                        })
                    }
                }
            }
        }
        Self::from_shape_vec((nrows, cols), data)
    }

    /// Concatenate matrices column-wise, preserving the given order.
    ///
    /// All blocks must share the same row count; `nrows` is used when the
    /// block list is empty.
    pub fn hstack(nrows: usize, blocks: &[Array2<T>]) -> Result<Self, ShapeError> {
        let cols: usize = blocks.iter().map(|b| b.cols).sum();
        if let Some(bad) = blocks.iter().find(|b| b.rows != nrows) {
            return Err(ShapeError {
                rows: nrows,
                cols: bad.cols,
                len: bad.data.len(),
            });
        }
        let mut data = Vec::with_capacity(nrows * cols);
        for row in 0..nrows {
            for block in blocks {
                data.extend_from_slice(block.row_slice(row));
            }
        }
        Self::from_shape_vec((nrows, cols), data)
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let offset = self.offset(index.0, index.1);
        &self.data[offset]
    }
}

#[derive(Debug, Clone)]
pub struct ShapeError {
    rows: usize,
    cols: usize,
    len: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid shape ({}, {}) for buffer of length {}",
            self.rows, self.cols, self.len
        )
    }
}

impl Error for ShapeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hstack_keeps_block_order() {
        let a = Array2::from_shape_vec((2, 1), vec![1.0, 2.0]).unwrap();
        let b = Array2::from_shape_vec((2, 2), vec![10.0, 11.0, 20.0, 21.0]).unwrap();
        let c = Array2::hstack(2, &[a, b]).unwrap();
        assert_eq!(c.shape(), (2, 3));
        assert_eq!(c.row_slice(0), &[1.0, 10.0, 11.0]);
        assert_eq!(c.row_slice(1), &[2.0, 20.0, 21.0]);
    }

    #[test]
    fn hstack_rejects_row_mismatch() {
        let a = Array2::from_shape_vec((2, 1), vec![1.0, 2.0]).unwrap();
        let b = Array2::from_shape_vec((1, 1), vec![3.0]).unwrap();
        assert!(Array2::hstack(2, &[a, b]).is_err());
    }

    #[test]
    fn from_columns_is_row_major() {
        let m = Array2::from_columns(2, &[vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(m.as_slice(), &[1, 3, 2, 4]);
        assert_eq!(m.column(1), vec![3, 4]);
    }

    #[test]
    fn from_shape_vec_checks_length() {
        let err = Array2::from_shape_vec((2, 2), vec![1.0f64; 3]).unwrap_err();
        assert!(err.to_string().contains("length 3"));
    }
}

use crate::error::{MatrixError, Result};
use crate::math::distribution::{sample_normal, UniformSource};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

/// Dense row-major matrix of `f32`.
///
/// The shape is fixed at construction: `data` always holds `rows` rows of
/// `cols` elements. Initialisers (`set_zero`, `set_one`, `set_normal`, `load`)
/// mutate in place; arithmetic, `transpose` and `square` return a fresh matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix", into = "RawMatrix")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f32>>,
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix. Either dimension may be zero.
    pub fn new(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Like `new`, but accepts any integer type and rejects negative sizes
    /// and sizes whose element count overflows `usize`.
    pub fn try_new<R, C>(rows: R, cols: C) -> Result<Matrix>
    where
        R: TryInto<usize> + Copy + fmt::Display,
        C: TryInto<usize> + Copy + fmt::Display,
    {
        let (r, c) = match (rows.try_into(), cols.try_into()) {
            (Ok(r), Ok(c)) => (r, c),
            _ => {
                return Err(MatrixError::InvalidDimensions(format!(
                    "{rows} x {cols} is not a valid shape"
                )))
            }
        };
        if r.checked_mul(c).is_none() {
            return Err(MatrixError::InvalidDimensions(format!(
                "{r} x {c} elements overflow"
            )));
        }
        Ok(Matrix::new(r, c))
    }

    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::new(rows, cols)
    }

    pub fn ones(rows: usize, cols: usize) -> Matrix {
        let mut res = Matrix::new(rows, cols);
        res.set_one();
        res
    }

    /// Matrix with every element drawn independently from N(mu, sigma).
    pub fn normal<S>(rows: usize, cols: usize, mu: f32, sigma: f32, source: &mut S) -> Matrix
    where
        S: UniformSource + ?Sized,
    {
        let mut res = Matrix::new(rows, cols);
        res.set_normal(mu, sigma, source);
        res
    }

    /// Builds a matrix from its rows. All rows must have the same length.
    pub fn from_data(data: Vec<Vec<f32>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if let Some((i, row)) = data.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(MatrixError::InvalidDimensions(format!(
                "row {i} has {} elements, expected {cols}",
                row.len()
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn data(&self) -> &[Vec<f32>] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Writes one element and returns the value it replaced, or `None` if
    /// `(row, col)` is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f32) -> Option<f32> {
        self.data
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .map(|slot| std::mem::replace(slot, value))
    }

    pub fn set_zero(&mut self) {
        self.fill(0.0);
    }

    pub fn set_one(&mut self) {
        self.fill(1.0);
    }

    /// Overwrites every element with an independent N(mu, sigma) sample,
    /// visiting elements in row-major order.
    pub fn set_normal<S>(&mut self, mu: f32, sigma: f32, source: &mut S)
    where
        S: UniformSource + ?Sized,
    {
        for row in &mut self.data {
            for x in row.iter_mut() {
                *x = sample_normal(source, mu, sigma);
            }
        }
    }

    fn fill(&mut self, value: f32) {
        for row in &mut self.data {
            row.fill(value);
        }
    }

    /// Replaces the whole grid. `data` must already have this matrix's shape.
    pub(crate) fn replace_data(&mut self, data: Vec<Vec<f32>>) {
        debug_assert_eq!(data.len(), self.rows);
        self.data = data;
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::new(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f32) -> f32,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Elementwise square, `x * x` for every element. Not a matrix power:
    /// `a.square()` is the Hadamard product `a ⊙ a`, never `a · a`.
    pub fn square(&self) -> Matrix {
        self.map(|x| x * x)
    }

    fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, functor: F) -> Result<Matrix>
    where
        F: Fn(f32, f32) -> f32,
    {
        if self.shape() != rhs.shape() {
            return Err(MatrixError::ShapeMismatch {
                op,
                left: self.shape(),
                right: rhs.shape(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b).map(|(&a, &b)| functor(a, b)).collect())
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix> {
        self.zip_with(rhs, "hadamard", |a, b| a * b)
    }

    /// Standard matrix product; requires `self.cols == rhs.rows`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(MatrixError::ShapeMismatch {
                op: "matmul",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut res = Matrix::new(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// The product behind `*`.
    ///
    /// Equal shapes always give the Hadamard product, even when the operands
    /// are square and would also chain. Otherwise, if `self.cols == rhs.rows`,
    /// the standard matrix product is returned. Anything else is a
    /// `ShapeMismatch`, which is also logged at error level.
    pub fn product(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.shape() == rhs.shape() {
            self.hadamard(rhs)
        } else if self.cols == rhs.rows {
            self.matmul(rhs)
        } else {
            error!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            );
            Err(MatrixError::ShapeMismatch {
                op: "product",
                left: self.shape(),
                right: rhs.shape(),
            })
        }
    }

    /// Renders `label` followed by the rows, logs the block at info level and
    /// returns it.
    pub fn show(&self, label: &str) -> String {
        let text = format!("{label}\n{self}");
        info!("{text}");
        text
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::new(0, 0)
    }
}

/// Rows separated by newlines, elements within a row by single spaces.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.data {
            for (j, x) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{x}")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<f32>>> for Matrix {
    type Error = MatrixError;

    fn try_from(data: Vec<Vec<f32>>) -> Result<Matrix> {
        Matrix::from_data(data)
    }
}

impl From<Matrix> for Vec<Vec<f32>> {
    fn from(m: Matrix) -> Self {
        m.data
    }
}

/// Serialized form of a `Matrix`. The shape is stored next to the rows so
/// that matrices with zero rows keep their column count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f32>>,
}

impl TryFrom<RawMatrix> for Matrix {
    type Error = MatrixError;

    fn try_from(raw: RawMatrix) -> Result<Matrix> {
        if raw.data.len() != raw.rows {
            return Err(MatrixError::InvalidDimensions(format!(
                "{} rows given, expected {}",
                raw.data.len(),
                raw.rows
            )));
        }
        if let Some((i, row)) = raw.data.iter().enumerate().find(|(_, row)| row.len() != raw.cols) {
            return Err(MatrixError::InvalidDimensions(format!(
                "row {i} has {} elements, expected {}",
                row.len(),
                raw.cols
            )));
        }
        Ok(Matrix {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

impl From<Matrix> for RawMatrix {
    fn from(m: Matrix) -> Self {
        RawMatrix {
            rows: m.rows,
            cols: m.cols,
            data: m.data,
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        &self.data[row][col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f32 {
        &mut self.data[row][col]
    }
}

impl Add for &Matrix {
    type Output = Result<Matrix>;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, "add", |a, b| a + b)
    }
}

impl Sub for &Matrix {
    type Output = Result<Matrix>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }
}

impl Mul for &Matrix {
    type Output = Result<Matrix>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.product(rhs)
    }
}

impl Add for Matrix {
    type Output = Result<Matrix>;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Sub for Matrix {
    type Output = Result<Matrix>;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Mul for Matrix {
    type Output = Result<Matrix>;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

// Scalar broadcasting never fails. `scalar op matrix` keeps the operand order,
// so `1.0 - m` computes `1.0 - x` per element.
macro_rules! scalar_ops {
    ($($trait:ident $method:ident $op:tt),*) => {$(
        impl $trait<f32> for &Matrix {
            type Output = Matrix;

            fn $method(self, rhs: f32) -> Matrix {
                self.map(|x| x $op rhs)
            }
        }

        impl $trait<f32> for Matrix {
            type Output = Matrix;

            fn $method(self, rhs: f32) -> Matrix {
                &self $op rhs
            }
        }

        impl $trait<&Matrix> for f32 {
            type Output = Matrix;

            fn $method(self, rhs: &Matrix) -> Matrix {
                rhs.map(|x| self $op x)
            }
        }

        impl $trait<Matrix> for f32 {
            type Output = Matrix;

            fn $method(self, rhs: Matrix) -> Matrix {
                self $op &rhs
            }
        }
    )*};
}

scalar_ops!(Add add +, Sub sub -, Mul mul *);

//! QBF instance: coefficient matrix, loader and objective.

use super::error::InstanceError;
use crate::ga::{Chromosome, Evaluator, Gene, Solution};
use std::path::Path;

/// A quadratic binary function `f(x) = xᵀAx` with an upper-triangular `A`.
///
/// Only the upper triangle (diagonal included) is read from the instance;
/// entries below the diagonal are zero, not mirrored.
#[derive(Debug, Clone, PartialEq)]
pub struct Qbf {
    size: usize,
    /// Row-major `size × size`.
    coefficients: Vec<f64>,
}

impl Qbf {
    /// Builds an instance from the `n(n+1)/2` upper-triangle coefficients,
    /// row-major with `i` outer and `j >= i` inner.
    pub fn from_upper_triangle(size: usize, upper: &[f64]) -> Result<Self, InstanceError> {
        let expected = triangle_len(size);
        if upper.len() != expected {
            return Err(InstanceError::CoefficientCount {
                expected,
                found: upper.len(),
            });
        }

        let mut coefficients = vec![0.0; size * size];
        let mut values = upper.iter();
        for i in 0..size {
            for j in i..size {
                // length checked above
                coefficients[i * size + j] = values.next().copied().unwrap_or_default();
            }
        }
        Ok(Self { size, coefficients })
    }

    /// Parses an instance: the dimension `n`, then `n(n+1)/2` coefficients,
    /// all whitespace separated.
    ///
    /// Tokens after the last coefficient are ignored.
    ///
    /// ```
    /// use u_bitga::qbf::Qbf;
    ///
    /// let qbf = Qbf::parse("2\n 1 -3\n    2\n").unwrap();
    /// assert_eq!(qbf.size(), 2);
    /// assert_eq!(qbf.coefficient(0, 1), -3.0);
    /// assert_eq!(qbf.coefficient(1, 0), 0.0);
    /// assert_eq!(qbf.evaluate_assignment(&[1, 1]), 0.0);
    /// ```
    pub fn parse(input: &str) -> Result<Self, InstanceError> {
        let mut tokens = input.split_whitespace();

        let first = tokens.next().ok_or(InstanceError::MissingDimension)?;
        let size: usize = first
            .parse()
            .map_err(|_| InstanceError::InvalidDimension(first.to_string()))?;

        let expected = triangle_len(size);
        let mut upper = Vec::with_capacity(expected);
        for (position, token) in tokens.by_ref().take(expected).enumerate() {
            let value: f64 = token.parse().map_err(|_| InstanceError::InvalidToken {
                position: position + 1,
                token: token.to_string(),
            })?;
            upper.push(value);
        }
        if upper.len() < expected {
            return Err(InstanceError::Truncated {
                expected,
                found: upper.len(),
            });
        }

        let trailing = tokens.count();
        if trailing > 0 {
            tracing::warn!(trailing, size, "ignoring tokens after the coefficient matrix");
        }

        Self::from_upper_triangle(size, &upper)
    }

    /// Reads and parses an instance file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InstanceError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| InstanceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let qbf = Self::parse(&input)?;
        tracing::debug!(path = %path.display(), size = qbf.size, "loaded qbf instance");
        Ok(qbf)
    }

    /// Dimension of the decision vector.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Coefficient `A[i][j]`.
    ///
    /// # Panics
    /// Panics if `i` or `j` is out of bounds.
    pub fn coefficient(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.size && j < self.size, "index ({i}, {j}) out of bounds");
        self.coefficients[i * self.size + j]
    }

    /// `xᵀAx` for a 0/1 assignment of every variable.
    ///
    /// # Panics
    /// Panics if `assignment.len() != size()`.
    pub fn evaluate_assignment(&self, assignment: &[Gene]) -> f64 {
        assert_eq!(assignment.len(), self.size, "assignment length mismatch");
        let selected: Vec<usize> = assignment
            .iter()
            .enumerate()
            .filter(|(_, &g)| g == 1)
            .map(|(i, _)| i)
            .collect();
        self.evaluate_elements(&selected)
    }

    /// `xᵀAx` where `x_i = 1` exactly for the listed indices.
    ///
    /// # Panics
    /// Panics if an index is out of bounds.
    pub fn evaluate_elements(&self, elements: &[usize]) -> f64 {
        let mut sum = 0.0;
        for &i in elements {
            let row = &self.coefficients[i * self.size..(i + 1) * self.size];
            for &j in elements {
                sum += row[j];
            }
        }
        sum
    }
}

impl Evaluator for Qbf {
    fn domain_size(&self) -> usize {
        self.size
    }

    fn evaluate(&self, solution: &mut Solution) -> f64 {
        solution.cost = self.evaluate_elements(&solution.elements);
        solution.cost
    }

    fn make_viable(&self, _chromosome: &mut Chromosome) {}
}

fn triangle_len(size: usize) -> usize {
    size * (size + 1) / 2
}

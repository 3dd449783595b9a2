//! Plain-text weight files: one matrix per file, one row per line, values separated by
//! whitespace.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use log::info;
use ndarray::{Array2, ArrayView2};

use crate::{
    MlErr, Result,
    arch::{Network, Shape},
};

/// Writes `matrix` to `writer`, one row per line.
pub fn write_matrix<W: Write>(mut writer: W, matrix: ArrayView2<f32>) -> Result<()> {
    for row in matrix.rows() {
        let line: Vec<_> = row.iter().map(f32::to_string).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads a matrix written by `write_matrix`. Blank lines are ignored.
///
/// # Arguments
/// * `what` - The name of the matrix, used in errors.
/// * `reader` - Where to read the matrix from.
pub fn read_matrix<R: Read>(what: &'static str, reader: R) -> Result<Array2<f32>> {
    let mut values = Vec::new();
    let mut rows = 0;
    let mut cols = None;

    for line in BufReader::new(reader).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f32>().map_err(|_| MlErr::InvalidWeight {
                    what,
                    row: rows,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let expected = *cols.get_or_insert(row.len());
        if row.len() != expected {
            return Err(MlErr::ShapeMismatch {
                what,
                got: (rows + 1, row.len()),
                expected: (rows + 1, expected),
            });
        }

        values.extend(row);
        rows += 1;
    }

    let shape = (rows, cols.unwrap_or(0));
    Array2::from_shape_vec(shape, values).map_err(|_| MlErr::ShapeMismatch {
        what,
        got: shape,
        expected: shape,
    })
}

impl Network {
    /// Writes both weight matrices, each to its own file.
    pub fn save_weights<P, Q>(&self, w1_path: P, w2_path: Q) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (w1_path, w2_path) = (w1_path.as_ref(), w2_path.as_ref());

        write_matrix(BufWriter::new(File::create(w1_path)?), self.w1())?;
        write_matrix(BufWriter::new(File::create(w2_path)?), self.w2())?;

        info!(
            "saved weights to {} and {}",
            w1_path.display(),
            w2_path.display()
        );
        Ok(())
    }

    /// Loads a network from weight files written by `save_weights`.
    ///
    /// # Arguments
    /// * `shape` - The layer sizes the files must agree with.
    /// * `w1_path` - The input to hidden weights file.
    /// * `w2_path` - The hidden to output weights file.
    ///
    /// # Returns
    /// The network or a `ShapeMismatch` naming the matrix and both dimensions.
    pub fn load_weights<P, Q>(shape: Shape, w1_path: P, w2_path: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let w1 = read_matrix("W1", File::open(w1_path)?)?;
        let w2 = read_matrix("W2", File::open(w2_path)?)?;
        Network::from_weights(shape, w1, w2)
    }
}

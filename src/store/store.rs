//! Plain-text persistence for `Matrix`.
//!
//! A saved matrix is one line per row, elements separated by commas, each line
//! terminated by `\n`. There is no header and the shape is not stored: the
//! reader must already know `(rows, cols)` and pass a matrix of that shape to
//! `load`. Files live at `<base_dir>/<folder>/<name>[_<n>].txt`.

use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{MatrixError, Result};
use crate::math::matrix::Matrix;
use crate::store::config::StoreConfig;

const EXTENSION: &str = "txt";

/// Reads and writes matrices beneath a base directory.
#[derive(Debug, Clone)]
pub struct MatrixStore {
    base_dir: PathBuf,
    default_name: String,
    default_folder: String,
}

impl MatrixStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> MatrixStore {
        MatrixStore::from_config(&StoreConfig {
            base_dir: base_dir.into(),
            ..StoreConfig::default()
        })
    }

    pub fn from_config(config: &StoreConfig) -> MatrixStore {
        MatrixStore {
            base_dir: config.base_dir.clone(),
            default_name: config.default_name.clone(),
            default_folder: config.default_folder.clone(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<base_dir>/<folder>/<name>.txt`, without checking that it exists.
    pub fn path_for(&self, name: &str, folder: &str) -> PathBuf {
        self.base_dir.join(folder).join(format!("{name}.{EXTENSION}"))
    }

    /// Creates the folder if needed and opens the file to write.
    ///
    /// With `create_new`, an existing `name.txt` is left alone and the first
    /// free `name_2.txt`, `name_3.txt`, ... is created instead. Each candidate
    /// is claimed with `create_new(true)`, so a name taken between attempts
    /// just moves on to the next suffix.
    fn open_target(&self, name: &str, folder: &str, create_new: bool) -> Result<(File, PathBuf)> {
        let dir = self.base_dir.join(folder);
        std::fs::create_dir_all(&dir).map_err(|e| MatrixError::io(&dir, e))?;

        let mut path = self.path_for(name, folder);
        if !create_new {
            let file = File::create(&path).map_err(|e| MatrixError::io(&path, e))?;
            return Ok((file, path));
        }

        let mut number = 1;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    if number > 1 {
                        debug!("{name}.{EXTENSION} exists, using suffix _{number}");
                    }
                    return Ok((file, path));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    number += 1;
                    path = dir.join(format!("{name}_{number}.{EXTENSION}"));
                }
                Err(e) => return Err(MatrixError::io(&path, e)),
            }
        }
    }

    /// Writes `matrix` and returns the path actually used. Without
    /// `create_new` an existing file is overwritten.
    pub fn save(&self, matrix: &Matrix, name: &str, folder: &str, create_new: bool) -> Result<PathBuf> {
        let (file, path) = self.open_target(name, folder, create_new)?;
        debug!("saving {}x{} matrix to {}", matrix.rows(), matrix.cols(), path.display());

        let mut writer = BufWriter::new(file);
        write_rows(&mut writer, matrix)
            .and_then(|_| writer.flush())
            .map_err(|e| MatrixError::io(&path, e))?;
        Ok(path)
    }

    /// Fills `matrix` from `<name>.txt`. The file must provide at least
    /// `matrix.rows()` lines of at least `matrix.cols()` values; anything
    /// beyond that is ignored. On error `matrix` is left untouched.
    pub fn load(&self, matrix: &mut Matrix, name: &str, folder: &str) -> Result<()> {
        let path = self.path_for(name, folder);
        debug!("loading {}x{} matrix from {}", matrix.rows(), matrix.cols(), path.display());

        let text = std::fs::read_to_string(&path).map_err(|e| MatrixError::io(&path, e))?;
        let data = parse_rows(&text, matrix.rows(), matrix.cols())?;
        matrix.replace_data(data);
        Ok(())
    }

    pub fn save_default(&self, matrix: &Matrix, create_new: bool) -> Result<PathBuf> {
        self.save(matrix, &self.default_name, &self.default_folder, create_new)
    }

    pub fn load_default(&self, matrix: &mut Matrix) -> Result<()> {
        self.load(matrix, &self.default_name, &self.default_folder)
    }
}

impl Matrix {
    /// Saves through `store`; see `MatrixStore::save`.
    pub fn save(&self, store: &MatrixStore, name: &str, folder: &str, create_new: bool) -> Result<PathBuf> {
        store.save(self, name, folder, create_new)
    }

    /// Loads through `store` into this already-shaped matrix; see `MatrixStore::load`.
    pub fn load(&mut self, store: &MatrixStore, name: &str, folder: &str) -> Result<()> {
        store.load(self, name, folder)
    }
}

/// Writes rows in the text format: `a,b,c\n` per row.
pub fn write_rows<W: Write>(writer: &mut W, matrix: &Matrix) -> std::io::Result<()> {
    for row in matrix.data() {
        for (j, x) in row.iter().enumerate() {
            if j > 0 {
                writer.write_all(b",")?;
            }
            write!(writer, "{x}")?;
        }
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Parses the first `rows` non-empty lines of `text`, taking the first
/// `cols` non-empty comma-separated tokens of each.
///
/// A matrix with no columns is written as bare newlines, which the blank-line
/// filter would drop, so `cols == 0` needs nothing from the file.
pub fn parse_rows(text: &str, rows: usize, cols: usize) -> Result<Vec<Vec<f32>>> {
    if cols == 0 {
        return Ok(vec![Vec::new(); rows]);
    }

    let lines: Vec<&str> = text
        .split(&['\r', '\n'][..])
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < rows {
        return Err(MatrixError::ShapeMismatch {
            op: "load",
            left: (rows, cols),
            right: (lines.len(), cols),
        });
    }

    let mut data = Vec::with_capacity(rows);
    for (i, line) in lines.iter().take(rows).enumerate() {
        let tokens: Vec<&str> = line.split(',').filter(|t| !t.is_empty()).collect();
        if tokens.len() < cols {
            return Err(MatrixError::ShapeMismatch {
                op: "load",
                left: (rows, cols),
                right: (rows, tokens.len()),
            });
        }

        let row = tokens
            .iter()
            .take(cols)
            .enumerate()
            .map(|(j, token)| {
                token.trim().parse::<f32>().map_err(|source| MatrixError::ParseError {
                    line: i,
                    column: j,
                    token: token.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<f32>>>()?;
        data.push(row);
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(data: &[&[f32]]) -> Matrix {
        Matrix::from_data(data.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn writes_comma_separated_rows() {
        let mut out = Vec::new();
        write_rows(&mut out, &m(&[&[1.0, 2.5], &[-3.0, 0.125]])).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1,2.5\n-3,0.125\n");
    }

    #[test]
    fn parses_crlf_and_skips_blank_lines() {
        let data = parse_rows("1,2\r\n\r\n3, 4\r\n", 2, 2).unwrap();
        assert_eq!(data, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn ignores_extra_rows_and_columns() {
        let data = parse_rows("1,2,9\n3,4,9\n5,6,9\n", 2, 2).unwrap();
        assert_eq!(data, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn zero_column_rows_need_no_tokens() {
        let data = parse_rows("\n\n\n", 3, 0).unwrap();
        assert_eq!(data, vec![Vec::<f32>::new(); 3]);
        assert_eq!(parse_rows("", 2, 0).unwrap().len(), 2);
    }

    #[test]
    fn too_few_lines_is_a_shape_mismatch() {
        let err = parse_rows("1,2\n", 2, 2).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::ShapeMismatch { op: "load", left: (2, 2), right: (1, 2) }
        ));
    }

    #[test]
    fn too_few_tokens_is_a_shape_mismatch() {
        let err = parse_rows("1,2\n3\n", 2, 2).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::ShapeMismatch { op: "load", right: (2, 1), .. }
        ));
    }

    #[test]
    fn bad_token_reports_position() {
        let err = parse_rows("1,2\n3,x4\n", 2, 2).unwrap_err();
        match err {
            MatrixError::ParseError { line, column, token, .. } => {
                assert_eq!((line, column), (1, 1));
                assert_eq!(token, "x4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_new_skips_every_taken_name() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("f");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("w.txt"), "first\n").unwrap();
        std::fs::write(folder.join("w_2.txt"), "second\n").unwrap();

        let store = MatrixStore::new(dir.path());
        let path = store.save(&m(&[&[1.0]]), "w", "f", true).unwrap();
        assert_eq!(path, folder.join("w_3.txt"));
        assert_eq!(std::fs::read_to_string(folder.join("w.txt")).unwrap(), "first\n");
        assert_eq!(std::fs::read_to_string(folder.join("w_2.txt")).unwrap(), "second\n");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "1\n");
    }

    #[test]
    fn path_layout() {
        let store = MatrixStore::new("/data");
        assert_eq!(
            store.path_for("weights", "run1"),
            PathBuf::from("/data/run1/weights.txt")
        );
    }
}

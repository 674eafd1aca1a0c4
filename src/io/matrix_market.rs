//! Matrix Market coordinate reader.
//!
//! Accepts real (or integer) general and symmetric matrices in coordinate
//! format. Symmetric files keep their one-triangle storage; the returned
//! `Shape` tag tells the caller to run `expand_symmetric` before any
//! structure analysis. Complex and pattern fields are rejected. Indices in
//! the file are 1-based.

use crate::error::Error;
use crate::matrix::CsrMatrix;
use std::fs;
use std::path::Path;

/// Storage symmetry declared by the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// One triangle stored; expand before graph analysis.
    Sym,
    /// Full pattern stored.
    Unsym,
}

/// Parse a Matrix Market coordinate body. Explicitly stored zeros are
/// dropped when `drop_zeros` is set.
pub fn read_matrix_market_str(
    content: &str,
    drop_zeros: bool,
) -> Result<(CsrMatrix<f64>, Shape), Error> {
    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| Error::Parse("empty input".into()))?;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.len() < 5 || !fields[0].eq_ignore_ascii_case("%%MatrixMarket") {
        return Err(Error::Parse("missing %%MatrixMarket header".into()));
    }
    if !fields[1].eq_ignore_ascii_case("matrix") || !fields[2].eq_ignore_ascii_case("coordinate") {
        return Err(Error::Parse(format!(
            "unsupported object/format: {} {}",
            fields[1], fields[2]
        )));
    }
    match fields[3].to_ascii_lowercase().as_str() {
        "real" | "integer" => {}
        other => return Err(Error::Parse(format!("unsupported field type: {other}"))),
    }
    let shape = match fields[4].to_ascii_lowercase().as_str() {
        "general" => Shape::Unsym,
        "symmetric" => Shape::Sym,
        other => return Err(Error::Parse(format!("unsupported symmetry: {other}"))),
    };

    let mut data = lines.filter(|l| {
        let t = l.trim();
        !t.is_empty() && !t.starts_with('%')
    });
    let size_line = data
        .next()
        .ok_or_else(|| Error::Parse("missing size line".into()))?;
    let dims: Vec<&str> = size_line.split_whitespace().collect();
    if dims.len() != 3 {
        return Err(Error::Parse(format!("malformed size line: {size_line}")));
    }
    let nrows: usize = dims[0]
        .parse()
        .map_err(|_| Error::Parse(format!("bad row count: {}", dims[0])))?;
    let ncols: usize = dims[1]
        .parse()
        .map_err(|_| Error::Parse(format!("bad column count: {}", dims[1])))?;
    let nnz: usize = dims[2]
        .parse()
        .map_err(|_| Error::Parse(format!("bad entry count: {}", dims[2])))?;

    let mut entries = Vec::with_capacity(nnz);
    let mut seen = 0usize;
    for line in data {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() != 3 {
            return Err(Error::Parse(format!("malformed entry line: {line}")));
        }
        let r: usize = cols[0]
            .parse()
            .map_err(|_| Error::Parse(format!("bad row index: {}", cols[0])))?;
        let c: usize = cols[1]
            .parse()
            .map_err(|_| Error::Parse(format!("bad column index: {}", cols[1])))?;
        let v: f64 = cols[2]
            .parse()
            .map_err(|_| Error::Parse(format!("bad value: {}", cols[2])))?;
        if r == 0 || c == 0 || r > nrows || c > ncols {
            return Err(Error::Parse(format!("index ({r}, {c}) out of range")));
        }
        seen += 1;
        if drop_zeros && v == 0.0 {
            continue;
        }
        entries.push((r - 1, c - 1, v));
    }
    if seen != nnz {
        return Err(Error::Parse(format!("expected {nnz} entries, found {seen}")));
    }
    let m = CsrMatrix::from_triplets(nrows, ncols, &entries)?;
    Ok((m, shape))
}

/// Read a Matrix Market file from disk.
pub fn read_matrix_market<P: AsRef<Path>>(
    path: P,
    drop_zeros: bool,
) -> Result<(CsrMatrix<f64>, Shape), Error> {
    let content = fs::read_to_string(path)?;
    read_matrix_market_str(&content, drop_zeros)
}

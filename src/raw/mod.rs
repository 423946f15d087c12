// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reader for the raw files the engine's `write` command produces.
//!
//! Only the first plot in a file is read. The header is a sequence of
//! `Key: value` lines followed by the variable table, then either `Binary:`
//! (native-endian `f64`, complex values as real/imaginary pairs) or `Values:`
//! (ASCII, one point index followed by one value per variable).

use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RawFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Raw file header is missing '{0}'")]
    MissingHeader(&'static str),

    #[error("Invalid value '{value}' for header '{key}'")]
    InvalidHeader { key: &'static str, value: String },

    #[error("Malformed variable entry: '{0}'")]
    InvalidVariable(String),

    #[error("Raw file has no 'Binary:' or 'Values:' section")]
    MissingData,

    #[error("Raw data truncated: expected {expected} values, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("Invalid numeric value '{0}'")]
    InvalidNumber(String),
}

/// One entry of the `Variables:` table.
#[derive(Debug, Clone, PartialEq)]
pub struct RawVariable {
    pub index: usize,
    pub name: String,
    /// Quantity reported by the engine (`time`, `voltage`, `current`, ...)
    pub kind: String,
}

/// Samples of one variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawColumn {
    pub real: Vec<f64>,
    /// Empty for real plots
    pub imag: Vec<f64>,
}

impl RawColumn {
    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.real.last().copied()
    }

    /// True when every sample is no smaller than the one before it.
    pub fn is_non_decreasing(&self) -> bool {
        self.real.windows(2).all(|w| w[1] >= w[0])
    }
}

/// First plot of a raw file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFile {
    pub title: String,
    pub date: String,
    pub plot_name: String,
    pub flags: String,
    pub variables: Vec<RawVariable>,
    pub points: usize,
    columns: Vec<RawColumn>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Encoding {
    Binary,
    Ascii,
}

impl RawFile {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, RawFileError> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, RawFileError> {
        let mut raw = RawFile::default();
        let mut variable_count: Option<usize> = None;
        let mut points: Option<usize> = None;
        let mut in_variables = false;
        let mut offset = 0;
        let mut encoding = None;

        while offset < bytes.len() {
            let end = bytes[offset..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| offset + p)
                .unwrap_or(bytes.len());
            let line = String::from_utf8_lossy(&bytes[offset..end]);
            let line = line.trim_end_matches('\r');
            offset = (end + 1).min(bytes.len());

            let trimmed = line.trim();
            if trimmed == "Binary:" {
                encoding = Some(Encoding::Binary);
                break;
            }
            if trimmed == "Values:" {
                encoding = Some(Encoding::Ascii);
                break;
            }
            if trimmed.is_empty() {
                continue;
            }

            if in_variables && line.starts_with(|c: char| c.is_whitespace()) {
                raw.variables.push(parse_variable(trimmed)?);
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "Title" => raw.title = value.to_string(),
                "Date" => raw.date = value.to_string(),
                "Plotname" => raw.plot_name = value.to_string(),
                "Flags" => raw.flags = value.to_string(),
                "No. Variables" => variable_count = Some(parse_count("No. Variables", value)?),
                "No. Points" => points = Some(parse_count("No. Points", value)?),
                "Variables" => in_variables = true,
                _ => {}
            }
        }

        let encoding = encoding.ok_or(RawFileError::MissingData)?;
        let variable_count = variable_count.ok_or(RawFileError::MissingHeader("No. Variables"))?;
        let points = points.ok_or(RawFileError::MissingHeader("No. Points"))?;
        if raw.variables.len() != variable_count {
            return Err(RawFileError::InvalidHeader {
                key: "No. Variables",
                value: format!(
                    "{} declared, {} listed",
                    variable_count,
                    raw.variables.len()
                ),
            });
        }

        raw.points = points;
        let complex = raw.is_complex();
        let data = &bytes[offset..];
        raw.columns = match encoding {
            Encoding::Binary => read_binary(data, variable_count, points, complex)?,
            Encoding::Ascii => read_ascii(data, variable_count, points, complex)?,
        };
        Ok(raw)
    }

    pub fn is_complex(&self) -> bool {
        self.flags
            .split_whitespace()
            .any(|flag| flag.eq_ignore_ascii_case("complex"))
    }

    /// Column for `name` under case-insensitive comparison.
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.variables
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
            .and_then(|i| self.columns.get(i))
    }

    /// The first variable, which is the scale of the plot.
    pub fn scale(&self) -> Option<&RawColumn> {
        self.columns.first()
    }
}

fn parse_count(key: &'static str, value: &str) -> Result<usize, RawFileError> {
    value.parse().map_err(|_| RawFileError::InvalidHeader {
        key,
        value: value.to_string(),
    })
}

fn parse_variable(line: &str) -> Result<RawVariable, RawFileError> {
    let mut fields = line.split_whitespace();
    let (Some(index), Some(name)) = (fields.next(), fields.next()) else {
        return Err(RawFileError::InvalidVariable(line.to_string()));
    };
    let index = index
        .parse()
        .map_err(|_| RawFileError::InvalidVariable(line.to_string()))?;
    Ok(RawVariable {
        index,
        name: name.to_string(),
        kind: fields.next().unwrap_or_default().to_string(),
    })
}

/// Numbers the header promises, or `InvalidHeader` if that overflows.
fn expected_values(points: usize, per_point: usize) -> Result<usize, RawFileError> {
    points
        .checked_mul(per_point)
        .ok_or_else(|| RawFileError::InvalidHeader {
            key: "No. Points",
            value: format!("{} points of {} values overflow", points, per_point),
        })
}

/// Columns pre-sized for at most `capacity` samples; callers bound it by the data present.
fn empty_columns(variables: usize, capacity: usize, complex: bool) -> Vec<RawColumn> {
    (0..variables)
        .map(|_| RawColumn {
            real: Vec::with_capacity(capacity),
            imag: if complex {
                Vec::with_capacity(capacity)
            } else {
                Vec::new()
            },
        })
        .collect()
}

fn read_binary(
    data: &[u8],
    variables: usize,
    points: usize,
    complex: bool,
) -> Result<Vec<RawColumn>, RawFileError> {
    let per_value = if complex { 2 } else { 1 };
    let expected = expected_values(points, variables * per_value)?;
    let found = data.len() / 8;
    if found < expected {
        return Err(RawFileError::Truncated { expected, found });
    }

    let mut numbers = data.chunks_exact(8).map(|chunk| {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(chunk);
        f64::from_ne_bytes(buf)
    });
    let mut columns = empty_columns(variables, points, complex);
    for _ in 0..points {
        for column in columns.iter_mut() {
            let real = numbers.next().ok_or(RawFileError::Truncated { expected, found })?;
            column.real.push(real);
            if complex {
                let imag = numbers.next().ok_or(RawFileError::Truncated { expected, found })?;
                column.imag.push(imag);
            }
        }
    }
    Ok(columns)
}

fn read_ascii(
    data: &[u8],
    variables: usize,
    points: usize,
    complex: bool,
) -> Result<Vec<RawColumn>, RawFileError> {
    let text = String::from_utf8_lossy(data);
    let mut tokens = text.split_whitespace();
    let expected = expected_values(points, variables + 1)?;
    let mut found = 0;
    // Every value takes at least two bytes including its separator
    let mut columns = empty_columns(variables, points.min(data.len() / 2), complex);

    for _ in 0..points {
        // Point index
        tokens.next().ok_or(RawFileError::Truncated { expected, found })?;
        found += 1;
        for column in columns.iter_mut() {
            let token = tokens.next().ok_or(RawFileError::Truncated { expected, found })?;
            found += 1;
            let (real, imag) = match token.split_once(',') {
                Some((re, im)) => (parse_number(re)?, Some(parse_number(im)?)),
                None => (parse_number(token)?, None),
            };
            column.real.push(real);
            if complex {
                column.imag.push(imag.unwrap_or(0.0));
            }
        }
    }
    Ok(columns)
}

fn parse_number(token: &str) -> Result<f64, RawFileError> {
    token
        .parse()
        .map_err(|_| RawFileError::InvalidNumber(token.to_string()))
}

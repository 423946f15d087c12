// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Views over the data the engine publishes during a simulation.
//!
//! A [`DataPoint`] either borrows the engine's per-point array directly (the
//! FFI path, no allocation per point) or an owned slice of samples (in-process
//! engines and tests). It never outlives the callback that received it.

use crate::backends::ngspice::ffi;
use std::borrow::Cow;
use std::ffi::CStr;

/// Value of one vector at one accepted timepoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorValue {
    pub real: f64,
    pub imag: f64,
    pub is_scale: bool,
    pub is_complex: bool,
}

impl VectorValue {
    pub fn real(real: f64) -> Self {
        Self {
            real,
            imag: 0.0,
            is_scale: false,
            is_complex: false,
        }
    }

    pub fn scale(real: f64) -> Self {
        Self {
            is_scale: true,
            ..Self::real(real)
        }
    }
}

/// Owned named sample, for engines that do not hand out C arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSample {
    pub name: String,
    pub value: VectorValue,
}

impl VectorSample {
    pub fn new(name: impl Into<String>, value: VectorValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

enum PointSource<'a> {
    Raw(&'a [*mut ffi::VecValues]),
    Owned(&'a [VectorSample]),
}

/// Snapshot of every vector at one accepted timepoint.
pub struct DataPoint<'a> {
    index: i32,
    source: PointSource<'a>,
}

impl<'a> DataPoint<'a> {
    pub fn from_samples(index: i32, samples: &'a [VectorSample]) -> Self {
        Self {
            index,
            source: PointSource::Owned(samples),
        }
    }

    /// Wrap the engine's per-point array.
    ///
    /// # Safety
    /// Every non-null entry must point to a valid `VecValues` for `'a`, and
    /// each `name` must be null or a NUL-terminated string valid for `'a`.
    pub(crate) unsafe fn from_raw(index: i32, values: &'a [*mut ffi::VecValues]) -> Self {
        Self {
            index,
            source: PointSource::Raw(values),
        }
    }

    /// Engine-side index of this point within the run.
    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn len(&self) -> usize {
        match self.source {
            PointSource::Raw(values) => values.len(),
            PointSource::Owned(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value of the vector at position `i`, if present.
    pub fn value(&self, i: usize) -> Option<VectorValue> {
        match self.source {
            PointSource::Raw(values) => {
                let ptr = *values.get(i)?;
                if ptr.is_null() {
                    return None;
                }
                // SAFETY: guaranteed by the contract of `from_raw`
                let raw = unsafe { &*ptr };
                Some(VectorValue {
                    real: raw.creal,
                    imag: raw.cimag,
                    is_scale: raw.is_scale,
                    is_complex: raw.is_complex,
                })
            }
            PointSource::Owned(samples) => samples.get(i).map(|s| s.value),
        }
    }

    /// Name of the vector at position `i`, if present.
    pub fn name(&self, i: usize) -> Option<Cow<'a, str>> {
        match self.source {
            PointSource::Raw(values) => {
                let ptr = *values.get(i)?;
                if ptr.is_null() {
                    return None;
                }
                // SAFETY: guaranteed by the contract of `from_raw`
                let name = unsafe { (*ptr).name };
                if name.is_null() {
                    return None;
                }
                Some(unsafe { CStr::from_ptr(name) }.to_string_lossy())
            }
            PointSource::Owned(samples) => samples.get(i).map(|s| Cow::Borrowed(s.name.as_str())),
        }
    }
}

/// One entry of the vector table.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDescriptor {
    pub number: i32,
    pub name: String,
    pub is_real: bool,
}

/// Vector table published once per simulation by the init-data callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorTable {
    pub plot_name: String,
    pub title: String,
    pub date: String,
    pub plot_type: String,
    pub vectors: Vec<VectorDescriptor>,
}

impl VectorTable {
    /// Build a table of real vectors from names, numbered in order.
    pub fn from_names<I, S>(plot_name: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vectors = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| VectorDescriptor {
                number: i as i32,
                name: name.into(),
                is_real: true,
            })
            .collect();
        Self {
            plot_name: plot_name.into(),
            vectors,
            ..Self::default()
        }
    }

    /// Position of `name` under case-insensitive ASCII comparison.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.vectors
            .iter()
            .position(|v| v.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_position_is_case_insensitive() {
        let table = VectorTable::from_names("tran1", ["time", "V(1)", "v(2)"]);
        assert_eq!(table.position_of("V(2)"), Some(2));
        assert_eq!(table.position_of("TIME"), Some(0));
        assert_eq!(table.position_of("V(3)"), None);
        assert_eq!(table.vectors[1].number, 1);
    }

    #[test]
    fn test_owned_point_access() {
        let samples = vec![
            VectorSample::new("time", VectorValue::scale(0.25)),
            VectorSample::new("V(2)", VectorValue::real(0.7)),
        ];
        let point = DataPoint::from_samples(12, &samples);

        assert_eq!(point.index(), 12);
        assert_eq!(point.len(), 2);
        assert!(point.value(0).unwrap().is_scale);
        assert_eq!(point.value(1).unwrap().real, 0.7);
        assert_eq!(point.name(1).as_deref(), Some("V(2)"));
        assert!(point.value(2).is_none());
    }

    #[test]
    fn test_raw_point_access() {
        let name = CString::new("V(2)").unwrap();
        let mut value = ffi::VecValues {
            name: name.as_ptr() as *mut _,
            creal: 0.9,
            cimag: 0.1,
            is_scale: false,
            is_complex: true,
        };
        let entries = [&mut value as *mut ffi::VecValues, std::ptr::null_mut()];
        let point = unsafe { DataPoint::from_raw(3, &entries) };

        assert_eq!(point.len(), 2);
        let read = point.value(0).unwrap();
        assert_eq!(read.real, 0.9);
        assert_eq!(read.imag, 0.1);
        assert!(read.is_complex);
        assert_eq!(point.name(0).as_deref(), Some("V(2)"));
        assert!(point.value(1).is_none());
        assert!(point.name(1).is_none());
    }
}

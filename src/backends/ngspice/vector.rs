// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::ffi;
use serde::Serialize;
use std::ffi::CStr;

/// `dvec_flags` bit marking real data.
pub const VF_REAL: i16 = 1 << 0;
/// `dvec_flags` bit marking complex data.
pub const VF_COMPLEX: i16 = 1 << 1;

/// Samples of one vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum VectorValues {
    Real(Vec<f64>),
    Complex(Vec<(f64, f64)>),
}

/// Vector copied out of engine-owned storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorData {
    pub name: String,
    /// Engine `simulation_type` code
    pub vector_type: i32,
    pub flags: i16,
    pub values: VectorValues,
}

impl VectorData {
    pub fn len(&self) -> usize {
        match &self.values {
            VectorValues::Real(v) => v.len(),
            VectorValues::Complex(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_real(&self) -> bool {
        self.flags & VF_REAL != 0
    }

    pub fn is_complex(&self) -> bool {
        self.flags & VF_COMPLEX != 0
    }

    /// Physical quantity for the type codes that are stable across engine releases.
    pub fn quantity(&self) -> Option<&'static str> {
        match self.vector_type {
            0 => Some("none"),
            1 => Some("time"),
            2 => Some("frequency"),
            3 => Some("voltage"),
            4 => Some("current"),
            _ => None,
        }
    }

    /// Last sample's real part.
    pub fn last_real(&self) -> Option<f64> {
        match &self.values {
            VectorValues::Real(v) => v.last().copied(),
            VectorValues::Complex(v) => v.last().map(|(re, _)| *re),
        }
    }

    /// Copy a vector description returned by `ngGet_Vec_Info`.
    ///
    /// # Safety
    /// `raw` must be valid, with `v_length` readable elements behind whichever
    /// data pointer is non-null. The storage is only valid until the next command.
    pub(crate) unsafe fn copy_from(raw: &ffi::VectorInfoRaw) -> Self {
        let name = if raw.v_name.is_null() {
            String::new()
        } else {
            CStr::from_ptr(raw.v_name).to_string_lossy().into_owned()
        };
        let length = raw.v_length.max(0) as usize;

        let values = if !raw.v_compdata.is_null() {
            let data = std::slice::from_raw_parts(raw.v_compdata, length);
            VectorValues::Complex(data.iter().map(|c| (c.cx_real, c.cx_imag)).collect())
        } else if !raw.v_realdata.is_null() {
            VectorValues::Real(std::slice::from_raw_parts(raw.v_realdata, length).to_vec())
        } else {
            VectorValues::Real(Vec::new())
        };

        Self {
            name,
            vector_type: raw.v_type,
            flags: raw.v_flags,
            values,
        }
    }
}

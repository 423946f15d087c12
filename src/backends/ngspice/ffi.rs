// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! C layouts and entry-point signatures of the ngspice shared library.
//!
//! These mirror `sharedspice.h` field for field and must not be reordered.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int, c_short, c_void};

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NgComplex {
    pub cx_real: f64,
    pub cx_imag: f64,
}

/// Returned by `ngGet_Vec_Info`; storage is owned by the engine.
#[repr(C)]
#[derive(Debug)]
pub struct VectorInfoRaw {
    pub v_name: *mut c_char,
    pub v_type: c_int,
    pub v_flags: c_short,
    pub v_realdata: *mut f64,
    pub v_compdata: *mut NgComplex,
    pub v_length: c_int,
}

/// One vector at one data point.
#[repr(C)]
#[derive(Debug)]
pub struct VecValues {
    pub name: *mut c_char,
    pub creal: f64,
    pub cimag: f64,
    pub is_scale: bool,
    pub is_complex: bool,
}

/// Every vector at one data point.
#[repr(C)]
#[derive(Debug)]
pub struct VecValuesAll {
    pub veccount: c_int,
    pub vecindex: c_int,
    pub vecsa: *mut *mut VecValues,
}

#[repr(C)]
#[derive(Debug)]
pub struct VecInfo {
    pub number: c_int,
    pub vecname: *mut c_char,
    pub is_real: bool,
    pub pdvec: *mut c_void,
    pub pdvecscale: *mut c_void,
}

/// Vector table of a new simulation.
#[repr(C)]
#[derive(Debug)]
pub struct VecInfoAll {
    pub name: *mut c_char,
    pub title: *mut c_char,
    pub date: *mut c_char,
    pub type_: *mut c_char,
    pub veccount: c_int,
    pub vecs: *mut *mut VecInfo,
}

// Callbacks

pub type SendChar = unsafe extern "C" fn(*mut c_char, c_int, *mut c_void) -> c_int;
pub type SendStat = unsafe extern "C" fn(*mut c_char, c_int, *mut c_void) -> c_int;
pub type ControlledExit = unsafe extern "C" fn(c_int, bool, bool, c_int, *mut c_void) -> c_int;
pub type SendData = unsafe extern "C" fn(*mut VecValuesAll, c_int, c_int, *mut c_void) -> c_int;
pub type SendInitData = unsafe extern "C" fn(*mut VecInfoAll, c_int, *mut c_void) -> c_int;
pub type BGThreadRunning = unsafe extern "C" fn(bool, c_int, *mut c_void) -> c_int;

// Entry points

pub type InitFn = unsafe extern "C" fn(
    Option<SendChar>,
    Option<SendStat>,
    Option<ControlledExit>,
    Option<SendData>,
    Option<SendInitData>,
    Option<BGThreadRunning>,
    *mut c_void,
) -> c_int;
pub type CommandFn = unsafe extern "C" fn(*mut c_char) -> c_int;
pub type CircFn = unsafe extern "C" fn(*mut *mut c_char) -> c_int;
pub type CurPlotFn = unsafe extern "C" fn() -> *mut c_char;
pub type AllPlotsFn = unsafe extern "C" fn() -> *mut *mut c_char;
pub type AllVecsFn = unsafe extern "C" fn(*mut c_char) -> *mut *mut c_char;
pub type VecInfoFn = unsafe extern "C" fn(*mut c_char) -> *mut VectorInfoRaw;
pub type RunningFn = unsafe extern "C" fn() -> bool;
pub type SetBkptFn = unsafe extern "C" fn(f64) -> bool;

/// Resolved entry points of one engine instance.
#[derive(Clone, Copy)]
pub struct Api {
    pub init: InitFn,
    pub command: CommandFn,
    pub circ: CircFn,
    pub cur_plot: CurPlotFn,
    pub all_plots: AllPlotsFn,
    pub all_vecs: AllVecsFn,
    pub vec_info: VecInfoFn,
    pub running: RunningFn,
    pub set_bkpt: SetBkptFn,
}

/// Exported symbol names, NUL-terminated for the loader.
pub mod symbols {
    pub const INIT: &[u8] = b"ngSpice_Init\0";
    pub const COMMAND: &[u8] = b"ngSpice_Command\0";
    pub const CIRC: &[u8] = b"ngSpice_Circ\0";
    pub const CUR_PLOT: &[u8] = b"ngSpice_CurPlot\0";
    pub const ALL_PLOTS: &[u8] = b"ngSpice_AllPlots\0";
    pub const ALL_VECS: &[u8] = b"ngSpice_AllVecs\0";
    pub const VEC_INFO: &[u8] = b"ngGet_Vec_Info\0";
    pub const RUNNING: &[u8] = b"ngSpice_running\0";
    pub const SET_BKPT: &[u8] = b"ngSpice_SetBkpt\0";

    /// Symbol name without the trailing NUL, for error messages.
    pub fn display(symbol: &'static [u8]) -> &'static str {
        let trimmed = symbol.strip_suffix(b"\0").unwrap_or(symbol);
        std::str::from_utf8(trimmed).unwrap_or("<non-utf8 symbol>")
    }
}

#[cfg(feature = "linked")]
mod linked {
    use super::*;

    #[link(name = "ngspice")]
    extern "C" {
        pub fn ngSpice_Init(
            print: Option<SendChar>,
            stat: Option<SendStat>,
            exit: Option<ControlledExit>,
            data: Option<SendData>,
            init_data: Option<SendInitData>,
            bg_running: Option<BGThreadRunning>,
            user: *mut c_void,
        ) -> c_int;
        pub fn ngSpice_Command(command: *mut c_char) -> c_int;
        pub fn ngSpice_Circ(circarray: *mut *mut c_char) -> c_int;
        pub fn ngSpice_CurPlot() -> *mut c_char;
        pub fn ngSpice_AllPlots() -> *mut *mut c_char;
        pub fn ngSpice_AllVecs(plotname: *mut c_char) -> *mut *mut c_char;
        pub fn ngGet_Vec_Info(vecname: *mut c_char) -> *mut VectorInfoRaw;
        pub fn ngSpice_running() -> bool;
        pub fn ngSpice_SetBkpt(time: f64) -> bool;
    }
}

#[cfg(feature = "linked")]
impl Api {
    /// Entry points of the module linked into this binary.
    pub fn linked() -> Self {
        Self {
            init: linked::ngSpice_Init,
            command: linked::ngSpice_Command,
            circ: linked::ngSpice_Circ,
            cur_plot: linked::ngSpice_CurPlot,
            all_plots: linked::ngSpice_AllPlots,
            all_vecs: linked::ngSpice_AllVecs,
            vec_info: linked::ngGet_Vec_Info,
            running: linked::ngSpice_running,
            set_bkpt: linked::ngSpice_SetBkpt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_display_trims_nul() {
        assert_eq!(symbols::display(symbols::INIT), "ngSpice_Init");
        assert_eq!(symbols::display(symbols::VEC_INFO), "ngGet_Vec_Info");
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! `extern "C"` entry points registered with `ngSpice_Init`.
//!
//! Each trampoline recovers the [`Observer`] from the user pointer, converts
//! the engine's structures into borrowed views and forwards the event. Panics
//! are caught here; unwinding into the engine is undefined behaviour.

use super::ffi;
use crate::observation::{DataPoint, Observer, VectorDescriptor, VectorTable};
use std::borrow::Cow;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// # Safety
/// `user` must be null or the pointer registered at init, whose `Observer` is
/// kept alive by the engine handle.
unsafe fn observer<'a>(user: *mut c_void) -> Option<&'a Observer> {
    (user as *const Observer).as_ref()
}

unsafe fn text<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

fn guarded<F: FnOnce()>(callback: &str, body: F) {
    if catch_unwind(AssertUnwindSafe(body)).is_err() {
        tracing::error!(callback, "Panic in engine callback suppressed");
    }
}

pub(crate) unsafe extern "C" fn send_char(line: *mut c_char, id: c_int, user: *mut c_void) -> c_int {
    guarded("send_char", || {
        if let Some(observer) = observer(user) {
            observer.on_char(id, &text(line));
        }
    });
    0
}

pub(crate) unsafe extern "C" fn send_stat(line: *mut c_char, id: c_int, user: *mut c_void) -> c_int {
    guarded("send_stat", || {
        if let Some(observer) = observer(user) {
            observer.on_stat(id, &text(line));
        }
    });
    0
}

pub(crate) unsafe extern "C" fn controlled_exit(
    status: c_int,
    immediate: bool,
    quit: bool,
    id: c_int,
    user: *mut c_void,
) -> c_int {
    guarded("controlled_exit", || {
        if let Some(observer) = observer(user) {
            observer.on_exit(id, status, immediate, quit);
        }
    });
    status
}

pub(crate) unsafe extern "C" fn send_data(
    all: *mut ffi::VecValuesAll,
    _count: c_int,
    id: c_int,
    user: *mut c_void,
) -> c_int {
    guarded("send_data", || {
        let (Some(observer), Some(all)) = (observer(user), all.as_ref()) else {
            return;
        };
        let entries: &[*mut ffi::VecValues] = if all.vecsa.is_null() || all.veccount <= 0 {
            &[]
        } else {
            std::slice::from_raw_parts(all.vecsa, all.veccount as usize)
        };
        let point = DataPoint::from_raw(all.vecindex, entries);
        observer.on_data(id, &point);
    });
    0
}

pub(crate) unsafe extern "C" fn send_init_data(
    all: *mut ffi::VecInfoAll,
    id: c_int,
    user: *mut c_void,
) -> c_int {
    guarded("send_init_data", || {
        let (Some(observer), Some(all)) = (observer(user), all.as_ref()) else {
            return;
        };
        observer.on_init_data(id, vector_table(all));
    });
    0
}

pub(crate) unsafe extern "C" fn bg_thread_running(no_runs: bool, id: c_int, user: *mut c_void) -> c_int {
    guarded("bg_thread_running", || {
        if let Some(observer) = observer(user) {
            observer.on_thread_state(id, no_runs);
        }
    });
    0
}

/// Copy the engine's vector table into an owned one.
unsafe fn vector_table(all: &ffi::VecInfoAll) -> VectorTable {
    let entries: &[*mut ffi::VecInfo] = if all.vecs.is_null() || all.veccount <= 0 {
        &[]
    } else {
        std::slice::from_raw_parts(all.vecs, all.veccount as usize)
    };
    let vectors = entries
        .iter()
        .filter_map(|&ptr| ptr.as_ref())
        .map(|info| VectorDescriptor {
            number: info.number,
            name: text(info.vecname).into_owned(),
            is_real: info.is_real,
        })
        .collect();

    VectorTable {
        plot_name: text(all.name).into_owned(),
        title: text(all.title).into_owned(),
        date: text(all.date).into_owned(),
        plot_type: text(all.type_).into_owned(),
        vectors,
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine handle over the ngspice C ABI.
//!
//! Two construction paths produce the same [`Engine`]: [`Engine::load`]
//! resolves the entry points from a module opened at runtime, and
//! [`Engine::linked`] binds to the module linked into the binary (feature
//! `linked`). Everything after construction is shared.
//!
//! The engine keeps a raw pointer to the [`Observer`] as its user data. The
//! handle holds an `Arc` to it, and a linked module stays resident after
//! unload, so the supervisor keeps its own `Arc` for the life of the process.

use super::callbacks;
use super::ffi::{self, symbols};
use super::vector::VectorData;
use crate::config::consts::MAX_COMMAND_LENGTH;
use crate::errors::{EngineError, EngineResult};
use crate::observability::messages::engine::{
    CommandRefused, CommandSubmitted, EngineInitialized, EngineLoaded, EngineUnloaded,
};
use crate::observability::messages::StructuredLog;
use crate::observation::Observer;
use crate::traits::Simulator;
use libloading::Library;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_void};
use std::path::Path;
use std::ptr;
use std::sync::Arc;

pub struct Engine {
    api: ffi::Api,
    library: Option<Library>,
    observer: Arc<Observer>,
    origin: String,
    initialized: bool,
    unloaded: bool,
}

impl Engine {
    /// Open the module at `path` and resolve every required entry point.
    pub fn load(path: &Path, observer: Arc<Observer>) -> EngineResult<Self> {
        let origin = path.display().to_string();
        // SAFETY: loading runs the module's initializers; libngspice has no
        // requirements on the host beyond being loaded once per handle.
        let library = unsafe { Library::new(path) }.map_err(|source| EngineError::ModuleLoad {
            path: origin.clone(),
            source,
        })?;
        let api = resolve(&library, &origin)?;
        EngineLoaded { origin: &origin }.log();

        Ok(Self {
            api,
            library: Some(library),
            observer,
            origin,
            initialized: false,
            unloaded: false,
        })
    }

    /// Bind to the module linked into this binary.
    #[cfg(feature = "linked")]
    pub fn linked(observer: Arc<Observer>) -> EngineResult<Self> {
        let origin = "linked libngspice".to_string();
        EngineLoaded { origin: &origin }.log();
        Ok(Self {
            api: ffi::Api::linked(),
            library: None,
            observer,
            origin,
            initialized: false,
            unloaded: false,
        })
    }

    #[cfg(not(feature = "linked"))]
    pub fn linked(_observer: Arc<Observer>) -> EngineResult<Self> {
        Err(EngineError::Unsupported("linked".to_string()))
    }

    /// Register the callback set and the observer as user data.
    pub fn init(&mut self) -> EngineResult<()> {
        if self.unloaded {
            return Err(EngineError::Unloaded);
        }
        self.observer.attach();
        let user = Arc::as_ptr(&self.observer) as *mut c_void;

        // SAFETY: the trampolines match the declared signatures and `user`
        // stays valid for as long as the engine may call back.
        let status = unsafe {
            (self.api.init)(
                Some(callbacks::send_char),
                Some(callbacks::send_stat),
                Some(callbacks::controlled_exit),
                Some(callbacks::send_data),
                Some(callbacks::send_init_data),
                Some(callbacks::bg_thread_running),
                user,
            )
        };
        if status != 0 {
            return Err(EngineError::InitRejected(status));
        }

        self.initialized = true;
        tracing::info!("{}", EngineInitialized { origin: &self.origin });
        Ok(())
    }

    pub fn observer(&self) -> &Arc<Observer> {
        &self.observer
    }

    fn ensure_live(&self) -> EngineResult<()> {
        if self.unloaded {
            return Err(EngineError::Unloaded);
        }
        if let Some(exit) = self.observer.state().exit_request() {
            return Err(EngineError::Exited {
                status: exit.status,
            });
        }
        Ok(())
    }

    fn checked_command(&mut self, text: &str) -> EngineResult<i32> {
        self.ensure_live()?;
        if text.len() > MAX_COMMAND_LENGTH {
            return Err(EngineError::CommandTooLong {
                length: text.len(),
                max: MAX_COMMAND_LENGTH,
            });
        }
        let command = CString::new(text)?;
        Ok(self.submit(&command))
    }

    /// Submit without the liveness guard; teardown uses this after an exit request.
    fn submit(&self, command: &CStr) -> i32 {
        // SAFETY: the engine copies the string before returning
        let status = unsafe { (self.api.command)(command.as_ptr() as *mut c_char) };
        CommandSubmitted {
            command: &command.to_string_lossy(),
            status,
        }
        .log();
        status
    }
}

impl Simulator for Engine {
    fn command(&mut self, text: &str) -> EngineResult<i32> {
        self.checked_command(text).inspect_err(|error| {
            tracing::warn!("{}", CommandRefused { command: text, error });
        })
    }

    fn exec_command(&mut self, text: &str) -> EngineResult<Vec<String>> {
        self.observer.begin_capture();
        let result = self.command(text);
        let captured = self.observer.take_capture();
        result?;
        Ok(captured.stdout)
    }

    fn load_circuit(&mut self, lines: &[&str]) -> EngineResult<i32> {
        self.ensure_live()?;
        let owned = lines
            .iter()
            .map(|line| CString::new(*line))
            .collect::<Result<Vec<_>, _>>()?;
        let mut array: Vec<*mut c_char> = owned.iter().map(|l| l.as_ptr() as *mut c_char).collect();
        array.push(ptr::null_mut());

        // SAFETY: NULL-terminated array of strings that outlive the call
        let status = unsafe { (self.api.circ)(array.as_mut_ptr()) };
        tracing::debug!(lines = lines.len(), status, "Circuit handed to engine");
        Ok(status)
    }

    fn current_plot(&mut self) -> EngineResult<String> {
        self.ensure_live()?;
        // SAFETY: engine-owned string, copied before the next command
        let plot = unsafe { (self.api.cur_plot)() };
        unsafe { owned_string(plot) }.ok_or_else(|| EngineError::NoData {
            operation: "current plot".to_string(),
        })
    }

    fn all_plots(&mut self) -> EngineResult<Vec<String>> {
        self.ensure_live()?;
        let plots = unsafe { (self.api.all_plots)() };
        unsafe { string_array(plots) }.ok_or_else(|| EngineError::NoData {
            operation: "plot list".to_string(),
        })
    }

    fn all_vectors(&mut self, plot: &str) -> EngineResult<Vec<String>> {
        self.ensure_live()?;
        let name = CString::new(plot)?;
        let vectors = unsafe { (self.api.all_vecs)(name.as_ptr() as *mut c_char) };
        unsafe { string_array(vectors) }.ok_or_else(|| EngineError::NoData {
            operation: format!("vectors of plot '{}'", plot),
        })
    }

    fn vector_info(&mut self, name: &str) -> EngineResult<VectorData> {
        self.ensure_live()?;
        let qualified = CString::new(name)?;
        let info = unsafe { (self.api.vec_info)(qualified.as_ptr() as *mut c_char) };
        // SAFETY: non-null result points at a vector valid until the next command
        match unsafe { info.as_ref() } {
            Some(raw) => Ok(unsafe { VectorData::copy_from(raw) }),
            None => Err(EngineError::NoData {
                operation: format!("vector '{}'", name),
            }),
        }
    }

    fn is_running(&mut self) -> EngineResult<bool> {
        self.ensure_live()?;
        Ok(unsafe { (self.api.running)() })
    }

    fn set_breakpoint(&mut self, time: f64) -> EngineResult<bool> {
        self.ensure_live()?;
        Ok(unsafe { (self.api.set_bkpt)(time) })
    }

    fn unload(&mut self) {
        if self.unloaded {
            return;
        }
        if self.initialized {
            self.submit(c"bg_pstop");
        }
        self.observer.detach();
        self.unloaded = true;

        let module_released = self.library.take().is_some();
        EngineUnloaded {
            origin: &self.origin,
            module_released,
        }
        .log();
    }

    fn origin(&self) -> &str {
        &self.origin
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.unload();
    }
}

fn resolve(library: &Library, origin: &str) -> EngineResult<ffi::Api> {
    // SAFETY: each symbol is read as the fn-pointer type declared in sharedspice.h
    unsafe {
        Ok(ffi::Api {
            init: symbol(library, origin, symbols::INIT)?,
            command: symbol(library, origin, symbols::COMMAND)?,
            circ: symbol(library, origin, symbols::CIRC)?,
            cur_plot: symbol(library, origin, symbols::CUR_PLOT)?,
            all_plots: symbol(library, origin, symbols::ALL_PLOTS)?,
            all_vecs: symbol(library, origin, symbols::ALL_VECS)?,
            vec_info: symbol(library, origin, symbols::VEC_INFO)?,
            running: symbol(library, origin, symbols::RUNNING)?,
            set_bkpt: symbol(library, origin, symbols::SET_BKPT)?,
        })
    }
}

unsafe fn symbol<T: Copy>(library: &Library, origin: &str, name: &'static [u8]) -> EngineResult<T> {
    library
        .get::<T>(name)
        .map(|symbol| *symbol)
        .map_err(|source| EngineError::MissingSymbol {
            path: origin.to_string(),
            symbol: symbols::display(name),
            source,
        })
}

unsafe fn owned_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Copy a NULL-terminated array of engine-owned strings.
unsafe fn string_array(mut ptr: *mut *mut c_char) -> Option<Vec<String>> {
    if ptr.is_null() {
        return None;
    }
    let mut strings = Vec::new();
    while !(*ptr).is_null() {
        strings.push(CStr::from_ptr(*ptr).to_string_lossy().into_owned());
        ptr = ptr.add(1);
    }
    Some(strings)
}

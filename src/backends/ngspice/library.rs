// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Module path used when neither the environment nor the config names one.
#[cfg(target_os = "cygwin")]
pub fn default_library_path() -> &'static str {
    "/cygdrive/c/cygwin/usr/local/bin/cygngspice-0.dll"
}

#[cfg(windows)]
pub fn default_library_path() -> &'static str {
    "ngspice.dll"
}

#[cfg(target_os = "macos")]
pub fn default_library_path() -> &'static str {
    "libngspice.dylib"
}

#[cfg(not(any(windows, target_os = "macos", target_os = "cygwin")))]
pub fn default_library_path() -> &'static str {
    "libngspice.so"
}

// SPDX-License-Identifier: MIT
//
// OS calls: escape-sequence enablement, the console output surface, and
// terminal size queries.
//
// Safety: this module uses `unsafe` for `ioctl(TIOCGWINSZ)` on unix and for
// the Win32 console API on Windows. Each block is a single FFI call on
// locally owned, properly initialized data.
#![allow(unsafe_code)]
//
// Everything platform-specific is selected here, once, behind plain
// functions. The rest of the crate asks `console_surface()` for a surface
// and gets `None` where the platform has no console API.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use crate::config::PlatformErrorPolicy;
use crate::console::ConsoleSurface;
use crate::error::{Error, Result};

// ─── Size ────────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

/// Query the controlling terminal's size via `ioctl(TIOCGWINSZ)`.
///
/// `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

/// Query the visible console window size.
#[cfg(windows)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let info = win::screen_buffer_info()?;
    let w = info.srWindow;
    let cols = u16::try_from(i32::from(w.Right) - i32::from(w.Left) + 1).ok()?;
    let rows = u16::try_from(i32::from(w.Bottom) - i32::from(w.Top) + 1).ok()?;
    (cols > 0 && rows > 0).then_some(Size { cols, rows })
}

#[cfg(not(any(unix, windows)))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

// ─── Escape processing ───────────────────────────────────────────────────────

/// Remembers whether escape processing was actually turned on.
///
/// Only a successful enable latches. A failure suppressed under
/// [`PlatformErrorPolicy::Ignore`] leaves the gate open, so the next caller
/// retries and a [`PlatformErrorPolicy::Raise`] caller still sees the error.
#[derive(Debug)]
pub struct EscapeGate {
    enabled: AtomicBool,
}

impl EscapeGate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Run `enable` unless an earlier call already succeeded.
    ///
    /// # Errors
    ///
    /// [`Error::Platform`] when `enable` fails and `policy` is
    /// [`PlatformErrorPolicy::Raise`]. With [`PlatformErrorPolicy::Ignore`]
    /// the failure is logged and `Ok` is returned.
    pub fn enable_with<F>(&self, policy: PlatformErrorPolicy, enable: F) -> Result<()>
    where
        F: FnOnce() -> io::Result<()>,
    {
        if self.is_enabled() {
            return Ok(());
        }
        match enable() {
            Ok(()) => {
                self.enabled.store(true, Ordering::Release);
                Ok(())
            }
            Err(err) => match policy {
                PlatformErrorPolicy::Raise => Err(Error::Platform(err)),
                PlatformErrorPolicy::Ignore => {
                    warn!("could not enable escape processing, continuing: {err}");
                    Ok(())
                }
            },
        }
    }
}

impl Default for EscapeGate {
    fn default() -> Self {
        Self::new()
    }
}

static ESCAPES: EscapeGate = EscapeGate::new();

/// Make sure the process's output handle interprets escape sequences.
///
/// The OS call succeeds at most once per process; later calls return
/// immediately. On unix terminals escapes are always interpreted.
///
/// # Errors
///
/// See [`EscapeGate::enable_with`].
pub fn enable_escape_processing(policy: PlatformErrorPolicy) -> Result<()> {
    ESCAPES.enable_with(policy, enable_virtual_terminal)
}

#[cfg(windows)]
fn enable_virtual_terminal() -> io::Result<()> {
    win::enable_virtual_terminal()
}

#[cfg(not(windows))]
#[allow(clippy::unnecessary_wraps)]
const fn enable_virtual_terminal() -> io::Result<()> {
    Ok(())
}

// ─── Console surface ─────────────────────────────────────────────────────────

/// The process's console output surface, if the platform has one and stdout
/// is attached to it.
#[cfg(windows)]
#[must_use]
pub fn console_surface() -> Option<Box<dyn ConsoleSurface>> {
    win::Console::stdout().map(|c| Box::new(c) as Box<dyn ConsoleSurface>)
}

#[cfg(not(windows))]
#[must_use]
pub fn console_surface() -> Option<Box<dyn ConsoleSurface>> {
    None
}

#[cfg(windows)]
mod win {
    use std::io;

    use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
    use windows_sys::Win32::System::Console::{
        CHAR_INFO, CHAR_INFO_0, CONSOLE_MODE, CONSOLE_SCREEN_BUFFER_INFO, COORD,
        ENABLE_VIRTUAL_TERMINAL_PROCESSING, GetConsoleMode, GetConsoleScreenBufferInfo,
        GetStdHandle, STD_OUTPUT_HANDLE, SMALL_RECT, SetConsoleMode, WriteConsoleOutputW,
    };

    use crate::codepage;
    use crate::console::{CellRecord, ConsoleSurface};

    fn stdout_handle() -> Option<HANDLE> {
        let handle = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) };
        (!handle.is_null() && handle != INVALID_HANDLE_VALUE).then_some(handle)
    }

    fn console_mode(handle: HANDLE) -> io::Result<CONSOLE_MODE> {
        let mut mode: CONSOLE_MODE = 0;
        if unsafe { GetConsoleMode(handle, &mut mode) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(mode)
    }

    pub fn enable_virtual_terminal() -> io::Result<()> {
        let handle = stdout_handle().ok_or_else(io::Error::last_os_error)?;
        let mode = console_mode(handle)?;
        if unsafe { SetConsoleMode(handle, mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn screen_buffer_info() -> Option<CONSOLE_SCREEN_BUFFER_INFO> {
        let handle = stdout_handle()?;
        let mut info: CONSOLE_SCREEN_BUFFER_INFO = unsafe { std::mem::zeroed() };
        let ok = unsafe { GetConsoleScreenBufferInfo(handle, &mut info) };
        (ok != 0).then_some(info)
    }

    /// Console screen buffer attached to stdout.
    pub struct Console {
        handle: HANDLE,
    }

    impl Console {
        pub fn stdout() -> Option<Self> {
            let handle = stdout_handle()?;
            console_mode(handle).ok()?;
            Some(Self { handle })
        }
    }

    fn coord(v: u16) -> io::Result<i16> {
        i16::try_from(v).map_err(|_| io::Error::other("console coordinate out of range"))
    }

    impl ConsoleSurface for Console {
        fn write_region(
            &mut self,
            records: &[CellRecord],
            width: u16,
            height: u16,
            x: u16,
            y: u16,
        ) -> io::Result<()> {
            let infos: Vec<CHAR_INFO> = records
                .iter()
                .map(|rec| CHAR_INFO {
                    Char: CHAR_INFO_0 {
                        UnicodeChar: u16::try_from(u32::from(codepage::decode(rec.code)))
                            .unwrap_or(u16::from(b'?')),
                    },
                    Attributes: rec.console_attributes(),
                })
                .collect();

            let size = COORD {
                X: coord(width)?,
                Y: coord(height)?,
            };
            let origin = COORD { X: 0, Y: 0 };
            let mut region = SMALL_RECT {
                Left: coord(x)?,
                Top: coord(y)?,
                Right: coord(x.saturating_add(width - 1))?,
                Bottom: coord(y.saturating_add(height - 1))?,
            };
            let ok = unsafe {
                WriteConsoleOutputW(self.handle, infos.as_ptr(), size, origin, &mut region)
            };
            if ok == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

use std::io::{self, Read};
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use signal_hook::consts::{SIGHUP, SIGQUIT, SIGTERM};

// Cooked settings captured the first time raw mode is entered. Read from
// signal context, so only lock-free access is allowed here.
static SAVED: OnceLock<(RawFd, libc::termios)> = OnceLock::new();
static RAW_ACTIVE: AtomicBool = AtomicBool::new(false);
static RESTORE_HOOK: Once = Once::new();

pub fn is_terminal(fd: RawFd) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

/// Unbuffered reader over a borrowed descriptor.
///
/// Each `read` is a single `read(2)` of at most `buf.len()` bytes, so bytes
/// the editor has not asked for stay in the descriptor for child processes
/// that inherit it.
#[derive(Debug, Clone, Copy)]
pub struct FdReader {
    fd: RawFd,
}

impl FdReader {
    pub fn new(fd: RawFd) -> Self {
        FdReader { fd }
    }

    pub fn stdin() -> Self {
        Self::new(libc::STDIN_FILENO)
    }

    pub fn fd(&self) -> RawFd {
        self.fd
    }
}

impl Read for FdReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }
}

/// Non-canonical, non-echoing terminal mode held for one editor session.
/// Signal generation is off too, so Ctrl-C arrives as a byte.
///
/// The original settings come back when the guard is dropped, and also when
/// the process is killed by SIGTERM, SIGHUP or SIGQUIT while the guard is
/// alive.
pub struct RawMode {
    fd: RawFd,
    original: libc::termios,
}

impl RawMode {
    /// Returns `None` when `fd` is not a terminal.
    pub fn enable(fd: RawFd) -> io::Result<Option<Self>> {
        if !is_terminal(fd) {
            return Ok(None);
        }

        let mut original = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(fd, &mut original) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let _ = SAVED.set((fd, original));
        install_restore_hook();

        let raw = raw_settings(&original);
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        RAW_ACTIVE.store(true, Ordering::SeqCst);

        Ok(Some(RawMode { fd, original }))
    }
}

fn raw_settings(original: &libc::termios) -> libc::termios {
    let mut raw = *original;
    raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
    raw.c_cc[libc::VMIN] = 1;
    raw.c_cc[libc::VTIME] = 0;
    raw
}

impl Drop for RawMode {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSANOW, &self.original);
        }
        RAW_ACTIVE.store(false, Ordering::SeqCst);
    }
}

fn restore_saved() {
    if !RAW_ACTIVE.load(Ordering::SeqCst) {
        return;
    }
    if let Some((fd, original)) = SAVED.get() {
        unsafe {
            libc::tcsetattr(*fd, libc::TCSANOW, original);
        }
    }
}

fn install_restore_hook() {
    RESTORE_HOOK.call_once(|| {
        for signal in [SIGTERM, SIGHUP, SIGQUIT] {
            // tcsetattr is async-signal-safe; the default action runs after.
            let result = unsafe {
                signal_hook::low_level::register(signal, move || {
                    restore_saved();
                    let _ = signal_hook::low_level::emulate_default_handler(signal);
                })
            };
            if let Err(e) = result {
                tracing::warn!("could not hook signal {}: {}", signal, e);
            }
        }
    });
}

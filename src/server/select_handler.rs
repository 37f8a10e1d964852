use libc::{FD_ISSET, FD_SET, FD_ZERO, fd_set, pselect, timespec};
use std::os::fd::RawFd;
use std::time::Duration;

pub struct SelectHandler {
    timeout: Duration,
}

impl SelectHandler {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Blocks until one of `fds` is readable or the timeout runs out.
    /// Returns the positions in `fds` that are ready; empty on timeout or signal.
    pub fn wait_for_readable(&self, fds: &[RawFd]) -> std::io::Result<Vec<usize>> {
        let mut read_set: fd_set = unsafe { std::mem::zeroed() };
        unsafe { FD_ZERO(&mut read_set) };

        let mut max_fd = -1;
        for &fd in fds {
            unsafe { FD_SET(fd, &mut read_set) };
            if fd > max_fd {
                max_fd = fd;
            }
        }

        let timeout = timespec {
            tv_sec: self.timeout.as_secs() as _,
            tv_nsec: self.timeout.subsec_nanos() as _,
        };

        let ready_count = unsafe {
            pselect(
                max_fd + 1,
                &mut read_set,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &timeout,
                std::ptr::null(),
            )
        };

        if ready_count < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(err);
        }

        Ok(fds
            .iter()
            .enumerate()
            .filter(|&(_, &fd)| unsafe { FD_ISSET(fd, &read_set) })
            .map(|(i, _)| i)
            .collect())
    }
}

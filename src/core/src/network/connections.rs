//! Counting the inet sockets (TCP and UDP, v4 and v6) owned by a process.
//!
//! On Linux the process's file descriptors are listed through `procfs` and
//! every socket inode is matched against the kernel's TCP/UDP tables, which
//! excludes unix-domain and netlink sockets from the count.

use crate::error_handling::types::InspectionError;

/// Source of per-process connection counts.
pub trait ConnectionSource: Send + Sync {
    /// Returns the number of active inet connections held by `pid`.
    fn connections(&self, pid: u32) -> Result<usize, InspectionError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcConnections;

impl ProcConnections {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "linux")]
impl ConnectionSource for ProcConnections {
    fn connections(&self, pid: u32) -> Result<usize, InspectionError> {
        use procfs::process::{FDTarget, Process};
        use std::collections::HashSet;

        let raw_pid = i32::try_from(pid).map_err(|_| InspectionError::NoSuchProcess(pid))?;
        let process = Process::new(raw_pid).map_err(|e| map_proc_error(pid, e))?;

        let mut socket_inodes = HashSet::new();
        for fd in process.fd().map_err(|e| map_proc_error(pid, e))? {
            // A descriptor closed while iterating is not an error for the whole count.
            if let Ok(info) = fd {
                if let FDTarget::Socket(inode) = info.target {
                    socket_inodes.insert(inode);
                }
            }
        }

        if socket_inodes.is_empty() {
            return Ok(0);
        }

        let inet_inodes = inet_socket_inodes().map_err(|e| map_proc_error(pid, e))?;
        Ok(socket_inodes
            .iter()
            .filter(|inode| inet_inodes.contains(*inode))
            .count())
    }
}

#[cfg(not(target_os = "linux"))]
impl ConnectionSource for ProcConnections {
    fn connections(&self, _pid: u32) -> Result<usize, InspectionError> {
        Err(InspectionError::Unsupported)
    }
}

#[cfg(target_os = "linux")]
fn inet_socket_inodes() -> procfs::ProcResult<std::collections::HashSet<u64>> {
    let mut inodes = std::collections::HashSet::new();
    inodes.extend(procfs::net::tcp()?.into_iter().map(|entry| entry.inode));
    // IPv6 or UDP tables are absent when the kernel is built without them.
    if let Ok(entries) = procfs::net::tcp6() {
        inodes.extend(entries.into_iter().map(|entry| entry.inode));
    }
    if let Ok(entries) = procfs::net::udp() {
        inodes.extend(entries.into_iter().map(|entry| entry.inode));
    }
    if let Ok(entries) = procfs::net::udp6() {
        inodes.extend(entries.into_iter().map(|entry| entry.inode));
    }
    Ok(inodes)
}

#[cfg(target_os = "linux")]
fn map_proc_error(pid: u32, err: procfs::ProcError) -> InspectionError {
    match err {
        procfs::ProcError::NotFound(_) => InspectionError::NoSuchProcess(pid),
        procfs::ProcError::PermissionDenied(_) => InspectionError::AccessDenied(pid),
        other => InspectionError::Other(other.to_string()),
    }
}

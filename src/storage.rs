//! Storage Backend
//!
//! Owns the backing file descriptor and its shared read/write mapping.
//!
//! ## Responsibilities
//! - Open or create the backing file
//! - Grow the file to a page-aligned length (never shrink)
//! - Map the whole file `MAP_SHARED`, so writes to memory are writes to the file
//! - Flush, unmap and close on shutdown, idempotently
//!
//! The backend works in bytes only. Translating record capacities into byte
//! lengths is the job of [`RecordLayout`](crate::layout::RecordLayout).
//!
//! ## Remapping
//!
//! Growing the file invalidates the old mapping. `grow()` takes `&mut self`,
//! so the borrow checker guarantees no slice into the old mapping survives
//! the remap.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;
use tracing::{debug, info, warn};

use crate::error::{Result, TableError};

/// Fallback when the host page size cannot be queried
const FALLBACK_PAGE_SIZE: usize = 4096;

/// Host virtual memory page size
pub fn page_size() -> usize {
    #[cfg(unix)]
    {
        // SAFETY: sysconf has no memory-safety preconditions.
        let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        if size > 0 {
            return size as usize;
        }
    }
    FALLBACK_PAGE_SIZE
}

/// Round `len` up to a whole number of pages (at least one page)
pub fn round_to_page(len: usize) -> Option<usize> {
    let page = page_size();
    let pages = len.max(1).checked_add(page - 1)? / page;
    pages.checked_mul(page)
}

/// A file mapped read/write into the process
pub struct MappedFile {
    path: PathBuf,
    file: Option<File>,
    mmap: Option<MmapMut>,
    use_page_cache: bool,
}

impl MappedFile {
    /// Open the file at `path`, creating it if absent, and map it.
    ///
    /// The file is grown to `minimum_len` rounded up to the page size when it
    /// is currently shorter. A longer file keeps its length.
    pub fn open(path: &Path, minimum_len: usize, use_page_cache: bool) -> Result<Self> {
        let mut mapped = Self {
            path: path.to_path_buf(),
            file: None,
            mmap: None,
            use_page_cache,
        };
        mapped.map(minimum_len)?;
        Ok(mapped)
    }

    /// Grow the file so the mapping spans at least `minimum_len` bytes.
    ///
    /// Existing bytes are preserved: the old mapping is flushed, the file is
    /// extended, and the new mapping reflects the file's content.
    pub fn grow(&mut self, minimum_len: usize) -> Result<()> {
        if !self.is_open() {
            return Err(TableError::Closed);
        }
        if self.len() >= minimum_len {
            return Ok(());
        }

        if let Some(mmap) = self.mmap.take() {
            mmap.flush()?;
        }
        self.map(minimum_len)?;

        debug!(path = %self.path.display(), len = self.len(), "grew mapping");
        Ok(())
    }

    /// Re-open and re-map the file at its current length
    pub fn reopen(&mut self) -> Result<()> {
        self.close()?;
        self.map(0)
    }

    /// Synchronize the mapping to the file without unmapping
    pub fn flush(&self) -> Result<()> {
        if let Some(mmap) = &self.mmap {
            mmap.flush()?;
        }
        Ok(())
    }

    /// Flush, unmap and close. Calling this while nothing is mapped is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let flushed = match self.mmap.take() {
            Some(mmap) => mmap.flush(),
            None => Ok(()),
        };
        if self.file.take().is_some() {
            debug!(path = %self.path.display(), "closed mapping");
        }
        flushed.map_err(TableError::from)
    }

    pub fn is_open(&self) -> bool {
        self.mmap.is_some()
    }

    /// Length of the current mapping in bytes (0 when closed)
    pub fn len(&self) -> usize {
        self.mmap.as_ref().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.mmap.as_deref()
    }

    pub fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        self.mmap.as_deref_mut()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn uses_page_cache(&self) -> bool {
        self.use_page_cache
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Open the descriptor (reusing it if still held), size the file, and map it
    fn map(&mut self, minimum_len: usize) -> Result<()> {
        let file = match self.file.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&self.path)?,
        };

        let current_len = file.metadata()?.len();
        if current_len == 0 {
            info!(path = %self.path.display(), "creating table file");
        }

        let target_len = round_to_page(minimum_len).ok_or_else(|| {
            TableError::Storage(format!("requested size {} overflows", minimum_len))
        })? as u64;

        if current_len < target_len {
            file.set_len(target_len)?;
        }
        let len = current_len.max(target_len);

        if len > usize::MAX as u64 {
            return Err(TableError::Storage(format!(
                "file {} of {} bytes cannot be mapped",
                self.path.display(),
                len
            )));
        }

        if !self.use_page_cache {
            advise_no_cache(&file, &self.path);
        }

        // SAFETY: MmapMut::map_mut is unsafe because the file may be changed by
        // other processes while mapped. The table assumes a single logical
        // owner; callers sharing a file across processes must coordinate
        // externally. The mapping is owned by this struct and dropped before
        // the file is resized or closed, and every access is bounds-checked
        // against the mapping's length.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        if !self.use_page_cache {
            advise_mapping(&mmap, &self.path);
        }

        debug!(path = %self.path.display(), len = mmap.len(), "mapped table file");

        self.file = Some(file);
        self.mmap = Some(mmap);
        Ok(())
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(path = %self.path.display(), error = %e, "failed to flush mapping on drop");
        }
    }
}

/// Ask the host to drop the file's cached pages.
///
/// On Linux this is a one-time eviction hint: `POSIX_FADV_DONTNEED` discards
/// what is cached now, and later faults populate the cache again. It runs on
/// every map and remap. macOS `F_NOCACHE` sticks to the descriptor instead.
#[allow(unused_variables)]
fn advise_no_cache(file: &File, path: &Path) {
    #[cfg(target_os = "linux")]
    {
        use std::os::unix::io::AsRawFd;

        // SAFETY: posix_fadvise only reads the descriptor, which is valid for
        // the lifetime of `file`. It is advisory and cannot affect memory safety.
        let rc = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_DONTNEED) };
        if rc != 0 {
            warn!(path = %path.display(), rc, "posix_fadvise failed; using page cache");
        }
    }

    #[cfg(target_os = "macos")]
    {
        use std::os::unix::io::AsRawFd;

        // SAFETY: F_NOCACHE only toggles a flag on a descriptor valid for the
        // lifetime of `file`.
        let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_NOCACHE, 1) };
        if rc == -1 {
            warn!(path = %path.display(), "F_NOCACHE failed; using page cache");
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    warn!(path = %path.display(), "page cache bypass unsupported on this platform");
}

/// Turn off readahead on a fresh mapping so faults only pull in touched pages.
/// Re-applied after every remap because advice belongs to the mapping.
#[allow(unused_variables)]
fn advise_mapping(mmap: &MmapMut, path: &Path) {
    #[cfg(unix)]
    let advised = mmap.advise(memmap2::Advice::Random);
    #[cfg(not(unix))]
    let advised: std::io::Result<()> = Ok(());

    if let Err(e) = advised {
        warn!(path = %path.display(), error = %e, "madvise failed; readahead stays on");
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Runtime discovery.
//!
//! A [`Loader`](crate::Loader) asks its [`Discovery`] for runtimes the first
//! time it needs candidates. [`SearchPathDiscovery`] scans directories for
//! runtime libraries in priority order:
//!
//! 1. `ONEVPL_SEARCH_PATH` (user defined)
//! 2. `VPL_BIN` (package directory)
//! 3. `LD_LIBRARY_PATH` (`PATH` on Windows)
//! 4. System library directories
//!
//! Each variable may hold several directories separated as for `PATH`.
//! [`StaticDiscovery`] hands out a fixed list, which is how runtimes are
//! injected in tests or by embedders that already hold them.
//!
//! # Example
//!
//! ```no_run
//! use vpldispatch::{Loader, SearchPathDiscovery, SearchPaths, SearchPriority};
//!
//! let mut paths = SearchPaths::new();
//! paths.push(SearchPriority::UserDefined, "/opt/runtimes");
//! let mut loader = Loader::with_discovery(SearchPathDiscovery::new(paths));
//! println!("{} implementations", loader.implementation_count()?);
//! # Ok::<(), vpldispatch::Error>(())
//! ```

use std::{
    collections::HashSet,
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use log::{debug, warn};
use vpldispatch_sys as ffi;

use crate::runtime::{LibraryRuntime, Runtime};
use crate::Error;

pub const ENV_SEARCH_PATH: &str = "ONEVPL_SEARCH_PATH";
pub const ENV_PACKAGE_PATH: &str = "VPL_BIN";
#[cfg(windows)]
pub const ENV_OS_PATH: &str = "PATH";
#[cfg(not(windows))]
pub const ENV_OS_PATH: &str = "LD_LIBRARY_PATH";

#[cfg(all(unix, not(target_os = "macos")))]
const SYSTEM_DIRS: &[&str] = &[
    "/usr/lib/x86_64-linux-gnu",
    "/usr/lib64",
    "/usr/lib",
    "/usr/local/lib",
];
#[cfg(target_os = "macos")]
const SYSTEM_DIRS: &[&str] = &["/usr/local/lib", "/opt/homebrew/lib"];
#[cfg(windows)]
const SYSTEM_DIRS: &[&str] = &["C:\\Windows\\System32"];
#[cfg(not(any(unix, windows)))]
const SYSTEM_DIRS: &[&str] = &[];

/// Source of runtimes for a loader.
pub trait Discovery: Send {
    fn discover(&self) -> Result<Vec<Arc<dyn Runtime>>, Error>;
}

/// A fixed list of runtimes.
#[derive(Clone, Default)]
pub struct StaticDiscovery {
    runtimes: Vec<Arc<dyn Runtime>>,
}

impl StaticDiscovery {
    pub fn new(runtimes: Vec<Arc<dyn Runtime>>) -> StaticDiscovery {
        StaticDiscovery { runtimes }
    }

    pub fn with(mut self, runtime: Arc<dyn Runtime>) -> StaticDiscovery {
        self.runtimes.push(runtime);
        self
    }
}

impl Discovery for StaticDiscovery {
    fn discover(&self) -> Result<Vec<Arc<dyn Runtime>>, Error> {
        Ok(self.runtimes.clone())
    }
}

/// Where a search directory came from. Lower values are searched first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchPriority {
    UserDefined = 1,
    Package = 2,
    OsPath = 3,
    SystemDefault = 4,
}

/// Ordered list of directories to scan for runtimes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    dirs: Vec<(SearchPriority, PathBuf)>,
}

impl SearchPaths {
    pub fn new() -> SearchPaths {
        SearchPaths::default()
    }

    /// Directories from the environment followed by the system defaults.
    pub fn from_env() -> SearchPaths {
        SearchPaths::from_vars(|name| env::var_os(name))
    }

    fn from_vars(var: impl Fn(&str) -> Option<OsString>) -> SearchPaths {
        let mut paths = SearchPaths::new();
        for (name, priority) in [
            (ENV_SEARCH_PATH, SearchPriority::UserDefined),
            (ENV_PACKAGE_PATH, SearchPriority::Package),
            (ENV_OS_PATH, SearchPriority::OsPath),
        ] {
            if let Some(value) = var(name) {
                for dir in env::split_paths(&value) {
                    if !dir.as_os_str().is_empty() {
                        paths.push(priority, dir);
                    }
                }
            }
        }
        for dir in SYSTEM_DIRS {
            paths.push(SearchPriority::SystemDefault, *dir);
        }
        paths
    }

    pub fn push(&mut self, priority: SearchPriority, dir: impl Into<PathBuf>) {
        self.dirs.push((priority, dir.into()));
    }

    /// Directories in search order. Directories of equal priority keep the
    /// order they were added in.
    pub fn iter(&self) -> impl Iterator<Item = (SearchPriority, &Path)> {
        let mut dirs: Vec<(SearchPriority, &Path)> =
            self.dirs.iter().map(|(p, d)| (*p, d.as_path())).collect();
        dirs.sort_by_key(|(p, _)| *p);
        dirs.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Scans [`SearchPaths`] for runtime libraries.
#[derive(Debug, Clone)]
pub struct SearchPathDiscovery {
    paths: SearchPaths,
}

impl SearchPathDiscovery {
    pub fn new(paths: SearchPaths) -> SearchPathDiscovery {
        SearchPathDiscovery { paths }
    }

    pub fn from_env() -> SearchPathDiscovery {
        SearchPathDiscovery::new(SearchPaths::from_env())
    }

    pub fn paths(&self) -> &SearchPaths {
        &self.paths
    }

    /// Runtime library files in search order, each listed once.
    pub fn library_files(&self) -> Vec<(SearchPriority, PathBuf)> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for (priority, dir) in self.paths.iter() {
            for file in runtime_files(dir) {
                let key = fs::canonicalize(&file).unwrap_or_else(|_| file.clone());
                if seen.insert(key) {
                    files.push((priority, file));
                }
            }
        }
        files
    }
}

impl Discovery for SearchPathDiscovery {
    fn discover(&self) -> Result<Vec<Arc<dyn Runtime>>, Error> {
        let mut runtimes: Vec<Arc<dyn Runtime>> = Vec::new();
        for (priority, file) in self.library_files() {
            match LibraryRuntime::open(&file) {
                Ok(runtime) => {
                    debug!("loaded runtime {} ({:?})", file.display(), priority);
                    runtimes.push(Arc::new(runtime));
                }
                Err(err) => warn!(
                    "skipping {}: {} (a runtime exports {})",
                    file.display(),
                    err,
                    ffi::REQUIRED_SYMBOLS.join(", ")
                ),
            }
        }
        Ok(runtimes)
    }
}

/// Runtime library files directly inside `dir`, sorted by name.
pub fn runtime_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("cannot scan {}: {}", dir.display(), err);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(ffi::is_runtime_file_name)
        })
        .collect();
    files.sort();
    files
}

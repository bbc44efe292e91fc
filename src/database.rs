//! Lookup facade
//!
//! [`GeoIpDatabase`] ties the trailer scanner, cache strategy, trie descent
//! and record decoder together behind one lock:
//!
//! ```text
//! address ──normalize──▶ key ──search──▶ terminal ──decode──▶ Record
//!                          │                │
//!                    AddressFamily     CacheStrategy
//! ```
//!
//! The lock guards the cache (and with it the shared file cursor), the
//! metadata, the cached info string and the last netmask as one unit.
//! A freshness check, when enabled, runs inside the same lock before every
//! operation and swaps the whole open generation at once.

use crate::cache::{CacheMode, CacheStrategy};
use crate::country::Country;
use crate::dat::format::DatabaseMetadata;
use crate::dat::tree::{search, Descent};
use crate::dat::types::{AddressFamily, Edition, RecordShape};
use crate::error::{GeoIpError, Result};
use crate::file_reader::{is_gzip_path, load_container};
use crate::info::ContainerInfo;
use crate::options::OpenOptions;
use crate::record::{Location, Record, RecordDecoder, Region};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Cursor;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

/// Outcome of a single lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lookup {
    /// Decoded record, `None` when the database has no data for the address
    pub record: Option<Record>,
    /// Address bits consumed by the descent, `None` if no descent ran
    pub netmask: Option<u8>,
}

/// One open generation of a container
struct OpenState {
    cache: CacheStrategy,
    metadata: DatabaseMetadata,
    modified: Option<SystemTime>,
    info: Option<ContainerInfo>,
}

struct Inner {
    state: Option<OpenState>,
    last_netmask: Option<u8>,
}

/// A legacy GeoIP database
///
/// Safe to share between threads; every operation takes the instance lock.
///
/// # Examples
///
/// ```no_run
/// use geodat::{GeoIpDatabase, OpenOptions, CacheMode};
///
/// let db = GeoIpDatabase::open(
///     "GeoIP.dat",
///     OpenOptions::new().cache(CacheMode::Memory),
/// )?;
///
/// let country = db.country("8.8.8.8".parse()?)?;
/// println!("{} ({})", country.name, country.code);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct GeoIpDatabase {
    path: Option<PathBuf>,
    options: OpenOptions,
    inner: Mutex<Inner>,
}

impl GeoIpDatabase {
    /// Open a container file
    ///
    /// Fails on I/O errors or a corrupt trailer. Containers ending in `.gz`
    /// are always opened in memory.
    pub fn open<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = load(&path, &options)?;
        Ok(Self::with_state(Some(path), options, state))
    }

    /// Open a container already held in memory
    ///
    /// Always uses the memory cache; freshness checking does not apply.
    pub fn from_bytes(data: Vec<u8>, options: OpenOptions) -> Result<Self> {
        let metadata =
            DatabaseMetadata::scan(&mut Cursor::new(data.as_slice()), options.countries().len())?;
        let state = OpenState {
            cache: CacheStrategy::memory(data, &metadata),
            metadata,
            modified: None,
            info: None,
        };
        log_open("<memory>", &state);
        Ok(Self::with_state(None, options, state))
    }

    fn with_state(path: Option<PathBuf>, options: OpenOptions, state: OpenState) -> Self {
        Self {
            path,
            options,
            inner: Mutex::new(Inner {
                state: Some(state),
                last_netmask: None,
            }),
        }
    }

    /// Release the file handle and cached data; safe to call repeatedly
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.state.take().is_some() {
            log::debug!("Closed {}", self.display_path());
        }
    }

    /// Re-read the container from its path, reopening a closed instance
    ///
    /// In-memory instances cannot be reloaded; once closed they stay closed.
    pub fn reload(&self) -> Result<()> {
        let mut inner = self.lock();
        match &self.path {
            Some(path) => {
                inner.state = Some(load(path, &self.options)?);
                Ok(())
            }
            None if inner.state.is_some() => Ok(()),
            None => Err(GeoIpError::NotOpen),
        }
    }

    /// True until [`close`](Self::close) is called
    pub fn is_open(&self) -> bool {
        self.lock().state.is_some()
    }

    /// Path the database was opened from, `None` for in-memory instances
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Layout of the current generation
    pub fn metadata(&self) -> Result<DatabaseMetadata> {
        let mut inner = self.lock();
        Ok(self.current(&mut inner.state)?.metadata)
    }

    /// Edition of the current generation
    pub fn edition(&self) -> Result<Edition> {
        Ok(self.metadata()?.edition)
    }

    /// Cache strategy actually in use
    pub fn cache_mode(&self) -> Result<CacheMode> {
        let mut inner = self.lock();
        Ok(self.current(&mut inner.state)?.cache.mode())
    }

    /// Bytes held in memory by the cache
    pub fn resident_bytes(&self) -> Result<usize> {
        let mut inner = self.lock();
        Ok(self.current(&mut inner.state)?.cache.resident_bytes())
    }

    /// The container's info string, empty if it has none
    pub fn container_info(&self) -> Result<ContainerInfo> {
        let mut inner = self.lock();
        let state = self.current(&mut inner.state)?;
        if let Some(info) = &state.info {
            return Ok(info.clone());
        }
        let info = ContainerInfo::new(state.cache.info_string()?);
        state.info = Some(info.clone());
        Ok(info)
    }

    /// Prefix length of the most recent descent on this instance
    ///
    /// Only meaningful right after a lookup from the same caller; other
    /// threads sharing the instance may have replaced it since.
    pub fn last_netmask(&self) -> Option<u8> {
        self.lock().last_netmask
    }

    /// Look up an address with the family the edition is keyed on
    pub fn lookup(&self, addr: IpAddr) -> Result<Option<Record>> {
        Ok(self.query(addr, None)?.record)
    }

    /// Look up an address, forcing the descent width
    pub fn lookup_as(&self, addr: IpAddr, family: AddressFamily) -> Result<Option<Record>> {
        Ok(self.query(addr, Some(family))?.record)
    }

    /// Look up an address given as text
    ///
    /// Text that does not parse as an address yields the unknown sentinel.
    /// IPv4-mapped IPv6 text is reduced to its four IPv4 bytes first.
    pub fn lookup_str(&self, addr: &str) -> Result<Option<Record>> {
        match addr.trim().parse::<IpAddr>() {
            Ok(ip) => self.lookup(ip.to_canonical()),
            Err(_) => Ok(Record::unknown_for(self.edition()?)),
        }
    }

    /// Look up an address, returning the record together with its prefix length
    pub fn query(&self, addr: IpAddr, family: Option<AddressFamily>) -> Result<Lookup> {
        let decoded = self.descend(addr, family, "lookup", |_| true, |descent, state| {
            let decoder = RecordDecoder::new(&state.metadata, self.options.countries());
            Ok((decoder.decode(descent.terminal, &mut state.cache)?, descent.netmask))
        })?;

        match decoded {
            Some((record, netmask)) => Ok(Lookup {
                record,
                netmask: Some(netmask),
            }),
            None => Ok(Lookup {
                record: Record::unknown_for(self.edition()?),
                netmask: None,
            }),
        }
    }

    /// Country of an address in a country, region or city database
    pub fn country(&self, addr: IpAddr) -> Result<Country> {
        let record = self.typed(addr, "country", |shape| {
            matches!(shape, RecordShape::Country | RecordShape::Region | RecordShape::City)
        })?;
        Ok(record
            .and_then(|r| r.country())
            .unwrap_or(Country::UNKNOWN))
    }

    /// Country and region of an address in a region database
    pub fn region(&self, addr: IpAddr) -> Result<Option<Region>> {
        match self.typed(addr, "region", |shape| shape == RecordShape::Region)? {
            Some(Record::Region(region)) => Ok(Some(region)),
            _ => Ok(None),
        }
    }

    /// Location of an address in a city database
    pub fn location(&self, addr: IpAddr) -> Result<Option<Location>> {
        match self.typed(addr, "location", |shape| shape == RecordShape::City)? {
            Some(Record::Location(location)) => Ok(Some(location)),
            _ => Ok(None),
        }
    }

    /// Label of an address in an organization, ISP, domain or AS database
    pub fn organization(&self, addr: IpAddr) -> Result<Option<String>> {
        match self.typed(addr, "organization", |shape| shape == RecordShape::Label)? {
            Some(Record::Organization(label)) => Ok(Some(label)),
            _ => Ok(None),
        }
    }

    /// Raw terminal value minus the segment start, for any edition
    ///
    /// Unresolvable addresses return 0.
    pub fn id(&self, addr: IpAddr) -> Result<u32> {
        let id = self.descend(addr, None, "id", |_| true, |descent, state| {
            Ok(descent.terminal - state.metadata.segment_start)
        })?;
        Ok(id.unwrap_or(0))
    }

    fn typed(
        &self,
        addr: IpAddr,
        operation: &'static str,
        accepts: fn(RecordShape) -> bool,
    ) -> Result<Option<Record>> {
        let decoded = self.descend(addr, None, operation, accepts, |descent, state| {
            RecordDecoder::new(&state.metadata, self.options.countries())
                .decode(descent.terminal, &mut state.cache)
        })?;
        Ok(decoded.flatten())
    }

    /// Run one descent under the lock and hand the terminal to `finish`
    ///
    /// Returns `Ok(None)` when the address cannot be expressed in the
    /// descent's address family.
    fn descend<T>(
        &self,
        addr: IpAddr,
        family: Option<AddressFamily>,
        operation: &'static str,
        accepts: fn(RecordShape) -> bool,
        finish: impl FnOnce(Descent, &mut OpenState) -> Result<T>,
    ) -> Result<Option<T>> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let state = self.current(&mut inner.state)?;

        let edition = state.metadata.edition;
        if !accepts(edition.shape()) {
            return Err(GeoIpError::UnsupportedEdition { edition, operation });
        }

        let family = family.unwrap_or_else(|| edition.family());
        let Some(key) = family.normalize(addr) else {
            log::trace!("{} cannot be expressed as {:?}", addr, family);
            return Ok(None);
        };

        let descent = search(&mut state.cache, &state.metadata, &key, family)?;
        inner.last_netmask = Some(descent.netmask);
        finish(descent, state).map(Some)
    }

    /// The open generation, reloaded first if the file changed on disk
    fn current<'a>(&self, slot: &'a mut Option<OpenState>) -> Result<&'a mut OpenState> {
        let state = slot.as_mut().ok_or(GeoIpError::NotOpen)?;

        if let (true, Some(path)) = (self.options.checks_freshness(), &self.path) {
            let modified = fs::metadata(path)?.modified()?;
            if state.modified != Some(modified) {
                log::info!("{} changed on disk, reloading", path.display());
                *state = load(path, &self.options)?;
            }
        }

        Ok(state)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn display_path(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

impl std::fmt::Debug for GeoIpDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeoIpDatabase")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Scan and cache a container from disk
fn load(path: &Path, options: &OpenOptions) -> Result<OpenState> {
    let modified = if options.checks_freshness() {
        Some(fs::metadata(path)?.modified()?)
    } else {
        None
    };

    let mut mode = options.cache_mode();
    if is_gzip_path(path) && mode != CacheMode::Memory {
        log::warn!(
            "{} is gzip compressed, using memory cache instead of {} cache",
            path.display(),
            mode
        );
        mode = CacheMode::Memory;
    }

    let countries = options.countries().len();
    let (cache, metadata) = match mode {
        CacheMode::Memory => {
            let buffer = load_container(path)?;
            let metadata = DatabaseMetadata::scan(&mut Cursor::new(buffer.as_slice()), countries)?;
            (CacheStrategy::memory(buffer, &metadata), metadata)
        }
        CacheMode::Disk => {
            let mut file = File::open(path)?;
            let metadata = DatabaseMetadata::scan(&mut file, countries)?;
            (CacheStrategy::disk(file, &metadata), metadata)
        }
        CacheMode::Index => {
            let mut file = File::open(path)?;
            let metadata = DatabaseMetadata::scan(&mut file, countries)?;
            (CacheStrategy::index(file, &metadata)?, metadata)
        }
    };

    let state = OpenState {
        cache,
        metadata,
        modified,
        info: None,
    };
    log_open(&path.display().to_string(), &state);
    Ok(state)
}

fn log_open(source: &str, state: &OpenState) {
    log::debug!(
        "Opened {}: {} edition, segment start {}, {}-byte pointers, {} cache",
        source,
        state.metadata.edition,
        state.metadata.segment_start,
        state.metadata.node_record_width,
        state.cache.mode()
    );
}

//! NMEA lines supply
use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace, warn};

/// Pending (unterminated) data is discarded past this size:
/// a valid NMEA sentence is at most 82 bytes long.
const MAX_PENDING_LEN: usize = 1024;

/// Client handle, delivered by a [LineProvider]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub u32);

/// [LineProvider] supplies raw NMEA lines to any number of clients.
/// The provider is shared: each client only manages its own [Handle]
/// and never assumes exclusive ownership of the underlying stream.
pub trait LineProvider {
    /// Create a new (paused) client [Handle].
    /// Returns None when the underlying stream cannot be accessed.
    fn create_handle(&mut self) -> Option<Handle>;

    /// Resume line delivery to this [Handle].
    fn unpause(&mut self, handle: Handle);

    /// Pause line delivery to this [Handle]. Lines are not buffered while paused.
    fn pause(&mut self, handle: Handle);

    /// Release this [Handle].
    fn destroy(&mut self, handle: Handle);

    /// Next buffered line for this [Handle], if any.
    fn read_line(&mut self, handle: Handle) -> Option<Vec<u8>>;
}

#[derive(Debug, Default)]
struct Client {
    paused: bool,
    lines: VecDeque<Vec<u8>>,
}

/// [LineHub] is an in memory [LineProvider]: raw bytes are fed by the
/// host (for example from a gpsd socket), split into lines and fanned out
/// to every active [Handle].
#[derive(Debug)]
pub struct LineHub {
    /// Next handle ID
    next_id: u32,
    /// Underlying stream is accessible
    available: bool,
    /// Unterminated data
    pending: Vec<u8>,
    /// Attached clients
    clients: BTreeMap<Handle, Client>,
}

impl Default for LineHub {
    fn default() -> Self {
        Self {
            next_id: 0,
            available: true,
            pending: Vec::with_capacity(MAX_PENDING_LEN),
            clients: Default::default(),
        }
    }
}

impl LineHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the underlying stream (in)accessible.
    /// New clients are refused while inaccessible.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Number of attached clients
    pub fn clients(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if this [Handle] exists and is currently paused
    pub fn is_paused(&self, handle: Handle) -> bool {
        self.clients
            .get(&handle)
            .map(|client| client.paused)
            .unwrap_or(false)
    }

    /// Feed raw bytes. Complete lines (terminator stripped) are dispatched to
    /// all active clients. Returns true if at least one client received a line,
    /// in which case the host should notify its sources.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        let mut notify = false;

        for byte in bytes {
            if *byte != b'\n' {
                if self.pending.len() == MAX_PENDING_LEN {
                    warn!("discarding {} unterminated bytes", self.pending.len());
                    self.pending.clear();
                }
                self.pending.push(*byte);
                continue;
            }

            if self.pending.last() == Some(&b'\r') {
                self.pending.pop();
            }

            let line = std::mem::take(&mut self.pending);
            if line.is_empty() {
                continue;
            }

            for client in self.clients.values_mut().filter(|c| !c.paused) {
                client.lines.push_back(line.clone());
                notify = true;
            }
        }

        notify
    }
}

impl LineProvider for LineHub {
    fn create_handle(&mut self) -> Option<Handle> {
        if !self.available {
            return None;
        }

        let handle = Handle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        self.clients.insert(
            handle,
            Client {
                paused: true,
                ..Default::default()
            },
        );

        debug!("{:?} attached ({} clients)", handle, self.clients.len());
        Some(handle)
    }

    fn unpause(&mut self, handle: Handle) {
        if let Some(client) = self.clients.get_mut(&handle) {
            client.paused = false;
        }
    }

    fn pause(&mut self, handle: Handle) {
        if let Some(client) = self.clients.get_mut(&handle) {
            client.paused = true;
            client.lines.clear();
        }
    }

    fn destroy(&mut self, handle: Handle) {
        if self.clients.remove(&handle).is_some() {
            debug!("{:?} detached ({} clients)", handle, self.clients.len());
        }
    }

    fn read_line(&mut self, handle: Handle) -> Option<Vec<u8>> {
        let line = self.clients.get_mut(&handle)?.lines.pop_front()?;
        trace!("{:?} read {} bytes", handle, line.len());
        Some(line)
    }
}

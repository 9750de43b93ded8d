//! Satellites information source: streaming and one-shot requests
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use log::{debug, error, trace};

use crate::{
    aggregator::Aggregator,
    cfg::Config,
    error::Error,
    nmea::{validate, SentenceKind},
    prelude::{Duration, Epoch, Handle, LineProvider, SatelliteInfo},
};

/// [Event]s emitted by the [Source], in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Satellites in view were updated (complete GSV group)
    InViewUpdated(Vec<SatelliteInfo>),
    /// Satellites used in the fix were updated (confirmed GSA)
    InUseUpdated(Vec<SatelliteInfo>),
    /// Pending one-shot request could not be fulfilled in time
    RequestTimeout,
    /// [Error] occurred
    Error(Error),
}

/// One-shot update request, in flight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Request {
    /// Streaming was active prior this request
    pub(crate) was_running: bool,
    /// Satellites in view refreshed since request started
    pub(crate) in_view: bool,
    /// Satellites in use refreshed since request started
    pub(crate) in_use: bool,
    /// Request deadline
    pub(crate) deadline: Epoch,
}

impl Request {
    /// True if streaming was already active when this request started
    pub fn was_running(&self) -> bool {
        self.was_running
    }

    /// Request deadline
    pub fn deadline(&self) -> Epoch {
        self.deadline
    }

    /// True once both views have been refreshed
    pub fn is_complete(&self) -> bool {
        self.in_view && self.in_use
    }
}

/// [Source] state
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum State {
    /// Not streaming
    Idle,
    /// Continuous updates, through this [Handle]
    Streaming(Handle),
    /// One-shot [Request] in flight. The [Handle] is missing when the
    /// line provider could not be accessed, or streaming was stopped
    /// in the meantime.
    Requesting {
        handle: Option<Handle>,
        request: Request,
    },
}

/// [Source] publishes the satellites in view and the satellites in use,
/// from NMEA lines supplied by a shared [LineProvider].
///
/// Everything runs on the caller thread: the host notifies new lines
/// with [Source::on_line_ready], drives the request deadline with
/// [Source::poll] and collects [Event]s with [Source::events].
pub struct Source<P: LineProvider> {
    /// Shared [LineProvider]
    provider: Rc<RefCell<P>>,
    /// [Config] preset
    cfg: Config,
    /// [Aggregator]
    aggregator: Aggregator,
    /// [State]
    state: State,
    /// Last [Error] that occurred
    last_error: Option<Error>,
    /// Stop streaming once current line dispatch completes
    deferred_stop: bool,
    /// Pending [Event]s
    events: VecDeque<Event>,
}

impl<P: LineProvider> Source<P> {
    /// Builds a new (idle) [Source] attached to this [LineProvider].
    pub fn new(provider: Rc<RefCell<P>>, cfg: Config) -> Self {
        Self {
            provider,
            cfg,
            aggregator: Aggregator::new(cfg),
            state: State::Idle,
            last_error: None,
            deferred_stop: false,
            events: VecDeque::with_capacity(8),
        }
    }

    /// Current [State]
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Last [Error] that occurred, None if none ever did.
    pub fn last_error(&self) -> Option<Error> {
        self.last_error
    }

    /// Minimal update interval (in milliseconds)
    pub fn minimum_update_interval(&self) -> u32 {
        self.cfg.min_update_interval_ms
    }

    /// True while updates are streaming from the [LineProvider]
    pub fn is_running(&self) -> bool {
        self.handle().is_some()
    }

    /// Pending [Request] deadline, the host should call [Source::poll] past it.
    pub fn deadline(&self) -> Option<Epoch> {
        self.request().map(|request| request.deadline)
    }

    /// Pending [Request]
    pub fn request(&self) -> Option<&Request> {
        match &self.state {
            State::Requesting { request, .. } => Some(request),
            _ => None,
        }
    }

    /// Satellites in view (last complete GSV group)
    pub fn satellites_in_view(&self) -> Vec<SatelliteInfo> {
        self.aggregator.satellites_in_view()
    }

    /// Satellites used in the fix (last confirmed GSA)
    pub fn satellites_in_use(&self) -> &[SatelliteInfo] {
        self.aggregator.satellites_in_use()
    }

    /// Drains pending [Event]s
    pub fn events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }

    fn handle(&self) -> Option<Handle> {
        match self.state {
            State::Idle => None,
            State::Streaming(handle) => Some(handle),
            State::Requesting { handle, .. } => handle,
        }
    }

    /// Start streaming updates. No-op if already streaming.
    pub fn start_updates(&mut self) {
        let request = match self.state {
            State::Idle => None,
            State::Requesting {
                handle: None,
                request,
            } => Some(request),
            _ => return,
        };

        let handle = self.provider.borrow_mut().create_handle();

        let handle = match handle {
            Some(handle) => handle,
            None => {
                error!("failed to access line provider");
                self.last_error = Some(Error::AccessError);
                self.events.push_back(Event::Error(Error::AccessError));
                return;
            },
        };

        self.provider.borrow_mut().unpause(handle);

        self.state = match request {
            Some(request) => State::Requesting {
                handle: Some(handle),
                request,
            },
            None => State::Streaming(handle),
        };

        debug!("{:?} updates started", handle);
    }

    /// Stop streaming updates. No-op if not streaming.
    /// A pending [Request] remains armed until its deadline.
    pub fn stop_updates(&mut self) {
        let handle = match self.state {
            State::Streaming(handle) => {
                self.state = State::Idle;
                handle
            },
            State::Requesting {
                handle: Some(handle),
                request,
            } => {
                self.state = State::Requesting {
                    handle: None,
                    request,
                };
                handle
            },
            _ => return,
        };

        let mut provider = self.provider.borrow_mut();
        provider.pause(handle);
        provider.destroy(handle);

        debug!("{:?} updates stopped", handle);
    }

    /// Request fresh satellites data within `timeout_ms` milliseconds.
    /// Null timeout stands for [Source::minimum_update_interval].
    /// Ignored while another request is pending.
    pub fn request_update(&mut self, now: Epoch, timeout_ms: u32) {
        if self.request().is_some() {
            debug!("request already pending");
            return;
        }

        let min_interval_ms = self.minimum_update_interval();

        let timeout_ms = if timeout_ms == 0 {
            min_interval_ms
        } else {
            timeout_ms
        };

        if timeout_ms < min_interval_ms {
            debug!(
                "request timeout {}ms below minimal interval {}ms",
                timeout_ms, min_interval_ms
            );
            self.events.push_back(Event::RequestTimeout);
            return;
        }

        let was_running = self.is_running();
        if !was_running {
            self.start_updates();
        }

        let request = Request {
            was_running,
            in_view: false,
            in_use: false,
            deadline: now + Duration::from_milliseconds(timeout_ms as f64),
        };

        debug!("{:?} request pending until {}", self.handle(), request.deadline);

        self.state = State::Requesting {
            handle: self.handle(),
            request,
        };
    }

    /// Drives the pending [Request] deadline.
    pub fn poll(&mut self, now: Epoch) {
        let request = match self.state {
            State::Requesting { request, .. } if now >= request.deadline => request,
            _ => return,
        };

        self.conclude_request();

        if !request.was_running {
            self.stop_updates();
        }

        if !request.is_complete() {
            debug!("request timed out");
            self.events.push_back(Event::RequestTimeout);
        }
    }

    /// Notification that new lines are available on our [Handle].
    /// Buffered lines are all processed. When a one-shot [Request] completes
    /// while streaming was not active, streaming stops once this drain is over:
    /// lines still buffered after the completion are processed as a stream and
    /// may emit their own [Event]s.
    pub fn on_line_ready(&mut self) {
        while let Some(handle) = self.handle() {
            let line = self.provider.borrow_mut().read_line(handle);
            match line {
                Some(line) => {
                    self.process_line(&line);
                },
                None => break,
            }
        }

        if self.deferred_stop {
            self.deferred_stop = false;
            self.stop_updates();
        }
    }

    /// Processes one raw NMEA line. Malformed lines and sentences are dropped.
    fn process_line(&mut self, line: &[u8]) {
        let sentence = match validate(line) {
            Ok(sentence) => sentence,
            Err(e) => {
                trace!("rejected line: {}", e);
                return;
            },
        };

        let result = match sentence.kind {
            SentenceKind::Gsv => self.aggregator.process_gsv(&sentence).map(|in_view| {
                if let Some(satellites) = in_view {
                    self.in_view_updated(satellites);
                }
            }),
            SentenceKind::Gsa => self.aggregator.process_gsa(&sentence).map(|in_use| {
                if let Some(satellites) = in_use {
                    self.in_use_updated(satellites);
                }
            }),
            SentenceKind::Other(_) => return,
        };

        if let Err(e) = result {
            debug!("{:?} sentence: {}", sentence.kind, e);
        }
    }

    fn conclude_request(&mut self) {
        if let State::Requesting { handle, .. } = self.state {
            self.state = match handle {
                Some(handle) => State::Streaming(handle),
                None => State::Idle,
            };
        }
    }

    fn in_view_updated(&mut self, satellites: Vec<SatelliteInfo>) {
        let request = match &mut self.state {
            State::Requesting { request, .. } => {
                request.in_view = true;
                Some(*request)
            },
            _ => None,
        };

        if let Some(request) = request {
            if request.is_complete() {
                self.complete_request(request);
                return;
            }
            // one-shot callers only get the consolidated answer
            if !request.was_running {
                return;
            }
        }

        self.events.push_back(Event::InViewUpdated(satellites));
    }

    fn in_use_updated(&mut self, satellites: Vec<SatelliteInfo>) {
        let request = match &mut self.state {
            State::Requesting { request, .. } => {
                request.in_use = true;
                Some(*request)
            },
            _ => None,
        };

        if let Some(request) = request {
            if request.is_complete() {
                self.complete_request(request);
                return;
            }
            if !request.was_running {
                return;
            }
        }

        self.events.push_back(Event::InUseUpdated(satellites));
    }

    /// Both views refreshed: the [Request] concludes with the consolidated
    /// in view snapshot, followed by the satellites in use.
    fn complete_request(&mut self, request: Request) {
        self.conclude_request();
        if !request.was_running {
            self.deferred_stop = true;
        }

        debug!("request completed");

        self.events
            .push_back(Event::InViewUpdated(self.aggregator.satellites_in_view()));
        self.events.push_back(Event::InUseUpdated(
            self.aggregator.satellites_in_use().to_vec(),
        ));
    }
}

impl<P: LineProvider> Drop for Source<P> {
    fn drop(&mut self) {
        self.stop_updates();
    }
}

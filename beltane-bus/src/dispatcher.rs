//! Push-update dispatcher: the control-side consumer of the returns ring.
//!
//! Each descriptor coming back from the engine is routed to at most one
//! observer by matching its address against the observers' registered
//! scopes, top-down through the hierarchy exactly as the text codec
//! decodes it. Two reserved control codes bypass address routing
//! entirely: plain text notifications and raw data exchange. A
//! descriptor nobody's scope admits is dropped; notification is
//! best-effort by design.

use beltane_types::control::reserved;
use beltane_types::{Address, Descriptor, Engine, Insert, Section};

use crate::ring::RingReader;
use crate::text_pool::TextPool;

/// Matcher for one address level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    Any,
    Is(T),
}

impl<T: PartialEq> Filter<T> {
    fn admits(&self, actual: Option<T>) -> bool {
        match self {
            Filter::Any => true,
            Filter::Is(wanted) => actual.as_ref() == Some(wanted),
        }
    }
}

/// Matcher for the section level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionFilter {
    Any,
    /// Any numbered part.
    AnyPart,
    Is(Section),
}

/// The address subtree one observer cares about. Levels are tested
/// top-down; a mismatch at any level discards the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub section: SectionFilter,
    pub kit: Filter<u8>,
    pub engine: Filter<Engine>,
    pub insert: Filter<Insert>,
}

impl Scope {
    /// Matches every address.
    pub fn any() -> Scope {
        Scope {
            section: SectionFilter::Any,
            kit: Filter::Any,
            engine: Filter::Any,
            insert: Filter::Any,
        }
    }

    pub fn section(section: Section) -> Scope {
        Scope {
            section: SectionFilter::Is(section),
            ..Scope::any()
        }
    }

    pub fn any_part() -> Scope {
        Scope {
            section: SectionFilter::AnyPart,
            ..Scope::any()
        }
    }

    pub fn with_kit(mut self, kit: u8) -> Scope {
        self.kit = Filter::Is(kit);
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Scope {
        self.engine = Filter::Is(engine);
        self
    }

    pub fn with_insert(mut self, insert: Insert) -> Scope {
        self.insert = Filter::Is(insert);
        self
    }

    pub fn admits(&self, address: &Address) -> bool {
        let section_ok = match self.section {
            SectionFilter::Any => true,
            SectionFilter::AnyPart => matches!(address.section, Section::Part(_)),
            SectionFilter::Is(wanted) => address.section == wanted,
        };
        section_ok
            && self.kit.admits(address.kit)
            && self.engine.admits(address.engine)
            && self.insert.admits(address.insert)
    }
}

/// Handle for re-scoping or removing a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(usize);

type UpdateFn = Box<dyn FnMut(&Descriptor) + Send>;
type NotifyFn = Box<dyn FnMut(String) + Send>;

struct Observer {
    scope: Scope,
    callback: UpdateFn,
    live: bool,
}

pub struct UpdateDispatcher {
    returns: RingReader,
    pool: TextPool,
    observers: Vec<Observer>,
    notify: Option<NotifyFn>,
    raw_receiver: Option<UpdateFn>,
}

impl UpdateDispatcher {
    pub fn new(returns: RingReader, pool: TextPool) -> UpdateDispatcher {
        UpdateDispatcher {
            returns,
            pool,
            observers: Vec::new(),
            notify: None,
            raw_receiver: None,
        }
    }

    /// Register an observer for every descriptor whose address `scope`
    /// admits. First registered, first matched.
    pub fn observe(
        &mut self,
        scope: Scope,
        callback: impl FnMut(&Descriptor) + Send + 'static,
    ) -> ObserverId {
        self.observers.push(Observer {
            scope,
            callback: Box::new(callback),
            live: true,
        });
        ObserverId(self.observers.len() - 1)
    }

    /// Narrow or widen an observer's scope, e.g. when the UI focuses a
    /// different part. Updates for the old subtree are dropped from then
    /// on, not redelivered.
    pub fn set_scope(&mut self, id: ObserverId, scope: Scope) {
        if let Some(observer) = self.observers.get_mut(id.0) {
            observer.scope = scope;
        }
    }

    pub fn remove(&mut self, id: ObserverId) {
        if let Some(observer) = self.observers.get_mut(id.0) {
            observer.live = false;
        }
    }

    /// Receiver for plain text notifications.
    pub fn on_notify(&mut self, callback: impl FnMut(String) + Send + 'static) {
        self.notify = Some(Box::new(callback));
    }

    /// Receiver for raw data-exchange descriptors.
    pub fn on_raw_data(&mut self, callback: impl FnMut(&Descriptor) + Send + 'static) {
        self.raw_receiver = Some(Box::new(callback));
    }

    /// Drain the returns ring, routing every pending descriptor. Returns
    /// how many were delivered (dropped ones don't count).
    pub fn poll(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(descriptor) = self.returns.read() {
            if self.route(&descriptor) {
                delivered += 1;
            }
        }
        delivered
    }

    fn route(&mut self, descriptor: &Descriptor) -> bool {
        match descriptor.control {
            reserved::TEXT_MESSAGE => {
                let text = match descriptor.msg {
                    Some(id) => self.pool.fetch(id),
                    None => String::new(),
                };
                if text.is_empty() {
                    return false;
                }
                match &mut self.notify {
                    Some(notify) => {
                        notify(text);
                        true
                    }
                    None => {
                        log::info!(target: "bus", "{text}");
                        false
                    }
                }
            }
            reserved::DATA_EXCHANGE => match &mut self.raw_receiver {
                Some(receiver) => {
                    receiver(descriptor);
                    true
                }
                None => false,
            },
            _ => {
                for observer in &mut self.observers {
                    if observer.live && observer.scope.admits(&descriptor.address) {
                        (observer.callback)(descriptor);
                        return true;
                    }
                }
                log::trace!(
                    target: "bus",
                    "no observer for {:?} control {}",
                    descriptor.address,
                    descriptor.control
                );
                false
            }
        }
    }
}

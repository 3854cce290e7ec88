//! Live session runtime.
//!
//! [`SessionRuntime`] owns everything a live session touches: the event
//! store, the session directory, the scheduler driving the synthetic event
//! stream and the broadcaster pushing graph updates. State moves
//! IDLE -> LIVE on [`SessionRuntime::start_session`] and back to IDLE on
//! [`SessionRuntime::end_session`]; a new session restarts the cycle.
//!
//! At most one stream task exists at a time. Starting a session cancels the
//! previous task before scheduling a new one, and due firings are only
//! dispatched when they belong to the current task.

mod factory;
mod scheduler;
mod store;

pub use factory::*;
pub use scheduler::*;
pub use store::*;

use std::time::Duration;

use campaign_model::{Event, EventId, Registry, Session, SessionId, Timestamp};
use serde::Serialize;
use tracing::{debug, info};

use crate::broadcast::{Broadcaster, ListenerResult, SubscriptionId};
use crate::config::JournalConfig;
use crate::graph::{Graph, GraphBuilder};
use crate::storage::{KeyValueStore, SessionDirectory};
use crate::timeline::{EventQuery, EventSource};

/// Why a graph update was broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateCause {
    /// Delivered once to a new subscriber.
    Initial,
    SessionStarted,
    EventAppended,
    /// The graph is unchanged; only the session state moved.
    SessionEnded,
}

/// Payload pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUpdate {
    pub graph: Graph,
    pub active_session: Option<SessionId>,
    pub cause: UpdateCause,
}

/// The running synthetic event stream of one session.
#[derive(Debug, Clone)]
struct Stream {
    handle: TaskHandle,
    session: SessionId,
    ticks: u64,
}

/// Explicit owner of the live session state.
///
/// Construct one per process (or per test). Nothing here is global.
#[derive(Debug)]
pub struct SessionRuntime<St, Sc> {
    config: JournalConfig,
    registry: Registry,
    events: EventStore,
    directory: SessionDirectory<St>,
    scheduler: Sc,
    factory: EventFactory,
    updates: Broadcaster<GraphUpdate>,
    stream: Option<Stream>,
}

impl<St: KeyValueStore, Sc: Scheduler> SessionRuntime<St, Sc> {
    pub fn new(config: JournalConfig, registry: Registry, store: St, scheduler: Sc) -> Self {
        let directory = SessionDirectory::new(store, config.storage.key_prefix.clone());
        let factory = EventFactory::new(&config);
        Self {
            config,
            registry,
            events: EventStore::default(),
            directory,
            scheduler,
            factory,
            updates: Broadcaster::new(),
            stream: None,
        }
    }

    /// Seed the campaign history that precedes any live session.
    pub fn with_base_events(mut self, events: Vec<Event>) -> Self {
        self.events = EventStore::new(events);
        self
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    /// Events generated since the current (or last) session started.
    pub fn session_events(&self) -> &[Event] {
        self.events.session()
    }

    pub fn directory(&self) -> &SessionDirectory<St> {
        &self.directory
    }

    pub fn scheduler(&self) -> &Sc {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Sc {
        &mut self.scheduler
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.directory.list()
    }

    pub fn active_session(&self) -> Option<Session> {
        self.directory.active()
    }

    /// Events archived when a session ended.
    pub fn archive(&self, id: &SessionId) -> Vec<Event> {
        self.directory.archive(id)
    }

    /// Whether a stream task is currently scheduled.
    pub fn is_live(&self) -> bool {
        self.stream
            .as_ref()
            .is_some_and(|s| self.scheduler.is_scheduled(s.handle))
    }

    /// Build the graph over every current event.
    pub fn graph(&self) -> Graph {
        GraphBuilder::with_registry(&self.registry).build(&self.events.all())
    }

    /// Register a listener. It receives the current graph before this
    /// returns, then every later update.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GraphUpdate) -> ListenerResult + 'static,
    {
        let current = self.update(UpdateCause::Initial);
        self.updates.subscribe(&current, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.updates.unsubscribe(id)
    }

    /// Start a new session and its event stream.
    ///
    /// A running stream is stopped first and its session closed, so there is
    /// never more than one producer of events or one active session.
    pub fn start_session(&mut self, title: Option<String>) -> Session {
        let now = self.scheduler.now_ms();

        if let Some(stream) = self.stream.take() {
            self.scheduler.cancel(stream.handle);
            self.directory.write_archive(&stream.session, self.events.session());
            self.directory.end(&stream.session, now);
            info!(session = %stream.session, "closed previous session");
        } else if let Some(stale) = self.directory.active() {
            // Left over from an earlier process; its events are not ours to archive.
            self.directory.end(&stale.id, now);
            info!(session = %stale.id, "closed stale session");
        }

        let session = self.directory.create(title, now);
        self.events.clear_session();

        let handle = self.scheduler.schedule(self.config.tick_interval());
        self.stream = Some(Stream {
            handle,
            session: session.id.clone(),
            ticks: 0,
        });

        info!(session = %session.id, "session started");
        self.broadcast(UpdateCause::SessionStarted);
        session
    }

    /// Dispatch every due firing of the stream task. Returns the number of
    /// events appended.
    pub fn run_pending(&mut self) -> usize {
        let mut appended = 0;
        for firing in self.scheduler.take_due() {
            let current = self.stream.as_ref().is_some_and(|s| s.handle == firing.handle);
            if !current {
                debug!(?firing, "ignoring firing of another task");
                continue;
            }
            self.tick(firing.at);
            appended += 1;
        }
        appended
    }

    fn tick(&mut self, at: Timestamp) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        stream.ticks += 1;
        let id = EventId::new(format!("{}-{}", stream.session, stream.ticks));

        let ts = self.events.last_session_ts().map_or(at, |last| at.max(last));
        let event = self.factory.synthesize(&self.registry, id, ts);
        debug!(event = %event.id, ts, "appending live event");

        self.events.append(event);
        self.broadcast(UpdateCause::EventAppended);
    }

    /// End a session: stop its stream, archive its events and record the
    /// end time once. The displayed events stay as they are.
    ///
    /// Returns `None` for an unknown session. Ending an ended session
    /// changes nothing and broadcasts nothing.
    pub fn end_session(&mut self, id: &SessionId) -> Option<Session> {
        let now = self.scheduler.now_ms();

        let streaming = self.stream.as_ref().is_some_and(|s| s.session == *id);
        if streaming {
            if let Some(stream) = self.stream.take() {
                self.scheduler.cancel(stream.handle);
            }
            self.directory.write_archive(id, self.events.session());
        }

        let was_active = self.directory.get(id).is_some_and(|s| s.is_active());
        let ended = self.directory.end(id, now);

        if streaming || was_active {
            info!(session = %id, events = self.events.session().len(), "session ended");
            self.broadcast(UpdateCause::SessionEnded);
        }
        ended
    }

    fn update(&self, cause: UpdateCause) -> GraphUpdate {
        GraphUpdate {
            graph: self.graph(),
            active_session: self.stream.as_ref().map(|s| s.session.clone()),
            cause,
        }
    }

    fn broadcast(&mut self, cause: UpdateCause) {
        let update = self.update(cause);
        let delivered = self.updates.publish(&update);
        debug!(
            ?cause,
            nodes = update.graph.node_count(),
            edges = update.graph.edge_count(),
            delivered,
            "broadcast graph update"
        );
    }
}

impl<St: KeyValueStore> SessionRuntime<St, VirtualScheduler> {
    /// Move simulated time forward and run whatever came due.
    pub fn advance(&mut self, by: Duration) -> usize {
        self.scheduler.advance(by);
        self.run_pending()
    }
}

impl<St: KeyValueStore, Sc: Scheduler> EventSource for SessionRuntime<St, Sc> {
    fn query_events(&self, query: &EventQuery) -> Vec<Event> {
        self.events.query_events(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeRef;
    use crate::storage::MemoryStore;
    use crate::view::{GraphView, NullSurface, Selection, Tap};
    use std::cell::RefCell;
    use std::rc::Rc;

    const TICK: Duration = Duration::from_millis(2_000);

    type Runtime = SessionRuntime<MemoryStore, VirtualScheduler>;

    fn runtime() -> Runtime {
        runtime_with(MemoryStore::new())
    }

    fn runtime_with(store: MemoryStore) -> Runtime {
        let config = JournalConfig {
            seed: Some(11),
            ..JournalConfig::default()
        };
        SessionRuntime::new(config, Registry::demo(), store, VirtualScheduler::new(0))
    }

    fn record(runtime: &mut Runtime) -> Rc<RefCell<Vec<GraphUpdate>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        runtime.subscribe(move |u: &GraphUpdate| {
            sink.borrow_mut().push(u.clone());
            Ok(())
        });
        seen
    }

    fn causes(updates: &[GraphUpdate]) -> Vec<UpdateCause> {
        updates.iter().map(|u| u.cause).collect()
    }

    #[test]
    fn test_three_ticks_strictly_increasing() {
        let mut rt = runtime();
        let session = rt.start_session(Some("Intro".into()));

        assert_eq!(rt.advance(TICK * 3), 3);

        let events = rt.session_events();
        assert_eq!(events.len(), 3);
        assert!(events.windows(2).all(|w| w[0].ts < w[1].ts));
        assert_eq!(events[0].id.as_str(), format!("{}-1", session.id));
        assert_eq!(events[2].id.as_str(), format!("{}-3", session.id));
        assert_eq!(events[0].ts, 2_000);
    }

    #[test]
    fn test_start_twice_runs_one_stream() {
        let mut rt = runtime();
        let first = rt.start_session(None);
        let second = rt.start_session(None);

        assert_eq!(rt.scheduler().active_tasks(), 1);
        assert_eq!(rt.advance(TICK), 1);
        assert_eq!(rt.session_events().len(), 1);

        // The first session record was closed.
        let sessions = rt.sessions();
        assert_eq!(sessions.len(), 2);
        assert!(!sessions.iter().find(|s| s.id == first.id).unwrap().is_active());
        assert_eq!(rt.active_session().unwrap().id, second.id);
    }

    #[test]
    fn test_start_clears_only_session_buffer() {
        let mut rt = runtime().with_base_events(vec![Event::new("h1", "History", -5)]);
        rt.start_session(None);
        rt.advance(TICK * 2);
        assert_eq!(rt.events().len(), 3);

        rt.start_session(None);
        assert!(rt.session_events().is_empty());
        assert_eq!(rt.events().len(), 1);
        assert!(rt.graph().event("h1").is_some());
    }

    #[test]
    fn test_subscribe_delivers_current_graph() {
        let mut rt = runtime().with_base_events(vec![Event::new("h1", "History", 1)
            .with_character("c-rogue")
            .at("l-town")]);
        let seen = record(&mut rt);

        {
            let seen = seen.borrow();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].cause, UpdateCause::Initial);
            assert_eq!(seen[0].graph, rt.graph());
            assert!(seen[0].active_session.is_none());
        }

        let session = rt.start_session(None);
        rt.advance(TICK);

        let seen = seen.borrow();
        assert_eq!(
            causes(&seen),
            vec![
                UpdateCause::Initial,
                UpdateCause::SessionStarted,
                UpdateCause::EventAppended
            ]
        );
        assert_eq!(seen[2].active_session.as_ref(), Some(&session.id));
        assert_eq!(seen[2].graph.edge_count(), rt.graph().edge_count());
    }

    #[test]
    fn test_end_keeps_events_and_end_time() {
        let mut rt = runtime();
        let seen = record(&mut rt);
        let session = rt.start_session(Some("Vault".into()));
        rt.advance(TICK * 2);

        let before = rt.session_events().to_vec();
        let ended = rt.end_session(&session.id).unwrap();
        assert_eq!(ended.ended_at, Some(4_000));
        assert_eq!(rt.session_events(), before.as_slice());
        assert!(!rt.is_live());
        assert!(rt.active_session().is_none());

        // No more ticks.
        assert_eq!(rt.advance(TICK * 5), 0);
        assert_eq!(rt.session_events().len(), 2);

        let again = rt.end_session(&session.id).unwrap();
        assert_eq!(again.ended_at, Some(4_000));

        let seen = seen.borrow();
        let ends = seen.iter().filter(|u| u.cause == UpdateCause::SessionEnded).count();
        assert_eq!(ends, 1);
        assert_eq!(seen.last().unwrap().graph, rt.graph());
    }

    #[test]
    fn test_end_archives_events() {
        let mut rt = runtime();
        let session = rt.start_session(None);
        rt.advance(TICK * 3);
        rt.end_session(&session.id);

        let archived = rt.archive(&session.id);
        assert_eq!(archived, rt.session_events());
    }

    #[test]
    fn test_end_unknown_session() {
        let mut rt = runtime();
        let seen = record(&mut rt);
        let session = rt.start_session(None);

        assert!(rt.end_session(&SessionId::new("nope")).is_none());
        assert!(rt.is_live());
        assert_eq!(rt.active_session().unwrap().id, session.id);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_failing_listener_does_not_block_others() {
        let mut rt = runtime();
        rt.subscribe(|u: &GraphUpdate| match u.cause {
            UpdateCause::Initial => Ok(()),
            _ => Err("listener gave up".into()),
        });
        let seen = record(&mut rt);

        rt.start_session(None);
        rt.advance(TICK);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_unsubscribe_stops_updates() {
        let mut rt = runtime();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let id = rt.subscribe(move |_: &GraphUpdate| {
            *sink.borrow_mut() += 1;
            Ok(())
        });

        assert!(rt.unsubscribe(id));
        rt.start_session(None);
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn test_corrupt_storage_reads_empty() {
        let mut store = MemoryStore::new();
        store.set("ds_sessions", "{not json").unwrap();
        store.set("ds_activeSessionId", "sess-gone").unwrap();

        let mut rt = runtime_with(store);
        assert!(rt.sessions().is_empty());
        assert!(rt.active_session().is_none());

        rt.start_session(None);
        assert_eq!(rt.sessions().len(), 1);
    }

    #[test]
    fn test_stale_active_session_is_closed() {
        let mut rt = runtime();
        let stale = rt.start_session(None);
        rt.advance(TICK);

        // A fresh runtime over the same storage.
        let store = rt.directory.into_store();
        let mut rt = runtime_with(store);
        assert_eq!(rt.active_session().unwrap().id, stale.id);

        rt.start_session(None);
        let sessions = rt.sessions();
        assert!(!sessions.iter().find(|s| s.id == stale.id).unwrap().is_active());
        assert_eq!(rt.active_session().unwrap().id, sessions[1].id);
    }

    #[test]
    fn test_advance_to_end_of_clock() {
        let mut rt = runtime();
        rt.start_session(None);

        assert_eq!(rt.advance(Duration::MAX), MAX_CATCH_UP);
        assert!(!rt.is_live());
        assert!(rt.session_events().windows(2).all(|w| w[0].ts <= w[1].ts));
    }

    #[test]
    fn test_view_follows_runtime_updates() {
        let mut rt = runtime();
        let view = Rc::new(RefCell::new(GraphView::new(NullSurface)));
        let sink = Rc::clone(&view);
        rt.subscribe(move |u: &GraphUpdate| {
            sink.borrow_mut().apply_graph(u.graph.clone());
            Ok(())
        });

        rt.start_session(Some("Intro".into()));
        rt.advance(TICK);
        let live = NodeRef::event(rt.session_events()[0].id.as_str());
        view.borrow_mut().handle_tap(Tap::Node(live.clone()));
        assert_eq!(view.borrow().selection(), &Selection::Node(live));

        // A new session clears the buffer and with it the selected event.
        rt.start_session(Some("Second".into()));
        assert!(view.borrow().selection().is_none());
        assert!(!view.borrow().highlight().is_active());

        let rogue = NodeRef::character("c-rogue");
        view.borrow_mut().handle_tap(Tap::Node(rogue.clone()));
        rt.advance(TICK * 3);

        let view = view.borrow();
        assert_eq!(view.graph().nodes.events.len(), 3);
        assert_eq!(view.selection(), &Selection::Node(rogue));
        assert!(view.highlight().is_active());
    }

    #[test]
    fn test_live_events_reference_registry() {
        let mut rt = runtime();
        rt.start_session(None);
        rt.advance(TICK * 10);

        let graph = rt.graph();
        assert!(graph.is_consistent());
        assert_eq!(graph.nodes.characters.len(), rt.registry().characters.len());
        assert_eq!(graph.nodes.events.len(), 10);
    }
}

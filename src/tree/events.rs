//! Structural change notifications.
//!
//! Every mutation of a child list is bracketed: the subscriber first hears
//! which index range is about to change, then that the change is done. A
//! view that materializes handles to rows can therefore shift them
//! deterministically. Nodes are addressed by their index path from the tree
//! root; the root itself is the empty path.

/// Receives structural changes from [`TreeCache::refresh`].
///
/// Every callback defaults to doing nothing, so a subscriber only overrides
/// what it needs.
///
/// [`TreeCache::refresh`]: super::TreeCache::refresh
pub trait TreeChangeSubscriber {
    /// Rows `start..=end` are about to be inserted under `parent`.
    fn pre_insert(&mut self, parent: &[usize], start: usize, end: usize) {
        let _ = (parent, start, end);
    }

    /// The announced insertion under `parent` is complete.
    fn post_insert(&mut self, parent: &[usize]) {
        let _ = parent;
    }

    /// Rows `start..=end` are about to be removed from `parent`.
    fn pre_remove(&mut self, parent: &[usize], start: usize, end: usize) {
        let _ = (parent, start, end);
    }

    /// The announced removal from `parent` is complete.
    fn post_remove(&mut self, parent: &[usize]) {
        let _ = parent;
    }

    /// Sent once per node whose children changed during a refresh, after
    /// all of its insertions and removals.
    fn children_changed(&mut self, node: &[usize]) {
        let _ = node;
    }
}

/// A subscriber that ignores every notification (null object pattern).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTreeEvents;

impl TreeChangeSubscriber for NoTreeEvents {}

/// A recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// See [`TreeChangeSubscriber::pre_insert`].
    PreInsert {
        /// Index path of the parent.
        parent: Vec<usize>,
        /// First inserted row.
        start: usize,
        /// Last inserted row.
        end: usize,
    },
    /// See [`TreeChangeSubscriber::post_insert`].
    PostInsert {
        /// Index path of the parent.
        parent: Vec<usize>,
    },
    /// See [`TreeChangeSubscriber::pre_remove`].
    PreRemove {
        /// Index path of the parent.
        parent: Vec<usize>,
        /// First removed row.
        start: usize,
        /// Last removed row.
        end: usize,
    },
    /// See [`TreeChangeSubscriber::post_remove`].
    PostRemove {
        /// Index path of the parent.
        parent: Vec<usize>,
    },
    /// See [`TreeChangeSubscriber::children_changed`].
    ChildrenChanged {
        /// Index path of the node.
        node: Vec<usize>,
    },
}

/// Subscriber that records every notification in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    /// Recorded notifications, oldest first.
    pub events: Vec<TreeEvent>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `pre_insert` notifications.
    pub fn inserts(&self) -> usize {
        self.count(|e| matches!(e, TreeEvent::PreInsert { .. }))
    }

    /// Number of `pre_remove` notifications.
    pub fn removes(&self) -> usize {
        self.count(|e| matches!(e, TreeEvent::PreRemove { .. }))
    }

    /// Number of `children_changed` notifications.
    pub fn changes(&self) -> usize {
        self.count(|e| matches!(e, TreeEvent::ChildrenChanged { .. }))
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn count(&self, predicate: impl Fn(&TreeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl TreeChangeSubscriber for EventLog {
    fn pre_insert(&mut self, parent: &[usize], start: usize, end: usize) {
        self.events.push(TreeEvent::PreInsert {
            parent: parent.to_vec(),
            start,
            end,
        });
    }

    fn post_insert(&mut self, parent: &[usize]) {
        self.events.push(TreeEvent::PostInsert {
            parent: parent.to_vec(),
        });
    }

    fn pre_remove(&mut self, parent: &[usize], start: usize, end: usize) {
        self.events.push(TreeEvent::PreRemove {
            parent: parent.to_vec(),
            start,
            end,
        });
    }

    fn post_remove(&mut self, parent: &[usize]) {
        self.events.push(TreeEvent::PostRemove {
            parent: parent.to_vec(),
        });
    }

    fn children_changed(&mut self, node: &[usize]) {
        self.events.push(TreeEvent::ChildrenChanged {
            node: node.to_vec(),
        });
    }
}

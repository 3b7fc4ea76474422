use std::sync::Mutex;

#[derive(Debug, Default)]
struct Current {
    generation: u64,
    assignment_id: Option<String>,
}

/// Tracks which assignment a caller is currently looking at, so results of
/// queries issued for an earlier selection can be dropped on arrival.
///
/// One tracker per view; it is not shared between callers.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current: Mutex<Current>,
}

/// Handed out by [`SelectionTracker::select`]; identifies one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    assignment_id: String,
}

impl SelectionTicket {
    pub fn assignment_id(&self) -> &str {
        &self.assignment_id
    }
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `assignment_id` current, superseding every earlier ticket.
    pub fn select(&self, assignment_id: impl Into<String>) -> SelectionTicket {
        let mut current = self.lock();
        current.generation += 1;
        let assignment_id = assignment_id.into();
        current.assignment_id = Some(assignment_id.clone());
        SelectionTicket {
            generation: current.generation,
            assignment_id,
        }
    }

    pub fn clear(&self) {
        let mut current = self.lock();
        current.generation += 1;
        current.assignment_id = None;
    }

    pub fn current(&self) -> Option<String> {
        self.lock().assignment_id.clone()
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.lock().generation == ticket.generation
    }

    /// Passes `value` through only if `ticket` is still the latest selection.
    pub fn accept<T>(&self, ticket: &SelectionTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(
                assignment_id = %ticket.assignment_id,
                "discarding result for superseded selection"
            );
            None
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Current> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

use std::collections::HashMap;

use serde_json::Value;

use super::ScheduleEvent;

/// Events returned by a fetch, keyed by event id. Iteration order is
/// unspecified.
#[derive(Debug, Clone, Default)]
pub struct EventCollection {
    events: HashMap<String, ScheduleEvent>,
    supplemental_data: Option<Value>,
}

impl EventCollection {
    pub fn new(events: HashMap<String, ScheduleEvent>, supplemental_data: Option<Value>) -> Self {
        Self {
            events,
            supplemental_data,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ScheduleEvent> {
        self.events.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScheduleEvent)> {
        self.events.iter()
    }

    pub fn supplemental_data(&self) -> Option<&Value> {
        self.supplemental_data.as_ref()
    }

    /// Events ordered by start time then id, for display.
    pub fn sorted(&self) -> Vec<&ScheduleEvent> {
        let mut events: Vec<&ScheduleEvent> = self.events.values().collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then(a.id.cmp(&b.id)));
        events
    }
}

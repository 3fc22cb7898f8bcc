pub mod collection;
pub mod event;

pub use collection::EventCollection;
pub use event::{EventPatch, NewEvent, ScheduleEvent, parse_id_list};

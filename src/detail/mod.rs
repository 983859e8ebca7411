pub mod controller;
pub mod event_id;
pub mod phase;
pub mod sections;

pub use controller::{DetailController, DetailSnapshot, DetailTiming};
pub use event_id::{parse_event_id, ParsedEventId};
pub use sections::{DetailSource, FetchContext, SectionFetchResult, SectionKind};

//! Keeps the in-memory diagram, its persisted copy and the view in step.

mod controller;
mod ids;
pub mod sample;
pub mod scheduler;
pub mod settings;
mod snapshot;
pub mod view;

pub use controller::{
    DEFAULT_NEW_NODE_POSITION, EXPORT_FILE_NAME, EdgeChanges, EditorState, NodeChanges,
    NodeDataPatch, SyncController, SyncPhase,
};
pub use sample::sample_document;
pub use scheduler::{Clock, ManualClock, ScheduledTask, Scheduler, SystemClock, TaskHandle, TaskKind};
pub use settings::SyncSettings;
pub use snapshot::{export_saved, load_saved_graph};
pub use view::{EventBusView, NullView, ViewAdapter};

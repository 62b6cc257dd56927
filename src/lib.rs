//! Choir seating chart editor.
//!
//! Singers are generated per voice part, dealt into rows under a layout
//! policy, and rearranged by swapping seats. The terminal front end draws the
//! chart and turns key presses and mouse drags into reducer actions.

pub mod cursor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod roster;
pub mod runtime;
pub mod seating;
pub mod state;
pub mod width;

pub use error::{Result, SeatingError};
pub use geometry::{Rect, Size};
pub use input::{parse_count, parse_row_count};
pub use layout::{Constraint, ScreenLayout};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use metrics::{MetricSnapshot, RuntimeMetrics};
pub use registry::{Panel, PanelRegistry};
pub use render::{AnsiRenderer, ChartGeometry, Highlights, render_chart};
pub use roster::{IdAllocator, MAX_PER_PART, Member, MemberId, Part, PartCounts, Roster};
pub use runtime::controls::{Command, Controls, Field};
pub use runtime::diagnostics::{LifecycleLoggerPlugin, MetricsSnapshotPlugin};
pub use runtime::driver::cli::{CliDriver, CliDriverError, DriverResult};
pub use runtime::{
    ChartPlugin, ChartRuntime, EditorConfig, EventFlow, RuntimeContext, RuntimeEvent,
};
pub use seating::{
    Cell, Coord, Grid, LayoutPolicy, MAX_ROWS, Placement, assign, policy_options,
};
pub use state::{Action, DragAndDrop, DragSession, Outcome, SeatingState, Transition, reduce};
pub use width::display_width;

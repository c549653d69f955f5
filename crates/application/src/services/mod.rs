//! Application services - Use case implementations

mod history_panel;
mod history_store;
mod route_workflow;
mod search_orchestrator;
mod session_view;

pub use history_panel::{HistoryPanel, PanelState};
pub use history_store::HistoryStore;
pub use route_workflow::{RouteOverlay, RouteWorkflow};
pub use search_orchestrator::{SearchHandle, SearchOrchestrator, SearchOutcome};
pub use session_view::{SessionEvent, SessionUpdate, SessionView};

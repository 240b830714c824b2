//! Transcript handling: intent classification, event matching, time
//! resolution and the calendar mutations that follow from them.

pub mod actor;
pub mod context;
pub mod handle;
pub mod intent;
pub mod matcher;
pub mod mutation;
pub mod resolver;
pub mod session;

pub use context::SessionContext;
pub use handle::AssistantHandle;
pub use intent::{classify, Intent, IntentKind};
pub use matcher::{find_event, MatchDirection};
pub use mutation::CalendarMutationService;
pub use resolver::DateTimeResolver;
pub use session::{AssistantSession, Diagnostic, Outcome};

// Export components
pub mod assistant;
pub mod google_calendar;
pub mod voice;

// Re-export the assistant handle
pub use assistant::AssistantHandle;

pub mod scripted;
pub mod wanderer;

pub use scripted::ScriptedDetector;
pub use wanderer::WandererDetector;

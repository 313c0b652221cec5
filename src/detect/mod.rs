mod backend;
mod backends;
mod result;

pub use backend::SubjectDetector;
pub use backends::scripted::ScriptedFrame;
pub use backends::{ScriptedDetector, WandererDetector};
pub use result::{DetectedSubject, Subject};

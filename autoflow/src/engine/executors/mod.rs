//! One executor per node kind, wired to the platform collaborator seams.

mod delay;
mod gesture;
mod launch;
mod screen_ml;
mod visual_trigger;

pub use delay::DelayNodeExecutor;
pub use gesture::GestureNodeExecutor;
pub use launch::{LaunchAppNodeExecutor, StartNodeExecutor};
pub use screen_ml::ScreenMlNodeExecutor;
pub use visual_trigger::VisualTriggerNodeExecutor;

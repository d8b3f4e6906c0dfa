//! Built-in cleaning stages, in the order the pipeline runs them

pub mod dc_removal;
pub mod notch;
pub mod bandpass;
pub mod artifact;
pub mod smoothing;
pub mod normalize;

// Re-export stage implementations
pub use dc_removal::*;
pub use notch::*;
pub use bandpass::*;
pub use artifact::*;
pub use smoothing::*;
pub use normalize::*;

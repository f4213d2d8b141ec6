// StrideWatch: Motion Detectors
//
// Both detectors consume one `Sample` per tick and never fail.

pub mod fall;
pub mod step;

pub use fall::FallDetector;
pub use step::StepDetector;

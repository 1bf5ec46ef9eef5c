pub mod browser;
pub mod normalizer;

pub use browser::{BrowserInfo, BrowserKind};
pub use normalizer::{NavigationInfo, TimingNormalizer, TimingSnapshot, TIMING_POINTS};

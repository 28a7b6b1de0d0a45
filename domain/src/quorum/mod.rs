//! Quorum thresholds
//!
//! A vote reaches quorum once enough members of the voting group have voted.
//! How many is enough depends on the [`ThresholdTier`]:
//!
//! | Tier | Fraction | 10 members |
//! |------|----------|-----------:|
//! | `majority` | 1/2 | 5 |
//! | `twothirds` | 2/3 | 7 |
//! | `fourfifths` | 4/5 | 8 |
//! | `all` | 1/1 | 10 |

pub mod threshold;

pub use threshold::ThresholdTier;

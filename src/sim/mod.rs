//! Deterministic trial simulation
//!
//! All task logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by dot ID)
//! - No rendering or platform dependencies; time comes in through a `Clock`

pub mod arena;
pub mod click;
pub mod collision;
pub mod layout;
pub mod machine;
pub mod state;
pub mod tick;

pub use arena::Arena;
pub use click::{complete_sub_trial, press, release, resolve_target};
pub use collision::{EdgeMask, bounce, classify, reflect};
pub use layout::{lay_out_field, place};
pub use machine::TrialMachine;
pub use state::{
    ClickRecord, Dot, DotVisualState, RngState, TrialEvent, TrialPhase, TrialRunState,
};
pub use tick::{move_dots, tick};

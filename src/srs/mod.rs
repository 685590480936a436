pub mod formulas;
pub mod params;
pub mod scheduler;
pub mod sm2;

pub use params::{FormulaVersion, Weights};
pub use scheduler::{review, Scheduler};
pub use sm2::{memory_state_from_sm2, Sm2Record};

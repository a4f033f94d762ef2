pub mod composer;
pub mod types;
pub mod wrap;

pub use composer::{compose, PageComposer};
pub use types::{Page, ViewportBudget};

mod component;
pub mod countdown;
pub mod debounce;
pub mod selection;

pub use component::BoothSearch;
pub use countdown::Countdown;
pub use selection::{SelectionState, Slot};

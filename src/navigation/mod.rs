//! Route queries and address-bar state.

pub mod history;
pub mod path_query;

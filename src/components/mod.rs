pub mod booth_search;
pub mod controls;
pub mod floor_plan;

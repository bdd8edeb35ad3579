pub mod chart;
pub mod controls;
pub mod datatable;
pub mod debug;
pub mod filters;
pub mod info;
pub mod map;
pub mod statistics;
pub mod text_input;

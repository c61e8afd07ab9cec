pub mod controls;
pub mod gauge;
pub mod item_list;
pub mod progress;
pub mod screen;

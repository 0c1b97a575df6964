pub mod layout;
pub mod model;
pub mod overlay;
pub mod session;
pub mod transition;
pub mod views;

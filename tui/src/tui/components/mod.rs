pub mod charts;
#[allow(clippy::module_inception)]
mod component;
pub mod filters;
pub mod logs;
pub mod nav_tabs;
pub mod rankings;

pub(crate) use component::Component;

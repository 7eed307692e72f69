pub(crate) mod apply;
pub(crate) mod config;
pub(crate) mod plan;
pub(crate) mod state;

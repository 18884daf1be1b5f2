pub(crate) mod backdrop;
pub(crate) mod component;
pub(crate) mod config;
pub(crate) mod environment;
pub(crate) mod stage;

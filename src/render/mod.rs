pub(crate) mod backend;
pub(crate) mod camera;
pub(crate) mod cpu;
pub(crate) mod pipeline;
pub(crate) mod placeholder;
pub(crate) mod tonemap;

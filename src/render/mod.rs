pub(crate) mod canvas;
pub(crate) mod cover;
pub(crate) mod filter;
pub(crate) mod renderer;
pub(crate) mod schedule;

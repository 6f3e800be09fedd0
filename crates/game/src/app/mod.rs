mod bootstrap;
mod save;
mod session;
mod world;

pub(crate) use bootstrap::{build_app, init_tracing};

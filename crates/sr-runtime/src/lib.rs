mod harness;
mod report;
mod sandbox;

pub use sandbox::{Sandbox, SandboxOptions, DEFAULT_ALLOWED_GLOBALS};

mod methods;
mod transitions;
mod types;

#[cfg(test)]
mod tests;

pub use types::{Stage, StageStatus};

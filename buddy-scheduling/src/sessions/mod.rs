pub mod negotiator;

pub use negotiator::{Decision, SessionNegotiator};

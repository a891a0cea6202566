//! Markov removal-effect engine and its advisory diagnostics.

mod absorbing_chain;
mod diagnostics;
mod engine;
mod transitions;

pub use absorbing_chain::AbsorbingChain;
pub use diagnostics::{
    MarkovDiagnostics, Reliability, TransitionShare, DIRECT_CHANNEL, TOP_TRANSITIONS,
};
pub use engine::{MarkovAttribution, MarkovFallback, MarkovOutcome};
pub use transitions::{ChainState, TransitionCounts};

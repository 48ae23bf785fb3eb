//! Accord multi-party account engine.
//!
//! A shared [`Account`] object holds assets and capabilities on behalf of
//! a set of weighted members.  State-changing work is bundled into named
//! proposals; once the approvals recorded against a proposal carry enough
//! weight for the issuer's threshold bucket, the proposal is converted
//! into a single-use [`Executable`] cursor that drives each action through
//! its side effect and cleanup exactly once, in order.
//!
//! Action families (minting, transfers, object withdrawal, ...) live in
//! their own crates and plug into the engine through the
//! [`ActionFamily`] witness, the proposal builder, and the executable's
//! typed accessors.  The built-in [`config`] family is the only way the
//! account's own membership, thresholds, and dependency table change
//! after genesis.

pub mod account;
pub mod action;
pub mod auth;
pub mod config;
pub mod deps;
pub mod error;
pub mod executable;
pub mod managed;
pub mod members;
pub mod params;
pub mod proposals;
pub mod thresholds;

pub use account::Account;
pub use action::Action;
pub use auth::{ActionFamily, Auth, Issuer};
pub use deps::{Dep, DepRegistry, Extensions};
pub use error::{
    AccountError, AuthError, DepsError, ManagedError, PolicyError, ProposalError, SequenceError,
    ThresholdError, TimingError,
};
pub use executable::Executable;
pub use managed::AssetKey;
pub use members::{Member, MemberRegistry};
pub use params::AccountParams;
pub use proposals::{Expired, Proposal};
pub use thresholds::Thresholds;

use accord_primitives::{AccountAddr, MemberKey, ObjectId, RoleName, Weight};
use thiserror::Error;

/// Top-level error type for the account engine, composed of smaller error
/// categories.  Every failure aborts the enclosing call in full; the engine
/// performs no internal retries and leaves no partial state behind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    /// The caller lacks standing for the operation.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A collision with existing committed proposal state.
    #[error(transparent)]
    Proposal(#[from] ProposalError),

    /// Quorum math failed.
    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    /// A timestamp or epoch gate failed.
    #[error(transparent)]
    Timing(#[from] TimingError),

    /// An action family violated the consume-in-order contract.  Never a
    /// legitimate run-time condition; treat as an integration bug.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Caller-supplied configuration data is semantically invalid.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// A dependency-registry constraint failed.
    #[error(transparent)]
    Deps(#[from] DepsError),

    /// A managed-asset access failed.
    #[error(transparent)]
    Managed(#[from] ManagedError),
}

/// The caller could not be authorized.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The caller is not a registered member of the account.
    #[error("caller {0} is not a member of this account")]
    NotMember(MemberKey),

    /// The auth token was constructed against a different account.
    #[error("auth was issued for account {found}, expected {expected}")]
    WrongAccount {
        expected: AccountAddr,
        found: AccountAddr,
    },

    /// A family other than the proposal's creator tried to drive it.
    #[error("proposal was issued by family `{expected}`, not `{found}`")]
    WrongIssuer {
        expected: &'static str,
        found: &'static str,
    },

    /// The member does not hold the requested role.
    #[error("member {member} does not hold role `{role}`")]
    InsufficientRole { member: MemberKey, role: RoleName },

    /// No threshold is defined for the requested role.
    #[error("role `{0}` does not exist on this account")]
    RoleDoesNotExist(RoleName),
}

/// Proposal-store state conflicts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProposalError {
    /// The chosen key collides with an open proposal.
    #[error("a proposal keyed `{0}` is already open")]
    KeyAlreadyExists(String),

    /// No open proposal under the given key.
    #[error("no open proposal keyed `{0}`")]
    NotFound(String),

    /// The proposal still has approvals recorded against it.
    #[error("proposal `{key}` still has {approvals} approval(s)")]
    NotEmpty { key: String, approvals: usize },

    /// The member already approved this proposal.
    #[error("member {member} already approved proposal `{key}`")]
    AlreadyApproved { key: String, member: MemberKey },

    /// The member never approved this proposal.
    #[error("member {member} has no approval on proposal `{key}`")]
    ApprovalNotFound { key: String, member: MemberKey },
}

/// Quorum-math failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThresholdError {
    /// Cumulative approver weight is short of the required threshold.
    #[error("approval weight {have} below required {required}")]
    NotReached { have: Weight, required: Weight },

    /// A proposed threshold exceeds the weight able to reach it.
    #[error("threshold {threshold} unreachable: {available} weight available{}", role_suffix(.role))]
    TooHigh {
        threshold: Weight,
        available: Weight,
        role: Option<RoleName>,
    },

    /// A zero threshold would allow unauthorized execution.
    #[error("threshold must be greater than zero")]
    Null,
}

fn role_suffix(role: &Option<RoleName>) -> String {
    match role {
        Some(r) => format!(" for role `{r}`"),
        None => String::new(),
    }
}

/// Timestamp / epoch gate failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimingError {
    /// The proposal's earliest execution time has not been reached.
    #[error("now {now_ms}ms is before earliest execution {execution_time}ms")]
    TooEarly { now_ms: u64, execution_time: u64 },

    /// The proposal expired.
    #[error("proposal expired at epoch {expiration}, current epoch {current_epoch}")]
    Expired { current_epoch: u64, expiration: u64 },
}

/// Violations of the consume-in-order / cleanup-before-terminate contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// The payload at the cursor is not of the declared type.
    #[error("action at slot {slot} is not a `{expected}`")]
    WrongActionType { slot: usize, expected: &'static str },

    /// The cursor has no further actions to hand out.
    #[error("no actions remain to process")]
    OutOfActions,

    /// Not every action was processed and cleaned up.
    #[error("{remaining} action(s) not yet cleaned up")]
    ActionsRemaining { remaining: usize },

    /// An action's executed marker was not in its terminal state.
    #[error("action `{action}` was cleaned up without being executed")]
    NotExecuted { action: &'static str },

    /// Objects lent out during execution were not returned.
    #[error("{outstanding} borrowed object(s) not yet returned")]
    ReturnAllObjectsBefore { outstanding: usize },

    /// Listed objects were not all retrieved before cleanup.
    #[error("{missing} listed object(s) not yet retrieved")]
    RetrieveAllObjectsBefore { missing: usize },

    /// An object was returned that was never lent out.
    #[error("object {0} was not lent out by this executable")]
    ObjectNotBorrowed(ObjectId),
}

/// Semantically invalid caller-supplied configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The member is already registered.
    #[error("member {0} is already registered")]
    AlreadyMember(MemberKey),

    /// The member is not registered.
    #[error("member {0} is not registered")]
    UnknownMember(MemberKey),

    /// Members must carry positive voting weight.
    #[error("member {0} has zero weight")]
    ZeroWeight(MemberKey),

    /// An account must start with at least one member.
    #[error("member registry cannot be empty")]
    NoMembers,
}

/// Dependency-registry failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DepsError {
    /// The dependency is absent from the external allow-list.
    #[error("dependency `{name}` v{version} is not allow-listed")]
    NotAllowlisted { name: String, version: u64 },

    /// A dependency under this name or package is already registered.
    #[error("dependency `{0}` is already registered")]
    AlreadyRegistered(String),

    /// The package is not a registered dependency of this account.
    #[error("package `{0}` is not a dependency of this account")]
    UnknownDependency(String),

    /// The package is not one of the privileged core dependencies.
    #[error("package `{0}` is not a core dependency")]
    NotCoreDependency(&'static str),
}

/// Managed-asset area failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManagedError {
    /// An asset is already stored under the key.
    #[error("managed asset `{0}` already exists")]
    Occupied(String),

    /// No asset under the key.
    #[error("no managed asset `{0}`")]
    Missing(String),

    /// The stored asset is not of the requested type.
    #[error("managed asset `{key}` is not a `{expected}`")]
    WrongAssetType { key: String, expected: &'static str },
}

//! End-to-end lifecycle tests for the proposal/executable engine.

#![allow(unused_crate_dependencies, reason = "integration test binary")]

use std::collections::BTreeMap;

use accord_account::{
    config, Account, AccountError, AccountParams, ActionFamily, AuthError, Extensions, Member,
    MemberRegistry, PolicyError, ProposalError, Thresholds, ThresholdError, TimingError,
};
use accord_account::params::{MemberParams, PackageParams};
use accord_primitives::{AccountAddr, Buf32, ManualClock, MemberKey, PackageId, RoleName};
use proptest::prelude::*;
use rand::seq::SliceRandom;

/// Stand-in family for proposals whose actions carry no engine effects.
#[derive(Debug)]
struct NotesFamily;

impl ActionFamily for NotesFamily {
    const PACKAGE: &'static str = "accord-notes";
    const FAMILY: &'static str = "notes";
}

/// Minimal payload with an explicit executed marker.
#[derive(Debug)]
struct NoteAction {
    text: String,
    applied: bool,
}

impl NoteAction {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            applied: false,
        }
    }
}

fn member(b: u8) -> MemberKey {
    MemberKey::new(Buf32::fill(b))
}

fn addr() -> AccountAddr {
    AccountAddr::new(Buf32::fill(0xaa))
}

fn protocol_package() -> PackageParams {
    PackageParams {
        name: "accord-account".to_owned(),
        package: PackageId::new(Buf32::fill(0x01)),
        version: 1,
    }
}

/// Registry {A: 2, B: 1, C: 1}, global threshold 3.
fn base_params() -> AccountParams {
    AccountParams {
        members: vec![
            MemberParams {
                key: member(1),
                weight: 2,
                roles: vec![],
            },
            MemberParams {
                key: member(2),
                weight: 1,
                roles: vec![],
            },
            MemberParams {
                key: member(3),
                weight: 1,
                roles: vec![],
            },
        ],
        global_threshold: 3,
        role_thresholds: BTreeMap::new(),
        core_packages: vec![protocol_package()],
        extension_deps: vec![],
    }
}

fn base_account() -> Account {
    Account::new(addr(), &base_params(), &Extensions::new()).unwrap()
}

/// Opens a single-note proposal under `key`.
fn propose_note(account: &mut Account, proposer: MemberKey, key: &str, execution_time: u64) {
    let auth = account.authenticate(proposer, None).unwrap();
    let proposal = account
        .create_proposal::<NotesFamily>(auth, key, "a note", execution_time, 100)
        .unwrap();
    proposal.push_action(NoteAction::new("hello"));
}

/// Drives a single-note executable through its full consume cycle.
fn drive_note(account: &mut Account, executor: MemberKey, key: &str, clock: &ManualClock) {
    let mut exec = account
        .execute_proposal::<NotesFamily>(executor, key, clock)
        .unwrap();
    let note = exec.current::<NotesFamily, NoteAction>().unwrap();
    note.applied = true;
    exec.advance::<NotesFamily>().unwrap();
    let done = exec.cleanup::<NotesFamily, NoteAction>().unwrap();
    assert!(done.applied);
    assert_eq!(done.text, "hello");
    exec.terminate().unwrap();
}

#[test]
fn quorum_accumulation_gates_execution() {
    let mut account = base_account();
    let clock = ManualClock::new(0, 0);
    propose_note(&mut account, member(1), "p1", 0);

    // A alone carries weight 2, below the global threshold of 3.
    account.approve_proposal(member(1), "p1").unwrap();
    let err = account
        .execute_proposal::<NotesFamily>(member(1), "p1", &clock)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Threshold(ThresholdError::NotReached {
            have: 2,
            required: 3
        })
    );

    // B tips the total to 3.
    account.approve_proposal(member(2), "p1").unwrap();
    drive_note(&mut account, member(1), "p1", &clock);

    // The key is gone: a second execute observes not-found, never a
    // double execution.
    assert!(!account.has_proposal("p1"));
    let err = account
        .execute_proposal::<NotesFamily>(member(1), "p1", &clock)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Proposal(ProposalError::NotFound("p1".to_owned()))
    );
}

#[test]
fn execution_time_gate() {
    let mut account = base_account();
    let mut clock = ManualClock::new(500, 0);
    propose_note(&mut account, member(1), "p2", 1500);

    for m in [member(1), member(2), member(3)] {
        account.approve_proposal(m, "p2").unwrap();
    }

    let err = account
        .execute_proposal::<NotesFamily>(member(1), "p2", &clock)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Timing(TimingError::TooEarly {
            now_ms: 500,
            execution_time: 1500
        })
    );

    clock.advance_ms(1000);
    drive_note(&mut account, member(1), "p2", &clock);
}

#[test]
fn expiration_gate_and_sweep() {
    let mut account = base_account();
    let mut clock = ManualClock::new(0, 0);
    propose_note(&mut account, member(1), "p3", 0);
    account.approve_proposal(member(1), "p3").unwrap();
    account.approve_proposal(member(2), "p3").unwrap();

    clock.set_epoch(100);
    let err = account
        .execute_proposal::<NotesFamily>(member(1), "p3", &clock)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Timing(TimingError::Expired {
            current_epoch: 100,
            expiration: 100
        })
    );

    // Anyone can sweep; approvals do not protect an expired proposal.
    let mut swept = account.sweep_expired(&clock);
    assert_eq!(swept.len(), 1);
    assert!(!account.has_proposal("p3"));

    let remnant = &mut swept[0];
    assert_eq!(remnant.key(), "p3");
    let note: NoteAction = remnant.pop_action::<NotesFamily, NoteAction>().unwrap();
    assert!(!note.applied);
    swept.pop().unwrap().destroy_empty().unwrap();
}

#[test]
fn role_threshold_takes_precedence() {
    // {A: 1} with role "treasurer"; global threshold 1 but the treasurer
    // bucket demands 2.  A role-scoped proposal must fail even though
    // the global quorum would pass.
    let treasurer = RoleName::from("treasurer");
    let params = AccountParams {
        members: vec![MemberParams {
            key: member(1),
            weight: 1,
            roles: vec![treasurer.clone()],
        }],
        global_threshold: 1,
        role_thresholds: BTreeMap::from([(treasurer.clone(), 2)]),
        core_packages: vec![protocol_package()],
        extension_deps: vec![],
    };
    let mut account = Account::new(addr(), &params, &Extensions::new()).unwrap();
    let clock = ManualClock::new(0, 0);

    let auth = account
        .authenticate(member(1), Some(treasurer.clone()))
        .unwrap();
    let proposal = account
        .create_proposal::<NotesFamily>(auth, "scoped", "", 0, 100)
        .unwrap();
    proposal.push_action(NoteAction::new("scoped"));
    account.approve_proposal(member(1), "scoped").unwrap();

    let err = account
        .execute_proposal::<NotesFamily>(member(1), "scoped", &clock)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Threshold(ThresholdError::NotReached {
            have: 1,
            required: 2
        })
    );

    // The same member's unscoped proposal sails through at the global
    // threshold of 1.
    propose_note(&mut account, member(1), "unscoped", 0);
    account.approve_proposal(member(1), "unscoped").unwrap();
    drive_note(&mut account, member(1), "unscoped", &clock);
}

#[test]
fn empty_proposal_deletable_by_any_member() {
    let mut account = base_account();
    propose_note(&mut account, member(1), "p4", 0);

    // C never touched the proposal but may delete it while unapproved.
    account.delete_proposal(member(3), "p4").unwrap();
    assert!(!account.has_proposal("p4"));

    propose_note(&mut account, member(1), "p5", 0);
    account.approve_proposal(member(2), "p5").unwrap();

    let err = account.delete_proposal(member(3), "p5").unwrap_err();
    assert_eq!(
        err,
        AccountError::Proposal(ProposalError::NotEmpty {
            key: "p5".to_owned(),
            approvals: 1
        })
    );

    // Withdrawing the approval reopens the door.
    account.remove_approval(member(2), "p5").unwrap();
    account.delete_proposal(member(3), "p5").unwrap();
}

#[test]
fn non_members_are_rejected_everywhere() {
    let mut account = base_account();
    let clock = ManualClock::new(0, 0);
    let outsider = member(9);
    propose_note(&mut account, member(1), "p6", 0);

    assert!(matches!(
        account.authenticate(outsider, None).unwrap_err(),
        AccountError::Auth(AuthError::NotMember(_))
    ));
    assert!(matches!(
        account.approve_proposal(outsider, "p6").unwrap_err(),
        AccountError::Auth(AuthError::NotMember(_))
    ));
    assert!(matches!(
        account.delete_proposal(outsider, "p6").unwrap_err(),
        AccountError::Auth(AuthError::NotMember(_))
    ));
    assert!(matches!(
        account
            .execute_proposal::<NotesFamily>(outsider, "p6", &clock)
            .unwrap_err(),
        AccountError::Auth(AuthError::NotMember(_))
    ));
}

#[test]
fn auth_is_bound_to_its_account() {
    let mut here = base_account();
    let there_params = base_params();
    let there = Account::new(AccountAddr::new(Buf32::fill(0xbb)), &there_params, &Extensions::new())
        .unwrap();

    // Token minted by the other account must not open proposals here.
    let foreign_auth = there.authenticate(member(1), None).unwrap();
    let err = here
        .create_proposal::<NotesFamily>(foreign_auth, "p7", "", 0, 100)
        .unwrap_err();
    assert!(matches!(
        err,
        AccountError::Auth(AuthError::WrongAccount { .. })
    ));
    assert!(!here.has_proposal("p7"));
}

#[test]
fn role_auth_requires_holding_the_role() {
    let treasurer = RoleName::from("treasurer");
    let mut params = base_params();
    params.members[0].roles = vec![treasurer.clone()];
    params.role_thresholds.insert(treasurer.clone(), 2);
    let account = Account::new(addr(), &params, &Extensions::new()).unwrap();

    assert!(account
        .authenticate(member(1), Some(treasurer.clone()))
        .is_ok());

    let err = account
        .authenticate(member(2), Some(treasurer.clone()))
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Auth(AuthError::InsufficientRole {
            member: member(2),
            role: treasurer,
        })
    );

    let err = account
        .authenticate(member(2), Some("ghost".into()))
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Auth(AuthError::RoleDoesNotExist("ghost".into()))
    );
}

#[test]
fn wrong_family_cannot_execute() {
    #[derive(Debug)]
    struct OtherFamily;
    impl ActionFamily for OtherFamily {
        const PACKAGE: &'static str = "accord-other";
        const FAMILY: &'static str = "other";
    }

    let mut account = base_account();
    let clock = ManualClock::new(0, 0);
    propose_note(&mut account, member(1), "p8", 0);
    account.approve_proposal(member(1), "p8").unwrap();
    account.approve_proposal(member(2), "p8").unwrap();

    let err = account
        .execute_proposal::<OtherFamily>(member(1), "p8", &clock)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Auth(AuthError::WrongIssuer {
            expected: "notes",
            found: "other",
        })
    );

    // The failed attempt must not consume the proposal.
    drive_note(&mut account, member(1), "p8", &clock);
}

#[test]
fn duplicate_keys_rejected_across_families() {
    let mut account = base_account();
    propose_note(&mut account, member(1), "dup", 0);

    let auth = account.authenticate(member(2), None).unwrap();
    let err = account
        .create_proposal::<NotesFamily>(auth, "dup", "", 0, 100)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Proposal(ProposalError::KeyAlreadyExists("dup".to_owned()))
    );
}

#[test]
fn config_rules_replace_members_and_thresholds() {
    let mut account = base_account();
    let clock = ManualClock::new(0, 0);

    // New registry: A keeps weight 2, D joins with weight 2; global
    // threshold rises to 4.
    let mut new_members = MemberRegistry::new();
    new_members
        .add([(member(1), Member::new(2)), (member(4), Member::new(2))])
        .unwrap();
    let new_thresholds = Thresholds::try_new(4).unwrap();

    let auth = account.authenticate(member(1), None).unwrap();
    config::propose_config_rules(
        &mut account,
        auth,
        "rules",
        "rotate the committee",
        0,
        100,
        new_members,
        new_thresholds,
    )
    .unwrap();

    account.approve_proposal(member(1), "rules").unwrap();
    account.approve_proposal(member(2), "rules").unwrap();

    let mut exec = account
        .execute_proposal::<config::ConfigFamily>(member(1), "rules", &clock)
        .unwrap();
    config::execute_config_rules(&mut account, &mut exec).unwrap();
    config::complete_config_rules(&mut exec).unwrap();
    exec.terminate().unwrap();

    assert!(account.members().contains(&member(4)));
    assert!(!account.members().contains(&member(2)));
    assert_eq!(account.thresholds().global(), 4);
}

#[test]
fn unreachable_config_rules_fail_at_creation() {
    let mut account = base_account();

    // Total new weight is 4; a global threshold of 5 can never be met.
    let mut new_members = MemberRegistry::new();
    new_members
        .add([(member(1), Member::new(2)), (member(2), Member::new(2))])
        .unwrap();
    let new_thresholds = Thresholds::try_new(5).unwrap();

    let auth = account.authenticate(member(1), None).unwrap();
    let err = config::propose_config_rules(
        &mut account,
        auth,
        "bad-rules",
        "",
        0,
        100,
        new_members,
        new_thresholds,
    )
    .unwrap_err();
    assert_eq!(
        err,
        AccountError::Threshold(ThresholdError::TooHigh {
            threshold: 5,
            available: 4,
            role: None,
        })
    );
    // Nothing was admitted, so there is nothing to approve.
    assert!(!account.has_proposal("bad-rules"));
}

#[test]
fn live_weight_recompute_at_execution() {
    let mut account = base_account();
    let clock = ManualClock::new(0, 0);

    // P approved by A (2) and B (1): enough under the current registry.
    propose_note(&mut account, member(1), "p-live", 0);
    account.approve_proposal(member(1), "p-live").unwrap();
    account.approve_proposal(member(2), "p-live").unwrap();

    // A committee rotation demotes A to weight 1 before execution.
    let mut new_members = MemberRegistry::new();
    new_members
        .add([
            (member(1), Member::new(1)),
            (member(2), Member::new(1)),
            (member(3), Member::new(1)),
        ])
        .unwrap();
    let auth = account.authenticate(member(1), None).unwrap();
    config::propose_config_rules(
        &mut account,
        auth,
        "demote",
        "",
        0,
        100,
        new_members,
        Thresholds::try_new(3).unwrap(),
    )
    .unwrap();
    account.approve_proposal(member(1), "demote").unwrap();
    account.approve_proposal(member(2), "demote").unwrap();
    let mut exec = account
        .execute_proposal::<config::ConfigFamily>(member(1), "demote", &clock)
        .unwrap();
    config::execute_config_rules(&mut account, &mut exec).unwrap();
    config::complete_config_rules(&mut exec).unwrap();
    exec.terminate().unwrap();

    // Approval weight is recomputed from the live registry: A+B now sum
    // to 2, short of the threshold that still reads 3.
    let err = account
        .execute_proposal::<NotesFamily>(member(1), "p-live", &clock)
        .unwrap_err();
    assert_eq!(
        err,
        AccountError::Threshold(ThresholdError::NotReached {
            have: 2,
            required: 3
        })
    );

    // C's approval restores the quorum.
    account.approve_proposal(member(3), "p-live").unwrap();
    drive_note(&mut account, member(1), "p-live", &clock);
}

#[test]
fn config_deps_opt_in_and_migration() {
    let mut account = base_account();
    let clock = ManualClock::new(0, 0);

    let pkg = PackageId::new(Buf32::fill(0x77));
    let mut extensions = Extensions::new();
    extensions.allow("accord-proto-treasury", pkg, 1);
    extensions.allow("accord-proto-treasury", pkg, 2);

    // Opt in at v1.
    let auth = account.authenticate(member(1), None).unwrap();
    config::propose_config_deps(
        &mut account,
        auth,
        "deps-v1",
        "",
        0,
        100,
        &extensions,
        vec![("accord-proto-treasury".to_owned(), pkg, 1)],
    )
    .unwrap();
    account.approve_proposal(member(1), "deps-v1").unwrap();
    account.approve_proposal(member(2), "deps-v1").unwrap();
    let mut exec = account
        .execute_proposal::<config::ConfigFamily>(member(1), "deps-v1", &clock)
        .unwrap();
    config::execute_config_deps(&mut account, &mut exec).unwrap();
    config::complete_config_deps(&mut exec).unwrap();
    exec.terminate().unwrap();

    assert_eq!(
        account.deps().get("accord-proto-treasury").unwrap().version(),
        1
    );

    // Still at v1 until the account explicitly migrates.
    let auth = account.authenticate(member(1), None).unwrap();
    config::propose_config_deps(
        &mut account,
        auth,
        "deps-v2",
        "",
        0,
        100,
        &extensions,
        vec![("accord-proto-treasury".to_owned(), pkg, 2)],
    )
    .unwrap();
    account.approve_proposal(member(1), "deps-v2").unwrap();
    account.approve_proposal(member(2), "deps-v2").unwrap();
    let mut exec = account
        .execute_proposal::<config::ConfigFamily>(member(1), "deps-v2", &clock)
        .unwrap();
    config::execute_config_deps(&mut account, &mut exec).unwrap();
    config::complete_config_deps(&mut exec).unwrap();
    exec.terminate().unwrap();

    assert_eq!(
        account.deps().get("accord-proto-treasury").unwrap().version(),
        2
    );
    // Core entries survive every replacement.
    assert!(account.deps().get("accord-account").unwrap().is_core());
}

#[test]
fn unlisted_dep_rejected_at_creation() {
    let mut account = base_account();
    let extensions = Extensions::new();

    let auth = account.authenticate(member(1), None).unwrap();
    let err = config::propose_config_deps(
        &mut account,
        auth,
        "deps-bad",
        "",
        0,
        100,
        &extensions,
        vec![(
            "rogue".to_owned(),
            PackageId::new(Buf32::fill(0x66)),
            1,
        )],
    )
    .unwrap_err();
    assert!(matches!(err, AccountError::Deps(_)));
    assert!(!account.has_proposal("deps-bad"));
}

#[test]
fn zero_global_threshold_rejected_at_genesis() {
    let mut params = base_params();
    params.global_threshold = 0;
    let err = Account::new(addr(), &params, &Extensions::new()).unwrap_err();
    assert_eq!(err, AccountError::Threshold(ThresholdError::Null));
}

#[test]
fn genesis_weight_must_cover_global_threshold() {
    let mut params = base_params();
    params.global_threshold = 5;
    let err = Account::new(addr(), &params, &Extensions::new()).unwrap_err();
    assert_eq!(
        err,
        AccountError::Threshold(ThresholdError::TooHigh {
            threshold: 5,
            available: 4,
            role: None,
        })
    );
}

#[test]
fn genesis_duplicate_member_rejected() {
    let mut params = base_params();
    params.members.push(MemberParams {
        key: member(1),
        weight: 1,
        roles: vec![],
    });
    let err = Account::new(addr(), &params, &Extensions::new()).unwrap_err();
    assert_eq!(
        err,
        AccountError::Policy(PolicyError::AlreadyMember(member(1)))
    );
}

#[test]
fn approval_order_is_irrelevant() {
    let mut rng = rand::thread_rng();
    for _ in 0..8 {
        let mut account = base_account();
        let clock = ManualClock::new(0, 0);
        propose_note(&mut account, member(1), "shuffled", 0);

        let mut approvers = vec![member(1), member(2), member(3)];
        approvers.shuffle(&mut rng);
        for m in approvers {
            account.approve_proposal(m, "shuffled").unwrap();
        }
        drive_note(&mut account, member(1), "shuffled", &clock);
    }
}

proptest! {
    /// Quorum monotonicity: execution succeeds iff the live approver
    /// weight sum reaches the global threshold.
    #[test]
    fn prop_quorum_monotonicity(
        weights in proptest::collection::vec(1u64..20, 1..6),
        threshold in 1u64..40,
        approve_mask in proptest::collection::vec(any::<bool>(), 6),
    ) {
        let total: u64 = weights.iter().sum();
        prop_assume!(total >= threshold);

        let params = AccountParams {
            members: weights
                .iter()
                .enumerate()
                .map(|(i, w)| MemberParams {
                    key: member(i as u8 + 1),
                    weight: *w,
                    roles: vec![],
                })
                .collect(),
            global_threshold: threshold,
            role_thresholds: BTreeMap::new(),
            core_packages: vec![protocol_package()],
            extension_deps: vec![],
        };
        let mut account = Account::new(addr(), &params, &Extensions::new()).unwrap();
        let clock = ManualClock::new(0, 0);
        propose_note(&mut account, member(1), "q", 0);

        let mut approved = 0u64;
        for (i, w) in weights.iter().enumerate() {
            if approve_mask[i] {
                account.approve_proposal(member(i as u8 + 1), "q").unwrap();
                approved += w;
            }
        }

        let result = account.execute_proposal::<NotesFamily>(member(1), "q", &clock);
        if approved >= threshold {
            let mut exec = result.unwrap();
            let note = exec.current::<NotesFamily, NoteAction>().unwrap();
            note.applied = true;
            exec.advance::<NotesFamily>().unwrap();
            exec.cleanup::<NotesFamily, NoteAction>().unwrap();
            exec.terminate().unwrap();
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                AccountError::Threshold(ThresholdError::NotReached {
                    have: approved,
                    required: threshold,
                })
            );
        }
    }
}

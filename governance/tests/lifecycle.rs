//! Scenario tests exercising the full proposal lifecycle:
//! configuration → creation → voting → window close → execution.
//!
//! Balances and heights come from the nullable collaborators so that tests can
//! move tokens and advance the chain between calls.

use std::sync::Arc;

use daocore_governance::{
    GovernanceConfig, GovernanceEngine, GovernanceError, GovernanceStore, ProposalRequest,
    ProposalStatus, ProposalType,
};
use daocore_nullables::{NullBalances, NullClock};
use daocore_types::{BlockHeight, HeightClock, Principal, ProposalId, TokenAmount};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ADMIN: &str = "ST1TEST";
const EXECUTOR: &str = "ST2EXEC";

struct Harness {
    engine: GovernanceEngine<Arc<NullBalances>>,
    balances: Arc<NullBalances>,
    clock: NullClock,
}

impl Harness {
    fn new() -> Self {
        let balances = Arc::new(NullBalances::new().with_balance(ADMIN, 1000));
        let engine =
            GovernanceEngine::new(GovernanceConfig::new(ADMIN), Arc::clone(&balances)).unwrap();
        Self {
            engine,
            balances,
            clock: NullClock::new(0),
        }
    }

    fn admin(&self) -> Principal {
        Principal::from(ADMIN)
    }

    fn create(&mut self, title: &str) -> Result<ProposalId, GovernanceError> {
        let caller = self.admin();
        self.create_as(&caller, ProposalRequest::new(title, "Test proposal", "rule-change"))
    }

    fn create_as(
        &mut self,
        caller: &Principal,
        request: ProposalRequest,
    ) -> Result<ProposalId, GovernanceError> {
        self.engine.create_proposal(caller, request, self.clock.current_height())
    }

    fn vote(&mut self, who: &str, id: ProposalId, choice: bool) -> Result<(), GovernanceError> {
        self.engine
            .vote_on_proposal(&Principal::from(who), id, choice, self.clock.current_height())
    }

    fn execute(&mut self, id: ProposalId) -> Result<(), GovernanceError> {
        self.engine.execute_proposal(id, self.clock.current_height())
    }

    fn set_executor(&mut self) {
        let admin = self.admin();
        self.engine
            .set_executor(&admin, Principal::from(EXECUTOR))
            .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[test]
fn creates_proposal_with_all_fields() {
    let mut h = Harness::new();
    let admin = h.admin();
    let id = h
        .create_as(
            &admin,
            ProposalRequest::new("Protect Zone A", "Increase no-take area", "rule-change")
                .with_rule_change("Update fishing limits")
                .with_zone("Zone A"),
        )
        .unwrap();
    assert_eq!(id, ProposalId::new(0));

    let p = h.engine.proposal(id).unwrap();
    assert_eq!(p.title, "Protect Zone A");
    assert_eq!(p.description, "Increase no-take area");
    assert_eq!(p.proposal_type, ProposalType::RuleChange);
    assert_eq!(p.rule_change.as_deref(), Some("Update fishing limits"));
    assert_eq!(p.reward_amount, None);
    assert_eq!(p.zone.as_deref(), Some("Zone A"));
    assert_eq!(p.yes_votes, TokenAmount::ZERO);
    assert_eq!(p.no_votes, TokenAmount::ZERO);
    assert!(!p.executed);
    assert_eq!(p.status, ProposalStatus::Active);
}

#[test]
fn rejects_duplicate_titles_forever() {
    let mut h = Harness::new();
    h.set_executor();
    let id = h.create("Protect Zone A").unwrap();
    let admin = h.admin();
    let err = h
        .create_as(
            &admin,
            ProposalRequest::new("Protect Zone A", "Different description", "zone-update")
                .with_reward_amount(100u128)
                .with_zone("Zone B"),
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::ProposalAlreadyExists(_)));
    assert_eq!(err.code(), 101);

    // Still taken after the original is executed.
    h.vote(ADMIN, id, true).unwrap();
    h.clock.set(145);
    h.execute(id).unwrap();
    assert!(h.engine.proposal_exists("Protect Zone A"));
    assert!(matches!(
        h.create("Protect Zone A"),
        Err(GovernanceError::ProposalAlreadyExists(_))
    ));
}

#[test]
fn rejects_creation_without_tokens() {
    let mut h = Harness::new();
    h.balances.set_balance(ADMIN, 0);
    assert_eq!(
        h.create("No Tokens"),
        Err(GovernanceError::NotTokenHolder(ADMIN.into()))
    );
    assert_eq!(h.engine.proposal_count(), 0);
}

#[test]
fn rejects_invalid_type_and_empty_title() {
    let mut h = Harness::new();
    let admin = h.admin();
    let err = h
        .create_as(&admin, ProposalRequest::new("InvalidType", "Desc", "invalid"))
        .unwrap_err();
    assert_eq!(err.code(), 108);
    let err = h
        .create_as(&admin, ProposalRequest::new("", "Desc", "rule-change"))
        .unwrap_err();
    assert_eq!(err.code(), 109);
}

#[test]
fn rejects_when_max_proposals_reached() {
    let mut config = GovernanceConfig::new(ADMIN);
    config.max_proposals = 1;
    let balances = Arc::new(NullBalances::new().with_balance(ADMIN, 1000));
    let mut engine = GovernanceEngine::new(config, balances).unwrap();
    let admin = Principal::from(ADMIN);
    let now = BlockHeight::GENESIS;
    engine
        .create_proposal(&admin, ProposalRequest::new("Max1", "Desc1", "rule-change"), now)
        .unwrap();
    assert_eq!(
        engine.create_proposal(&admin, ProposalRequest::new("Max2", "Desc2", "rule-change"), now),
        Err(GovernanceError::MaxProposalsExceeded(1))
    );
    assert_eq!(engine.proposal_count(), 1);
}

#[test]
fn counts_and_finds_proposals() {
    let mut h = Harness::new();
    h.create("Count1").unwrap();
    let admin = h.admin();
    h.create_as(&admin, ProposalRequest::new("Count2", "Desc2", "zone-update"))
        .unwrap();
    assert_eq!(h.engine.proposal_count(), 2);
    assert!(h.engine.proposal_exists("Count1"));
    assert!(!h.engine.proposal_exists("NonExists"));
    assert_eq!(h.engine.proposal_id_by_title("Count2"), Some(ProposalId::new(1)));
}

// ---------------------------------------------------------------------------
// Voting
// ---------------------------------------------------------------------------

#[test]
fn yes_vote_adds_full_balance() {
    let mut h = Harness::new();
    let id = h.create("Vote Test").unwrap();
    h.vote(ADMIN, id, true).unwrap();
    assert_eq!(h.engine.proposal(id).unwrap().yes_votes, TokenAmount::new(1000));
}

#[test]
fn rejects_double_voting_and_keeps_first_choice() {
    let mut h = Harness::new();
    let id = h.create("Double Vote").unwrap();
    h.vote(ADMIN, id, true).unwrap();
    let err = h.vote(ADMIN, id, false).unwrap_err();
    assert_eq!(err.code(), 104);
    let p = h.engine.proposal(id).unwrap();
    assert_eq!(p.yes_votes, TokenAmount::new(1000));
    assert_eq!(p.no_votes, TokenAmount::ZERO);
    assert_eq!(h.engine.vote_of(id, &ADMIN.into()), Some(true));
}

#[test]
fn later_balance_changes_do_not_touch_tally() {
    let mut h = Harness::new();
    let id = h.create("Snapshot Weight").unwrap();
    h.vote(ADMIN, id, true).unwrap();
    h.balances.set_balance(ADMIN, 1);
    assert_eq!(h.engine.proposal(id).unwrap().yes_votes, TokenAmount::new(1000));
}

#[test]
fn voting_window_is_inclusive_of_end_height() {
    let mut h = Harness::new();
    h.balances.set_balance("ST2", 10);
    let id = h.create("Window").unwrap();
    h.clock.set(144);
    h.vote(ADMIN, id, true).unwrap();
    h.clock.set(145);
    assert_eq!(h.vote("ST2", id, true), Err(GovernanceError::VotingClosed(id)));
}

#[test]
fn voting_closes_after_execution() {
    let mut h = Harness::new();
    h.set_executor();
    h.balances.set_balance("ST2", 10);
    let id = h.create("Closed").unwrap();
    h.clock.set(145);
    h.execute(id).unwrap();
    assert_eq!(h.vote("ST2", id, true), Err(GovernanceError::VotingClosed(id)));
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[test]
fn full_scenario_executes() {
    let mut h = Harness::new();
    let id = h.create("Execute Test").unwrap();
    assert_eq!(h.engine.proposal(id).unwrap().end_height, BlockHeight::new(144));
    h.vote(ADMIN, id, true).unwrap();
    assert_eq!(h.engine.proposal(id).unwrap().yes_votes, TokenAmount::new(1000));

    h.clock.advance(145).unwrap();
    h.set_executor();
    h.execute(id).unwrap();

    let p = h.engine.proposal(id).unwrap();
    assert!(p.executed);
    assert_eq!(p.status, ProposalStatus::Executed);
}

#[test]
fn execution_window_starts_after_end_height() {
    let mut h = Harness::new();
    h.set_executor();
    let id = h.create("Early Execute").unwrap();
    h.vote(ADMIN, id, true).unwrap();
    h.clock.set(100);
    assert_eq!(h.execute(id), Err(GovernanceError::VotingClosed(id)));
    h.clock.set(144);
    assert_eq!(h.execute(id), Err(GovernanceError::VotingClosed(id)));
    h.clock.set(145);
    h.execute(id).unwrap();
}

#[test]
fn rejects_execution_without_quorum() {
    let mut h = Harness::new();
    h.set_executor();
    let id = h.create("No Quorum").unwrap();
    h.balances.set_balance(ADMIN, 500);
    h.vote(ADMIN, id, false).unwrap();
    h.clock.set(145);
    let err = h.execute(id).unwrap_err();
    assert_eq!(err.code(), 105);
    assert!(!h.engine.proposal(id).unwrap().executed);
}

#[test]
fn quorum_boundary_at_51_percent() {
    for (yes, expect_ok) in [(510u128, true), (509u128, false)] {
        let mut h = Harness::new();
        h.set_executor();
        h.balances.set_balance("STYES", yes);
        h.balances.set_balance("STNO", 1000 - yes);
        let id = h.create("Boundary").unwrap();
        h.vote("STYES", id, true).unwrap();
        h.vote("STNO", id, false).unwrap();
        h.clock.set(145);
        let result = h.execute(id);
        if expect_ok {
            assert_eq!(result, Ok(()), "yes = {yes}");
        } else {
            assert_eq!(
                result,
                Err(GovernanceError::QuorumNotReached {
                    yes: TokenAmount::new(yes),
                    required: TokenAmount::new(510),
                }),
                "yes = {yes}"
            );
        }
    }
}

#[test]
fn rejects_execution_without_executor() {
    let mut h = Harness::new();
    let id = h.create("No Executor").unwrap();
    h.vote(ADMIN, id, true).unwrap();
    h.clock.set(145);
    assert_eq!(h.execute(id), Err(GovernanceError::AuthorityNotSet));
}

#[test]
fn second_execution_fails_and_changes_nothing() {
    let mut h = Harness::new();
    h.set_executor();
    let id = h.create("Once").unwrap();
    h.vote(ADMIN, id, true).unwrap();
    h.clock.set(145);
    h.execute(id).unwrap();
    let before = h.engine.store().clone();
    assert_eq!(h.execute(id), Err(GovernanceError::ProposalExecuted(id)));
    assert_eq!(h.engine.store(), &before);
}

#[test]
fn missing_proposal_is_reported() {
    let mut h = Harness::new();
    let missing = ProposalId::new(42);
    assert_eq!(h.execute(missing), Err(GovernanceError::ProposalNotFound(missing)));
    assert_eq!(h.vote(ADMIN, missing, true), Err(GovernanceError::ProposalNotFound(missing)));
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[test]
fn proposal_duration_changes_apply_to_new_proposals() {
    let mut h = Harness::new();
    let admin = h.admin();
    let first = h.create("Before").unwrap();
    assert_eq!(
        h.engine.set_proposal_duration(&admin, 0),
        Err(GovernanceError::InvalidProposalDuration(0))
    );
    assert_eq!(
        h.engine.set_proposal_duration(&admin, 10_081),
        Err(GovernanceError::InvalidProposalDuration(10_081))
    );
    h.engine.set_proposal_duration(&admin, 288).unwrap();
    assert_eq!(h.engine.config().proposal_duration, 288);

    h.clock.set(10);
    let second = h.create("After").unwrap();
    assert_eq!(h.engine.proposal(first).unwrap().end_height, BlockHeight::new(144));
    assert_eq!(h.engine.proposal(second).unwrap().end_height, BlockHeight::new(298));
}

#[test]
fn quorum_threshold_applies_at_execution_time() {
    let mut h = Harness::new();
    h.set_executor();
    h.balances.set_balance("STNO", 1000);
    let id = h.create("Retro").unwrap();
    h.vote(ADMIN, id, true).unwrap();
    h.vote("STNO", id, false).unwrap();
    h.clock.set(145);
    // 1000 of 2000 is below 51%.
    assert!(matches!(h.execute(id), Err(GovernanceError::QuorumNotReached { .. })));
    let admin = h.admin();
    h.engine.set_quorum_threshold(&admin, 50).unwrap();
    h.execute(id).unwrap();
}

#[test]
fn non_admin_cannot_configure() {
    let mut h = Harness::new();
    let intruder = Principal::from("ST3EVIL");
    let before = h.engine.store().clone();
    assert_eq!(
        h.engine.set_quorum_threshold(&intruder, 60),
        Err(GovernanceError::NotAuthorized(intruder.clone()))
    );
    assert_eq!(
        h.engine.set_executor(&intruder, intruder.clone()),
        Err(GovernanceError::NotAuthorized(intruder.clone()))
    );
    assert_eq!(h.engine.store(), &before);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn engine_resumes_from_snapshot() {
    let mut h = Harness::new();
    let id = h.create("Persist").unwrap();
    h.vote(ADMIN, id, true).unwrap();

    let bytes = h.engine.store().to_snapshot().unwrap();
    let store = GovernanceStore::from_snapshot(&bytes).unwrap();
    let mut resumed = GovernanceEngine::from_store(store, Arc::clone(&h.balances));

    assert_eq!(resumed.proposal_count(), 1);
    assert!(matches!(
        resumed.vote_on_proposal(&ADMIN.into(), id, false, BlockHeight::new(1)),
        Err(GovernanceError::AlreadyVoted { .. })
    ));
    assert_eq!(
        resumed
            .create_proposal(
                &ADMIN.into(),
                ProposalRequest::new("Next", "desc", "reward-dist"),
                BlockHeight::new(2),
            )
            .unwrap(),
        ProposalId::new(1)
    );
}

#[test]
fn proposals_near_max_height_survive_a_snapshot() {
    let mut h = Harness::new();
    h.clock.set(u64::MAX);
    assert_eq!(h.create("Too Late"), Err(GovernanceError::InvalidTimestamp));
    assert!(!h.engine.proposal_exists("Too Late"));

    h.clock.set(u64::MAX - 144);
    let id = h.create("Just In Time").unwrap();
    let bytes = h.engine.store().to_snapshot().unwrap();
    let restored = GovernanceStore::from_snapshot(&bytes).unwrap();
    let proposal = restored.proposal(id).unwrap();
    assert_eq!(proposal.end_height, BlockHeight::new(u64::MAX));
    assert!(proposal.end_height > proposal.start_height);
}

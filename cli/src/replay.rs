//! Deterministic replay of governance scripts.
//!
//! A script is a JSON document with initial balances and a list of steps. Steps
//! run in order against a fresh engine backed by the nullable clock and balance
//! table; each produces one [`StepOutcome`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use daocore_governance::{
    GovernanceConfig, GovernanceEngine, GovernanceError, Proposal, ProposalRequest, Tally,
};
use daocore_nullables::{NullBalances, NullClock};
use daocore_types::{BlockHeight, HeightClock, Principal, ProposalId, TokenAmount};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A replayable sequence of governance operations.
#[derive(Debug, Deserialize)]
pub struct Script {
    /// Starting height of the chain.
    #[serde(default)]
    pub start_height: u64,
    /// Initial token balances.
    #[serde(default)]
    pub balances: BTreeMap<String, ScriptAmount>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// One operation in a script.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    SetBalance {
        holder: String,
        amount: ScriptAmount,
    },
    Advance {
        blocks: u64,
    },
    SetHeight {
        height: u64,
    },
    SetExecutor {
        caller: String,
        executor: String,
    },
    SetProposalDuration {
        caller: String,
        blocks: u64,
    },
    SetQuorumThreshold {
        caller: String,
        percent: u32,
    },
    CreateProposal {
        caller: String,
        title: String,
        description: String,
        proposal_type: String,
        #[serde(default)]
        rule_change: Option<String>,
        #[serde(default)]
        reward_amount: Option<ScriptAmount>,
        #[serde(default)]
        zone: Option<String>,
    },
    Vote {
        caller: String,
        id: u64,
        choice: bool,
    },
    Execute {
        id: u64,
    },
    Count,
    Exists {
        title: String,
    },
    Show {
        id: u64,
    },
    Tally {
        id: u64,
    },
}

/// A token amount in a script: a JSON integer, or a decimal string for values
/// above `u64::MAX` (JSON numbers that large do not survive the tagged-step
/// buffering).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptAmount(pub TokenAmount);

impl<'de> Deserialize<'de> for ScriptAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = ScriptAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ScriptAmount(TokenAmount::new(u128::from(v))))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
                Ok(ScriptAmount(TokenAmount::new(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse::<u128>()
                    .map(|raw| ScriptAmount(TokenAmount::new(raw)))
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetBalance { .. } => "set-balance",
            Self::Advance { .. } => "advance",
            Self::SetHeight { .. } => "set-height",
            Self::SetExecutor { .. } => "set-executor",
            Self::SetProposalDuration { .. } => "set-proposal-duration",
            Self::SetQuorumThreshold { .. } => "set-quorum-threshold",
            Self::CreateProposal { .. } => "create-proposal",
            Self::Vote { .. } => "vote",
            Self::Execute { .. } => "execute",
            Self::Count => "count",
            Self::Exists { .. } => "exists",
            Self::Show { .. } => "show",
            Self::Tally { .. } => "tally",
        }
    }
}

/// What a successful step returned.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StepValue {
    Ack(bool),
    Height(BlockHeight),
    Id(ProposalId),
    Count(u64),
    Proposal(Box<Proposal>),
    Tally(Tally),
}

#[derive(Debug, Serialize)]
pub struct StepError {
    pub code: u32,
    pub kind: &'static str,
    pub message: String,
}

impl From<GovernanceError> for StepError {
    fn from(err: GovernanceError) -> Self {
        Self {
            code: err.code(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of a single step, printed as one JSON line.
#[derive(Debug, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub op: &'static str,
    pub height: BlockHeight,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<StepValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl StepOutcome {
    fn new(
        step: usize,
        op: &'static str,
        height: BlockHeight,
        result: Result<StepValue, GovernanceError>,
    ) -> Self {
        match result {
            Ok(value) => Self {
                step,
                op,
                height,
                ok: true,
                value: Some(value),
                error: None,
            },
            Err(err) => Self {
                step,
                op,
                height,
                ok: false,
                value: None,
                error: Some(err.into()),
            },
        }
    }
}

/// Runs scripts against a fresh in-memory engine.
pub struct Replayer {
    engine: GovernanceEngine<Arc<NullBalances>>,
    balances: Arc<NullBalances>,
    clock: NullClock,
}

impl Replayer {
    pub fn new(config: GovernanceConfig, script: &Script) -> Result<Self, GovernanceError> {
        let balances = Arc::new(NullBalances::new());
        for (holder, ScriptAmount(amount)) in &script.balances {
            balances.set_balance(holder.as_str(), amount.raw());
        }
        let engine = GovernanceEngine::new(config, Arc::clone(&balances))?;
        Ok(Self {
            engine,
            balances,
            clock: NullClock::new(script.start_height),
        })
    }

    pub fn engine(&self) -> &GovernanceEngine<Arc<NullBalances>> {
        &self.engine
    }

    /// Run every step in order. Failed steps are reported, not fatal.
    pub fn run(&mut self, steps: Vec<Step>) -> Vec<StepOutcome> {
        steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| {
                let op = step.name();
                let result = self.apply(step);
                let outcome = StepOutcome::new(index, op, self.clock.current_height(), result);
                tracing::debug!(step = index, op, ok = outcome.ok, "step replayed");
                outcome
            })
            .collect()
    }

    fn apply(&mut self, step: Step) -> Result<StepValue, GovernanceError> {
        let now = self.clock.current_height();
        let engine = &mut self.engine;
        match step {
            Step::SetBalance { holder, amount } => {
                self.balances.set_balance(holder, amount.0.raw());
                Ok(StepValue::Ack(true))
            }
            Step::Advance { blocks } => self
                .clock
                .advance(blocks)
                .map(StepValue::Height)
                .ok_or(GovernanceError::InvalidTimestamp),
            Step::SetHeight { height } => {
                self.clock.set(height);
                Ok(StepValue::Height(self.clock.current_height()))
            }
            Step::SetExecutor { caller, executor } => engine
                .set_executor(&Principal::new(caller), Principal::new(executor))
                .map(|()| StepValue::Ack(true)),
            Step::SetProposalDuration { caller, blocks } => engine
                .set_proposal_duration(&Principal::new(caller), blocks)
                .map(|()| StepValue::Ack(true)),
            Step::SetQuorumThreshold { caller, percent } => engine
                .set_quorum_threshold(&Principal::new(caller), percent)
                .map(|()| StepValue::Ack(true)),
            Step::CreateProposal {
                caller,
                title,
                description,
                proposal_type,
                rule_change,
                reward_amount,
                zone,
            } => {
                let request = ProposalRequest {
                    title,
                    description,
                    proposal_type,
                    rule_change,
                    reward_amount: reward_amount.map(|ScriptAmount(amount)| amount),
                    zone,
                };
                engine
                    .create_proposal(&Principal::new(caller), request, now)
                    .map(StepValue::Id)
            }
            Step::Vote { caller, id, choice } => engine
                .vote_on_proposal(&Principal::new(caller), ProposalId::new(id), choice, now)
                .map(|()| StepValue::Ack(true)),
            Step::Execute { id } => engine
                .execute_proposal(ProposalId::new(id), now)
                .map(|()| StepValue::Ack(true)),
            Step::Count => Ok(StepValue::Count(engine.proposal_count())),
            Step::Exists { title } => Ok(StepValue::Ack(engine.proposal_exists(&title))),
            Step::Show { id } => {
                let id = ProposalId::new(id);
                engine
                    .proposal(id)
                    .map(|p| StepValue::Proposal(Box::new(p.clone())))
                    .ok_or(GovernanceError::ProposalNotFound(id))
            }
            Step::Tally { id } => engine.tally(ProposalId::new(id), now).map(StepValue::Tally),
        }
    }
}

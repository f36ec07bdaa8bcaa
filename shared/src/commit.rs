use std::collections::HashMap;

use serde::Serialize;
use tendermint::account::Id as AccountId;
use tendermint::block::{Commit, CommitSig};
use tendermint::validator::Info as ValidatorInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureFlag {
    Commit,
    Nil,
    Absent,
}

pub fn signature_entry(
    signature: &CommitSig,
) -> (SignatureFlag, Option<AccountId>) {
    match signature {
        CommitSig::BlockIdFlagAbsent => (SignatureFlag::Absent, None),
        CommitSig::BlockIdFlagCommit {
            validator_address, ..
        } => (SignatureFlag::Commit, Some(*validator_address)),
        CommitSig::BlockIdFlagNil {
            validator_address, ..
        } => (SignatureFlag::Nil, Some(*validator_address)),
    }
}

/// How much of a validator set took part in a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Participation {
    pub signed: usize,
    pub nil: usize,
    pub absent: usize,
    /// Commit signatures from addresses outside the validator set.
    pub unknown_signers: usize,
    pub signed_power: u64,
    pub total_power: u64,
}

impl Participation {
    pub fn tally<I>(
        signatures: I,
        voting_powers: &HashMap<AccountId, u64>,
    ) -> Self
    where
        I: IntoIterator<Item = (SignatureFlag, Option<AccountId>)>,
    {
        let mut participation = Self {
            total_power: voting_powers.values().sum(),
            ..Self::default()
        };

        for (flag, address) in signatures {
            match flag {
                SignatureFlag::Commit => {
                    participation.signed += 1;
                    match address.and_then(|id| voting_powers.get(&id)) {
                        Some(power) => participation.signed_power += power,
                        None => participation.unknown_signers += 1,
                    }
                }
                SignatureFlag::Nil => participation.nil += 1,
                SignatureFlag::Absent => participation.absent += 1,
            }
        }

        participation
    }

    pub fn from_commit(commit: &Commit, validators: &[ValidatorInfo]) -> Self {
        let voting_powers = validators
            .iter()
            .map(|validator| (validator.address, validator.power.value()))
            .collect();

        Self::tally(commit.signatures.iter().map(signature_entry), &voting_powers)
    }

    pub fn signed_ratio(&self) -> f64 {
        if self.total_power == 0 {
            return 0.0;
        }
        self.signed_power as f64 / self.total_power as f64
    }

    /// More than two thirds of the voting power signed for the block.
    pub fn has_quorum(&self) -> bool {
        u128::from(self.signed_power) * 3 > u128::from(self.total_power) * 2
    }
}

//! Keyed entity stores.
//!
//! Each store is a `BTreeMap` repository (deterministic iteration order
//! matters for replay and serialization) exposing `get`, `insert`, and a
//! scoped `with` helper: read the entity, apply a caller-supplied mutation,
//! and validate the result before the borrow ends. The asset store's
//! checked path additionally verifies the caller's expected kind tag
//! against the stored record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::asset::{Asset, AssetTag, StreetData};
use super::loan::Loan;
use super::player::Player;
use super::{LoanId, PlayerId, PropertyId, StateError};

/// Repository of player records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStore {
    players: BTreeMap<PlayerId, Player>,
}

impl PlayerStore {
    pub fn insert(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn get(&self, id: PlayerId) -> Result<&Player, StateError> {
        self.players.get(&id).ok_or(StateError::UnknownPlayer(id))
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    /// The sanctioned mutation path: applies `f` to the stored record and
    /// verifies the cash invariant before returning.
    pub fn with<R, F>(&mut self, id: PlayerId, f: F) -> Result<R, StateError>
    where
        F: FnOnce(&mut Player) -> Result<R, StateError>,
    {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(StateError::UnknownPlayer(id))?;
        let out = f(player)?;
        let cash = player.cash();
        if !cash.is_finite() {
            return Err(StateError::NonFiniteCash { player: id, value: cash });
        }
        Ok(out)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.keys().copied()
    }
}

/// Repository of loan records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanStore {
    loans: BTreeMap<LoanId, Loan>,
}

impl LoanStore {
    /// Registers a new loan; the id must be fresh.
    pub fn insert(&mut self, loan: Loan) -> Result<(), StateError> {
        if self.loans.contains_key(&loan.id) {
            return Err(StateError::DuplicateLoan(loan.id));
        }
        self.loans.insert(loan.id, loan);
        Ok(())
    }

    pub fn get(&self, id: LoanId) -> Result<&Loan, StateError> {
        self.loans.get(&id).ok_or(StateError::UnknownLoan(id))
    }

    pub fn with<R, F>(&mut self, id: LoanId, f: F) -> Result<R, StateError>
    where
        F: FnOnce(&mut Loan) -> Result<R, StateError>,
    {
        let loan = self.loans.get_mut(&id).ok_or(StateError::UnknownLoan(id))?;
        f(loan)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    /// A fresh id one past the highest registered.
    pub fn next_id(&self) -> LoanId {
        LoanId(
            self.loans
                .keys()
                .next_back()
                .map(|id| id.0 + 1)
                .unwrap_or(0),
        )
    }
}

/// Repository of asset records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetStore {
    assets: BTreeMap<PropertyId, Asset>,
}

impl AssetStore {
    pub fn insert(&mut self, asset: Asset) {
        self.assets.insert(asset.id, asset);
    }

    pub fn get(&self, id: PropertyId) -> Result<&Asset, StateError> {
        self.assets.get(&id).ok_or(StateError::UnknownAsset(id))
    }

    pub fn with<R, F>(&mut self, id: PropertyId, f: F) -> Result<R, StateError>
    where
        F: FnOnce(&mut Asset) -> Result<R, StateError>,
    {
        let asset = self
            .assets
            .get_mut(&id)
            .ok_or(StateError::UnknownAsset(id))?;
        f(asset)
    }

    /// Mutation with an update-time kind check: fails if the stored asset's
    /// tag does not match what the caller expects to be mutating.
    pub fn with_expected<R, F>(
        &mut self,
        id: PropertyId,
        expected: AssetTag,
        f: F,
    ) -> Result<R, StateError>
    where
        F: FnOnce(&mut Asset) -> Result<R, StateError>,
    {
        let asset = self
            .assets
            .get_mut(&id)
            .ok_or(StateError::UnknownAsset(id))?;
        let actual = asset.tag();
        if actual != expected {
            return Err(StateError::KindMismatch {
                property: id,
                expected,
                actual,
            });
        }
        f(asset)
    }

    /// Street mutation helper; kind-checked.
    pub fn with_street<R, F>(&mut self, id: PropertyId, f: F) -> Result<R, StateError>
    where
        F: FnOnce(&mut Asset, StreetData) -> Result<R, StateError>,
    {
        self.with_expected(id, AssetTag::Street, |asset| {
            let data = match &asset.kind {
                super::asset::AssetKind::Street(data) => data.clone(),
                _ => unreachable!("tag checked above"),
            };
            f(asset, data)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// The asset instantiated from the square at `position`, if any.
    pub fn at_position(&self, position: usize) -> Option<&Asset> {
        self.assets.values().find(|a| a.position == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::economy::CreditRating;

    #[test]
    fn with_player_checks_cash_after_mutation() {
        let mut store = PlayerStore::default();
        store.insert(Player::new(PlayerId(1), 100.0, 500.0, CreditRating::CCC));

        store
            .with(PlayerId(1), |p| p.add_cash(50.0))
            .unwrap();
        assert_eq!(store.get(PlayerId(1)).unwrap().cash(), 150.0);

        let err = store.with(PlayerId(2), |_| Ok(())).unwrap_err();
        assert_eq!(err, StateError::UnknownPlayer(PlayerId(2)));
    }

    #[test]
    fn asset_store_kind_check() {
        let board = Board::standard();
        let mut store = AssetStore::default();
        // Position 5 is a railroad.
        store.insert(Asset::from_square(PropertyId(0), 5, board.square(5)).unwrap());

        let err = store
            .with_expected(PropertyId(0), AssetTag::Street, |_| Ok(()))
            .unwrap_err();
        assert_eq!(
            err,
            StateError::KindMismatch {
                property: PropertyId(0),
                expected: AssetTag::Street,
                actual: AssetTag::Railroad,
            }
        );

        store
            .with_expected(PropertyId(0), AssetTag::Railroad, |asset| {
                asset.owner = PlayerId(3);
                Ok(())
            })
            .unwrap();
        assert_eq!(store.get(PropertyId(0)).unwrap().owner, PlayerId(3));
    }

    #[test]
    fn loan_store_rejects_duplicate_ids() {
        use super::super::loan::RateKind;
        let mut store = LoanStore::default();
        let loan = Loan::new(
            LoanId(7),
            PlayerId(1),
            PlayerId(2),
            100.0,
            0.05,
            RateKind::Fixed,
            10,
        )
        .unwrap();
        store.insert(loan.clone()).unwrap();
        assert_eq!(store.insert(loan), Err(StateError::DuplicateLoan(LoanId(7))));
        assert_eq!(store.next_id(), LoanId(8));
    }
}

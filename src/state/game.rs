//! The `GameState` aggregate and its serializable snapshot.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::board::{Board, ColorGroup, SquareKind};
use crate::economy::{self, CreditProfile, CreditRating};

use super::asset::{Asset, AssetKind};
use super::loan::Loan;
use super::player::Player;
use super::stores::{AssetStore, LoanStore, PlayerStore};
use super::{PlayerId, PropertyId, StateError};

/// Number of cards in each deck. Card effects are out of scope; decks
/// exist so draws rotate deterministically and replay identically.
const DECK_SIZE: u16 = 16;

/// Table rules, configurable per game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    pub starting_cash: f64,
    pub go_salary: f64,
    pub jail_fine: f64,
    /// Turns a player sits in jail before being released automatically.
    pub jail_duration: u64,
    pub starting_credit_limit: f64,
    pub default_lending_threshold: CreditRating,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            starting_cash: 1500.0,
            go_salary: 200.0,
            jail_fine: 50.0,
            jail_duration: 3,
            starting_credit_limit: 2000.0,
            default_lending_threshold: CreditRating::CCC,
        }
    }
}

/// The full canonical game state: the three entity stores, the board,
/// turn bookkeeping, and the pending card decks. Together with the event
/// log this is the unit of durability; every field changes only through
/// event application.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub rules: GameRules,
    pub players: PlayerStore,
    pub assets: AssetStore,
    pub loans: LoanStore,
    pub turn: u64,
    pub current_player_turn: usize,
    pub turn_order: Vec<PlayerId>,
    pub chance_deck: VecDeque<u16>,
    pub community_chest_deck: VecDeque<u16>,
}

impl GameState {
    /// Sets up a fresh game: `num_players` players (ids starting at 1, the
    /// bank is id 0 and holds no record), every ownable square instantiated
    /// as a bank-owned asset, decks in order.
    pub fn new(board: Board, num_players: u32, rules: GameRules) -> GameState {
        let mut players = PlayerStore::default();
        let mut turn_order = Vec::with_capacity(num_players as usize);
        for i in 1..=num_players {
            let id = PlayerId(i);
            players.insert(Player::new(
                id,
                rules.starting_cash,
                rules.starting_credit_limit,
                rules.default_lending_threshold,
            ));
            turn_order.push(id);
        }

        let mut assets = AssetStore::default();
        for (next_id, position) in board.ownable_positions().into_iter().enumerate() {
            let asset = Asset::from_square(
                PropertyId(next_id as u32),
                position,
                board.square(position),
            )
            .expect("ownable position yields an asset");
            assets.insert(asset);
        }

        GameState {
            board,
            rules,
            players,
            assets,
            loans: LoanStore::default(),
            turn: 0,
            current_player_turn: 0,
            turn_order,
            chance_deck: (0..DECK_SIZE).collect(),
            community_chest_deck: (0..DECK_SIZE).collect(),
        }
    }

    /// The player whose turn it currently is, if the index is in range.
    pub fn current_player(&self) -> Option<PlayerId> {
        self.turn_order.get(self.current_player_turn).copied()
    }

    /// True iff `owner` holds every street property of `color`.
    pub fn has_color_monopoly(&self, owner: PlayerId, color: ColorGroup) -> bool {
        if owner.is_bank() {
            return false;
        }
        let positions = self.board.properties_of_color(color);
        !positions.is_empty()
            && positions.iter().all(|&pos| {
                self.assets
                    .at_position(pos)
                    .map(|a| a.owner == owner)
                    .unwrap_or(false)
            })
    }

    /// Number of railroads held by `owner`.
    pub fn railroads_owned(&self, owner: PlayerId) -> usize {
        self.assets
            .iter()
            .filter(|a| a.owner == owner && matches!(a.kind, AssetKind::Railroad))
            .count()
    }

    /// Number of utilities held by `owner`.
    pub fn utilities_owned(&self, owner: PlayerId) -> usize {
        self.assets
            .iter()
            .filter(|a| a.owner == owner && matches!(a.kind, AssetKind::Utility))
            .count()
    }

    /// Recomputes a player's derived net worth: cash, plus real value of
    /// held assets, plus balances owed to them, minus balances they owe.
    /// The bank has no record and is skipped.
    pub fn recompute_net_worth(&mut self, id: PlayerId) -> Result<(), StateError> {
        if id.is_bank() {
            return Ok(());
        }
        let asset_value: f64 = self
            .assets
            .iter()
            .filter(|a| a.owner == id)
            .map(|a| a.real_value)
            .sum();
        let receivable: f64 = self
            .loans
            .iter()
            .filter(|l| l.creditor == id)
            .map(Loan::current_balance)
            .sum();
        let payable: f64 = self
            .loans
            .iter()
            .filter(|l| l.debtor == id)
            .map(Loan::current_balance)
            .sum();
        self.players.with(id, |p| {
            p.net_worth = p.cash() + asset_value + receivable - payable;
            Ok(())
        })
    }

    /// The scoring inputs for a player's credit review, derived entirely
    /// from current state so the review is replay-deterministic.
    pub fn credit_profile(&self, id: PlayerId) -> Result<CreditProfile, StateError> {
        let player = self.players.get(id)?;
        let total_debt: f64 = self
            .loans
            .iter()
            .filter(|l| l.debtor == id)
            .map(Loan::current_balance)
            .sum();
        let loan_expenses: f64 = self
            .loans
            .iter()
            .filter(|l| l.debtor == id && !l.is_settled())
            .map(|l| economy::nominal_payment(l.initial_principal, l.rate, l.term).unwrap_or(0.0))
            .sum();
        let loan_income: f64 = self
            .loans
            .iter()
            .filter(|l| l.creditor == id && !l.is_settled())
            .map(|l| economy::nominal_payment(l.initial_principal, l.rate, l.term).unwrap_or(0.0))
            .sum();
        let asset_value: f64 = self
            .assets
            .iter()
            .filter(|a| a.owner == id)
            .map(|a| a.real_value)
            .sum();
        Ok(CreditProfile {
            total_debt,
            loan_expenses_per_turn: loan_expenses,
            other_expenses_per_turn: 0.0,
            income_per_turn: self.rules.go_salary + loan_income,
            total_assets: player.cash().max(0.0) + asset_value,
        })
    }

    /// The tax amount at a position, if it is a tax square.
    pub fn tax_at(&self, position: usize) -> Option<f64> {
        match self.board.square(position).kind {
            SquareKind::Tax { amount } => Some(amount),
            _ => None,
        }
    }

    /// A serializable projection for external observers and replays.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn: self.turn,
            current_player_turn: self.current_player_turn,
            turn_order: self.turn_order.clone(),
            players: self.players.iter().map(|p| (p.id, p.clone())).collect(),
            assets: self.assets.iter().map(|a| (a.id, a.clone())).collect(),
            loans: self.loans.iter().map(|l| (l.id, l.clone())).collect(),
        }
    }
}

/// Serializable projection of the game state, keyed by entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: u64,
    pub current_player_turn: usize,
    pub turn_order: Vec<PlayerId>,
    pub players: BTreeMap<PlayerId, Player>,
    pub assets: BTreeMap<PropertyId, Asset>,
    pub loans: BTreeMap<super::LoanId, Loan>,
}

//! Integration tests for the economic flows: rent, improvements, loans,
//! and credit reviews, all driven through the event bus so the cash
//! movements under test are the ones real games produce.

use magnate::board::Board;
use magnate::economy::CreditRating;
use magnate::events::{EventBus, EventKind};
use magnate::state::{GameRules, GameState, Loan, LoanId, PlayerId, PropertyId, RateKind};

fn bus(players: u32) -> EventBus {
    EventBus::new(GameState::new(Board::standard(), players, GameRules::default()))
}

fn asset_at(bus: &EventBus, position: usize) -> PropertyId {
    bus.state().assets.at_position(position).unwrap().id
}

/// Hands a bank-owned asset to a player without payment.
fn grant(bus: &mut EventBus, position: usize, to: PlayerId) -> PropertyId {
    let property = asset_at(bus, position);
    bus.process(EventKind::PropertyTransfer {
        from: PlayerId::BANK,
        to,
        property,
        amount: 0.0,
    })
    .unwrap();
    property
}

fn land_on(bus: &mut EventBus, player: PlayerId, die1: u8, die2: u8) {
    bus.process(EventKind::Roll { player, die1, die2 }).unwrap();
    bus.process(EventKind::PlayerMove { player }).unwrap();
}

#[test]
fn rent_on_a_lone_street_is_the_base_rent() {
    let mut bus = bus(2);
    // Position 3 is the second brown street, base rent 4.
    grant(&mut bus, 3, PlayerId(2));

    land_on(&mut bus, PlayerId(1), 1, 2);

    assert_eq!(bus.state().players.get(PlayerId(1)).unwrap().cash(), 1496.0);
    assert_eq!(bus.state().players.get(PlayerId(2)).unwrap().cash(), 1504.0);
}

#[test]
fn monopoly_doubles_unimproved_street_rent() {
    let mut bus = bus(2);
    grant(&mut bus, 1, PlayerId(2));
    grant(&mut bus, 3, PlayerId(2));

    land_on(&mut bus, PlayerId(1), 1, 2);

    // Both browns held: the unimproved rent of 4 doubles.
    assert_eq!(bus.state().players.get(PlayerId(1)).unwrap().cash(), 1492.0);
    assert_eq!(bus.state().players.get(PlayerId(2)).unwrap().cash(), 1508.0);
}

#[test]
fn utility_rent_scales_with_the_landing_roll() {
    let mut bus = bus(2);
    // Position 12 is a utility; one held means 4x the roll total.
    grant(&mut bus, 12, PlayerId(2));

    land_on(&mut bus, PlayerId(1), 6, 6); // total 12, lands exactly on 12

    assert_eq!(bus.state().players.get(PlayerId(1)).unwrap().cash(), 1452.0);
    assert_eq!(bus.state().players.get(PlayerId(2)).unwrap().cash(), 1548.0);
}

#[test]
fn upgrade_charges_the_value_delta_and_raises_rent() {
    let mut bus = bus(2);
    // Position 1: brown street, price 60, base rent 2.
    let property = grant(&mut bus, 1, PlayerId(2));

    bus.process(EventKind::PropertyUpgrade { property }).unwrap();

    // Value delta from unimproved (1.0x) to one house (1.6x) on 60 is 36.
    let state = bus.state();
    assert_eq!(state.players.get(PlayerId(2)).unwrap().cash(), 1464.0);
    let asset = state.assets.get(property).unwrap();
    assert_eq!(asset.real_value, 96.0);
    // Rent at one house is base 2 times the level multiplier 5.
    assert_eq!(asset.street().unwrap().current_rent, 10.0);
}

#[test]
fn downgrade_refunds_twice_the_value_delta() {
    let mut bus = bus(2);
    let property = grant(&mut bus, 1, PlayerId(2));
    bus.process(EventKind::PropertyUpgrade { property }).unwrap();
    bus.process(EventKind::PropertyDowngrade { property }).unwrap();

    // Paid 36 up, refunded 72 down.
    let state = bus.state();
    assert_eq!(state.players.get(PlayerId(2)).unwrap().cash(), 1536.0);
    assert_eq!(state.assets.get(property).unwrap().real_value, 60.0);
}

fn create_loan(bus: &mut EventBus, creditor: PlayerId, debtor: PlayerId, principal: f64) -> LoanId {
    let id = bus.state().loans.next_id();
    let loan = Loan::new(id, creditor, debtor, principal, 0.05, RateKind::Fixed, 20).unwrap();
    bus.process(EventKind::LoanCreation { loan }).unwrap();
    id
}

#[test]
fn loan_lifecycle_conserves_player_cash() {
    let mut bus = bus(2);
    let loan = create_loan(&mut bus, PlayerId(2), PlayerId(1), 1000.0);

    // Disbursal moves the principal.
    assert_eq!(bus.state().players.get(PlayerId(1)).unwrap().cash(), 2500.0);
    assert_eq!(bus.state().players.get(PlayerId(2)).unwrap().cash(), 500.0);

    bus.process(EventKind::LoanInterestAccrued { loan }).unwrap();
    assert_eq!(bus.state().loans.get(loan).unwrap().current_balance(), 1050.0);

    // A small payment is interest-only.
    bus.process(EventKind::LoanPayment { loan, amount: 30.0 })
        .unwrap();
    let record = bus.state().loans.get(loan).unwrap();
    assert_eq!(record.remaining_principal(), 1000.0);
    assert_eq!(record.remaining_interest(), 20.0);

    // Settling pays the full remaining balance.
    bus.process(EventKind::PlayerPayOffLoan { loan }).unwrap();
    let state = bus.state();
    assert!(state.loans.get(loan).unwrap().is_settled());
    assert_eq!(state.players.get(PlayerId(1)).unwrap().cash(), 1450.0);
    assert_eq!(state.players.get(PlayerId(2)).unwrap().cash(), 1550.0);

    // Every movement was player-to-player; the total never changed.
    let total: f64 = state.players.iter().map(|p| p.cash()).sum();
    assert_eq!(total, 3000.0);
}

#[test]
fn loan_transfer_moves_cash_to_the_seller_once() {
    let mut bus = bus(3);
    let loan = create_loan(&mut bus, PlayerId(2), PlayerId(1), 1000.0);

    bus.process(EventKind::LoanTransfer {
        loan,
        from: PlayerId(2),
        to: PlayerId(3),
        amount: 900.0,
    })
    .unwrap();

    let state = bus.state();
    assert_eq!(state.loans.get(loan).unwrap().creditor, PlayerId(3));
    // The seller already gave up the principal at creation; the sale nets
    // them the purchase price exactly once.
    assert_eq!(state.players.get(PlayerId(2)).unwrap().cash(), 1400.0);
    assert_eq!(state.players.get(PlayerId(3)).unwrap().cash(), 600.0);
    let total: f64 = state.players.iter().map(|p| p.cash()).sum();
    assert_eq!(total, 4500.0);
}

#[test]
fn credit_review_favors_the_creditor_over_the_debtor() {
    let mut bus = bus(2);
    create_loan(&mut bus, PlayerId(2), PlayerId(1), 1000.0);

    bus.process(EventKind::CreditReview { player: PlayerId(1) })
        .unwrap();
    bus.process(EventKind::CreditReview { player: PlayerId(2) })
        .unwrap();

    let debtor = bus.state().players.get(PlayerId(1)).unwrap().credit_rating;
    let creditor = bus.state().players.get(PlayerId(2)).unwrap().credit_rating;
    assert!(creditor > debtor);
    assert_eq!(creditor, CreditRating::AAA);
}

#[test]
fn net_worth_tracks_loans_on_both_sides() {
    let mut bus = bus(2);
    create_loan(&mut bus, PlayerId(2), PlayerId(1), 1000.0);

    let state = bus.state();
    // Debtor: 2500 cash minus the 1000 payable.
    assert_eq!(state.players.get(PlayerId(1)).unwrap().net_worth, 1500.0);
    // Creditor: 500 cash plus the 1000 receivable.
    assert_eq!(state.players.get(PlayerId(2)).unwrap().net_worth, 1500.0);
}

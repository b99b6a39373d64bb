//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// End-to-end engine scenarios driven through the public crate API only (no HTTP layer), covering
// the concrete fixtures and round-trip/idempotence properties the engine must satisfy.
//--------------------------------------------------------------------------------------------------

use matching_engine::{JsonFileStorage, MatchingEngine, NoopStorage, Side};

fn engine() -> MatchingEngine {
    MatchingEngine::new(Box::new(NoopStorage))
}

#[tokio::test]
async fn scenario_fresh_ladder() {
    let mut e = engine();
    for price in [88, 89, 90, 91, 92] {
        e.place(Side::Buy, price, 1).await.unwrap();
    }
    let view = e.snapshot();
    let prices: Vec<i64> = view.bids.iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![92, 91, 90, 89, 88]);

    let before = view.bids[0].price;
    let outcome = e.place(Side::Buy, 90, 1).await.unwrap();
    assert!(outcome.trades.is_empty());
    assert_eq!(e.snapshot().bids[0].price, before);
}

#[tokio::test]
async fn scenario_exact_cross_full_consume() {
    let mut e = engine();
    e.place(Side::Buy, 42, 2).await.unwrap();
    let outcome = e.place(Side::Sell, 40, 2).await.unwrap();

    assert_eq!(outcome.trades.len(), 1);
    assert_eq!(outcome.trades[0].price, 42);
    assert_eq!(outcome.trades[0].size, 2);
    let view = e.snapshot();
    assert!(view.bids.is_empty());
    assert!(view.asks.is_empty());
}

#[tokio::test]
async fn scenario_multi_level_sweep() {
    let mut e = engine();
    e.place(Side::Sell, 85, 10).await.unwrap();
    e.place(Side::Sell, 86, 1).await.unwrap();
    e.place(Side::Sell, 87, 1).await.unwrap();
    e.place(Side::Sell, 88, 1).await.unwrap();

    let outcome = e.place(Side::Buy, 88, 12).await.unwrap();
    let fills: Vec<(i64, u64)> = outcome.trades.iter().map(|t| (t.price, t.size)).collect();
    assert_eq!(fills, vec![(85, 10), (86, 1), (87, 1)]);

    let view = e.snapshot();
    assert!(view.asks.is_empty());
    assert!(view.bids.is_empty());
}

#[tokio::test]
async fn scenario_partial_fill_rests_remainder() {
    let mut e = engine();
    e.place(Side::Sell, 85, 10).await.unwrap();
    let outcome = e.place(Side::Buy, 88, 12).await.unwrap();

    assert_eq!(outcome.trades.len(), 1);
    assert_eq!(outcome.trades[0].size, 10);
    let view = e.snapshot();
    assert_eq!(view.bids.len(), 1);
    assert_eq!(view.bids[0].price, 88);
    assert_eq!(view.bids[0].volume, 2);
}

#[tokio::test]
async fn scenario_cancel_is_idempotent() {
    let mut e = engine();
    let outcome = e.place(Side::Sell, 40, 2).await.unwrap();

    assert!(e.cancel(outcome.order_id).await.unwrap());
    assert!(e.snapshot().asks.is_empty());
    assert!(!e.cancel(outcome.order_id).await.unwrap());
}

#[tokio::test]
async fn scenario_fifo_within_level() {
    let mut e = engine();
    let a = e.place(Side::Buy, 7331, 3).await.unwrap();
    let b = e.place(Side::Buy, 7331, 1).await.unwrap();
    let c = e.place(Side::Buy, 7331, 2).await.unwrap();

    assert!(e.cancel(b.order_id).await.unwrap());

    let outcome = e.place(Side::Sell, 7331, 5).await.unwrap();
    let takers: Vec<_> = outcome.trades.iter().map(|t| t.buy_order_id).collect();
    assert_eq!(takers, vec![a.order_id, c.order_id]);
}

#[tokio::test]
async fn conservation_holds_across_a_partial_match() {
    let mut e = engine();
    e.place(Side::Sell, 85, 10).await.unwrap();
    let outcome = e.place(Side::Buy, 88, 12).await.unwrap();

    let traded: u64 = outcome.trades.iter().map(|t| t.size).sum();
    let resting: u64 = e.snapshot().bids.iter().map(|l| l.volume).sum();
    assert_eq!(traded + resting, 12);
}

#[tokio::test]
async fn restoring_from_json_storage_round_trips_the_book() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");

    let order_id = {
        let mut e = MatchingEngine::new(Box::new(JsonFileStorage::new(&path)));
        let outcome = e.place(Side::Buy, 100, 5).await.unwrap();
        outcome.order_id
    };

    let mut restored = MatchingEngine::new(Box::new(JsonFileStorage::new(&path)));
    restored.restore().await.unwrap();

    let view = restored.snapshot();
    assert_eq!(view.bids.len(), 1);
    assert_eq!(view.bids[0].price, 100);
    assert_eq!(view.bids[0].volume, 5);

    assert!(restored.cancel(order_id).await.unwrap());
}

#[tokio::test]
async fn reset_is_reflected_after_restore_from_the_same_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");

    let mut e = MatchingEngine::new(Box::new(JsonFileStorage::new(&path)));
    e.place(Side::Buy, 100, 5).await.unwrap();
    e.reset().await.unwrap();

    let mut restored = MatchingEngine::new(Box::new(JsonFileStorage::new(&path)));
    restored.restore().await.unwrap();
    assert!(restored.snapshot().bids.is_empty());
}

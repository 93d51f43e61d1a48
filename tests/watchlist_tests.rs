// Watchlist store against a temporary SQLite file

use tempfile::TempDir;

use coin_watchlist::{NewWatchlistEntry, WatchlistError, WatchlistStore};

async fn temp_store() -> (WatchlistStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("watchlist.db").display());
    let store = WatchlistStore::connect(&url).await.unwrap();
    (store, dir)
}

fn entry(coin_id: &str, price: f64, market_cap: i64) -> NewWatchlistEntry {
    NewWatchlistEntry {
        coin_id: coin_id.to_string(),
        name: coin_id.to_string(),
        symbol: coin_id.to_uppercase(),
        price,
        market_cap,
        note: String::new(),
    }
}

#[tokio::test]
async fn test_newest_entry_listed_first() {
    let (store, _dir) = temp_store().await;

    let first = store.insert(&entry("bitcoin", 65000.0, 1_200_000_000_000)).await.unwrap();
    let second = store.insert(&entry("ethereum", 3000.0, 360_000_000_000)).await.unwrap();
    let third = store.insert(&entry("cardano", 0.45, 16_000_000_000)).await.unwrap();

    let ids: Vec<i64> = store.list_all().await.unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![third, second, first]);
}

#[tokio::test]
async fn test_round_trips_values() {
    let (store, _dir) = temp_store().await;
    let mut new = entry("bitcoin", 65000.123456, 1_200_000_000_000);
    new.note = "cold storage".to_string();

    let id = store.insert(&new).await.unwrap();
    let saved = store.get_by_id(id).await.unwrap();

    assert_eq!(saved.coin_id, "bitcoin");
    assert_eq!(saved.symbol, "BITCOIN");
    assert_eq!(saved.price, 65000.123456);
    assert_eq!(saved.market_cap, 1_200_000_000_000);
    assert_eq!(saved.note, "cold storage");
}

#[tokio::test]
async fn test_update_price_and_cap_leaves_note_and_created_at() {
    let (store, _dir) = temp_store().await;
    let mut new = entry("solana", 140.0, 60_000_000_000);
    new.note = "watch the unlock".to_string();
    let id = store.insert(&new).await.unwrap();
    let before = store.get_by_id(id).await.unwrap();

    store.update_price_and_cap(id, 155.5, 70_000_000_000).await.unwrap();
    let after = store.get_by_id(id).await.unwrap();

    assert_eq!(after.price, 155.5);
    assert_eq!(after.market_cap, 70_000_000_000);
    assert_eq!(after.note, before.note);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.coin_id, before.coin_id);
    assert_eq!(after.name, before.name);
}

#[tokio::test]
async fn test_update_note() {
    let (store, _dir) = temp_store().await;
    let id = store.insert(&entry("dogecoin", 0.12, 17_000_000_000)).await.unwrap();

    store.update_note(id, "meme money").await.unwrap();
    let saved = store.get_by_id(id).await.unwrap();
    assert_eq!(saved.note, "meme money");
    assert_eq!(saved.price, 0.12);
}

#[tokio::test]
async fn test_delete_removes_exactly_one_row() {
    let (store, _dir) = temp_store().await;
    let keep = store.insert(&entry("bitcoin", 1.0, 1)).await.unwrap();
    let gone = store.insert(&entry("ethereum", 1.0, 1)).await.unwrap();

    store.delete_by_id(gone).await.unwrap();

    let remaining = store.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep);
    assert!(matches!(
        store.get_by_id(gone).await,
        Err(WatchlistError::NotFound(id)) if id == gone
    ));
}

#[tokio::test]
async fn test_same_coin_can_be_saved_twice() {
    let (store, _dir) = temp_store().await;
    store.insert(&entry("bitcoin", 1.0, 1)).await.unwrap();
    store.insert(&entry("bitcoin", 2.0, 2)).await.unwrap();

    assert_eq!(store.list_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rows_survive_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("watchlist.db").display());

    let store = WatchlistStore::connect(&url).await.unwrap();
    let id = store.insert(&entry("litecoin", 80.0, 6_000_000_000)).await.unwrap();
    store.close().await;

    let reopened = WatchlistStore::connect(&url).await.unwrap();
    assert_eq!(reopened.get_by_id(id).await.unwrap().coin_id, "litecoin");
}

// crates.io
use time::macros;
// self
use session_relay::{
	auth::{Credential, CredentialRecord},
	store::{CredentialStore, MemoryStore},
};

fn build_record(token: &str) -> CredentialRecord {
	CredentialRecord::new(Credential::new(token), macros::datetime!(2025-11-10 12:00 UTC))
}

#[tokio::test]
async fn save_and_load_round_trip() {
	let store = MemoryStore::default();
	let record = build_record("access-1");

	store
		.save(record.clone())
		.await
		.expect("Saving record fixture into memory store should succeed.");

	let fetched = store
		.load()
		.await
		.expect("Loading the slot from memory store should succeed.")
		.expect("Stored record should remain present.");

	assert_eq!(fetched.credential().expose(), record.credential().expose());
	assert_eq!(fetched.issued_at, record.issued_at);
}

#[tokio::test]
async fn save_overwrites_the_single_slot() {
	let store = MemoryStore::default();

	store
		.save(build_record("access-old"))
		.await
		.expect("Saving the first record should succeed.");
	store
		.save(build_record("access-new"))
		.await
		.expect("Saving the replacement record should succeed.");

	let fetched = store
		.load()
		.await
		.expect("Loading the slot should succeed.")
		.expect("Slot should hold the replacement record.");

	assert_eq!(fetched.credential().expose(), "access-new");
}

#[tokio::test]
async fn clear_returns_the_previous_record() {
	let store = MemoryStore::default();

	store.save(build_record("access-1")).await.expect("Saving record fixture should succeed.");

	let previous = store
		.clear()
		.await
		.expect("Clearing the slot should succeed.")
		.expect("Clear should hand back the evicted record.");

	assert_eq!(previous.credential().expose(), "access-1");
	assert!(store.load().await.expect("Loading the slot should succeed.").is_none());

	let empty = store.clear().await.expect("Clearing an empty slot should succeed.");

	assert!(empty.is_none());
}

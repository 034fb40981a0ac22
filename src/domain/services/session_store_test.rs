use anyhow::Result;
use test_utils::chat_history_fixture;
use test_utils::utc;

use super::SessionStore;
use super::STORAGE_KEY;
use crate::domain::models::Message;
use crate::domain::models::Sender;
use crate::domain::models::Storage;
use crate::infrastructure::storage::memory::MemoryStorage;

fn message(id: &str, sender: Sender, content: &str) -> Message {
    return Message::new(id, sender, content, utc(2024, 5, 1, 8, 0));
}

fn pair(text: &str) -> Vec<Message> {
    return vec![
        message("1", Sender::User, text),
        message("2", Sender::Assistant, "Sure."),
    ];
}

fn store_with(storage: &MemoryStorage) -> SessionStore {
    return SessionStore::open(Box::new(storage.clone()));
}

mod load {
    use super::*;

    #[test]
    fn it_starts_empty_without_history() {
        let store = store_with(&MemoryStorage::default());

        assert!(store.sessions().is_empty());
        assert_eq!(store.current_id(), None);
    }

    #[test]
    fn it_starts_empty_on_malformed_history() -> Result<()> {
        let storage = MemoryStorage::default();
        storage.set(STORAGE_KEY, "{not json")?;
        let store = store_with(&storage);

        assert!(store.sessions().is_empty());
        assert_eq!(store.current_id(), None);

        return Ok(());
    }

    #[test]
    fn it_starts_empty_on_wrong_shape() -> Result<()> {
        let storage = MemoryStorage::default();
        storage.set(STORAGE_KEY, r#"[{"id": 5}]"#)?;

        assert!(store_with(&storage).load().is_empty());

        return Ok(());
    }

    #[test]
    fn it_keeps_the_first_of_duplicate_ids() -> Result<()> {
        let storage = MemoryStorage::default();
        let duplicated = chat_history_fixture().replace("1690000000000", "1700000005000");
        storage.set(STORAGE_KEY, &duplicated)?;
        let mut store = store_with(&storage);

        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.sessions()[0].title, "Write me a haiku about the sea");

        let remaining = store.delete_session("1700000005000")?;
        assert!(remaining.is_empty());

        return Ok(());
    }

    #[test]
    fn it_creates_sessions_after_out_of_range_ids() -> Result<()> {
        let storage = MemoryStorage::default();
        storage.set(
            STORAGE_KEY,
            &chat_history_fixture().replace("1690000000000", "18446744073709551615"),
        )?;
        let mut store = store_with(&storage);
        store.clear_current();

        let created = store.create_session("Hello", vec![])?;

        assert_eq!(created.id.len(), 13);
        assert_eq!(store.sessions().len(), 3);

        return Ok(());
    }

    #[test]
    fn it_reads_browser_history() -> Result<()> {
        let storage = MemoryStorage::default();
        storage.set(STORAGE_KEY, chat_history_fixture())?;
        let store = store_with(&storage);

        let sessions = store.sessions();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].title, "Write me a haiku about the sea");
        assert_eq!(sessions[0].messages.len(), 2);
        assert_eq!(sessions[0].messages[1].sender, Sender::Assistant);
        assert_eq!(
            sessions[0].messages[1].timestamp.to_rfc3339(),
            "2023-11-14T22:13:23.512+00:00"
        );
        assert_eq!(store.current_id(), Some("1700000005000"));

        return Ok(());
    }

    #[test]
    fn it_issues_ids_after_loaded_ones() -> Result<()> {
        let storage = MemoryStorage::default();
        storage.set(
            STORAGE_KEY,
            &chat_history_fixture().replace("1700000001001", "99999999999999"),
        )?;
        let store = store_with(&storage);

        assert_eq!(store.next_id(), "100000000000000");

        return Ok(());
    }
}

mod save {
    use super::*;

    #[test]
    fn it_round_trips_created_sessions() -> Result<()> {
        let storage = MemoryStorage::default();
        let mut store = store_with(&storage);
        let created = store.create_session("Hello", pair("Hello"))?;

        let reloaded = store_with(&storage);
        let session = reloaded.get(&created.id).unwrap();

        assert_eq!(session.id, created.id);
        assert_eq!(session.title, created.title);
        assert_eq!(session.messages, created.messages);
        assert_eq!(session.created_at, created.created_at);
        assert_eq!(session.updated_at, created.updated_at);

        return Ok(());
    }

    #[test]
    fn it_overwrites_the_whole_collection() -> Result<()> {
        let storage = MemoryStorage::default();
        let mut store = store_with(&storage);
        store.create_session("First", pair("First"))?;
        store.create_session("Second", pair("Second"))?;

        store.save(vec![])?;

        assert_eq!(storage.get(STORAGE_KEY)?, Some("[]".to_string()));
        assert_eq!(store.current_id(), None);

        return Ok(());
    }

    #[test]
    fn it_writes_camel_case_json() -> Result<()> {
        let storage = MemoryStorage::default();
        let mut store = store_with(&storage);
        store.create_session("Hello", vec![])?;

        let payload = storage.get(STORAGE_KEY)?.unwrap();
        assert!(payload.contains("\"createdAt\""));
        assert!(payload.contains("\"updatedAt\""));
        assert!(payload.contains("\"title\":\"Hello\""));

        return Ok(());
    }
}

mod create_session {
    use super::*;

    #[test]
    fn it_prepends_and_selects() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let older = store.create_session("Older", pair("Older"))?;
        let newer = store.create_session("Newer", pair("Newer"))?;

        let ids = store
            .sessions()
            .iter()
            .map(|e| return e.id.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
        assert_eq!(store.current_id(), Some(newer.id.as_str()));
        assert_ne!(newer.id, older.id);

        return Ok(());
    }

    #[test]
    fn it_derives_a_truncated_title() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let session =
            store.create_session("What is the airspeed velocity of an unladen swallow?", vec![])?;

        insta::assert_snapshot!(session.title, @"What is the airspeed velocity ...");
        assert_eq!(session.created_at, session.updated_at);

        return Ok(());
    }
}

mod update_session {
    use super::*;

    #[test]
    fn it_replaces_messages_and_bumps_updated_at() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let session = store.create_session("Hello", pair("Hello"))?;

        let mut messages = pair("Hello");
        messages.extend(pair("More"));
        store.update_session(&session.id, messages.clone())?;

        let updated = store.get(&session.id).unwrap();
        assert_eq!(updated.messages, messages);
        assert_eq!(updated.created_at, session.created_at);
        assert!(updated.updated_at > session.updated_at);

        return Ok(());
    }

    #[test]
    fn it_leaves_other_sessions_and_order_alone() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let older = store.create_session("Older", pair("Older"))?;
        let newer = store.create_session("Newer", pair("Newer"))?;

        store.update_session(&older.id, vec![])?;

        assert_eq!(store.sessions()[0], newer);
        assert_eq!(store.sessions()[1].id, older.id);
        assert!(store.sessions()[1].messages.is_empty());

        return Ok(());
    }

    #[test]
    fn it_ignores_unknown_ids() -> Result<()> {
        let storage = MemoryStorage::default();
        let mut store = store_with(&storage);
        store.create_session("Hello", pair("Hello"))?;
        let before = store.sessions().to_vec();
        let persisted = storage.get(STORAGE_KEY)?;

        let after = store.update_session("missing", vec![])?.to_vec();

        assert_eq!(after, before);
        assert_eq!(storage.get(STORAGE_KEY)?, persisted);

        return Ok(());
    }
}

mod delete_session {
    use super::*;

    #[test]
    fn it_retargets_current_to_the_first_remaining() -> Result<()> {
        let storage = MemoryStorage::default();
        let mut store = store_with(&storage);
        let b = store.create_session("B", pair("B"))?;
        let a = store.create_session("A", pair("A"))?;
        assert_eq!(store.current_id(), Some(a.id.as_str()));

        let remaining = store.delete_session(&a.id)?.to_vec();

        assert_eq!(remaining, vec![b.clone()]);
        assert_eq!(store.current_id(), Some(b.id.as_str()));
        assert_eq!(store_with(&storage).sessions().to_vec(), vec![b]);

        return Ok(());
    }

    #[test]
    fn it_clears_current_when_nothing_is_left() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let only = store.create_session("Only", pair("Only"))?;

        store.delete_session(&only.id)?;

        assert!(store.sessions().is_empty());
        assert_eq!(store.current_id(), None);

        return Ok(());
    }

    #[test]
    fn it_keeps_current_when_deleting_another_session() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let b = store.create_session("B", pair("B"))?;
        let a = store.create_session("A", pair("A"))?;

        store.delete_session(&b.id)?;

        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.current_id(), Some(a.id.as_str()));

        return Ok(());
    }

    #[test]
    fn it_ignores_unknown_ids() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let a = store.create_session("A", pair("A"))?;

        let remaining = store.delete_session("missing")?;

        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, a.id);
        assert_eq!(store.current_id(), Some(a.id.as_str()));

        return Ok(());
    }
}

mod select_session {
    use super::*;

    #[test]
    fn it_selects_existing_sessions() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let b = store.create_session("B", pair("B"))?;
        store.create_session("A", pair("A"))?;

        let selected = store.select_session(&b.id).map(|e| return e.id.to_string());

        assert_eq!(selected, Some(b.id.to_string()));
        assert_eq!(store.current_id(), Some(b.id.as_str()));

        return Ok(());
    }

    #[test]
    fn it_ignores_unknown_ids() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        let a = store.create_session("A", pair("A"))?;

        assert!(store.select_session("missing").is_none());
        assert_eq!(store.current_id(), Some(a.id.as_str()));

        return Ok(());
    }

    #[test]
    fn it_clears_current() -> Result<()> {
        let mut store = store_with(&MemoryStorage::default());
        store.create_session("A", pair("A"))?;

        store.clear_current();

        assert_eq!(store.current_id(), None);
        assert!(store.current().is_none());
        assert_eq!(store.sessions().len(), 1);

        return Ok(());
    }
}

#[test]
fn it_clears_everything() -> Result<()> {
    let storage = MemoryStorage::default();
    let mut store = store_with(&storage);
    store.create_session("A", pair("A"))?;

    store.clear()?;

    assert!(store.sessions().is_empty());
    assert_eq!(store.current_id(), None);
    assert_eq!(storage.get(STORAGE_KEY)?, None);

    return Ok(());
}

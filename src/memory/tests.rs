use super::*;
use tempfile::TempDir;

fn store() -> (TempDir, MemoryStore) {
    let tmp = TempDir::new().unwrap();
    let store = MemoryStore::new(tmp.path()).unwrap();
    (tmp, store)
}

#[test]
fn facts_come_back_in_insertion_order() {
    let (_tmp, store) = store();
    store.append_fact("general", "fact one").unwrap();
    store.append_fact("general", "fact two").unwrap();
    store.append_fact("general", "fact three").unwrap();

    let facts = store.recent_facts(10).unwrap();
    let texts: Vec<&str> = facts.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["fact one", "fact two", "fact three"]);
}

#[test]
fn recent_facts_windows_to_the_newest() {
    let (_tmp, store) = store();
    for i in 0..5 {
        store.append_fact("general", &format!("fact {}", i)).unwrap();
    }

    let facts = store.recent_facts(2).unwrap();
    let texts: Vec<&str> = facts.iter().map(|f| f.text.as_str()).collect();
    // Newest two, oldest of the window first
    assert_eq!(texts, vec!["fact 3", "fact 4"]);
}

#[test]
fn empty_store_returns_no_facts() {
    let (_tmp, store) = store();
    assert!(store.recent_facts(10).unwrap().is_empty());
}

#[test]
fn logged_turns_are_searchable() {
    let (_tmp, store) = store();
    store
        .log_turn("find the budget report", "I found D:\\Reports\\budget.xlsx")
        .unwrap();
    store.log_turn("what's the weather", "No idea.").unwrap();

    let hits = store.search_history("budget report", 10).unwrap();
    assert!(!hits.is_empty());
    assert!(hits.iter().any(|r| r.content.contains("budget")));
}

#[test]
fn search_misses_return_empty() {
    let (_tmp, store) = store();
    store.log_turn("hello there", "hi").unwrap();
    let hits = store.search_history("quarterly forecast", 10).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn search_survives_fts_syntax_characters() {
    let (_tmp, store) = store();
    store.log_turn("organize D:\\Download please", "done").unwrap();
    // Quotes/colons/backslashes must not break the query
    let result = store.search_history("\"D:\\Download\" AND (please)", 10);
    assert!(result.is_ok());
}

#[test]
fn reopening_preserves_data() {
    let tmp = TempDir::new().unwrap();
    {
        let store = MemoryStore::new(tmp.path()).unwrap();
        store.append_fact("general", "persisted fact").unwrap();
    }
    let store = MemoryStore::new(tmp.path()).unwrap();
    let facts = store.recent_facts(10).unwrap();
    assert_eq!(facts.len(), 1);
    assert_eq!(facts[0].text, "persisted fact");
}

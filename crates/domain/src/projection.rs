//! Decision projection: the replay engine behind every aggregate.
//!
//! A [`DecisionProjection`] owns a string-keyed data map and a table from event
//! kind to mutator. Aggregates only supply the table; replaying history is
//! the same for all of them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::aggregate::DomainEvent;

/// A mutator writes the effect of one event into the projection data.
///
/// It must only read the event and write into the data, so that replaying
/// the same history always produces the same data.
pub type Mutator<E> = fn(&mut ProjectionData, &E);

/// String-keyed state derived from events.
///
/// Keys are kept sorted so two snapshots of equal state compare and print
/// identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectionData(BTreeMap<String, Value>);

impl ProjectionData {
    /// Creates empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Serialize) {
        self.0.insert(key.to_string(), to_value(value));
    }

    /// Removes a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns the raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserializes the value stored under `key`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Returns a boolean flag; missing keys read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns an integer; missing keys read as `0`.
    pub fn int(&self, key: &str) -> i64 {
        self.0.get(key).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Returns a string value.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns the string elements of a list; missing keys read as empty.
    pub fn strings(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Adds `by` to an integer value and returns the new value.
    ///
    /// Saturates at the bounds of `i64`.
    pub fn increment(&mut self, key: &str, by: i64) -> i64 {
        let next = self.int(key).saturating_add(by);
        self.0.insert(key.to_string(), Value::from(next));
        next
    }

    /// Appends to a list, creating it if needed.
    pub fn push(&mut self, key: &str, value: impl Serialize) {
        self.list_mut(key).push(to_value(value));
    }

    /// Appends to a list unless an equal element is already present.
    ///
    /// Returns true if the element was added.
    pub fn push_unique(&mut self, key: &str, value: impl Serialize) -> bool {
        let value = to_value(value);
        let list = self.list_mut(key);
        if list.contains(&value) {
            return false;
        }
        list.push(value);
        true
    }

    /// Removes every element equal to `value` from a list.
    pub fn remove_from_list(&mut self, key: &str, value: impl Serialize) {
        let value = to_value(value);
        if let Some(Value::Array(items)) = self.0.get_mut(key) {
            items.retain(|item| item != &value);
        }
    }

    /// Returns true if a list contains an element equal to `value`.
    pub fn list_contains(&self, key: &str, value: impl Serialize) -> bool {
        let value = to_value(value);
        matches!(self.0.get(key), Some(Value::Array(items)) if items.contains(&value))
    }

    /// Returns the number of elements in a list.
    pub fn list_len(&self, key: &str) -> usize {
        match self.0.get(key) {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        }
    }

    /// Returns true if no key is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn list_mut(&mut self, key: &str) -> &mut Vec<Value> {
        let entry = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        match entry {
            Value::Array(items) => items,
            _ => unreachable!("entry was just made an array"),
        }
    }
}

fn to_value(value: impl Serialize) -> Value {
    match serde_json::to_value(value) {
        Ok(value) => value,
        Err(error) => {
            tracing::error!(%error, "projection value failed to serialize");
            debug_assert!(false, "projection value failed to serialize: {error}");
            Value::Null
        }
    }
}

/// Replayable key-value state machine driven by registered mutators.
pub struct DecisionProjection<E: DomainEvent> {
    data: ProjectionData,
    handlers: HashMap<E::Kind, Mutator<E>>,
}

impl<E: DomainEvent> DecisionProjection<E> {
    /// Creates an empty projection with no handlers.
    pub fn new() -> Self {
        Self {
            data: ProjectionData::new(),
            handlers: HashMap::new(),
        }
    }

    /// Associates a mutator with an event kind. The last registration wins.
    pub fn register(&mut self, kind: E::Kind, mutator: Mutator<E>) -> &mut Self {
        self.handlers.insert(kind, mutator);
        self
    }

    /// Returns true if a mutator is registered for `kind`.
    pub fn has_handler(&self, kind: E::Kind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Applies one event. Events without a registered mutator are ignored.
    pub fn apply(&mut self, event: &E) -> &mut Self {
        if let Some(mutator) = self.handlers.get(&event.kind()) {
            mutator(&mut self.data, event);
        }
        self
    }

    /// Applies events in order.
    pub fn apply_all<'a, I>(&mut self, events: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        for event in events {
            self.apply(event);
        }
        self
    }

    /// Returns a copy of the current data.
    ///
    /// Changing the copy never affects the projection.
    pub fn data(&self) -> ProjectionData {
        self.data.clone()
    }

    /// Borrows the current data for reading.
    pub fn state(&self) -> &ProjectionData {
        &self.data
    }
}

impl<E: DomainEvent> Default for DecisionProjection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DomainEvent> Clone for DecisionProjection<E> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

impl<E: DomainEvent> fmt::Debug for DecisionProjection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionProjection")
            .field("data", &self.data)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::EventKind;
    use serde::Deserialize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum CounterKind {
        Added,
        Labelled,
        Ignored,
    }

    impl EventKind for CounterKind {
        fn as_str(&self) -> &'static str {
            match self {
                CounterKind::Added => "Added",
                CounterKind::Labelled => "Labelled",
                CounterKind::Ignored => "Ignored",
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum CounterEvent {
        Added(i64),
        Labelled(String),
        Ignored,
    }

    impl DomainEvent for CounterEvent {
        type Kind = CounterKind;

        fn kind(&self) -> CounterKind {
            match self {
                CounterEvent::Added(_) => CounterKind::Added,
                CounterEvent::Labelled(_) => CounterKind::Labelled,
                CounterEvent::Ignored => CounterKind::Ignored,
            }
        }
    }

    fn on_added(data: &mut ProjectionData, event: &CounterEvent) {
        if let CounterEvent::Added(n) = event {
            data.increment("total", *n);
        }
    }

    fn on_added_twice(data: &mut ProjectionData, event: &CounterEvent) {
        if let CounterEvent::Added(n) = event {
            data.increment("total", n * 2);
        }
    }

    fn on_labelled(data: &mut ProjectionData, event: &CounterEvent) {
        if let CounterEvent::Labelled(label) = event {
            data.push_unique("labels", label);
        }
    }

    fn counter() -> DecisionProjection<CounterEvent> {
        let mut projection = DecisionProjection::new();
        projection
            .register(CounterKind::Added, on_added)
            .register(CounterKind::Labelled, on_labelled);
        projection
    }

    fn history() -> Vec<CounterEvent> {
        vec![
            CounterEvent::Added(2),
            CounterEvent::Labelled("a".to_string()),
            CounterEvent::Added(3),
            CounterEvent::Labelled("a".to_string()),
        ]
    }

    #[test]
    fn apply_runs_registered_mutators_in_order() {
        let mut projection = counter();
        projection.apply_all(&history());

        assert_eq!(projection.state().int("total"), 5);
        assert_eq!(projection.state().strings("labels"), vec!["a"]);
    }

    #[test]
    fn replay_is_deterministic() {
        let events = history();
        let mut first = counter();
        let mut second = counter();

        first.apply_all(&events);
        second.apply_all(&events);

        assert_eq!(first.data(), second.data());
    }

    #[test]
    fn unknown_kind_is_a_no_op() {
        let mut projection = counter();
        projection.apply(&CounterEvent::Added(1));
        let before = projection.data();

        projection.apply(&CounterEvent::Ignored);

        assert_eq!(projection.data(), before);
        assert!(!projection.has_handler(CounterKind::Ignored));
    }

    #[test]
    fn last_registration_wins() {
        let mut projection = counter();
        projection.register(CounterKind::Added, on_added_twice);

        projection.apply(&CounterEvent::Added(4));

        assert_eq!(projection.state().int("total"), 8);
    }

    #[test]
    fn data_returns_a_detached_copy() {
        let mut projection = counter();
        projection.apply(&CounterEvent::Added(1));

        let mut copy = projection.data();
        copy.set("total", 100);

        assert_eq!(projection.state().int("total"), 1);
    }

    #[test]
    fn list_helpers() {
        let mut data = ProjectionData::new();
        assert!(data.push_unique("players", "toto"));
        assert!(!data.push_unique("players", "toto"));
        data.push("players", "titi");
        assert!(data.list_contains("players", "titi"));

        data.remove_from_list("players", "toto");

        assert_eq!(data.strings("players"), vec!["titi"]);
        assert_eq!(data.list_len("players"), 1);
        assert_eq!(data.list_len("missing"), 0);
    }

    #[test]
    fn missing_keys_read_as_defaults() {
        let data = ProjectionData::new();
        assert!(!data.flag("isDeleted"));
        assert_eq!(data.int("points"), 0);
        assert!(data.string("name").is_none());
        assert!(data.read::<String>("name").is_none());
        assert!(data.is_empty());
    }

    #[test]
    fn increment_saturates_instead_of_overflowing() {
        let mut data = ProjectionData::new();
        data.set("balance", i64::MAX);

        assert_eq!(data.increment("balance", 1), i64::MAX);
        assert_eq!(data.increment("balance", -1), i64::MAX - 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "failed to serialize")]
    fn unserializable_value_is_reported() {
        let mut keyed_by_pair = std::collections::HashMap::new();
        keyed_by_pair.insert((1, 2), 3);

        ProjectionData::new().set("bad", keyed_by_pair);
    }
}

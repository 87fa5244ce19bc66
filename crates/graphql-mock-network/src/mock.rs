use std::{fmt, sync::Arc};

use indexmap::IndexMap;

/// The runtime arguments of a field, with variables substituted.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// A nested resolver map: field name to the mock of that field.
pub type FieldMocks = IndexMap<String, Mock>;

/// The failure a producer signals. It ends up in the `errors` of the response
/// with the same message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MockError {
    message: String,
}

impl MockError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for MockError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MockError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Error> for MockError {
    fn from(value: serde_json::Error) -> Self {
        Self::new(value.to_string())
    }
}

type ProducerFn = dyn Fn(&Arguments) -> Result<Mock, MockError> + Send + Sync;

/// A callable mock, invoked with the arguments of the field it resolves.
///
/// Two producers are equal only if they are the same allocation: merging
/// passes producers through without wrapping them.
#[derive(Clone)]
pub struct Producer(Arc<ProducerFn>);

impl Producer {
    pub fn call(&self, arguments: &Arguments) -> Result<Mock, MockError> {
        (self.0)(arguments)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Producer")
    }
}

impl PartialEq for Producer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A mock bound to a type or a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Mock {
    /// A plain value, returned as is.
    Value(serde_json::Value),
    /// A nested resolver map for object types.
    Fields(FieldMocks),
    /// A callable producing one of the other forms.
    Producer(Producer),
}

impl Mock {
    pub fn value(value: impl Into<serde_json::Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, Mock)>) -> Self {
        Self::Fields(fields.into_iter().map(|(name, mock)| (name.into(), mock)).collect())
    }

    /// A producer that cannot fail.
    pub fn from_fn<F, M>(producer: F) -> Self
    where
        F: Fn(&Arguments) -> M + Send + Sync + 'static,
        M: Into<Mock>,
    {
        Self::Producer(Producer(Arc::new(move |arguments| Ok(producer(arguments).into()))))
    }

    pub fn try_from_fn<F, M>(producer: F) -> Self
    where
        F: Fn(&Arguments) -> Result<M, MockError> + Send + Sync + 'static,
        M: Into<Mock>,
    {
        Self::Producer(Producer(Arc::new(move |arguments| {
            producer(arguments).map(Into::into)
        })))
    }

    /// A producer that always fails with `message`.
    pub fn error(message: impl Into<String>) -> Self {
        let error = MockError::new(message);
        Self::Producer(Producer(Arc::new(move |_| Err(error.clone()))))
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, Self::Producer(_))
    }

    /// Whether this mock, as it stands, is a nested resolver map that merges
    /// key by key with another one.
    pub fn is_resolver_map(&self) -> bool {
        matches!(self, Self::Fields(fields) if !fields.is_empty())
    }

    /// The non-empty resolver map this mock stands for without arguments,
    /// invoking producers.
    pub(crate) fn resolver_map(&self) -> Option<FieldMocks> {
        match self.realize(&Arguments::new()) {
            Ok(Realized::Fields(fields)) if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    pub(crate) fn realize(&self, arguments: &Arguments) -> Result<Realized, MockError> {
        match self {
            Self::Value(value) => Ok(Realized::Value(value.clone())),
            Self::Fields(fields) => Ok(Realized::Fields(fields.clone())),
            Self::Producer(producer) => producer.call(arguments)?.into_realized(arguments),
        }
    }

    fn into_realized(self, arguments: &Arguments) -> Result<Realized, MockError> {
        match self {
            Self::Value(value) => Ok(Realized::Value(value)),
            Self::Fields(fields) => Ok(Realized::Fields(fields)),
            Self::Producer(producer) => producer.call(arguments)?.into_realized(arguments),
        }
    }
}

impl From<serde_json::Value> for Mock {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

impl From<Producer> for Mock {
    fn from(value: Producer) -> Self {
        Self::Producer(value)
    }
}

/// A mock after every producer on its surface has been invoked.
#[derive(Debug)]
pub(crate) enum Realized {
    Value(serde_json::Value),
    Fields(FieldMocks),
}

/// One set of mocks, keyed by GraphQL type name.
///
/// ```
/// use graphql_mock_network::{Mock, MockLayer};
/// use serde_json::json;
///
/// let mocks = MockLayer::new()
///     .with_mock("ID", Mock::value("200"))
///     .with_field_mock("Query", "todo", Mock::from_fn(|_| json!({ "title": "A todo" })));
///
/// assert_eq!(mocks.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockLayer {
    mocks: IndexMap<String, Mock>,
}

impl MockLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `mock` to `key`, replacing whatever the layer had there.
    pub fn with_mock(mut self, key: impl Into<String>, mock: impl Into<Mock>) -> Self {
        self.insert(key, mock);
        self
    }

    /// Binds `mock` to `field_name` inside the resolver map of `type_name`.
    ///
    /// A producer of `type_name` returning a resolver map is replaced by that
    /// map. Any other mock of `type_name` that is not a field map is replaced
    /// by one.
    pub fn with_field_mock(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        mock: impl Into<Mock>,
    ) -> Self {
        let entry = self
            .mocks
            .entry(type_name.into())
            .or_insert_with(|| Mock::Fields(FieldMocks::new()));

        if entry.is_producer() {
            if let Some(fields) = entry.resolver_map() {
                *entry = Mock::Fields(fields);
            }
        }

        match entry {
            Mock::Fields(fields) => {
                fields.insert(field_name.into(), mock.into());
            }
            other => {
                *other = Mock::Fields(FieldMocks::from_iter([(field_name.into(), mock.into())]));
            }
        }

        self
    }

    pub fn insert(&mut self, key: impl Into<String>, mock: impl Into<Mock>) -> Option<Mock> {
        self.mocks.insert(key.into(), mock.into())
    }

    pub fn get(&self, key: &str) -> Option<&Mock> {
        self.mocks.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut Mock> {
        self.mocks.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.mocks.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Mock)> {
        self.mocks.iter().map(|(key, mock)| (key.as_str(), mock))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.mocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mocks.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Mock)> for MockLayer {
    fn from_iter<T: IntoIterator<Item = (K, Mock)>>(iter: T) -> Self {
        let mut layer = MockLayer::new();

        for (key, mock) in iter {
            layer.insert(key, mock);
        }

        layer
    }
}

impl IntoIterator for MockLayer {
    type Item = (String, Mock);
    type IntoIter = indexmap::map::IntoIter<String, Mock>;

    fn into_iter(self) -> Self::IntoIter {
        self.mocks.into_iter()
    }
}

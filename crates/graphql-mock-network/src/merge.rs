use crate::mock::{Mock, MockLayer};

/// Merges mock layers, oldest first, into one effective mock set.
///
/// The last layer wins for every key, except when both the accumulated and
/// the incoming mock are nested resolver maps: then they merge field by field,
/// with the incoming fields winning. Producers returning a resolver map when
/// invoked without arguments take part in the merge as that map. Any other
/// producer is kept as is, so it is still called with the field arguments
/// at query time.
pub fn merge_mocks<'a>(layers: impl IntoIterator<Item = &'a MockLayer>) -> MockLayer {
    let mut merged = MockLayer::new();

    for layer in layers {
        for (key, mock) in layer.iter() {
            let incoming = unwrap(mock);

            match merged.get_mut(key) {
                Some(Mock::Fields(existing)) if !existing.is_empty() && incoming.is_resolver_map() => {
                    if let Mock::Fields(fields) = incoming {
                        existing.extend(fields);
                    }
                }
                _ => {
                    merged.insert(key, incoming);
                }
            }
        }
    }

    merged
}

fn unwrap(mock: &Mock) -> Mock {
    if !mock.is_producer() {
        return mock.clone();
    }

    mock.resolver_map().map(Mock::Fields).unwrap_or_else(|| mock.clone())
}

use {
    crate::{Event, Result, TypesError},
    std::collections::BTreeMap,
};

/// Attribute index: ABCI events flattened into `"type.key" -> [values]`.
///
/// Values keep their emission order, so attributes emitted side by side in
/// the same events stay positionally paired across keys, e.g. the `i`-th
/// `proposal_deposit.proposal_id` belongs with the `i`-th
/// `proposal_deposit.amount`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvMap(BTreeMap<String, Vec<String>>);

impl EvMap {
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut map = BTreeMap::<String, Vec<String>>::new();

        for event in events {
            for attr in &event.attributes {
                map.entry(full_key(&event.kind, &attr.key))
                    .or_default()
                    .push(attr.value.clone());
            }
        }

        Self(map)
    }

    pub fn get(&self, kind: &str, key: &str) -> Option<&[String]> {
        self.0.get(&full_key(kind, key)).map(Vec::as_slice)
    }

    pub fn contains(&self, kind: &str, key: &str) -> bool {
        self.0.contains_key(&full_key(kind, key))
    }

    /// Every attribute value in the index, across all keys.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The values of an attribute parsed as integers. Any non-integer value
    /// is an error.
    pub fn u64s(&self, kind: &str, key: &str) -> Result<Option<Vec<u64>>> {
        let Some(values) = self.get(kind, key) else {
            return Ok(None);
        };

        values
            .iter()
            .map(|value| {
                value.parse().map_err(|_| TypesError::NotAnInteger {
                    key: full_key(kind, key),
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Pair the values of two attributes of the same event type by position.
    ///
    /// Returns `None` if the left attribute is absent. If it is present, the
    /// right one must be present too and hold the same number of values.
    pub fn paired(
        &self,
        kind: &str,
        left: &str,
        right: &str,
    ) -> Result<Option<Vec<(&str, &str)>>> {
        let Some(lefts) = self.get(kind, left) else {
            return Ok(None);
        };

        let rights = self
            .get(kind, right)
            .ok_or_else(|| TypesError::MissingAttribute(full_key(kind, right)))?;

        if lefts.len() != rights.len() {
            return Err(TypesError::AttributeMismatch {
                left: full_key(kind, left),
                left_len: lefts.len(),
                right: full_key(kind, right),
                right_len: rights.len(),
            });
        }

        Ok(Some(
            lefts
                .iter()
                .zip(rights)
                .map(|(l, r)| (l.as_str(), r.as_str()))
                .collect(),
        ))
    }
}

fn full_key(kind: &str, key: &str) -> String {
    format!("{kind}.{key}")
}

// ----------------------------------- tests -----------------------------------

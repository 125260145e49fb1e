use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A saved conversation, stored verbatim.
///
/// The server does not interpret thread contents; the only constraint is that
/// the document is a JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadDocument(pub Map<String, Value>);

impl From<Map<String, Value>> for ThreadDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::error::SampQueryError;
use crate::parse::{get_text, get_u16, get_u8};

/// Server configuration as obtained by the `r` request.
///
/// Every rule keeps its raw text, in the order the server sent it. The two
/// rules clients usually care about are also decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerRules {
    /// Raw name/value pairs. A repeated name overwrites the earlier value in place.
    #[serde(serialize_with = "as_map")]
    values: Vec<(String, String)>,
    /// Position of each name in `values`.
    #[serde(skip)]
    index: HashMap<String, usize>,
    /// `true` only when the `lagcomp` rule is exactly `On`.
    pub lagcomp: bool,
    /// The `weather` rule as an integer; `None` when absent or not numeric.
    pub weather: Option<i32>,
}

fn as_map<S: Serializer>(values: &[(String, String)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(values.iter().map(|(n, v)| (n, v)))
}

impl ServerRules {
    /// Parse a rules reply body (header already stripped).
    pub fn parse(data: &[u8]) -> Result<ServerRules, SampQueryError> {
        let mut offset: usize = 0;
        let count = get_u16(data, &mut offset, "rule count")?;

        let mut rules = ServerRules::default();
        for _ in 0..count {
            let len = get_u8(data, &mut offset, "rule name length")?;
            let name = get_text(data, &mut offset, usize::from(len), "rule name")?;
            let len = get_u8(data, &mut offset, "rule value length")?;
            let value = get_text(data, &mut offset, usize::from(len), "rule value")?;
            rules.insert(name, value);
        }

        rules.lagcomp = rules.get("lagcomp") == Some("On");
        rules.weather = rules.get("weather").and_then(|raw| match raw.trim().parse() {
            Ok(weather) => Some(weather),
            Err(_) => {
                log::warn!("ignoring non-numeric weather rule {raw:?}");
                None
            }
        });

        Ok(rules)
    }

    fn insert(&mut self, name: String, value: String) {
        match self.index.get(&name) {
            Some(&pos) => self.values[pos].1 = value,
            None => {
                self.index.insert(name.clone(), self.values.len());
                self.values.push((name, value));
            }
        }
    }

    /// Raw text of the rule called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index.get(name).map(|&pos| self.values[pos].1.as_str())
    }

    /// Name/value pairs in the order the server sent them.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Observed state of one InsoApp in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "truthy")]
    pub available: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

/// Body of the create call. The platform only takes name and image.
#[derive(Debug, Serialize)]
pub(crate) struct DeployRequest<'a> { pub name: &'a str, pub image: &'a str }

impl AppRecord {
    /// A record that has not been deployed yet.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self { name: name.into(), image: image.into(), available: false, url: String::new() }
    }

    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> { serde_json::from_slice(body) }

    /// Ready to serve traffic: reported available and reachable somewhere.
    pub fn is_ready(&self) -> bool { self.available && !self.url.is_empty() }

    pub(crate) fn deploy_request(&self) -> DeployRequest<'_> { DeployRequest { name: &self.name, image: &self.image } }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

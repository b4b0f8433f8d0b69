//! Wire types exchanged with the backend.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};

/// Dashboard role. Roles are not hierarchical; views list the roles they admit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Subadmin,
    /// Any role string this build does not know. Never present in an allow-list.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Subadmin => "subadmin",
            Self::Unknown => "unknown",
        }
    }
}

/// Profile of an authenticated dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUser")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Wire shape of [`User`]. Document-store backends send `_id`, sometimes
/// next to a virtual `id`; either one is accepted.
#[derive(Deserialize)]
struct RawUser {
    #[serde(default, deserialize_with = "id_from_any")]
    id: Option<String>,
    #[serde(default, rename = "_id", deserialize_with = "id_from_any")]
    document_id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    role: Role,
}

impl TryFrom<RawUser> for User {
    type Error = String;

    fn try_from(raw: RawUser) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.document_id)
            .ok_or_else(|| "missing field `id`".to_owned())?;
        Ok(Self { id, name: raw.name, email: raw.email, role: raw.role })
    }
}

/// Backends differ on numeric vs string ids; both become a string.
fn id_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("unsupported user id: {other}"))),
    }
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: &str, password: &str, remember_me: bool) -> Self {
        Self { email: email.trim().to_owned(), password: password.to_owned(), remember_me }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    /// Present for token-based backends; cookie-session backends omit it.
    #[serde(default, alias = "accessToken")]
    pub token: Option<String>,
}

/// Public site configuration used for branding. Off-shape optional fields
/// decode as absent rather than rejecting the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default, deserialize_with = "lenient_text")]
    pub website_name: String,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub main_color: Option<String>,
    #[serde(default, deserialize_with = "lenient_contact")]
    pub contact_info: Option<ContactInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_links")]
    pub social_links: BTreeMap<String, String>,
}

fn text_of(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(serde_json::Value::deserialize(deserializer)?))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_text(deserializer)?.unwrap_or_default())
}

fn lenient_contact<'de, D>(deserializer: D) -> Result<Option<ContactInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Accepts `{ "facebook": "https://…" }` or `[{ "platform": "facebook", "url": "https://…" }]`;
/// anything else yields no links.
fn lenient_links<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let links = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter_map(|(name, url)| text_of(url).map(|url| (name, url)))
            .collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                let name = item.get("platform").or_else(|| item.get("name")).cloned().and_then(text_of)?;
                let url = item.get("url").cloned().and_then(text_of)?;
                Some((name, url))
            })
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(links)
}

/// Responses arrive either bare or wrapped as `{ "data": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

/// Decode a response body, unwrapping the `data` envelope when present.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, serde_json::Error> {
    Ok(match serde_json::from_str::<Envelope<T>>(body)? {
        Envelope::Wrapped { data } | Envelope::Bare(data) => data,
    })
}

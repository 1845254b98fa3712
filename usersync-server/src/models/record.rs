//! User record codec
//!
//! Maps between the nested JSON document a client sends and the flat row
//! stored in the `users` table:
//! - `decode`: JSON object -> [`UserRow`], checking every leaf by path
//! - `encode`: [`UserRow`] -> [`UserDocument`], the nested shape again
//!
//! Address and geo leaves keep their bare names as columns; company leaves
//! are prefixed (`company_name`, `company_catchPhrase`, `company_bs`).

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::FromRow;

use super::MalformedRecord;

/// Flat storage form of a user, one field per column.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub email: String,
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub lat: String,
    pub lng: String,
    pub phone: String,
    pub website: String,
    pub company_name: String,
    pub company_catch_phrase: String,
    pub company_bs: String,
}

/// Nested document form of a user, as served by `GET /getUsers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDocument {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub email: String,
    pub address: Address,
    pub phone: String,
    pub website: String,
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: Geo,
}

/// Coordinates are kept as text on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub name: String,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
    pub bs: String,
}

/// Parse a request body into the list of raw user documents it carries.
///
/// The body must be a JSON array. Elements are not decoded here; see
/// [`decode`].
pub fn parse_batch(body: &[u8]) -> Result<Vec<Value>, MalformedRecord> {
    let payload: Value = serde_json::from_slice(body).map_err(|e| MalformedRecord::InvalidJson {
        reason: e.to_string(),
    })?;

    match payload {
        Value::Array(items) => Ok(items),
        other => Err(MalformedRecord::NotAnArray {
            found: json_kind(&other),
        }),
    }
}

/// Decode one nested user document into its flat row.
///
/// Every leaf must be present: `id` as a JSON integer that fits in 32 bits,
/// everything else as a JSON string. Extra fields are ignored.
pub fn decode(document: &Value) -> Result<UserRow, MalformedRecord> {
    let user = Fields::root(document)?;
    let address = user.nested("address")?;
    let geo = address.nested("geo")?;
    let company = user.nested("company")?;

    Ok(UserRow {
        id: user.integer("id")?,
        name: user.text("name")?,
        username: user.text("username")?,
        email: user.text("email")?,
        street: address.text("street")?,
        suite: address.text("suite")?,
        city: address.text("city")?,
        zipcode: address.text("zipcode")?,
        lat: geo.text("lat")?,
        lng: geo.text("lng")?,
        phone: user.text("phone")?,
        website: user.text("website")?,
        company_name: company.text("name")?,
        company_catch_phrase: company.text("catchPhrase")?,
        company_bs: company.text("bs")?,
    })
}

/// Rebuild the nested document from a stored row.
pub fn encode(row: UserRow) -> UserDocument {
    UserDocument {
        id: row.id,
        name: row.name,
        username: row.username,
        email: row.email,
        address: Address {
            street: row.street,
            suite: row.suite,
            city: row.city,
            zipcode: row.zipcode,
            geo: Geo {
                lat: row.lat,
                lng: row.lng,
            },
        },
        phone: row.phone,
        website: row.website,
        company: Company {
            name: row.company_name,
            catch_phrase: row.company_catch_phrase,
            bs: row.company_bs,
        },
    }
}

impl From<UserRow> for UserDocument {
    fn from(row: UserRow) -> Self {
        encode(row)
    }
}

/// One JSON object level, remembering where it sits in the document.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    path: String,
}

impl<'a> Fields<'a> {
    fn root(value: &'a Value) -> Result<Self, MalformedRecord> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                path: String::new(),
            }),
            _ => Err(MalformedRecord::WrongType {
                path: String::new(),
                expected: "a JSON object",
            }),
        }
    }

    fn path_of(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_owned()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn get(&self, key: &str) -> Result<&'a Value, MalformedRecord> {
        self.object
            .get(key)
            .ok_or_else(|| MalformedRecord::Missing {
                path: self.path_of(key),
            })
    }

    fn nested(&self, key: &str) -> Result<Fields<'a>, MalformedRecord> {
        match self.get(key)? {
            Value::Object(object) => Ok(Fields {
                object,
                path: self.path_of(key),
            }),
            _ => Err(MalformedRecord::WrongType {
                path: self.path_of(key),
                expected: "an object",
            }),
        }
    }

    fn text(&self, key: &str) -> Result<String, MalformedRecord> {
        match self.get(key)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(MalformedRecord::WrongType {
                path: self.path_of(key),
                expected: "a string",
            }),
        }
    }

    fn integer(&self, key: &str) -> Result<i32, MalformedRecord> {
        self.get(key)?
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| MalformedRecord::WrongType {
                path: self.path_of(key),
                expected: "a 32-bit integer",
            })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

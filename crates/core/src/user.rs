use serde::{Deserialize, Deserializer, Serialize};

use crate::{DomainError, DomainResult, UserId};

/// A stored user record.
///
/// Once constructed through [`User::create`], `name`, `username` and `email`
/// are never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Create input as it arrives from a client.
///
/// Every field is optional at the type level so a missing field is reported
/// as a validation failure rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserFields {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Partial update.
///
/// Absent fields are left unchanged. `phone` distinguishes absent (`None`)
/// from an explicit `null` (`Some(None)`), which clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub phone: Option<Option<String>>,
}

fn present_or_null<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

impl User {
    /// Validate create input and build the record under `id`.
    ///
    /// All missing or blank required fields are reported together.
    pub fn create(id: UserId, fields: UserFields) -> DomainResult<Self> {
        let missing: Vec<&str> = [
            ("name", fields.name.as_deref()),
            ("username", fields.username.as_deref()),
            ("email", fields.email.as_deref()),
        ]
        .into_iter()
        .filter(|(_, v)| is_blank(*v))
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(DomainError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        // Checked above; the defaults are unreachable.
        Ok(Self {
            id,
            name: fields.name.unwrap_or_default(),
            username: fields.username.unwrap_or_default(),
            email: fields.email.unwrap_or_default(),
            phone: fields.phone.filter(|p| !p.trim().is_empty()),
        })
    }

    /// Apply a partial update in place. The identifier never changes.
    pub fn apply(&mut self, patch: &UserPatch) -> DomainResult<()> {
        patch.validate()?;

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(username) = &patch.username {
            self.username = username.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone().filter(|p| !p.trim().is_empty());
        }
        Ok(())
    }
}

impl UserPatch {
    /// A supplied required field must not be blank. Absent fields are fine.
    pub fn validate(&self) -> DomainResult<()> {
        let blank: Vec<&str> = [
            ("name", self.name.as_deref()),
            ("username", self.username.as_deref()),
            ("email", self.email.as_deref()),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_some() && is_blank(*v))
        .map(|(field, _)| field)
        .collect();

        if blank.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!(
                "fields cannot be empty: {}",
                blank.join(", ")
            )))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.username.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

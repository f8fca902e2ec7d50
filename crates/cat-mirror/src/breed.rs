use std::fmt;

use serde::{Deserialize, Serialize};

use crate::repository::RepositoryError;

const MAX_ID_LEN: usize = 10;
const MAX_NAME_LEN: usize = 100;
const MAX_ORIGIN_LEN: usize = 100;
const MAX_LIFE_SPAN_LEN: usize = 50;
const MAX_REFERENCE_IMAGE_LEN: usize = 50;

/// Provider-assigned short code identifying a breed (e.g. `abys`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreedId(String);

impl BreedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BreedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cat breed mirrored from the upstream catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breed {
    pub id: BreedId,
    pub name: String,
    pub temperament: Option<String>,
    pub origin: Option<String>,
    pub description: Option<String>,
    pub life_span: Option<String>,
    pub wikipedia_url: Option<String>,
    pub reference_image_id: Option<String>,
}

impl Breed {
    /// A breed with only the required fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: BreedId::new(id),
            name: name.into(),
            temperament: None,
            origin: None,
            description: None,
            life_span: None,
            wikipedia_url: None,
            reference_image_id: None,
        }
    }

    /// Check the column constraints a breed row must satisfy before it is
    /// written.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        let id = self.id.as_str();
        if id.trim().is_empty() {
            return Err(RepositoryError::Constraint("breed id is blank".into()));
        }
        check_len("breed id", id, MAX_ID_LEN)?;

        if self.name.trim().is_empty() {
            return Err(RepositoryError::Constraint(format!(
                "breed {id}: name is blank"
            )));
        }
        check_len("breed name", &self.name, MAX_NAME_LEN)?;

        if let Some(origin) = &self.origin {
            check_len("breed origin", origin, MAX_ORIGIN_LEN)?;
        }
        if let Some(life_span) = &self.life_span {
            check_len("breed life span", life_span, MAX_LIFE_SPAN_LEN)?;
        }
        if let Some(reference) = &self.reference_image_id {
            check_len("breed reference image id", reference, MAX_REFERENCE_IMAGE_LEN)?;
        }

        if let Some(raw) = &self.wikipedia_url {
            url::Url::parse(raw).map_err(|e| {
                RepositoryError::Constraint(format!("breed {id}: invalid wikipedia url {raw:?}: {e}"))
            })?;
        }

        Ok(())
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), RepositoryError> {
    let len = value.chars().count();
    if len > max {
        return Err(RepositoryError::Constraint(format!(
            "{field} is {len} characters (max {max})"
        )));
    }
    Ok(())
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::breed::BreedId;
use crate::repository::RepositoryError;

/// Provider-assigned image identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an image was collected for: a specific breed, or one of the two
/// fixed special categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageCategory {
    Breed,
    Hats,
    Sunglasses,
}

impl ImageCategory {
    /// The special categories mirrored independently of any breed, with
    /// the provider's numeric code for each.
    pub const SPECIAL: [(ImageCategory, u32); 2] = [(Self::Hats, 1), (Self::Sunglasses, 4)];

    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breed => "BREED",
            Self::Hats => "HATS",
            Self::Sunglasses => "SUNGLASSES",
        }
    }

    /// The provider's numeric category code. Breed images are searched by
    /// breed id instead and have no code.
    pub fn upstream_code(&self) -> Option<u32> {
        Self::SPECIAL
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, code)| *code)
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown image category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ImageCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BREED" => Ok(Self::Breed),
            "HATS" => Ok(Self::Hats),
            "SUNGLASSES" => Ok(Self::Sunglasses),
            _ => Err(UnknownCategory(s.to_owned())),
        }
    }
}

/// A picture record, tied either to a breed or to a special category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ImageId,
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub category: ImageCategory,
    pub breed_id: Option<BreedId>,
}

impl Image {
    /// `category == Breed` if and only if `breed_id` is set; url must be
    /// non-blank.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.id.as_str().trim().is_empty() {
            return Err(RepositoryError::Constraint("image id is blank".into()));
        }
        if self.url.trim().is_empty() {
            return Err(RepositoryError::Constraint(format!(
                "image {}: url is blank",
                self.id
            )));
        }

        match (self.category, &self.breed_id) {
            (ImageCategory::Breed, None) => Err(RepositoryError::Constraint(format!(
                "image {}: breed image without a breed",
                self.id
            ))),
            (ImageCategory::Hats | ImageCategory::Sunglasses, Some(breed)) => {
                Err(RepositoryError::Constraint(format!(
                    "image {}: {} image must not reference breed {breed}",
                    self.id, self.category
                )))
            }
            _ => Ok(()),
        }
    }
}

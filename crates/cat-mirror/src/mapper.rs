//! Conversion from upstream transfer records to stored records.

use crate::breed::{Breed, BreedId};
use crate::image::{Image, ImageCategory, ImageId};
use crate::record::{BreedRecord, ImageRecord};

/// Copy a breed record field for field.
pub fn to_breed(record: BreedRecord) -> Breed {
    Breed {
        id: BreedId::new(record.id),
        name: record.name,
        temperament: record.temperament,
        origin: record.origin,
        description: record.description,
        life_span: record.life_span,
        wikipedia_url: record.wikipedia_url,
        reference_image_id: record.reference_image_id,
    }
}

/// Build an image with the given category. The breed association comes
/// from the caller, never from the breeds embedded in the record.
pub fn to_image(record: ImageRecord, category: ImageCategory, breed: Option<&BreedId>) -> Image {
    Image {
        id: ImageId::new(record.id),
        url: record.url,
        width: record.width,
        height: record.height,
        category,
        breed_id: breed.cloned(),
    }
}

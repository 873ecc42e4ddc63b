use super::error::check_id;
use super::{EntityKind, ValidationError};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Genre {
    id: i64,
    name: String,
}

impl Genre {
    pub fn new(id: i64, name: &str) -> Result<Self, ValidationError> {
        Ok(Genre {
            id: check_id(EntityKind::Genre, id)?,
            name: name.trim().to_string(),
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Genre {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Genre {}

impl Hash for Genre {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

use super::error::check_id;
use super::{EntityKind, ValidationError};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct Artist {
    id: i64,
    full_name: String,
}

impl Artist {
    pub fn new(id: i64, full_name: &str) -> Result<Self, ValidationError> {
        Ok(Artist {
            id: check_id(EntityKind::Artist, id)?,
            full_name: full_name.trim().to_string(),
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn set_full_name(&mut self, full_name: &str) {
        self.full_name = full_name.trim().to_string();
    }
}

impl PartialEq for Artist {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Artist {}

impl Hash for Artist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_is_by_id() {
        let a = Artist::new(1, "AWOL").unwrap();
        let b = Artist::new(1, "  Someone else ").unwrap();
        assert_eq!(a, b);
        assert_eq!(b.full_name(), "Someone else");

        let set: HashSet<Artist> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn rejects_negative_id() {
        assert!(Artist::new(-1, "x").is_err());
    }
}

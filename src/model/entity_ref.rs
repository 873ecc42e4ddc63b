use super::{Album, Artist, Genre, Review, Track, User};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Artist,
    Album,
    Genre,
    Track,
    Review,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Genre => "genre",
            EntityKind::Track => "track",
            EntityKind::Review => "review",
        };
        f.write_str(name)
    }
}

/// A shared reference to any catalog entity, or to nothing.
///
/// The relationship setters of [`Track`] take an `EntityRef` and check its kind
/// explicitly: a reference of the wrong kind clears the relationship instead of failing.
#[derive(Debug, Clone, Default)]
pub enum EntityRef {
    #[default]
    None,
    User(Arc<User>),
    Artist(Arc<Artist>),
    Album(Arc<Album>),
    Genre(Arc<Genre>),
    Track(Arc<Track>),
    Review(Arc<Review>),
}

impl EntityRef {
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            EntityRef::None => None,
            EntityRef::User(_) => Some(EntityKind::User),
            EntityRef::Artist(_) => Some(EntityKind::Artist),
            EntityRef::Album(_) => Some(EntityKind::Album),
            EntityRef::Genre(_) => Some(EntityKind::Genre),
            EntityRef::Track(_) => Some(EntityKind::Track),
            EntityRef::Review(_) => Some(EntityKind::Review),
        }
    }
}

macro_rules! entity_ref_from {
    ($($entity:ident),*) => {
        $(
            impl From<Arc<$entity>> for EntityRef {
                fn from(value: Arc<$entity>) -> Self {
                    EntityRef::$entity(value)
                }
            }

            impl From<$entity> for EntityRef {
                fn from(value: $entity) -> Self {
                    EntityRef::$entity(Arc::new(value))
                }
            }

            impl From<Option<Arc<$entity>>> for EntityRef {
                fn from(value: Option<Arc<$entity>>) -> Self {
                    value.map_or(EntityRef::None, EntityRef::$entity)
                }
            }
        )*
    };
}

entity_ref_from!(User, Artist, Album, Genre, Track, Review);

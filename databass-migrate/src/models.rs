// Data models for the migration: entity schemas, relationship types and node attributes
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// The kinds of records that become graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Artist,
    Genre,
    Label,
    Goal,
    Release,
    Review,
    /// Derived from the `country` column of artists, labels and releases.
    Country,
}

/// Exported entity types in dependency order: every type only references
/// types that appear before it.
pub const MIGRATION_ORDER: [EntityType; 6] = [
    EntityType::Artist,
    EntityType::Genre,
    EntityType::Label,
    EntityType::Goal,
    EntityType::Release,
    EntityType::Review,
];

/// Association export listing the secondary genres of each release.
pub const RELEASE_GENRE_FILE: &str = "release_genre.csv";

/// Column holding the free-text country name on artists, labels and releases.
pub const COUNTRY_COLUMN: &str = "country";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

/// One column of an export file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    /// Row is rejected when this cell is empty.
    pub required: bool,
}

impl ColumnSpec {
    const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
            required: false,
        }
    }

    const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
            required: false,
        }
    }

    const fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
            required: true,
        }
    }
}

/// A foreign-key column and the relationship it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub target: EntityType,
    pub relation: RelationType,
}

const ARTIST_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("id"),
    ColumnSpec::required("name"),
    ColumnSpec::text("mbid"),
    ColumnSpec::text("image"),
    ColumnSpec::text("country"),
    ColumnSpec::text("type"),
    ColumnSpec::text("begin"),
    ColumnSpec::text("end"),
    ColumnSpec::text("date_added"),
];

// Labels share the artist layout in the source schema.
const LABEL_COLUMNS: &[ColumnSpec] = ARTIST_COLUMNS;

const GENRE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("id"),
    ColumnSpec::required("name"),
    ColumnSpec::text("date_added"),
];

const GOAL_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("id"),
    ColumnSpec::text("start"),
    ColumnSpec::text("end"),
    ColumnSpec::text("completed"),
    ColumnSpec::text("type"),
    ColumnSpec::integer("amount"),
    ColumnSpec::text("date_added"),
];

const RELEASE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("id"),
    ColumnSpec::required("name"),
    ColumnSpec::text("mbid"),
    ColumnSpec::text("image"),
    ColumnSpec::text("country"),
    ColumnSpec::text("artist_id"),
    ColumnSpec::text("label_id"),
    ColumnSpec::integer("year"),
    ColumnSpec::integer("runtime"),
    ColumnSpec::integer("rating"),
    ColumnSpec::text("listen_date"),
    ColumnSpec::integer("track_count"),
    ColumnSpec::text("main_genre_id"),
    ColumnSpec::text("date_added"),
];

const REVIEW_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("id"),
    ColumnSpec::text("timestamp"),
    ColumnSpec::text("text"),
    ColumnSpec::text("release_id"),
    ColumnSpec::text("date_added"),
];

const COUNTRY_COLUMNS: &[ColumnSpec] = &[ColumnSpec::required("name")];

const RELEASE_FOREIGN_KEYS: &[ForeignKey] = &[
    ForeignKey {
        column: "artist_id",
        target: EntityType::Artist,
        relation: RelationType::MadeBy,
    },
    ForeignKey {
        column: "label_id",
        target: EntityType::Label,
        relation: RelationType::ReleasedBy,
    },
    ForeignKey {
        column: "main_genre_id",
        target: EntityType::Genre,
        relation: RelationType::HasGenre,
    },
];

const REVIEW_FOREIGN_KEYS: &[ForeignKey] = &[ForeignKey {
    column: "release_id",
    target: EntityType::Release,
    relation: RelationType::IsAbout,
}];

impl EntityType {
    /// Node label in the graph.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Artist => "Artist",
            EntityType::Genre => "Genre",
            EntityType::Label => "Label",
            EntityType::Goal => "Goal",
            EntityType::Release => "Release",
            EntityType::Review => "Review",
            EntityType::Country => "Country",
        }
    }

    /// Export file name, or `None` for derived types.
    pub fn export_file(&self) -> Option<&'static str> {
        match self {
            EntityType::Artist => Some("artist.csv"),
            EntityType::Genre => Some("genre.csv"),
            EntityType::Label => Some("label.csv"),
            EntityType::Goal => Some("goal.csv"),
            EntityType::Release => Some("release.csv"),
            EntityType::Review => Some("review.csv"),
            EntityType::Country => None,
        }
    }

    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            EntityType::Artist => ARTIST_COLUMNS,
            EntityType::Genre => GENRE_COLUMNS,
            EntityType::Label => LABEL_COLUMNS,
            EntityType::Goal => GOAL_COLUMNS,
            EntityType::Release => RELEASE_COLUMNS,
            EntityType::Review => REVIEW_COLUMNS,
            EntityType::Country => COUNTRY_COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns().iter().find(|c| c.name == name)
    }

    pub fn foreign_keys(&self) -> &'static [ForeignKey] {
        match self {
            EntityType::Release => RELEASE_FOREIGN_KEYS,
            EntityType::Review => REVIEW_FOREIGN_KEYS,
            _ => &[],
        }
    }

    /// Relationship linking this entity to the country named in its row.
    pub fn country_relation(&self) -> Option<RelationType> {
        match self {
            EntityType::Artist | EntityType::Label => Some(RelationType::IsFrom),
            EntityType::Release => Some(RelationType::ReleasedIn),
            _ => None,
        }
    }

    /// Properties that must be unique among nodes of this type when set.
    pub fn unique_properties(&self) -> &'static [&'static str] {
        match self {
            EntityType::Artist
            | EntityType::Genre
            | EntityType::Label
            | EntityType::Release
            | EntityType::Country => &["mbid"],
            EntityType::Goal | EntityType::Review => &[],
        }
    }

    /// Property that identifies a node of this type, used for indexing.
    pub fn key_property(&self) -> &'static str {
        match self {
            EntityType::Country => "name",
            _ => "id",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relationship types created by the migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationType {
    MadeBy,
    ReleasedBy,
    HasGenre,
    IsAbout,
    IsFrom,
    ReleasedIn,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::MadeBy => "MADE_BY",
            RelationType::ReleasedBy => "RELEASED_BY",
            RelationType::HasGenre => "HAS_GENRE",
            RelationType::IsAbout => "IS_ABOUT",
            RelationType::IsFrom => "IS_FROM",
            RelationType::ReleasedIn => "RELEASED_IN",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque node identifier assigned by the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Text(s) => f.write_str(s),
            AttributeValue::Integer(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

/// Node properties keyed by source column name.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// One row of the release/genre association export.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseGenre {
    pub release_id: String,
    pub genre_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_order_respects_foreign_keys() {
        for (position, entity) in MIGRATION_ORDER.iter().enumerate() {
            for fk in entity.foreign_keys() {
                let target_position = MIGRATION_ORDER
                    .iter()
                    .position(|e| *e == fk.target)
                    .expect("foreign key target is exported");
                assert!(
                    target_position < position,
                    "{} references {} which is migrated later",
                    entity,
                    fk.target
                );
            }
        }
    }

    #[test]
    fn foreign_key_columns_are_part_of_the_layout() {
        for entity in MIGRATION_ORDER {
            for fk in entity.foreign_keys() {
                assert!(entity.column(fk.column).is_some(), "{}.{}", entity, fk.column);
            }
            if entity.country_relation().is_some() {
                assert!(entity.column(COUNTRY_COLUMN).is_some());
            }
        }
    }

    #[test]
    fn every_exported_entity_requires_an_id() {
        for entity in MIGRATION_ORDER {
            let id = entity.column("id").expect("id column");
            assert!(id.required);
            assert!(entity.export_file().is_some());
        }
        assert!(EntityType::Country.export_file().is_none());
    }

    #[test]
    fn exported_musicbrainz_ids_are_unique() {
        for entity in [EntityType::Artist, EntityType::Label, EntityType::Release] {
            assert_eq!(entity.unique_properties(), &["mbid"]);
            assert!(entity.column("mbid").is_some(), "{}", entity);
        }
        assert!(EntityType::Goal.unique_properties().is_empty());
        assert!(EntityType::Review.unique_properties().is_empty());
    }

    #[test]
    fn relation_names_match_graph_schema() {
        assert_eq!(RelationType::MadeBy.to_string(), "MADE_BY");
        assert_eq!(RelationType::ReleasedBy.to_string(), "RELEASED_BY");
        assert_eq!(RelationType::HasGenre.to_string(), "HAS_GENRE");
        assert_eq!(RelationType::IsAbout.to_string(), "IS_ABOUT");
        assert_eq!(EntityType::Release.to_string(), "Release");
    }
}

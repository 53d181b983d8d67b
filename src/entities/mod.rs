use std::fmt::Display;
use std::str::FromStr;

use anyhow::anyhow;
use rocket::request::FromParam;
use serde::de::DeserializeOwned;
use serde::Serialize;

mod dungeon;
mod game;
mod player;
pub mod types;

pub use dungeon::*;
pub use game::*;
pub use player::*;
pub use types::*;

/// Runs `$body` with `$t` bound to the concrete entity type of `$kind`.
macro_rules! with_entity_type {
    ($kind:expr, $t:ident => $body:expr) => {{
        use $crate::entities as __entities;
        match $kind {
            __entities::Kind::Profile => {
                type $t = __entities::Profile;
                $body
            }
            __entities::Kind::Player => {
                type $t = __entities::Player;
                $body
            }
            __entities::Kind::Pack => {
                type $t = __entities::Pack;
                $body
            }
            __entities::Kind::Card => {
                type $t = __entities::Card;
                $body
            }
            __entities::Kind::Game => {
                type $t = __entities::Game;
                $body
            }
            __entities::Kind::GameConfig => {
                type $t = __entities::GameConfig;
                $body
            }
            __entities::Kind::Map => {
                type $t = __entities::Map;
                $body
            }
            __entities::Kind::Dungeon => {
                type $t = __entities::Dungeon;
                $body
            }
            __entities::Kind::Floor => {
                type $t = __entities::Floor;
                $body
            }
            __entities::Kind::FloorConfig => {
                type $t = __entities::FloorConfig;
                $body
            }
            __entities::Kind::Prize => {
                type $t = __entities::Prize;
                $body
            }
            __entities::Kind::RoomConfig => {
                type $t = __entities::RoomConfig;
                $body
            }
            __entities::Kind::Room => {
                type $t = __entities::Room;
                $body
            }
            __entities::Kind::Challenge => {
                type $t = __entities::Challenge;
                $body
            }
            __entities::Kind::Door => {
                type $t = __entities::Door;
                $body
            }
        }
    }};
}

pub(crate) use with_entity_type;

/// Every entity the admin knows about, in the order they appear in the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Profile,
    Player,
    Pack,
    Card,
    Game,
    GameConfig,
    Map,
    Dungeon,
    Floor,
    FloorConfig,
    Prize,
    RoomConfig,
    Room,
    Challenge,
    Door,
}

impl Kind {
    pub const ALL: [Kind; 15] = [
        Kind::Profile,
        Kind::Player,
        Kind::Pack,
        Kind::Card,
        Kind::Game,
        Kind::GameConfig,
        Kind::Map,
        Kind::Dungeon,
        Kind::Floor,
        Kind::FloorConfig,
        Kind::Prize,
        Kind::RoomConfig,
        Kind::Room,
        Kind::Challenge,
        Kind::Door,
    ];

    /// Path segment used by the admin routes.
    pub fn slug(&self) -> &'static str {
        match self {
            Kind::Profile => "profile",
            Kind::Player => "player",
            Kind::Pack => "pack",
            Kind::Card => "card",
            Kind::Game => "game",
            Kind::GameConfig => "game-config",
            Kind::Map => "map",
            Kind::Dungeon => "dungeon",
            Kind::Floor => "floor",
            Kind::FloorConfig => "floor-config",
            Kind::Prize => "prize",
            Kind::RoomConfig => "room-config",
            Kind::Room => "room",
            Kind::Challenge => "challenge",
            Kind::Door => "door",
        }
    }

    /// Collection name on the backend, `api/<resource>`.
    pub fn resource(&self) -> &'static str {
        match self {
            Kind::Profile => "profiles",
            Kind::Player => "players",
            Kind::Pack => "packs",
            Kind::Card => "cards",
            Kind::Game => "games",
            Kind::GameConfig => "game-configs",
            Kind::Map => "maps",
            Kind::Dungeon => "dungeons",
            Kind::Floor => "floors",
            Kind::FloorConfig => "floor-configs",
            Kind::Prize => "prizes",
            Kind::RoomConfig => "room-configs",
            Kind::Room => "rooms",
            Kind::Challenge => "challenges",
            Kind::Door => "doors",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Kind::Profile => "Profile",
            Kind::Player => "Player",
            Kind::Pack => "Pack",
            Kind::Card => "Card",
            Kind::Game => "Game",
            Kind::GameConfig => "Game Config",
            Kind::Map => "Map",
            Kind::Dungeon => "Dungeon",
            Kind::Floor => "Floor",
            Kind::FloorConfig => "Floor Config",
            Kind::Prize => "Prize",
            Kind::RoomConfig => "Room Config",
            Kind::Room => "Room",
            Kind::Challenge => "Challenge",
            Kind::Door => "Door",
        }
    }

    pub fn plural_title(&self) -> String {
        format!("{}s", self.title())
    }

    pub fn fields(&self) -> &'static [Field] {
        with_entity_type!(*self, T => T::FIELDS)
    }

    /// Kinds this entity's form needs as reference collections.
    pub fn references(&self) -> Vec<Kind> {
        let mut kinds = Vec::new();
        for field in self.fields() {
            if let Some(kind) = field.kind.referenced_kind() {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        kinds
    }
}

impl FromStr for Kind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| anyhow!("Unknown entity: {}", s))
    }
}

impl<'a> FromParam<'a> for Kind {
    type Error = anyhow::Error;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Kind::from_str(param)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    DateTime,
    Choice(&'static [&'static str]),
    /// A single related entity, picked from that kind's collection.
    Reference(Kind),
    /// Many related entities. Sent as a list of `{id}` objects.
    References(Kind),
}

impl FieldKind {
    pub fn referenced_kind(&self) -> Option<Kind> {
        match self {
            FieldKind::Reference(kind) | FieldKind::References(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// One editable property of an entity, named as on the wire.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub const fn number(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Number,
            required: false,
        }
    }

    pub const fn date_time(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::DateTime,
            required: false,
        }
    }

    pub const fn choice(
        name: &'static str,
        label: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Choice(values),
            required: false,
        }
    }

    pub const fn reference(name: &'static str, label: &'static str, kind: Kind) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Reference(kind),
            required: false,
        }
    }

    pub const fn references(name: &'static str, label: &'static str, kind: Kind) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::References(kind),
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }
}

pub trait HasId {
    fn id(&self) -> Option<EntityId>;
}

/// A typed backend entity.
pub trait Entity:
    HasId + Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    const KIND: Kind;
    const FIELDS: &'static [Field];
}

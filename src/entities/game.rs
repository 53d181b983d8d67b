use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityRef, Field, HasId, Kind};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Game {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub game_name: Option<String>,
    pub description: Option<String>,
    /// Move log, free form.
    pub moves: Option<String>,
    /// The game's [`GameConfig`].
    pub location: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps: Option<Vec<EntityRef>>,
    pub player: Option<EntityRef>,
}

/// Setup of a game. `floor_config` and `room_config` are opaque numbers, not
/// links to the config entities.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub setup_date: Option<DateTime<Utc>>,
    pub floor_config: Option<i64>,
    pub room_config: Option<i64>,
    pub date_init: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Map {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub map_name: Option<String>,
    pub description: Option<String>,
    /// Dungeons, despite the name. Kept as `tasks` since that's what the
    /// backend calls the join.
    pub tasks: Option<Vec<EntityRef>>,
    pub game: Option<EntityRef>,
}

impl HasId for Game {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Game {
    const KIND: Kind = Kind::Game;
    const FIELDS: &'static [Field] = &[
        Field::text("gameName", "Game Name").required(),
        Field::text("description", "Description"),
        Field::text("moves", "Moves"),
        Field::reference("location", "Location", Kind::GameConfig),
        Field::reference("player", "Player", Kind::Player),
    ];
}

impl HasId for GameConfig {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for GameConfig {
    const KIND: Kind = Kind::GameConfig;
    const FIELDS: &'static [Field] = &[
        Field::date_time("setupDate", "Setup Date"),
        Field::number("floorConfig", "Floor Config"),
        Field::number("roomConfig", "Room Config"),
        Field::date_time("dateInit", "Date Init"),
        Field::date_time("dateEnd", "Date End"),
    ];
}

impl HasId for Map {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Map {
    const KIND: Kind = Kind::Map;
    const FIELDS: &'static [Field] = &[
        Field::text("mapName", "Map Name").required(),
        Field::text("description", "Description"),
        Field::references("tasks", "Task", Kind::Dungeon),
        Field::reference("game", "Game", Kind::Game),
    ];
}

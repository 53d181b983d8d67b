use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChallengeType, Difficulty, Entity, EntityId, EntityRef, Field, HasId, Kind};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dungeon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub dungeon_name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floors: Option<Vec<EntityRef>>,
    /// Maps listing this dungeon in their tasks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<EntityRef>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Floor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub floor_name: Option<String>,
    /// The floor's [`FloorConfig`].
    pub location: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<EntityRef>>,
    /// The [`Dungeon`] this floor belongs to.
    #[serde(rename = "name")]
    pub dungeon: Option<EntityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FloorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub setup: Option<String>,
    pub num_of_rooms: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Room {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub intro_text: Option<String>,
    pub room_name: Option<String>,
    /// The room's [`RoomConfig`].
    pub location: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors: Option<Vec<EntityRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenges: Option<Vec<EntityRef>>,
    /// The [`Floor`] this room is on.
    #[serde(rename = "name")]
    pub floor: Option<EntityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub setup: Option<String>,
    pub num_of_doors: Option<i64>,
    pub num_of_prizes: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Door {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub door_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prizes: Option<Vec<EntityRef>>,
    #[serde(rename = "name")]
    pub room: Option<EntityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Prize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub prize_name: Option<String>,
    pub pips: Option<i64>,
    pub expire_date: Option<DateTime<Utc>>,
    #[serde(rename = "name")]
    pub door: Option<EntityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Challenge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub intro_text: Option<String>,
    #[serde(rename = "challengeName")]
    pub challenge_type: Option<ChallengeType>,
    pub difficulty: Option<Difficulty>,
    #[serde(rename = "name")]
    pub room: Option<EntityRef>,
}

impl HasId for Dungeon {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Dungeon {
    const KIND: Kind = Kind::Dungeon;
    const FIELDS: &'static [Field] = &[
        Field::text("dungeonName", "Dungeon Name").required(),
        Field::date_time("startDate", "Start Date"),
        Field::date_time("endDate", "End Date"),
    ];
}

impl HasId for Floor {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Floor {
    const KIND: Kind = Kind::Floor;
    const FIELDS: &'static [Field] = &[
        Field::text("floorName", "Floor Name").required(),
        Field::reference("location", "Location", Kind::FloorConfig),
        Field::reference("name", "Name", Kind::Dungeon),
    ];
}

impl HasId for FloorConfig {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for FloorConfig {
    const KIND: Kind = Kind::FloorConfig;
    const FIELDS: &'static [Field] = &[
        Field::text("setup", "Setup").required(),
        Field::number("numOfRooms", "Num Of Rooms"),
    ];
}

impl HasId for Room {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Room {
    const KIND: Kind = Kind::Room;
    const FIELDS: &'static [Field] = &[
        Field::text("introText", "Intro Text"),
        Field::text("roomName", "Room Name").required(),
        Field::reference("location", "Location", Kind::RoomConfig),
        Field::reference("name", "Name", Kind::Floor),
    ];
}

impl HasId for RoomConfig {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for RoomConfig {
    const KIND: Kind = Kind::RoomConfig;
    const FIELDS: &'static [Field] = &[
        Field::text("setup", "Setup"),
        Field::number("numOfDoors", "Num Of Doors"),
        Field::number("numOfPrizes", "Num Of Prizes"),
    ];
}

impl HasId for Door {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Door {
    const KIND: Kind = Kind::Door;
    const FIELDS: &'static [Field] = &[
        Field::text("doorName", "Door Name").required(),
        Field::reference("name", "Name", Kind::Room),
    ];
}

impl HasId for Prize {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Prize {
    const KIND: Kind = Kind::Prize;
    const FIELDS: &'static [Field] = &[
        Field::text("prizeName", "Prize Name").required(),
        Field::number("pips", "Pips"),
        Field::date_time("expireDate", "Expire Date"),
        Field::reference("name", "Name", Kind::Door),
    ];
}

impl HasId for Challenge {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Challenge {
    const KIND: Kind = Kind::Challenge;
    const FIELDS: &'static [Field] = &[
        Field::text("introText", "Intro Text").required(),
        Field::choice("challengeName", "Challenge Name", ChallengeType::ALL),
        Field::choice("difficulty", "Difficulty", Difficulty::ALL),
        Field::reference("name", "Name", Kind::Room),
    ];
}

#[cfg(test)]
mod tests {
    use super::{Challenge, Difficulty, Room};
    use crate::entities::ChallengeType;

    #[test]
    fn test_room_relations_use_wire_names() {
        let room: Room = serde_json::from_value(serde_json::json!({
            "id": "8d2b4a57-6a0c-4a7c-9c43-0f52b0c3e9d1",
            "roomName": "hall",
            "location": { "id": "1c5e8f0d-2b7a-4e8e-8a5c-3d9a7b6c5e4f", "setup": "standard" },
            "name": null,
            "doors": []
        }))
        .unwrap();

        assert_eq!(room.room_name.as_deref(), Some("hall"));
        assert!(room.location.is_some());
        assert!(room.floor.is_none());
        assert_eq!(room.doors, Some(vec![]));

        let value = serde_json::to_value(&room).unwrap();
        assert!(value["name"].is_null());
        assert_eq!(value["location"]["setup"], "standard");
        assert!(value.get("challenges").is_none());
    }

    #[test]
    fn test_challenge_enums() {
        let challenge: Challenge = serde_json::from_value(serde_json::json!({
            "introText": "a riddle",
            "challengeName": "SOURCEROUS",
            "difficulty": "MEDIUM"
        }))
        .unwrap();

        assert_eq!(challenge.challenge_type, Some(ChallengeType::Sourcerous));
        assert_eq!(challenge.difficulty, Some(Difficulty::Medium));
        assert!(serde_json::from_value::<Challenge>(serde_json::json!({
            "difficulty": "IMPOSSIBLE"
        }))
        .is_err());
    }
}

use serde::{Deserialize, Serialize};

use super::{Entity, EntityId, EntityRef, Field, HasId, Kind};

/// Player identity and ACL record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: Option<String>,
    pub auth0_user_id: Option<String>,
    pub social_network: Option<String>,
    pub acl_setup: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub nick_name: Option<String>,
    /// The player's [`Profile`].
    pub location: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<EntityRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packs: Option<Vec<EntityRef>>,
}

/// A named card deck.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pack {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub pack_name: Option<String>,
    pub deck_name: Option<String>,
    pub config_setup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<EntityRef>>,
    pub player: Option<EntityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub card_name: Option<String>,
    pub initial_pip: Option<String>,
    pub pack: Option<EntityRef>,
}

impl HasId for Profile {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Profile {
    const KIND: Kind = Kind::Profile;
    const FIELDS: &'static [Field] = &[
        Field::text("name", "Name").required(),
        Field::text("auth0UserId", "Auth 0 User Id").required(),
        Field::text("socialNetwork", "Social Network"),
        Field::text("aclSetup", "Acl Setup"),
    ];
}

impl HasId for Player {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Player {
    const KIND: Kind = Kind::Player;
    const FIELDS: &'static [Field] = &[
        Field::text("nickName", "Nick Name").required(),
        Field::reference("location", "Location", Kind::Profile),
    ];
}

impl HasId for Pack {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Pack {
    const KIND: Kind = Kind::Pack;
    const FIELDS: &'static [Field] = &[
        Field::text("packName", "Pack Name").required(),
        Field::text("deckName", "Deck Name"),
        Field::text("configSetup", "Config Setup"),
        Field::reference("player", "Player", Kind::Player),
    ];
}

impl HasId for Card {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

impl Entity for Card {
    const KIND: Kind = Kind::Card;
    const FIELDS: &'static [Field] = &[
        Field::text("cardName", "Card Name"),
        Field::text("initialPip", "Initial Pip"),
        Field::reference("pack", "Pack", Kind::Pack),
    ];
}

use anyhow::bail;
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

/// Identity of any entity. Always assigned by the backend.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl From<Uuid> for EntityId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl<'a> FromParam<'a> for EntityId {
    type Error = <Uuid as FromParam<'a>>::Error;

    fn from_param(param: &'a str) -> std::result::Result<Self, Self::Error> {
        Ok(Self(Uuid::from_param(param)?))
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A related entity as it travels on the wire: an object carrying at least an
/// `id`. Whatever else the backend nested in there is kept so a full
/// replacement sends it back untouched.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct EntityRef {
    pub id: EntityId,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl EntityRef {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            rest: serde_json::Map::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeType {
    Strong,
    Sourcerous,
}

impl ChallengeType {
    pub const ALL: &'static [&'static str] = &["STRONG", "SOURCEROUS"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeType::Strong => "STRONG",
            ChallengeType::Sourcerous => "SOURCEROUS",
        }
    }
}

impl FromStr for ChallengeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "STRONG" => Self::Strong,
            "SOURCEROUS" => Self::Sourcerous,
            other => bail!("Unknown variant for ChallengeType: {}", other),
        })
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl Difficulty {
    pub const ALL: &'static [&'static str] = &["LOW", "MEDIUM", "HIGH"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Low => "LOW",
            Difficulty::Medium => "MEDIUM",
            Difficulty::High => "HIGH",
        }
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            other => bail!("Unknown variant for Difficulty: {}", other),
        })
    }
}

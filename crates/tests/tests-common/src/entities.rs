//! The Member and Team entities and the paths used to query them.

use querydsl::entity::attribute;
use querydsl::{Entity, EntityPath, EntityRecord, Error, Lazy, Value};

pub fn member() -> EntityPath {
    EntityPath::new("Member", "member")
}

pub fn team() -> EntityPath {
    EntityPath::new("Team", "team")
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Team {
    pub id: Option<i64>,
    pub name: String,
}

impl Team {
    pub fn new(name: &str) -> Team {
        Team {
            id: None,
            name: name.to_string(),
        }
    }
}

impl Entity for Team {
    const ENTITY: &'static str = "Team";

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn set_key(&mut self, key: i64) {
        self.id = Some(key);
    }

    fn from_record(record: &EntityRecord) -> Result<Self, Error> {
        Ok(Team {
            id: Some(record.key),
            name: attribute(record, "name")?,
        })
    }

    fn values(&self) -> Vec<(String, Value)> {
        vec![("name".to_string(), Value::from(self.name.as_str()))]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Member {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub age: i32,
    pub team: Lazy<Team>,
}

impl Member {
    pub fn new(username: Option<&str>, age: i32, team: Option<&Team>) -> Member {
        Member {
            id: None,
            username: username.map(ToString::to_string),
            age,
            team: team.map_or(Lazy::Absent, |team| Lazy::of(team.clone())),
        }
    }

    /// A member without a team, aged zero.
    pub fn named(username: &str) -> Member {
        Member::new(Some(username), 0, None)
    }
}

impl Entity for Member {
    const ENTITY: &'static str = "Member";

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn set_key(&mut self, key: i64) {
        self.id = Some(key);
    }

    fn from_record(record: &EntityRecord) -> Result<Self, Error> {
        Ok(Member {
            id: Some(record.key),
            username: attribute(record, "username")?,
            age: attribute(record, "age")?,
            team: Lazy::from_record(record, "team")?,
        })
    }

    fn values(&self) -> Vec<(String, Value)> {
        vec![
            ("username".to_string(), Value::from(self.username.clone())),
            ("age".to_string(), Value::from(self.age)),
            ("team".to_string(), Value::from(self.team.key())),
        ]
    }
}

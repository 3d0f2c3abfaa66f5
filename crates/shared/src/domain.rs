use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ElectionId);
id_newtype!(CandidateId);

/// Profile of the signed-in voter, as returned by `/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

impl Election {
    pub fn activity_label(&self) -> &'static str {
        if self.is_active {
            "active"
        } else {
            "inactive"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn election_defaults_missing_optional_fields() {
        let election: Election =
            serde_json::from_str(r#"{"id":3,"title":"Board"}"#).expect("election");
        assert_eq!(election.id, ElectionId(3));
        assert_eq!(election.description, "");
        assert!(!election.is_active);
        assert_eq!(election.activity_label(), "inactive");
    }

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let candidate = Candidate {
            id: CandidateId(9),
            name: "A".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&candidate).expect("json"),
            r#"{"id":9,"name":"A"}"#
        );
        assert_eq!(ElectionId(12).to_string(), "12");
    }
}

//! Study group model.

use super::Pagination;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Where the group meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupLocation {
    Online,
    Presencial,
}

impl GroupLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupLocation::Online => "online",
            GroupLocation::Presencial => "presencial",
        }
    }
}

impl std::str::FromStr for GroupLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" | "remote" | "remoto" => Ok(GroupLocation::Online),
            "presencial" | "in-person" => Ok(GroupLocation::Presencial),
            other => Err(format!("Unknown location: {}", other)),
        }
    }
}

/// Capacity status shown next to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    Available,
    AlmostFull,
    Full,
}

impl GroupStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GroupStatus::Available => "available",
            GroupStatus::AlmostFull => "almost full",
            GroupStatus::Full => "full",
        }
    }
}

/// A study group as listed by search and "my groups".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyGroup {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "materia")]
    pub subject: String,
    #[serde(rename = "objetivo")]
    pub objective: String,
    #[serde(rename = "local")]
    pub location: GroupLocation,
    #[serde(rename = "participantes_atual")]
    pub participant_count: u32,
    #[serde(rename = "limite_participantes")]
    pub participant_limit: u32,
    #[serde(rename = "criador_id", default)]
    pub creator_id: Option<u64>,
    #[serde(rename = "criador_nome", default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl StudyGroup {
    pub fn is_full(&self) -> bool {
        self.participant_count >= self.participant_limit
    }

    /// Full at the limit, almost full from 80% of it.
    pub fn status(&self) -> GroupStatus {
        if self.is_full() {
            GroupStatus::Full
        } else if u64::from(self.participant_count) * 5 >= u64::from(self.participant_limit) * 4 {
            GroupStatus::AlmostFull
        } else {
            GroupStatus::Available
        }
    }

    pub fn open_seats(&self) -> u32 {
        self.participant_limit.saturating_sub(self.participant_count)
    }
}

/// Role of a participant inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Admin,
    Membro,
}

/// A member of a study group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "curso", default)]
    pub course: Option<String>,
    #[serde(rename = "periodo", default)]
    pub period: Option<String>,
    #[serde(default, alias = "foto_perfil")]
    pub avatar: Option<String>,
    #[serde(rename = "papel")]
    pub role: ParticipantRole,
    #[serde(rename = "data_entrada", default)]
    pub joined_at: Option<String>,
}

/// A group together with its participant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDetails {
    #[serde(rename = "grupo")]
    pub group: StudyGroup,
    #[serde(rename = "participantes", default)]
    pub participants: Vec<Participant>,
}

impl GroupDetails {
    pub fn is_member(&self, user_id: u64) -> bool {
        self.participants.iter().any(|p| p.id == user_id)
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.participants
            .iter()
            .any(|p| p.id == user_id && p.role == ParticipantRole::Admin)
    }
}

/// Body for creating a group.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NewGroup {
    #[serde(rename = "nome")]
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    pub name: String,
    #[serde(rename = "materia")]
    #[validate(custom(function = "crate::validation::known_subject"))]
    pub subject: String,
    #[serde(rename = "objetivo")]
    #[validate(length(
        min = 10,
        max = 500,
        message = "Objective must be between 10 and 500 characters"
    ))]
    pub objective: String,
    #[serde(rename = "local")]
    pub location: GroupLocation,
    #[serde(rename = "limite_participantes")]
    #[validate(range(min = 2, max = 50, message = "Limit must be between 2 and 50 participants"))]
    pub participant_limit: u32,
}

impl NewGroup {
    /// Build a group request from form input, trimming free text.
    pub fn new(
        name: &str,
        subject: &str,
        objective: &str,
        location: GroupLocation,
        participant_limit: u32,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            subject: subject.trim().to_string(),
            objective: objective.trim().to_string(),
            location,
            participant_limit,
        }
    }
}

/// Sparse search filters. Unset or empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupFilters {
    pub subject: Option<String>,
    pub location: Option<GroupLocation>,
    pub text: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl GroupFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = crate::query::SparseQuery::new();
        query
            .push("materia", self.subject.as_deref())
            .push("local", self.location.map(|l| l.as_str()))
            .push("texto", self.text.as_deref())
            .push("pagina", self.page)
            .push("limite", self.per_page);
        query.into_pairs()
    }
}

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupPage {
    #[serde(rename = "grupos", default)]
    pub groups: Vec<StudyGroup>,
    #[serde(rename = "paginacao", default)]
    pub pagination: Pagination,
}

/// The caller's own groups.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupList {
    #[serde(rename = "grupos", default)]
    pub groups: Vec<StudyGroup>,
}

/// Response to group creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedGroup {
    #[serde(rename = "grupo")]
    pub group: StudyGroup,
}

/// Participant listing; wrapped or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParticipantList {
    Wrapped {
        #[serde(rename = "participantes")]
        participants: Vec<Participant>,
    },
    Bare(Vec<Participant>),
}

impl ParticipantList {
    pub fn into_vec(self) -> Vec<Participant> {
        match self {
            ParticipantList::Wrapped { participants } => participants,
            ParticipantList::Bare(participants) => participants,
        }
    }
}

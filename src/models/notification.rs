//! Notifications generated by the server about group activity.

use super::Pagination;
use serde::{Deserialize, Serialize};

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "nova_mensagem")]
    NewMessage,
    #[serde(rename = "novo_membro")]
    NewMember,
    #[serde(rename = "alteracao_grupo")]
    GroupChange,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewMessage => "nova_mensagem",
            NotificationKind::NewMember => "novo_membro",
            NotificationKind::GroupChange => "alteracao_grupo",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nova_mensagem" | "new-message" => Ok(NotificationKind::NewMessage),
            "novo_membro" | "new-member" => Ok(NotificationKind::NewMember),
            "alteracao_grupo" | "group-change" => Ok(NotificationKind::GroupChange),
            other => Err(format!("Unknown notification type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    #[serde(rename = "usuario_id", default)]
    pub recipient_id: Option<u64>,
    #[serde(rename = "tipo")]
    pub kind: NotificationKind,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "conteudo")]
    pub content: String,
    #[serde(rename = "lida", default)]
    pub read: bool,
    #[serde(rename = "grupo_id", default)]
    pub group_id: Option<u64>,
    #[serde(rename = "grupo_nome", default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Sparse notification filters.
///
/// `read` is tri-state: `Some(false)` asks for unread notifications only, so
/// it is sent whenever it is defined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFilters {
    pub read: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl NotificationFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = crate::query::SparseQuery::new();
        query
            .push_defined("lida", self.read)
            .push("pagina", self.page)
            .push("limite", self.per_page);
        query.into_pairs()
    }
}

/// Read/unread counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStats {
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "totalNaoLidas", default)]
    pub unread: u64,
    #[serde(rename = "totalLidas", default)]
    pub read: u64,
}

/// One page of notifications plus the caller's counters.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationPage {
    #[serde(rename = "notificacoes", default)]
    pub notifications: Vec<Notification>,
    #[serde(rename = "paginacao", default)]
    pub pagination: Pagination,
    #[serde(rename = "estatisticas", default)]
    pub stats: Option<NotificationStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatsEnvelope {
    #[serde(rename = "estatisticas", default)]
    pub stats: NotificationStats,
}

//! Group chat messages.

use super::Pagination;
use serde::{Deserialize, Serialize};

/// A message posted to a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    #[serde(rename = "grupo_id", default)]
    pub group_id: Option<u64>,
    #[serde(rename = "usuario_id")]
    pub author_id: u64,
    #[serde(rename = "usuario_nome", default)]
    pub author_name: Option<String>,
    #[serde(rename = "usuario_avatar", default)]
    pub author_avatar: Option<String>,
    #[serde(rename = "usuario_curso", default)]
    pub author_course: Option<String>,
    #[serde(rename = "usuario_periodo", default)]
    pub author_period: Option<String>,
    #[serde(rename = "conteudo")]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewMessage<'a> {
    #[serde(rename = "conteudo")]
    pub content: &'a str,
}

/// One page of a group's messages.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePage {
    #[serde(rename = "mensagens", default)]
    pub messages: Vec<Message>,
    #[serde(rename = "paginacao", default)]
    pub pagination: Pagination,
}

/// Response to posting a message.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    #[serde(rename = "mensagem")]
    pub message: Message,
}

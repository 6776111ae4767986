//! Pagination metadata returned by list endpoints.

use serde::{Deserialize, Serialize};

/// Page position reported by the server.
///
/// No consistency is promised across pages; items may shift between
/// requests if the underlying data changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(rename = "pagina", alias = "paginaAtual", default)]
    pub page: u32,
    #[serde(rename = "limite", default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "total_paginas", alias = "totalPaginas", default)]
    pub total_pages: u32,
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

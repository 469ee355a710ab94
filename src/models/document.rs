use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::line::{ExportLine, LineItem, LivraisonLine};

/// 资源类型 (用于变更通知与 API 路径)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resource {
    Export,
    Livraison,
    ClientModel,
    Commande,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Export => "export",
            Resource::Livraison => "livraison",
            Resource::ClientModel => "client-model",
            Resource::Commande => "commande",
        }
    }

    pub fn api_path(&self) -> String {
        format!("/api/{}", self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 持有行集合的父单据
pub trait LineDocument: Clone + fmt::Debug + Send + Sync {
    type Line: LineItem;

    const RESOURCE: Resource;

    /// 空字符串表示尚未持久化
    fn id(&self) -> &str;

    fn owner_email(&self) -> &str;

    fn lines(&self) -> &[Self::Line];

    /// 整体替换行集合, 返回新单据
    fn with_lines(&self, lines: Vec<Self::Line>) -> Self;

    fn with_id(self, id: String) -> Self;

    fn is_new(&self) -> bool {
        self.id().is_empty()
    }
}

/// 出口申报单 (DeclarationExport)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDeclaration {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub declaration_date: Option<NaiveDate>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[sqlx(skip)]
    pub lines: Vec<ExportLine>,
}

impl ExportDeclaration {
    pub fn new(email: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            email: email.into(),
            client_name: client_name.into(),
            client_id: None,
            declaration_date: None,
            lot_number: None,
            created_at: None,
            lines: Vec::new(),
        }
    }
}

impl LineDocument for ExportDeclaration {
    type Line = ExportLine;

    const RESOURCE: Resource = Resource::Export;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_email(&self) -> &str {
        &self.email
    }

    fn lines(&self) -> &[ExportLine] {
        &self.lines
    }

    fn with_lines(&self, lines: Vec<ExportLine>) -> Self {
        Self {
            lines,
            ..self.clone_header()
        }
    }

    fn with_id(self, id: String) -> Self {
        Self { id, ..self }
    }
}

impl ExportDeclaration {
    fn clone_header(&self) -> Self {
        Self {
            id: self.id.clone(),
            email: self.email.clone(),
            client_name: self.client_name.clone(),
            client_id: self.client_id.clone(),
            declaration_date: self.declaration_date,
            lot_number: self.lot_number.clone(),
            created_at: self.created_at,
            lines: Vec::new(),
        }
    }
}

/// 交货单 (Livraison)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Livraison {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[sqlx(skip)]
    pub lines: Vec<LivraisonLine>,
}

impl Livraison {
    pub fn new(email: impl Into<String>, client_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            email: email.into(),
            client_name: client_name.into(),
            delivery_date: None,
            created_at: None,
            lines: Vec::new(),
        }
    }
}

impl LineDocument for Livraison {
    type Line = LivraisonLine;

    const RESOURCE: Resource = Resource::Livraison;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_email(&self) -> &str {
        &self.email
    }

    fn lines(&self) -> &[LivraisonLine] {
        &self.lines
    }

    fn with_lines(&self, lines: Vec<LivraisonLine>) -> Self {
        Self {
            id: self.id.clone(),
            email: self.email.clone(),
            client_name: self.client_name.clone(),
            delivery_date: self.delivery_date,
            created_at: self.created_at,
            lines,
        }
    }

    fn with_id(self, id: String) -> Self {
        Self { id, ..self }
    }
}

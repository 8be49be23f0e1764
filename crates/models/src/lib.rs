use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Debt record and payloads

/// Lifecycle state of a debt. Wire values match the `situacao` column
/// of the remote `debts` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtStatus {
    #[serde(rename = "Aberta")]
    Open,
    #[serde(rename = "Fechada")]
    Closed,
}

/// A tracked debt as stored remotely and mirrored in the local cache.
///
/// `id` and `created_at` are assigned by the store on insert and never
/// change afterwards. `valor` stays non-negative: adjustments that would
/// drive it below zero clamp at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub descricao: String,
    pub credor: String,
    pub valor: f64,
    pub data_limite: Option<NaiveDate>,
    #[serde(default)]
    pub obs: String,
    pub situacao: DebtStatus,
}

impl Debt {
    pub fn is_open(&self) -> bool {
        self.situacao == DebtStatus::Open
    }
}

/// Insert payload. `situacao` is carried explicitly so a new row is always
/// `Aberta` regardless of table defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDebt {
    pub descricao: String,
    pub credor: String,
    pub valor: f64,
    pub data_limite: Option<NaiveDate>,
    pub obs: String,
    pub situacao: DebtStatus,
}

/// Partial update for a single row. Unset fields are skipped during
/// serialization, so a one-field patch touches exactly one column.
///
/// `data_limite` is doubly optional: the outer `None` leaves the column
/// alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebtPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_limite: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub situacao: Option<DebtStatus>,
}

impl DebtPatch {
    /// Patch that marks a debt as paid.
    pub fn settle() -> Self {
        Self {
            situacao: Some(DebtStatus::Closed),
            ..Self::default()
        }
    }

    /// Patch that rewrites only the amount.
    pub fn amount(valor: f64) -> Self {
        Self {
            valor: Some(valor),
            ..Self::default()
        }
    }

    /// Patch for the edit path: description, creditor, due date and notes.
    /// Never carries `valor`; the amount is immutable once created.
    pub fn details(
        descricao: String,
        credor: String,
        data_limite: Option<NaiveDate>,
        obs: String,
    ) -> Self {
        Self {
            descricao: Some(descricao),
            credor: Some(credor),
            data_limite: Some(data_limite),
            obs: Some(obs),
            ..Self::default()
        }
    }
}

/// Data collected by the debt form before it becomes an insert or an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtDraft {
    pub descricao: String,
    pub credor: String,
    pub valor: f64,
    pub data_limite: Option<NaiveDate>,
    pub obs: String,
}

impl From<DebtDraft> for NewDebt {
    fn from(draft: DebtDraft) -> Self {
        NewDebt {
            descricao: draft.descricao,
            credor: draft.credor,
            valor: draft.valor,
            data_limite: draft.data_limite,
            obs: draft.obs,
            situacao: DebtStatus::Open,
        }
    }
}

/// Sort debts in-place by `data_limite` ascending.
///
/// Sorting is stable. Debts without a due date are placed at the end,
/// preserving their relative order. Matches the store's server-side
/// `order=data_limite.asc.nullslast`.
pub fn sort_by_due_date(debts: &mut [Debt]) {
    debts.sort_by(|a, b| match (a.data_limite, b.data_limite) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

// Derived statistics

/// Dashboard numbers derived from the cached debt list. Pure projection,
/// recomputed on demand and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_debt: f64,
    pub total_paid: f64,
    pub pending_count: usize,
    pub urgent_count: usize,
}

impl DashboardStats {
    /// Computes the stats as of `today`. A debt is urgent when it is open
    /// and due within the next 7 days inclusive; overdue debts count too.
    /// Debts without a due date are never urgent.
    pub fn compute(debts: &[Debt], today: NaiveDate) -> Self {
        let deadline = today + Duration::days(7);

        let mut stats = DashboardStats {
            total_debt: 0.0,
            total_paid: 0.0,
            pending_count: 0,
            urgent_count: 0,
        };

        for debt in debts {
            match debt.situacao {
                DebtStatus::Open => {
                    stats.total_debt += debt.valor;
                    stats.pending_count += 1;
                    if debt.data_limite.is_some_and(|due| due <= deadline) {
                        stats.urgent_count += 1;
                    }
                }
                DebtStatus::Closed => stats.total_paid += debt.valor,
            }
        }

        stats
    }
}

// Settings models

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
}

pub fn default_gemini_model() -> String {
    "gemini-3-flash-preview".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub supabase: SupabaseSettings,
    pub gemini: GeminiSettings,
}

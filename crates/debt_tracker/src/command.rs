use models::{Debt, DebtDraft, DebtStatus};

/// Which slice of the cache the list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Open,
    Closed,
    All,
}

impl StatusFilter {
    pub fn matches(self, debt: &Debt) -> bool {
        match self {
            StatusFilter::Open => debt.situacao == DebtStatus::Open,
            StatusFilter::Closed => debt.situacao == DebtStatus::Closed,
            StatusFilter::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustKind {
    Increase,
    Decrease,
}

/// At most one modal is open at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalKind {
    Form { editing: Option<String> },
    ConfirmSettle(String),
    ConfirmDelete(String),
    Adjust { id: String, kind: AdjustKind },
}

/// A user action. Every interaction with the tracker goes through one of
/// these, consumed by `DebtTracker::dispatch`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Refresh,
    SetFilter(StatusFilter),
    OpenForm,
    EditDebt(String),
    RequestSettle(String),
    RequestDelete(String),
    RequestAdjust { id: String, kind: AdjustKind },
    CancelModal,
    ConfirmSettle,
    ConfirmDelete,
    SubmitAdjustment(f64),
    SubmitForm(DebtDraft),
}

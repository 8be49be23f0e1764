//! The optimistic mutation controller.
//!
//! Keeps a locally cached list of debts approximately synchronized with the
//! remote store. Every mutation applies its change to the cache first for
//! immediate feedback, then issues the remote call; when the store rejects
//! the call the cache is not patched back, it is re-fetched wholesale so
//! local and remote state cannot drift apart after partial failures.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use ai_client::TextModel;
use debt_store::{DebtStore, StoreError};
use models::{DashboardStats, Debt, DebtDraft, DebtPatch, DebtStatus, NewDebt};

use crate::command::{AdjustKind, Command, ModalKind, StatusFilter};
use crate::error::{Result, TrackerError};

pub struct DebtTracker {
    store: Arc<dyn DebtStore>,
    records: Vec<Debt>,
    filter: StatusFilter,
    pending_modal: Option<ModalKind>,
}

impl DebtTracker {
    pub fn new(store: Arc<dyn DebtStore>) -> Self {
        Self {
            store,
            records: Vec::new(),
            filter: StatusFilter::Open,
            pending_modal: None,
        }
    }

    // State accessors. The cache is only mutated through dispatch and the
    // operations below; `&mut self` serializes them, so two optimistic
    // mutations on the same record can never be in flight together.

    pub fn records(&self) -> &[Debt] {
        &self.records
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn pending_modal(&self) -> Option<&ModalKind> {
        self.pending_modal.as_ref()
    }

    pub fn visible(&self) -> Vec<&Debt> {
        self.records
            .iter()
            .filter(|d| self.filter.matches(d))
            .collect()
    }

    pub fn count_for(&self, filter: StatusFilter) -> usize {
        self.records.iter().filter(|d| filter.matches(d)).count()
    }

    pub fn stats(&self) -> DashboardStats {
        self.stats_on(Local::now().date_naive())
    }

    pub fn stats_on(&self, today: NaiveDate) -> DashboardStats {
        DashboardStats::compute(&self.records, today)
    }

    /// Whether the settle control is available for this debt. Also gates
    /// edit and adjustment, which only apply to open debts.
    pub fn can_settle(&self, id: &str) -> bool {
        self.find(id).is_some_and(Debt::is_open)
    }

    fn find(&self, id: &str) -> Option<&Debt> {
        self.records.iter().find(|d| d.id == id)
    }

    /// Replaces the cache with the store's current contents. Initial load
    /// and the recovery path for every failed mutation.
    pub async fn refresh(&mut self) -> Result<()> {
        self.records = self.store.list_debts().await?;
        Ok(())
    }

    /// Discards the stale optimistic change by reloading authoritative
    /// state, then hands back the original remote error for display.
    async fn reconcile(&mut self, err: StoreError) -> TrackerError {
        tracing::warn!(error = %err, "remote mutation failed, reloading authoritative state");
        match self.store.list_debts().await {
            Ok(debts) => self.records = debts,
            Err(fetch_err) => {
                tracing::error!(error = %fetch_err, "recovery fetch failed, keeping current cache");
            }
        }
        TrackerError::Remote(err)
    }

    /// Marks an open debt as paid. The cache flips immediately; only the
    /// `situacao` column is sent to the store.
    pub async fn settle(&mut self, id: &str) -> Result<()> {
        let debt = self
            .records
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| TrackerError::Validation(format!("unknown debt id: {id}")))?;
        if debt.situacao == DebtStatus::Closed {
            return Err(TrackerError::Validation(
                "debt is already settled".to_string(),
            ));
        }

        debt.situacao = DebtStatus::Closed;
        match self.store.update_debt(id, DebtPatch::settle()).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.reconcile(err).await),
        }
    }

    /// Removes a debt. The cached row disappears immediately.
    pub async fn delete(&mut self, id: &str) -> Result<()> {
        let index = self
            .records
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| TrackerError::Validation(format!("unknown debt id: {id}")))?;

        self.records.remove(index);
        match self.store.delete_debt(id).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.reconcile(err).await),
        }
    }

    /// Raises or lowers a debt's amount by a strictly positive delta,
    /// clamping at zero. Only the `valor` column is sent to the store.
    pub async fn adjust_amount(&mut self, id: &str, delta: f64, kind: AdjustKind) -> Result<()> {
        if !(delta > 0.0) {
            return Err(TrackerError::Validation(
                "adjustment must be a positive amount".to_string(),
            ));
        }
        let debt = self
            .records
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| TrackerError::Validation(format!("unknown debt id: {id}")))?;

        let new_valor = match kind {
            AdjustKind::Increase => debt.valor + delta,
            AdjustKind::Decrease => (debt.valor - delta).max(0.0),
        };

        debt.valor = new_valor;
        match self.store.update_debt(id, DebtPatch::amount(new_valor)).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.reconcile(err).await),
        }
    }

    /// Creates a debt or edits an existing one.
    ///
    /// Creation validates `valor > 0` locally; nothing is sent when that
    /// fails. The edit path never touches the amount. Neither path mutates
    /// the cache up front, so a failure needs no resync: the error goes
    /// back to the still-open form for retry. Success refreshes the cache.
    pub async fn save_debt(&mut self, draft: DebtDraft, editing: Option<&str>) -> Result<()> {
        match editing {
            None => {
                if !(draft.valor > 0.0) {
                    return Err(TrackerError::Validation(
                        "valor must be greater than zero".to_string(),
                    ));
                }
                self.store.insert_debt(NewDebt::from(draft)).await?;
            }
            Some(id) => {
                if self.find(id).is_none() {
                    return Err(TrackerError::Validation(format!("unknown debt id: {id}")));
                }
                let patch =
                    DebtPatch::details(draft.descricao, draft.credor, draft.data_limite, draft.obs);
                self.store.update_debt(id, patch).await?;
            }
        }

        // The mutation itself succeeded; a failed refresh keeps the cache
        // as-is and is not an error the form should stay open for.
        if let Err(err) = self.refresh().await {
            tracing::error!(error = %err, "refresh after save failed, keeping current cache");
        }
        Ok(())
    }

    /// Consumes one user action. Modal sequencing lives here: confirm
    /// dialogs close before their operation runs, while the adjustment
    /// input and the form only close when their operation succeeds.
    pub async fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Refresh => self.refresh().await,
            Command::SetFilter(filter) => {
                self.filter = filter;
                Ok(())
            }
            Command::OpenForm => {
                self.pending_modal = Some(ModalKind::Form { editing: None });
                Ok(())
            }
            Command::EditDebt(id) => {
                if !self.can_settle(&id) {
                    return Err(TrackerError::Validation(
                        "only open debts can be edited".to_string(),
                    ));
                }
                self.pending_modal = Some(ModalKind::Form { editing: Some(id) });
                Ok(())
            }
            Command::RequestSettle(id) => {
                if !self.can_settle(&id) {
                    return Err(TrackerError::Validation(
                        "settle is unavailable for this debt".to_string(),
                    ));
                }
                self.pending_modal = Some(ModalKind::ConfirmSettle(id));
                Ok(())
            }
            Command::RequestDelete(id) => {
                if self.find(&id).is_none() {
                    return Err(TrackerError::Validation(format!("unknown debt id: {id}")));
                }
                self.pending_modal = Some(ModalKind::ConfirmDelete(id));
                Ok(())
            }
            Command::RequestAdjust { id, kind } => {
                if !self.can_settle(&id) {
                    return Err(TrackerError::Validation(
                        "adjustment is unavailable for this debt".to_string(),
                    ));
                }
                self.pending_modal = Some(ModalKind::Adjust { id, kind });
                Ok(())
            }
            Command::CancelModal => {
                self.pending_modal = None;
                Ok(())
            }
            Command::ConfirmSettle => {
                let id = match self.pending_modal {
                    Some(ModalKind::ConfirmSettle(ref id)) => id.clone(),
                    _ => {
                        return Err(TrackerError::Validation(
                            "no settle confirmation is pending".to_string(),
                        ))
                    }
                };
                self.pending_modal = None;
                self.settle(&id).await
            }
            Command::ConfirmDelete => {
                let id = match self.pending_modal {
                    Some(ModalKind::ConfirmDelete(ref id)) => id.clone(),
                    _ => {
                        return Err(TrackerError::Validation(
                            "no delete confirmation is pending".to_string(),
                        ))
                    }
                };
                self.pending_modal = None;
                self.delete(&id).await
            }
            Command::SubmitAdjustment(delta) => {
                let (id, kind) = match self.pending_modal {
                    Some(ModalKind::Adjust { ref id, kind }) => (id.clone(), kind),
                    _ => {
                        return Err(TrackerError::Validation(
                            "no adjustment is pending".to_string(),
                        ))
                    }
                };
                let result = self.adjust_amount(&id, delta, kind).await;
                if result.is_ok() {
                    self.pending_modal = None;
                }
                result
            }
            Command::SubmitForm(draft) => {
                let editing = match self.pending_modal {
                    Some(ModalKind::Form { ref editing }) => editing.clone(),
                    _ => {
                        return Err(TrackerError::Validation(
                            "the debt form is not open".to_string(),
                        ))
                    }
                };
                let result = self.save_debt(draft, editing.as_deref()).await;
                if result.is_ok() {
                    self.pending_modal = None;
                }
                result
            }
        }
    }

    /// Runs the AI analysis over the current cache. Always returns
    /// displayable text; failures are absorbed by the analysis module.
    pub async fn analysis(&self, model: &dyn TextModel) -> String {
        ai_client::analyze_debts(model, &self.records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockStore {
        debts: Mutex<Vec<Debt>>,
        fail_next: AtomicBool,
        insert_calls: AtomicUsize,
        patches: Mutex<Vec<(String, DebtPatch)>>,
        deletes: Mutex<Vec<String>>,
        next_id: AtomicUsize,
    }

    impl MockStore {
        fn with(debts: Vec<Debt>) -> Arc<Self> {
            Arc::new(Self {
                debts: Mutex::new(debts),
                fail_next: AtomicBool::new(false),
                insert_calls: AtomicUsize::new(0),
                patches: Mutex::new(Vec::new()),
                deletes: Mutex::new(Vec::new()),
                next_id: AtomicUsize::new(1),
            })
        }

        fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        fn take_failure(&self) -> bool {
            self.fail_next.swap(false, Ordering::SeqCst)
        }

        fn rejected() -> StoreError {
            StoreError::Api {
                status: 500,
                message: "store rejected the call".to_string(),
            }
        }

        fn snapshot(&self) -> Vec<Debt> {
            let mut debts = self.debts.lock().unwrap().clone();
            models::sort_by_due_date(&mut debts);
            debts
        }

        fn last_patch(&self) -> (String, DebtPatch) {
            self.patches.lock().unwrap().last().cloned().unwrap()
        }

        fn patch_count(&self) -> usize {
            self.patches.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DebtStore for MockStore {
        async fn list_debts(&self) -> debt_store::Result<Vec<Debt>> {
            Ok(self.snapshot())
        }

        async fn insert_debt(&self, debt: NewDebt) -> debt_store::Result<Debt> {
            self.insert_calls.fetch_add(1, Ordering::SeqCst);
            if self.take_failure() {
                return Err(Self::rejected());
            }

            let id = format!("gen-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            let stored = Debt {
                id,
                created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                descricao: debt.descricao,
                credor: debt.credor,
                valor: debt.valor,
                data_limite: debt.data_limite,
                obs: debt.obs,
                situacao: debt.situacao,
            };
            self.debts.lock().unwrap().push(stored.clone());
            Ok(stored)
        }

        async fn update_debt(&self, id: &str, patch: DebtPatch) -> debt_store::Result<()> {
            self.patches
                .lock()
                .unwrap()
                .push((id.to_string(), patch.clone()));
            if self.take_failure() {
                return Err(Self::rejected());
            }

            let mut debts = self.debts.lock().unwrap();
            if let Some(debt) = debts.iter_mut().find(|d| d.id == id) {
                if let Some(situacao) = patch.situacao {
                    debt.situacao = situacao;
                }
                if let Some(valor) = patch.valor {
                    debt.valor = valor;
                }
                if let Some(descricao) = patch.descricao {
                    debt.descricao = descricao;
                }
                if let Some(credor) = patch.credor {
                    debt.credor = credor;
                }
                if let Some(data_limite) = patch.data_limite {
                    debt.data_limite = data_limite;
                }
                if let Some(obs) = patch.obs {
                    debt.obs = obs;
                }
            }
            Ok(())
        }

        async fn delete_debt(&self, id: &str) -> debt_store::Result<()> {
            self.deletes.lock().unwrap().push(id.to_string());
            if self.take_failure() {
                return Err(Self::rejected());
            }
            self.debts.lock().unwrap().retain(|d| d.id != id);
            Ok(())
        }
    }

    fn debt(id: &str, valor: f64, due: Option<&str>, situacao: DebtStatus) -> Debt {
        Debt {
            id: id.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            descricao: format!("divida {id}"),
            credor: "Banco".to_string(),
            valor,
            data_limite: due.map(|d| d.parse().unwrap()),
            obs: String::new(),
            situacao,
        }
    }

    async fn tracker_with(debts: Vec<Debt>) -> (DebtTracker, Arc<MockStore>) {
        let store = MockStore::with(debts);
        let mut tracker = DebtTracker::new(store.clone());
        tracker.refresh().await.unwrap();
        (tracker, store)
    }

    fn draft(descricao: &str, valor: f64) -> DebtDraft {
        DebtDraft {
            descricao: descricao.to_string(),
            credor: "Banco".to_string(),
            valor,
            data_limite: None,
            obs: String::new(),
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_cache_in_due_date_order() {
        let (tracker, _store) = tracker_with(vec![
            debt("late", 1.0, None, DebtStatus::Open),
            debt("soon", 1.0, Some("2025-06-01"), DebtStatus::Open),
        ])
        .await;

        let order: Vec<&str> = tracker.records().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(order, vec!["soon", "late"]);
    }

    #[tokio::test]
    async fn test_settle_flips_cache_and_sends_single_column() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        tracker.settle("d1").await.unwrap();

        assert_eq!(tracker.records()[0].situacao, DebtStatus::Closed);
        let (id, patch) = store.last_patch();
        assert_eq!(id, "d1");
        assert_eq!(patch, DebtPatch::settle());
    }

    #[tokio::test]
    async fn test_settle_failure_resyncs_cache_from_store() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;
        store.fail_next();

        let err = tracker.settle("d1").await.unwrap_err();

        assert!(matches!(err, TrackerError::Remote(_)));
        // The optimistic flip was discarded; cache equals authoritative state
        assert_eq!(tracker.records()[0].situacao, DebtStatus::Open);
        assert_eq!(tracker.records(), store.snapshot().as_slice());
    }

    #[tokio::test]
    async fn test_settle_rejects_closed_and_unknown_debts() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Closed)]).await;

        assert!(matches!(
            tracker.settle("d1").await,
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            tracker.settle("missing").await,
            Err(TrackerError::Validation(_))
        ));
        assert_eq!(store.patch_count(), 0);
    }

    #[tokio::test]
    async fn test_settle_control_unavailable_for_closed_debts() {
        let (mut tracker, _store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Closed)]).await;

        assert!(!tracker.can_settle("d1"));
        let err = tracker
            .dispatch(Command::RequestSettle("d1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert_eq!(tracker.pending_modal(), None);
    }

    #[tokio::test]
    async fn test_settle_confirm_flow_closes_modal_first() {
        let (mut tracker, _store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        tracker
            .dispatch(Command::RequestSettle("d1".to_string()))
            .await
            .unwrap();
        assert_eq!(
            tracker.pending_modal(),
            Some(&ModalKind::ConfirmSettle("d1".to_string()))
        );

        tracker.dispatch(Command::ConfirmSettle).await.unwrap();
        assert_eq!(tracker.pending_modal(), None);
        assert_eq!(tracker.records()[0].situacao, DebtStatus::Closed);
    }

    #[tokio::test]
    async fn test_delete_removes_row_remotely() {
        let (mut tracker, store) = tracker_with(vec![
            debt("d1", 500.0, None, DebtStatus::Open),
            debt("d2", 300.0, None, DebtStatus::Open),
        ])
        .await;

        tracker.delete("d1").await.unwrap();

        assert_eq!(tracker.records().len(), 1);
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.deletes.lock().unwrap().as_slice(), &["d1".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_failure_restores_row_from_store() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;
        store.fail_next();

        let err = tracker.delete("d1").await.unwrap_err();

        assert!(matches!(err, TrackerError::Remote(_)));
        assert_eq!(tracker.records().len(), 1);
        assert_eq!(tracker.records(), store.snapshot().as_slice());
    }

    #[tokio::test]
    async fn test_adjust_increase_updates_cache_and_payload() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        tracker
            .adjust_amount("d1", 150.0, AdjustKind::Increase)
            .await
            .unwrap();

        assert_eq!(tracker.records()[0].valor, 650.0);
        let (_, patch) = store.last_patch();
        // The payload carries the new amount and nothing else
        assert_eq!(patch, DebtPatch::amount(650.0));
    }

    #[tokio::test]
    async fn test_adjust_decrease_clamps_at_zero() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 100.0, None, DebtStatus::Open)]).await;

        tracker
            .adjust_amount("d1", 250.0, AdjustKind::Decrease)
            .await
            .unwrap();

        assert_eq!(tracker.records()[0].valor, 0.0);
        let (_, patch) = store.last_patch();
        assert_eq!(patch, DebtPatch::amount(0.0));
    }

    #[tokio::test]
    async fn test_adjust_rejects_non_positive_delta() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 100.0, None, DebtStatus::Open)]).await;

        for delta in [0.0, -5.0] {
            let err = tracker
                .adjust_amount("d1", delta, AdjustKind::Increase)
                .await
                .unwrap_err();
            assert!(matches!(err, TrackerError::Validation(_)));
        }
        assert_eq!(tracker.records()[0].valor, 100.0);
        assert_eq!(store.patch_count(), 0);
    }

    #[tokio::test]
    async fn test_adjust_failure_resyncs_and_keeps_modal_open() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        tracker
            .dispatch(Command::RequestAdjust {
                id: "d1".to_string(),
                kind: AdjustKind::Decrease,
            })
            .await
            .unwrap();
        store.fail_next();

        let err = tracker
            .dispatch(Command::SubmitAdjustment(100.0))
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::Remote(_)));
        assert_eq!(tracker.records()[0].valor, 500.0);
        // Input stays open for retry
        assert!(matches!(
            tracker.pending_modal(),
            Some(ModalKind::Adjust { .. })
        ));
    }

    #[tokio::test]
    async fn test_adjust_success_closes_the_input() {
        let (mut tracker, _store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        tracker
            .dispatch(Command::RequestAdjust {
                id: "d1".to_string(),
                kind: AdjustKind::Increase,
            })
            .await
            .unwrap();
        tracker
            .dispatch(Command::SubmitAdjustment(150.0))
            .await
            .unwrap();

        assert_eq!(tracker.pending_modal(), None);
        assert_eq!(tracker.records()[0].valor, 650.0);
    }

    #[tokio::test]
    async fn test_create_with_zero_valor_is_rejected_locally() {
        let (mut tracker, store) = tracker_with(vec![]).await;

        tracker.dispatch(Command::OpenForm).await.unwrap();
        let err = tracker
            .dispatch(Command::SubmitForm(draft("Cartao", 0.0)))
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::Validation(_)));
        assert_eq!(store.insert_calls.load(Ordering::SeqCst), 0);
        // Form stays open for correction
        assert_eq!(
            tracker.pending_modal(),
            Some(&ModalKind::Form { editing: None })
        );
    }

    #[tokio::test]
    async fn test_create_success_refreshes_cache_and_closes_form() {
        let (mut tracker, store) = tracker_with(vec![]).await;

        tracker.dispatch(Command::OpenForm).await.unwrap();
        tracker
            .dispatch(Command::SubmitForm(draft("Cartao", 750.0)))
            .await
            .unwrap();

        assert_eq!(tracker.pending_modal(), None);
        assert_eq!(tracker.records().len(), 1);
        let created = &tracker.records()[0];
        assert_eq!(created.situacao, DebtStatus::Open);
        assert_eq!(created.valor, 750.0);
        // id was assigned by the store, not locally
        assert!(created.id.starts_with("gen-"));
        assert_eq!(store.insert_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_failure_keeps_form_open_and_cache_unchanged() {
        let (mut tracker, store) = tracker_with(vec![]).await;

        tracker.dispatch(Command::OpenForm).await.unwrap();
        store.fail_next();
        let err = tracker
            .dispatch(Command::SubmitForm(draft("Cartao", 750.0)))
            .await
            .unwrap_err();

        assert!(matches!(err, TrackerError::Remote(_)));
        assert!(tracker.records().is_empty());
        assert_eq!(
            tracker.pending_modal(),
            Some(&ModalKind::Form { editing: None })
        );
    }

    #[tokio::test]
    async fn test_edit_updates_details_but_never_the_amount() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        tracker
            .dispatch(Command::EditDebt("d1".to_string()))
            .await
            .unwrap();
        // The form's amount field is ignored on the edit path
        tracker
            .dispatch(Command::SubmitForm(draft("Renegociado", 9999.0)))
            .await
            .unwrap();

        let (id, patch) = store.last_patch();
        assert_eq!(id, "d1");
        assert!(patch.valor.is_none());
        assert_eq!(patch.descricao.as_deref(), Some("Renegociado"));

        assert_eq!(tracker.pending_modal(), None);
        let edited = &tracker.records()[0];
        assert_eq!(edited.descricao, "Renegociado");
        assert_eq!(edited.valor, 500.0);
    }

    #[tokio::test]
    async fn test_edit_is_unavailable_for_closed_debts() {
        let (mut tracker, _store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Closed)]).await;

        let err = tracker
            .dispatch(Command::EditDebt("d1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));
        assert_eq!(tracker.pending_modal(), None);
    }

    #[tokio::test]
    async fn test_filter_controls_visible_slice() {
        let (mut tracker, _store) = tracker_with(vec![
            debt("open", 500.0, None, DebtStatus::Open),
            debt("closed", 300.0, None, DebtStatus::Closed),
        ])
        .await;

        // Default filter shows open debts
        assert_eq!(tracker.visible().len(), 1);
        assert_eq!(tracker.visible()[0].id, "open");

        tracker
            .dispatch(Command::SetFilter(StatusFilter::All))
            .await
            .unwrap();
        assert_eq!(tracker.visible().len(), 2);
        assert_eq!(tracker.count_for(StatusFilter::Closed), 1);
    }

    #[tokio::test]
    async fn test_confirm_without_pending_modal_is_rejected() {
        let (mut tracker, store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        assert!(matches!(
            tracker.dispatch(Command::ConfirmSettle).await,
            Err(TrackerError::Validation(_))
        ));
        assert!(matches!(
            tracker.dispatch(Command::ConfirmDelete).await,
            Err(TrackerError::Validation(_))
        ));
        assert_eq!(store.patch_count(), 0);
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_closes_any_modal() {
        let (mut tracker, _store) =
            tracker_with(vec![debt("d1", 500.0, None, DebtStatus::Open)]).await;

        tracker
            .dispatch(Command::RequestDelete("d1".to_string()))
            .await
            .unwrap();
        tracker.dispatch(Command::CancelModal).await.unwrap();

        assert_eq!(tracker.pending_modal(), None);
        assert_eq!(tracker.records().len(), 1);
    }

    #[tokio::test]
    async fn test_stats_reflect_current_cache() {
        let (tracker, _store) = tracker_with(vec![
            debt("d1", 500.0, None, DebtStatus::Open),
            debt("d2", 300.0, None, DebtStatus::Closed),
        ])
        .await;

        let stats = tracker.stats_on("2025-06-01".parse().unwrap());
        assert_eq!(stats.total_debt, 500.0);
        assert_eq!(stats.total_paid, 300.0);
        assert_eq!(stats.pending_count, 1);
    }
}

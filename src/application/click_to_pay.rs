use crate::domain::card::{CardSelection, ShopperCard};
use crate::domain::identity::IdentityLookupRequest;
use crate::domain::ports::SrcInitiatorRef;
use crate::domain::srci::{InitiateIdentityValidationResponse, SrcCheckoutParams, SrcInitParams};
use crate::domain::state::{CtpState, FlowState, Presentation};
use crate::error::{CtpError, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, watch};

/// Result of a completed Click to Pay checkout, handed to the embedding page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutPayload {
    pub scheme: String,
    pub src_digital_card_id: String,
    pub src_correlation_id: String,
    pub dcf_action_code: String,
    pub checkout_response: Option<String>,
}

/// Receives the single [`CheckoutPayload`] of a session.
pub type CheckoutReceiver = oneshot::Receiver<CheckoutPayload>;

/// Everything the presentation layer needs to render the flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickToPayView {
    pub flow_state: FlowState,
    pub presentation: Presentation,
    pub available_cards: Vec<ShopperCard>,
    pub selected_card: Option<ShopperCard>,
}

#[derive(Default)]
struct FlowData {
    /// Network that identified the shopper and runs the one-time code exchange.
    validating: Option<SrcInitiatorRef>,
    selection: Option<CardSelection>,
    on_submit: Option<oneshot::Sender<CheckoutPayload>>,
}

struct SessionInner {
    initiators: Vec<SrcInitiatorRef>,
    init_params: SrcInitParams,
    shopper_identity: Option<IdentityLookupRequest>,
    state: watch::Sender<FlowState>,
    mounted: AtomicBool,
    released: AtomicBool,
    flow: Mutex<FlowData>,
}

impl SessionInner {
    fn flow(&self) -> MutexGuard<'_, FlowData> {
        self.flow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        self.mounted.store(false, Ordering::Release);
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        for initiator in &self.initiators {
            initiator.remove_sdk_script();
        }
        tracing::debug!(initiators = self.initiators.len(), "Click to Pay session released");
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.release();
    }
}

/// One shopper's Click to Pay flow, from script loading to checkout.
///
/// The session owns the adapters for its lifetime: [`ClickToPaySession::release`]
/// (or dropping the last handle) removes every SDK script exactly once.
/// Once released, responses still in flight no longer change the
/// [`FlowState`].
///
/// Handles are cheap to clone and share the same flow.
#[derive(Clone)]
pub struct ClickToPaySession {
    inner: Arc<SessionInner>,
}

impl ClickToPaySession {
    /// Takes ownership of `initiators` for a new flow.
    ///
    /// The returned receiver yields the checkout payload once the shopper
    /// completes the checkout.
    pub fn acquire(
        initiators: Vec<SrcInitiatorRef>,
        init_params: SrcInitParams,
        shopper_identity: Option<IdentityLookupRequest>,
    ) -> (Self, CheckoutReceiver) {
        let (on_submit, receiver) = oneshot::channel();
        let (state, _) = watch::channel(FlowState::default());
        let inner = SessionInner {
            initiators,
            init_params,
            shopper_identity,
            state,
            mounted: AtomicBool::new(true),
            released: AtomicBool::new(false),
            flow: Mutex::new(FlowData {
                on_submit: Some(on_submit),
                ..Default::default()
            }),
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            receiver,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<FlowState> {
        self.inner.state.subscribe()
    }

    pub fn flow_state(&self) -> FlowState {
        *self.inner.state.borrow()
    }

    pub fn ctp_state(&self) -> CtpState {
        self.flow_state().ctp_state
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::Acquire)
    }

    pub fn view(&self) -> ClickToPayView {
        let flow_state = self.flow_state();
        let flow = self.inner.flow();
        ClickToPayView {
            flow_state,
            presentation: flow_state.presentation(),
            available_cards: flow
                .selection
                .as_ref()
                .map(|selection| selection.cards().to_vec())
                .unwrap_or_default(),
            selected_card: flow
                .selection
                .as_ref()
                .map(|selection| selection.selected().clone()),
        }
    }

    /// Ends the flow and removes every SDK script. Idempotent.
    pub fn release(&self) {
        self.inner.release();
    }

    fn transition(&self, ctp_state: CtpState) -> bool {
        if !self.is_mounted() {
            tracing::debug!(?ctp_state, "Session released, ignoring transition");
            return false;
        }
        self.inner.state.send_modify(|state| state.transition(ctp_state));
        tracing::info!(?ctp_state, "Click to Pay state changed");
        true
    }

    fn fall_back(&self, error: &CtpError) -> CtpState {
        if error.is_unavailable() {
            tracing::warn!(error = %error, "Network SDK unavailable, falling back to card entry");
        } else {
            tracing::warn!(error = %error, "Click to Pay failed, falling back to card entry");
        }
        self.transition(CtpState::NotAvailable);
        self.ctp_state()
    }

    /// Loads every network SDK, then tries to recognize the shopper, first by
    /// device then by the configured identity.
    ///
    /// Any failure here degrades to [`CtpState::NotAvailable`] rather than an
    /// error, so the shopper can always enter a card manually.
    pub async fn initialize(&self) -> CtpState {
        self.transition(CtpState::Loading);

        if self.inner.initiators.is_empty() {
            tracing::info!("No Click to Pay networks for this checkout");
            self.transition(CtpState::NotAvailable);
            return self.ctp_state();
        }

        for initiator in &self.inner.initiators {
            let loaded = initiator.load_sdk_script().await;
            if !self.is_mounted() {
                return self.ctp_state();
            }
            if let Err(e) = loaded {
                return self.fall_back(&e);
            }

            let initialized = initiator.init(&self.inner.init_params).await;
            if !self.is_mounted() {
                return self.ctp_state();
            }
            if let Err(e) = initialized {
                return self.fall_back(&e);
            }
        }

        match self.recognize().await {
            Ok(state) => state,
            Err(e) => self.fall_back(&e),
        }
    }

    async fn recognize(&self) -> Result<CtpState> {
        for initiator in &self.inner.initiators {
            let response = initiator.is_recognized().await?;
            if response.recognized {
                tracing::info!(scheme = %initiator.scheme(), "Shopper recognized");
                return self.load_cards(initiator, &response.id_tokens).await;
            }
        }

        let Some(identity) = &self.inner.shopper_identity else {
            self.transition(CtpState::NotAvailable);
            return Ok(self.ctp_state());
        };

        for initiator in &self.inner.initiators {
            let response = initiator.identity_lookup(identity).await?;
            if response.consumer_present {
                tracing::info!(scheme = %initiator.scheme(), "Shopper identified by lookup");
                if self.is_mounted() {
                    self.inner.flow().validating = Some(initiator.clone());
                    self.transition(CtpState::ShopperIdentified);
                }
                return Ok(self.ctp_state());
            }
        }

        self.transition(CtpState::NotAvailable);
        Ok(self.ctp_state())
    }

    async fn load_cards(&self, initiator: &SrcInitiatorRef, id_tokens: &[String]) -> Result<CtpState> {
        let profile = initiator.get_src_profile(id_tokens).await?;
        let cards = ShopperCard::from_profile(initiator.scheme(), &profile);
        let selection = CardSelection::new(cards)?;

        if self.is_mounted() {
            self.inner.flow().selection = Some(selection);
            self.transition(CtpState::Ready);
        }
        Ok(self.ctp_state())
    }

    fn validating(&self) -> Result<SrcInitiatorRef> {
        if self.ctp_state() != CtpState::ShopperIdentified {
            return Err(CtpError::InvariantViolation(format!(
                "identity validation requires ShopperIdentified, state is {:?}",
                self.ctp_state()
            )));
        }
        self.inner.flow().validating.clone().ok_or_else(|| {
            CtpError::InvariantViolation("no network identified the shopper".to_string())
        })
    }

    /// Sends the one-time code to the shopper.
    pub async fn start_identity_validation(&self) -> Result<InitiateIdentityValidationResponse> {
        let initiator = self.validating()?;
        initiator.initiate_identity_validation().await
    }

    /// Submits the one-time code and, when accepted, loads the shopper's cards.
    pub async fn finish_identity_validation(&self, otp: &str) -> Result<CtpState> {
        let initiator = self.validating()?;
        let response = initiator.complete_identity_validation(otp).await?;
        self.load_cards(&initiator, &[response.id_token]).await
    }

    /// Changes the selected card and returns its full record.
    pub fn select_card(&self, src_digital_card_id: &str) -> Result<ShopperCard> {
        let mut flow = self.inner.flow();
        let selection = flow.selection.as_mut().ok_or_else(|| {
            CtpError::InvariantViolation("no cards to select from".to_string())
        })?;
        selection.select(src_digital_card_id).cloned()
    }

    /// The shopper chose to type a card in. Wins over any later derivation.
    pub fn show_card_entry(&self) {
        if self.is_mounted() {
            self.inner.state.send_modify(FlowState::show_card_entry);
        }
    }

    /// Checks out the selected card with its network and emits the payload.
    pub async fn checkout(&self) -> Result<CheckoutPayload> {
        let card = {
            let flow = self.inner.flow();
            if flow.on_submit.is_none() {
                return Err(CtpError::InvariantViolation(
                    "checkout already completed".to_string(),
                ));
            }
            let selection = flow.selection.as_ref().ok_or_else(|| {
                CtpError::InvariantViolation("checkout before cards were loaded".to_string())
            })?;
            selection.selected().clone()
        };
        let initiator = self
            .inner
            .initiators
            .iter()
            .find(|initiator| initiator.scheme() == card.scheme)
            .cloned()
            .ok_or_else(|| {
                CtpError::InvariantViolation(format!("no adapter for scheme '{}'", card.scheme))
            })?;

        let params = SrcCheckoutParams {
            src_correlation_id: card.src_correlation_id.clone(),
            src_digital_card_id: card.src_digital_card_id.clone(),
        };
        let response = initiator.checkout(&params).await?;

        let payload = CheckoutPayload {
            scheme: card.scheme,
            src_digital_card_id: card.src_digital_card_id,
            src_correlation_id: card.src_correlation_id,
            dcf_action_code: response.dcf_action_code,
            checkout_response: response.checkout_response,
        };

        if !self.is_mounted() {
            return Ok(payload);
        }
        let on_submit = self.inner.flow().on_submit.take().ok_or_else(|| {
            CtpError::InvariantViolation("checkout already completed".to_string())
        })?;
        if on_submit.send(payload.clone()).is_err() {
            tracing::warn!("Checkout payload receiver dropped");
        }
        Ok(payload)
    }
}

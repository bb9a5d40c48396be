use serde::Serialize;

/// Stage of the Click to Pay flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CtpState {
    /// No network can be offered; the shopper enters the card manually.
    NotAvailable,
    Loading,
    /// A network knows the shopper; a one-time code is needed to continue.
    ShopperIdentified,
    /// The shopper's cards are available.
    Ready,
}

/// What the presentation layer should render for a given [`FlowState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Presentation {
    /// Only the regular card entry form.
    CardEntryOnly,
    /// Only the Click to Pay UI (loader or one-time code form).
    ClickToPayOnly,
    /// Click to Pay plus the card entry form. `card_entry_primary` is set
    /// when Click to Pay is not the primary payment method.
    ClickToPayWithCardEntry { card_entry_primary: bool },
    /// Click to Pay plus a "use another card" button revealing the form.
    ClickToPayWithCardEntryButton,
}

/// Snapshot of the flow as observed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowState {
    pub ctp_state: CtpState,
    pub is_primary_payment_method: Option<bool>,
    pub is_card_input_visible: Option<bool>,
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new(CtpState::Loading)
    }
}

impl FlowState {
    pub fn new(ctp_state: CtpState) -> Self {
        let mut state = Self {
            ctp_state,
            is_primary_payment_method: None,
            is_card_input_visible: None,
        };
        state.derive_preferences();
        state
    }

    fn is_undecided(&self) -> bool {
        self.is_primary_payment_method.is_none() && self.is_card_input_visible.is_none()
    }

    /// Moves to `ctp_state`, deriving the preferences if nobody decided them yet.
    pub fn transition(&mut self, ctp_state: CtpState) {
        self.ctp_state = ctp_state;
        self.derive_preferences();
    }

    /// Derivation only happens while both preferences are undecided, so an
    /// explicit shopper choice survives later transitions.
    fn derive_preferences(&mut self) {
        if !self.is_undecided() {
            return;
        }
        match self.ctp_state {
            CtpState::ShopperIdentified | CtpState::Ready => {
                self.is_card_input_visible = Some(false);
                self.is_primary_payment_method = Some(true);
            }
            CtpState::NotAvailable => {
                self.is_card_input_visible = Some(true);
                self.is_primary_payment_method = Some(false);
            }
            CtpState::Loading => {}
        }
    }

    /// The shopper asked to enter a card manually.
    pub fn show_card_entry(&mut self) {
        self.is_card_input_visible = Some(true);
        self.is_primary_payment_method = Some(false);
    }

    pub fn presentation(&self) -> Presentation {
        match self.ctp_state {
            CtpState::NotAvailable => Presentation::CardEntryOnly,
            CtpState::Loading | CtpState::ShopperIdentified => Presentation::ClickToPayOnly,
            CtpState::Ready => {
                if self.is_card_input_visible == Some(true) {
                    Presentation::ClickToPayWithCardEntry {
                        card_entry_primary: self.is_primary_payment_method != Some(true),
                    }
                } else {
                    Presentation::ClickToPayWithCardEntryButton
                }
            }
        }
    }
}

use crate::domain::srci::SrcProfile;
use crate::error::{CtpError, Result};
use serde::{Deserialize, Serialize};

/// A card returned by a network after the shopper's identity was validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopperCard {
    pub src_digital_card_id: String,
    pub pan_last_four: String,
    pub art_uri: String,
    pub card_title: Option<String>,
    pub scheme: String,
    pub src_correlation_id: String,
}

impl ShopperCard {
    /// Label shown in the cards dropdown, e.g. `"Mastercard •••• 4242"`.
    pub fn display_name(&self) -> String {
        format!(
            "{} •••• {}",
            self.card_title.as_deref().unwrap_or_default(),
            self.pan_last_four
        )
    }

    /// Flattens every masked card of a profile response into shopper cards.
    pub fn from_profile(scheme: &str, profile: &SrcProfile) -> Vec<ShopperCard> {
        profile
            .profiles
            .iter()
            .flat_map(|entry| entry.masked_cards.iter())
            .map(|card| ShopperCard {
                src_digital_card_id: card.src_digital_card_id.clone(),
                pan_last_four: card.pan_last_four.clone(),
                art_uri: card.digital_card_data.art_uri.clone(),
                card_title: card.digital_card_data.descriptor_name.clone(),
                scheme: scheme.to_string(),
                src_correlation_id: profile.src_correlation_id.clone(),
            })
            .collect()
    }
}

/// Selection state of the cards dropdown.
///
/// The card list is fixed for the session; only the selected id moves.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSelection {
    cards: Vec<ShopperCard>,
    selected: usize,
}

impl CardSelection {
    pub fn new(cards: Vec<ShopperCard>) -> Result<Self> {
        if cards.is_empty() {
            return Err(CtpError::InvariantViolation(
                "card selection requires at least one card".to_string(),
            ));
        }
        Ok(Self { cards, selected: 0 })
    }

    pub fn cards(&self) -> &[ShopperCard] {
        &self.cards
    }

    pub fn selected(&self) -> &ShopperCard {
        &self.cards[self.selected]
    }

    /// Moves the selection and returns the full record of the new card.
    pub fn select(&mut self, src_digital_card_id: &str) -> Result<&ShopperCard> {
        let index = self
            .cards
            .iter()
            .position(|card| card.src_digital_card_id == src_digital_card_id)
            .ok_or_else(|| {
                CtpError::InvariantViolation(format!(
                    "card '{}' is not part of the shopper's cards",
                    src_digital_card_id
                ))
            })?;
        self.selected = index;
        Ok(&self.cards[index])
    }
}

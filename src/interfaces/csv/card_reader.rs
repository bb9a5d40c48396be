use crate::domain::srci::{DigitalCardData, MaskedCard};
use crate::error::{CtpError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct CardRecord {
    src_digital_card_id: String,
    pan_last_four: String,
    art_uri: String,
    #[serde(default)]
    card_title: Option<String>,
}

impl TryFrom<CardRecord> for MaskedCard {
    type Error = CtpError;

    fn try_from(record: CardRecord) -> Result<Self> {
        let last_four = &record.pan_last_four;
        if last_four.len() != 4 || !last_four.chars().all(|c| c.is_ascii_digit()) {
            return Err(CtpError::InvalidCard(format!(
                "card {}: pan_last_four must be 4 digits, got '{}'",
                record.src_digital_card_id, last_four
            )));
        }
        Ok(MaskedCard {
            src_digital_card_id: record.src_digital_card_id,
            pan_last_four: record.pan_last_four,
            digital_card_data: DigitalCardData {
                art_uri: record.art_uri,
                descriptor_name: record.card_title.filter(|title| !title.is_empty()),
            },
        })
    }
}

/// Reads sandbox profile cards from a CSV source.
///
/// Expects the header `src_digital_card_id, pan_last_four, art_uri, card_title`;
/// whitespace is trimmed and `card_title` may be left empty.
pub struct CardReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CardReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one result per record, so a bad row does not hide the others.
    pub fn cards(self) -> impl Iterator<Item = Result<MaskedCard>> {
        self.reader.into_deserialize::<CardRecord>().map(|result| {
            let record = result.map_err(CtpError::from)?;
            MaskedCard::try_from(record)
        })
    }
}

use crate::amount::Amount;
use lightning_invoice::Bolt11Invoice;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("Could not parse invoice: {0}")]
    Malformed(String),
    #[error("Invoice does not specify an amount")]
    MissingAmount,
}

/// Extracts the amount to pay from a Lightning payment request.
pub trait InvoiceDecoder {
    fn amount(&self, invoice: &str) -> Result<Amount, InvoiceError>;
}

/// Decodes BOLT11 payment requests. Millisatoshi amounts are rounded up to the next satoshi.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bolt11Decoder;

impl InvoiceDecoder for Bolt11Decoder {
    fn amount(&self, invoice: &str) -> Result<Amount, InvoiceError> {
        let invoice = Bolt11Invoice::from_str(invoice.trim()).map_err(|e| InvoiceError::Malformed(e.to_string()))?;
        let msat = invoice.amount_milli_satoshis().ok_or(InvoiceError::MissingAmount)?;
        Ok(Amount::from_sat(msat.div_ceil(1000)))
    }
}

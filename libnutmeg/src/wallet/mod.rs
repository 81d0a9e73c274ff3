//! The wallet orchestrator.
//!
//! [`Wallet`] strings together the mint API, the blinding protocol, the denomination splitter and the proof store.
//! The store is only ever touched once a mint round trip has fully succeeded, so a failed flow leaves the persisted
//! proofs exactly as they were. Every flow takes `&mut self`: a wallet has a single writer for the whole duration of
//! a flow.

mod errors;
mod outputs;

pub use errors::WalletError;
pub use outputs::PreMintSecrets;

use crate::amount::{split_for_send, Amount};
use crate::invoice::{Bolt11Decoder, InvoiceDecoder};
use crate::mint::data_objects::{MeltRequest, RequestMintResponse, SplitRequest};
use crate::mint::MintConnector;
use crate::proof_store::ProofStore;
use crate::proofs::{sum_proofs, Keys, Proof};
use crate::storage::ProofStorage;
use crate::token::{deserialize_proofs, serialize_proofs};
use log::{debug, error, info, warn};
use rand_core::OsRng;
use std::collections::HashSet;

/// The two sides of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitProofs {
    /// Proofs worth `total - amount`
    pub keep: Vec<Proof>,
    /// Proofs worth `amount`
    pub send: Vec<Proof>,
}

/// What happened to a Lightning payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeltOutcome {
    pub paid: bool,
    /// The invoice amount
    pub amount: Amount,
    /// The fee reserve the mint asked for
    pub fee: Amount,
    pub preimage: Option<String>,
    /// The proofs handed to the mint. Removed from the store if `paid`, otherwise still held as reserved.
    pub proofs: Vec<Proof>,
}

pub struct Wallet<M, S> {
    mint: M,
    store: ProofStore<S>,
    keys: Option<Keys>,
    invoice_decoder: Box<dyn InvoiceDecoder>,
}

impl<M, S> Wallet<M, S>
where
    M: MintConnector,
    S: ProofStorage,
{
    /// Opens the proof store and prepares a wallet against `mint`. The mint's keys are not fetched until
    /// [`Wallet::load_mint`] is called.
    pub fn new(mint: M, storage: S) -> Result<Self, WalletError> {
        let store = ProofStore::open(storage)?;
        Ok(Self { mint, store, keys: None, invoice_decoder: Box::new(Bolt11Decoder) })
    }

    /// Uses an already known keyset instead of fetching it.
    pub fn with_keys(mut self, keys: Keys) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_invoice_decoder<D: InvoiceDecoder + 'static>(mut self, decoder: D) -> Self {
        self.invoice_decoder = Box::new(decoder);
        self
    }

    /// Fetches the mint's public keys. They are kept for the rest of the session.
    pub async fn load_mint(&mut self) -> Result<&Keys, WalletError> {
        let keys = self.mint.get_keys().await.inspect_err(|e| warn!("Could not load mint keys: {e}"))?;
        if keys.is_empty() {
            return Err(WalletError::InvalidRequest("Mint did not publish any keys".into()));
        }
        debug!("Loaded {} mint keys", keys.len());
        Ok(self.keys.insert(keys))
    }

    pub fn mint_connector(&self) -> &M {
        &self.mint
    }

    pub fn keys(&self) -> Option<&Keys> {
        self.keys.as_ref()
    }

    pub fn store(&self) -> &ProofStore<S> {
        &self.store
    }

    /// Every proof the wallet holds, reserved ones included.
    pub fn proofs(&self) -> Vec<Proof> {
        self.store.proofs()
    }

    pub fn spendable_balance(&self) -> Amount {
        self.store.spendable_balance()
    }

    pub fn total_balance(&self) -> Amount {
        self.store.total_balance()
    }

    /// Asks the mint for a Lightning invoice that, once paid, allows minting `amount`.
    pub async fn request_mint(&self, amount: Amount) -> Result<RequestMintResponse, WalletError> {
        info!("Requesting a mint invoice for {amount}");
        let invoice = self.mint.request_mint(amount).await.inspect_err(|e| warn!("Mint invoice request failed: {e}"))?;
        debug!("Mint invoice issued with payment hash {}", invoice.hash);
        Ok(invoice)
    }

    /// Mints `amount` in canonical denominations against a paid invoice and stores the new proofs.
    pub async fn mint(&mut self, amount: Amount, payment_hash: &str) -> Result<Vec<Proof>, WalletError> {
        info!("Minting {amount}");
        if amount.is_zero() {
            return Err(WalletError::InvalidRequest("Cannot mint a zero amount".into()));
        }
        let keys = self.require_keys()?;
        let premint = PreMintSecrets::random(&amount.split(), &mut OsRng)?;
        let response = self
            .mint
            .mint(premint.blinded_messages(), payment_hash)
            .await
            .inspect_err(|e| warn!("Minting {amount} failed: {e}"))?;
        let proofs = premint.construct_proofs(&response.promises, keys)?;
        self.store.add(proofs.clone()).inspect_err(|e| error!("Minted proofs could not be stored: {e}"))?;
        info!("Minted {} proofs worth {amount}", proofs.len());
        Ok(proofs)
    }

    /// Exchanges `proofs` for fresh ones: a side worth `amount` and a side worth the remainder.
    ///
    /// The inputs are dropped from the store and both sides added in a single write, and only after the mint has
    /// signed every output. Inputs need not be in the store, which is how received proofs are redeemed.
    pub async fn split(&mut self, proofs: &[Proof], amount: Amount) -> Result<SplitProofs, WalletError> {
        info!("Splitting {} proofs to obtain {amount}", proofs.len());
        if proofs.is_empty() {
            return Err(WalletError::InvalidRequest("No proofs to split".into()));
        }
        let mut seen = HashSet::new();
        if !proofs.iter().all(|p| seen.insert(p.secret.as_str())) {
            return Err(WalletError::InvalidRequest("Duplicate proofs in split".into()));
        }
        let total = proofs_value(proofs)?;
        let (keep_amounts, send_amounts) = split_for_send(total, amount)
            .ok_or(WalletError::InsufficientBalance { requested: amount, available: total })?;
        let keys = self.require_keys()?;
        let keep_len = keep_amounts.len();
        let premint = PreMintSecrets::random(&[keep_amounts, send_amounts].concat(), &mut OsRng)?;
        let request = SplitRequest { amount, proofs: proofs.to_vec(), outputs: premint.blinded_messages() };
        let response = self.mint.split(request).await.inspect_err(|e| warn!("Split of {total} failed: {e}"))?;
        if response.fst.len() != keep_len {
            // The halves are recovered from the request order, so a misplaced boundary is harmless
            warn!("Mint returned {} promises for {keep_len} kept outputs", response.fst.len());
        }
        let promises = [response.fst, response.snd].concat();
        let mut keep = premint.construct_proofs(&promises, keys)?;
        let send = keep.split_off(keep_len);

        let spent = proofs.iter().map(|p| p.secret.clone()).collect::<Vec<_>>();
        let fresh = keep.iter().chain(send.iter()).cloned().collect();
        self.store
            .replace(&spent, fresh)
            .inspect_err(|e| error!("Mint accepted a split that could not be stored: {e}"))?;
        debug!("Split {total} into {} kept and {} sent proofs", keep.len(), send.len());
        Ok(SplitProofs { keep, send })
    }

    /// Splits the unreserved subset of `proofs` so that exactly `amount` can be handed over, and reserves the send
    /// side. With `invalidate`, the send side is dropped from the store instead.
    pub async fn split_to_send(
        &mut self,
        proofs: &[Proof],
        amount: Amount,
        invalidate: bool,
    ) -> Result<SplitProofs, WalletError> {
        if amount.is_zero() {
            return Err(WalletError::InvalidRequest("Cannot send a zero amount".into()));
        }
        let reserved = self.store.reserved_secrets();
        let spendable =
            proofs.iter().filter(|p| !reserved.contains(p.secret.as_str())).cloned().collect::<Vec<_>>();
        let available = proofs_value(&spendable)?;
        if available < amount {
            warn!("Cannot send {amount}: only {available} is spendable");
            return Err(WalletError::InsufficientBalance { requested: amount, available });
        }
        let split = self.split(&spendable, amount).await?;
        let secrets = split.send.iter().map(|p| p.secret.clone()).collect::<Vec<_>>();
        self.store.mark_reserved(&secrets)?;
        if invalidate {
            self.store.remove(&secrets)?;
            debug!("Send side of {amount} invalidated");
        }
        Ok(split)
    }

    /// Swaps externally received proofs for fresh ones owned by this wallet.
    pub async fn redeem(&mut self, proofs: &[Proof]) -> Result<Vec<Proof>, WalletError> {
        let amount = proofs_value(proofs)?;
        info!("Redeeming {} proofs worth {amount}", proofs.len());
        let split = self.split(proofs, amount).await?;
        Ok(split.send)
    }

    /// Produces a token worth `amount` for someone else. The proofs it carries are no longer held by the wallet.
    pub async fn send(&mut self, amount: Amount) -> Result<String, WalletError> {
        let proofs = self.store.unreserved_proofs();
        let split = self.split_to_send(&proofs, amount, true).await?;
        Ok(serialize_proofs(&split.send)?)
    }

    /// Redeems a token produced by [`Wallet::send`].
    pub async fn receive(&mut self, token: &str) -> Result<Vec<Proof>, WalletError> {
        let proofs = deserialize_proofs(token)?;
        self.redeem(&proofs).await
    }

    /// Pays a Lightning invoice with the wallet's proofs.
    ///
    /// Proofs worth the invoice amount plus the mint's fee reserve are split off and reserved before the melt. They
    /// are removed once the mint reports the invoice as paid. Otherwise they stay reserved so the payment can be
    /// retried or the proofs reclaimed.
    pub async fn melt(&mut self, invoice: &str) -> Result<MeltOutcome, WalletError> {
        let invoice_amount = self.invoice_decoder.amount(invoice)?;
        info!("Paying invoice for {invoice_amount}");
        let fee = self.mint.check_fees(invoice).await.inspect_err(|e| warn!("Fee check failed: {e}"))?.fee;
        let amount = invoice_amount
            .checked_add(fee)
            .ok_or_else(|| WalletError::InvalidRequest(format!("Invoice amount {invoice_amount} overflows")))?;
        let proofs = self.store.proofs();
        let split = self.split_to_send(&proofs, amount, false).await?;
        let request = MeltRequest { proofs: split.send.clone(), amount, invoice: invoice.to_string() };
        let response = self
            .mint
            .melt(request)
            .await
            .inspect_err(|e| warn!("Melt failed, {amount} stays reserved: {e}"))?;
        if response.paid {
            let secrets = split.send.iter().map(|p| p.secret.clone()).collect::<Vec<_>>();
            self.store.remove(&secrets)?;
            info!("Invoice paid for {invoice_amount} plus up to {fee} in fees");
        } else {
            warn!("Mint did not pay the invoice. {amount} remains reserved");
        }
        Ok(MeltOutcome {
            paid: response.paid,
            amount: invoice_amount,
            fee,
            preimage: response.preimage,
            proofs: split.send,
        })
    }

    fn require_keys(&self) -> Result<&Keys, WalletError> {
        self.keys.as_ref().ok_or_else(|| WalletError::InvalidRequest("Mint keys have not been loaded".into()))
    }
}

/// The value of `proofs`, which may come from a token. Every amount must be a denomination and the total must fit.
fn proofs_value(proofs: &[Proof]) -> Result<Amount, WalletError> {
    if let Some(proof) = proofs.iter().find(|p| !p.amount.is_denomination()) {
        return Err(WalletError::InvalidRequest(format!("{} is not a valid denomination", proof.amount)));
    }
    sum_proofs(proofs).ok_or_else(|| WalletError::InvalidRequest("Proof amounts overflow".into()))
}

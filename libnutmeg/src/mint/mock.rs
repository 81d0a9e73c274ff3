//! An in-process mint for exercising wallet flows.
//!
//! [`MockMint`] holds a private key for every power-of-two denomination and follows the mint side of the protocol
//! honestly: it signs blinded outputs, verifies proofs against `hash_to_curve(secret)`, and refuses secrets it has
//! already seen. Invoices are considered paid as soon as they are issued.

use crate::amount::{Amount, MAX_DENOMINATIONS};
use crate::cryptography::dhke::{sign_message, verify_message};
use crate::cryptography::keys::SecretKey;
use crate::invoice::{InvoiceDecoder, InvoiceError};
use crate::mint::data_objects::{
    CheckFeesResponse, MeltRequest, MeltResponse, PostMintResponse, RequestMintResponse, SplitRequest, SplitResponse,
};
use crate::mint::{MintConnector, MintError};
use crate::proofs::{sum_proofs, BlindSignature, BlindedMessage, Keys, Proof};
use rand_core::OsRng;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const MOCK_KEYSET_ID: &str = "mockkeyset01";
const MOCK_INVOICE_PREFIX: &str = "lnmock";

#[derive(Default)]
struct MockMintState {
    spent: HashSet<String>,
    /// payment hash -> (amount, already minted)
    invoices: HashMap<String, (Amount, bool)>,
    pending_failure: Option<MintError>,
    melt_failure: Option<MintError>,
    unpaid_melts: bool,
    misplaced_split: bool,
    fee: Amount,
    requests: usize,
}

pub struct MockMint {
    keys: BTreeMap<Amount, SecretKey>,
    state: RefCell<MockMintState>,
}

impl Default for MockMint {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMint {
    pub fn new() -> Self {
        let keys = (0..MAX_DENOMINATIONS)
            .map(|bit| (Amount::from_sat(1 << bit), SecretKey::random(&mut OsRng)))
            .collect();
        Self { keys, state: RefCell::new(MockMintState::default()) }
    }

    pub fn public_keys(&self) -> Keys {
        self.keys.iter().map(|(amount, key)| (*amount, key.public_key())).collect()
    }

    /// The next request fails with `err` instead of being processed.
    pub fn fail_next_request(&self, err: MintError) {
        self.state.borrow_mut().pending_failure = Some(err);
    }

    /// The next melt fails with `err` after every earlier request has succeeded.
    pub fn fail_next_melt(&self, err: MintError) {
        self.state.borrow_mut().melt_failure = Some(err);
    }

    /// Moves the boundary between `fst` and `snd` in split responses one promise to the right.
    pub fn set_misplaced_split(&self, misplaced: bool) {
        self.state.borrow_mut().misplaced_split = misplaced;
    }

    /// Makes every melt report the Lightning payment as not (yet) completed.
    pub fn set_unpaid_melts(&self, unpaid: bool) {
        self.state.borrow_mut().unpaid_melts = unpaid;
    }

    pub fn set_fee(&self, fee: Amount) {
        self.state.borrow_mut().fee = fee;
    }

    pub fn is_spent(&self, secret: &str) -> bool {
        self.state.borrow().spent.contains(secret)
    }

    /// Number of requests received, including failed ones.
    pub fn request_count(&self) -> usize {
        self.state.borrow().requests
    }

    /// Checks that every proof carries a valid signature and an unspent, unique secret.
    pub fn verify_proofs(&self, proofs: &[Proof]) -> Result<(), MintError> {
        let state = self.state.borrow();
        let mut seen = HashSet::new();
        for proof in proofs {
            if state.spent.contains(&proof.secret) {
                return Err(protocol(11001, "tokens already spent."));
            }
            if !seen.insert(proof.secret.as_str()) {
                return Err(protocol(11002, "duplicate proofs."));
            }
            let key = self.key(proof.amount)?;
            let valid = verify_message(key, proof.secret.as_bytes(), &proof.signature)
                .map_err(|e| protocol(11003, &e.to_string()))?;
            if !valid {
                return Err(protocol(11003, "could not verify proofs."));
            }
        }
        Ok(())
    }

    fn key(&self, amount: Amount) -> Result<&SecretKey, MintError> {
        self.keys.get(&amount).ok_or_else(|| protocol(11004, &format!("invalid denomination {amount}")))
    }

    fn sign_outputs(&self, outputs: &[BlindedMessage]) -> Result<Vec<BlindSignature>, MintError> {
        outputs
            .iter()
            .map(|output| {
                let key = self.key(output.amount)?;
                let blinded_signature =
                    sign_message(key, &output.blinded).map_err(|e| protocol(11005, &e.to_string()))?;
                Ok(BlindSignature { id: MOCK_KEYSET_ID.to_string(), amount: output.amount, blinded_signature })
            })
            .collect()
    }

    fn start_request(&self) -> Result<(), MintError> {
        let mut state = self.state.borrow_mut();
        state.requests += 1;
        match state.pending_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn mark_spent(&self, proofs: &[Proof]) {
        let mut state = self.state.borrow_mut();
        state.spent.extend(proofs.iter().map(|p| p.secret.clone()));
    }
}

fn protocol(code: i64, error: &str) -> MintError {
    MintError::Protocol { code, error: error.to_string() }
}

impl MintConnector for MockMint {
    async fn get_keys(&self) -> Result<Keys, MintError> {
        self.start_request()?;
        Ok(self.public_keys())
    }

    async fn request_mint(&self, amount: Amount) -> Result<RequestMintResponse, MintError> {
        self.start_request()?;
        let mut state = self.state.borrow_mut();
        let hash = format!("{:064x}", state.invoices.len() + 1);
        state.invoices.insert(hash.clone(), (amount, false));
        Ok(RequestMintResponse { pr: format!("{MOCK_INVOICE_PREFIX}{}:{hash}", amount.to_sat()), hash })
    }

    async fn mint(&self, outputs: Vec<BlindedMessage>, payment_hash: &str) -> Result<PostMintResponse, MintError> {
        self.start_request()?;
        let (amount, minted) =
            *self.state.borrow().invoices.get(payment_hash).ok_or_else(|| protocol(10001, "unknown invoice."))?;
        if minted {
            return Err(protocol(10002, "tokens already issued for this invoice."));
        }
        let requested = Amount::checked_sum(outputs.iter().map(|o| o.amount));
        if requested != Some(amount) {
            let requested = requested.map(|a| a.to_string()).unwrap_or_else(|| "too much".into());
            return Err(protocol(10003, &format!("outputs total {requested} but invoice is for {amount}")));
        }
        let promises = self.sign_outputs(&outputs)?;
        self.state.borrow_mut().invoices.insert(payment_hash.to_string(), (amount, true));
        Ok(PostMintResponse { promises })
    }

    async fn split(&self, request: SplitRequest) -> Result<SplitResponse, MintError> {
        self.start_request()?;
        self.verify_proofs(&request.proofs)?;
        let total = sum_proofs(&request.proofs).ok_or_else(|| protocol(11008, "proof amounts overflow."))?;
        let outputs_total = Amount::checked_sum(request.outputs.iter().map(|o| o.amount));
        if outputs_total != Some(total) {
            return Err(protocol(11006, "split of promises is not balanced."));
        }
        let keep = total.checked_sub(request.amount).ok_or_else(|| protocol(11007, "split amount too large."))?;
        // The kept outputs are the shortest prefix adding up to `total - amount`
        let mut running = Amount::ZERO;
        let boundary = request
            .outputs
            .iter()
            .position(|o| {
                let reached = running == keep;
                running = running.checked_add(o.amount).unwrap_or(running);
                reached
            })
            .unwrap_or(request.outputs.len());
        let boundary =
            if self.state.borrow().misplaced_split { (boundary + 1).min(request.outputs.len()) } else { boundary };
        let promises = self.sign_outputs(&request.outputs)?;
        self.mark_spent(&request.proofs);
        let (fst, snd) = promises.split_at(boundary);
        Ok(SplitResponse { fst: fst.to_vec(), snd: snd.to_vec() })
    }

    async fn melt(&self, request: MeltRequest) -> Result<MeltResponse, MintError> {
        self.start_request()?;
        if let Some(err) = self.state.borrow_mut().melt_failure.take() {
            return Err(err);
        }
        self.verify_proofs(&request.proofs)?;
        if !matches!(sum_proofs(&request.proofs), Some(total) if total >= request.amount) {
            return Err(protocol(20001, "provided proofs are not enough to pay the invoice."));
        }
        if self.state.borrow().unpaid_melts {
            return Ok(MeltResponse { paid: false, preimage: None });
        }
        self.mark_spent(&request.proofs);
        Ok(MeltResponse { paid: true, preimage: Some("00".repeat(32)) })
    }

    async fn check_fees(&self, _invoice: &str) -> Result<CheckFeesResponse, MintError> {
        self.start_request()?;
        Ok(CheckFeesResponse { fee: self.state.borrow().fee })
    }
}

/// Builds payment requests understood by [`MockInvoiceDecoder`].
pub fn mock_invoice(amount: Amount) -> String {
    format!("{MOCK_INVOICE_PREFIX}{}:external", amount.to_sat())
}

/// Decodes `lnmock<sat>:<anything>` payment requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockInvoiceDecoder;

impl InvoiceDecoder for MockInvoiceDecoder {
    fn amount(&self, invoice: &str) -> Result<Amount, InvoiceError> {
        let rest = invoice.strip_prefix(MOCK_INVOICE_PREFIX).ok_or_else(|| InvoiceError::Malformed(invoice.into()))?;
        let sat = rest.split(':').next().unwrap_or_default();
        let sat = sat.parse::<u64>().map_err(|e| InvoiceError::Malformed(e.to_string()))?;
        match sat {
            0 => Err(InvoiceError::MissingAmount),
            sat => Ok(Amount::from_sat(sat)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cryptography::dhke::{blind_secret, unblind_signature};
    use crate::cryptography::keys::Secret;

    async fn minted_proof(mint: &MockMint, amount: u64) -> Proof {
        let amount = Amount::from_sat(amount);
        let invoice = mint.request_mint(amount).await.unwrap();
        let secret = Secret::random(&mut OsRng);
        let (blinded, r) = blind_secret(&secret, &mut OsRng).unwrap();
        let response = mint.mint(vec![BlindedMessage { amount, blinded }], &invoice.hash).await.unwrap();
        let promise = &response.promises[0];
        let key = *mint.public_keys().amount_key(amount).unwrap();
        let signature = unblind_signature(&promise.blinded_signature, &r, &key).unwrap();
        Proof { id: promise.id.clone(), amount, secret: secret.encode(), signature }
    }

    #[tokio::test]
    async fn honest_proofs_verify() {
        let mint = MockMint::new();
        let proof = minted_proof(&mint, 8).await;
        assert!(mint.verify_proofs(&[proof.clone()]).is_ok());
        let mut forged = proof.clone();
        forged.amount = Amount::from_sat(16);
        assert!(matches!(mint.verify_proofs(&[forged]), Err(MintError::Protocol { code: 11003, .. })));
        assert!(matches!(mint.verify_proofs(&[proof.clone(), proof]), Err(MintError::Protocol { code: 11002, .. })));
    }

    #[tokio::test]
    async fn invoices_mint_once() {
        let mint = MockMint::new();
        let invoice = mint.request_mint(Amount::from_sat(2)).await.unwrap();
        assert_eq!(MockInvoiceDecoder.amount(&invoice.pr).unwrap(), Amount::from_sat(2));
        let secret = Secret::random(&mut OsRng);
        let (blinded, _) = blind_secret(&secret, &mut OsRng).unwrap();
        let outputs = vec![BlindedMessage { amount: Amount::from_sat(2), blinded }];
        assert!(mint.mint(outputs.clone(), &invoice.hash).await.is_ok());
        let err = mint.mint(outputs, &invoice.hash).await.unwrap_err();
        assert!(matches!(err, MintError::Protocol { code: 10002, .. }));
    }

    #[tokio::test]
    async fn injected_failures() {
        let mint = MockMint::new();
        mint.fail_next_request(MintError::Transport("connection reset".into()));
        assert_eq!(mint.get_keys().await.unwrap_err(), MintError::Transport("connection reset".into()));
        assert!(mint.get_keys().await.is_ok());
        assert_eq!(mint.request_count(), 2);

        mint.fail_next_melt(MintError::Transport("connection reset".into()));
        assert!(mint.check_fees("lnmock1:x").await.is_ok());
        let request = MeltRequest { proofs: vec![], amount: Amount::from_sat(1), invoice: "lnmock1:x".into() };
        assert_eq!(mint.melt(request).await.unwrap_err(), MintError::Transport("connection reset".into()));
    }

    #[test]
    fn mock_invoices() {
        assert_eq!(MockInvoiceDecoder.amount(&mock_invoice(Amount::from_sat(21))).unwrap(), Amount::from_sat(21));
        assert_eq!(MockInvoiceDecoder.amount("lnmock0:x"), Err(InvoiceError::MissingAmount));
        assert!(MockInvoiceDecoder.amount("lnbc1").is_err());
    }
}

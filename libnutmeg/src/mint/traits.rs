use crate::amount::Amount;
use crate::mint::data_objects::{
    CheckFeesResponse, MeltRequest, MeltResponse, PostMintResponse, RequestMintResponse, SplitRequest, SplitResponse,
};
use crate::mint::MintError;
use crate::proofs::{BlindedMessage, Keys};

/// The mint API consumed by the wallet. Every call is a single request/response round trip.
///
/// Implementations must return promises in the same order as the outputs they were given.
pub trait MintConnector {
    /// `GET /keys`
    async fn get_keys(&self) -> Result<Keys, MintError>;

    /// `GET /mint?amount=N`
    async fn request_mint(&self, amount: Amount) -> Result<RequestMintResponse, MintError>;

    /// `POST /mint?payment_hash=H`
    async fn mint(&self, outputs: Vec<BlindedMessage>, payment_hash: &str) -> Result<PostMintResponse, MintError>;

    /// `POST /split`
    async fn split(&self, request: SplitRequest) -> Result<SplitResponse, MintError>;

    /// `POST /melt`
    async fn melt(&self, request: MeltRequest) -> Result<MeltResponse, MintError>;

    /// `POST /checkfees`
    async fn check_fees(&self, invoice: &str) -> Result<CheckFeesResponse, MintError>;
}

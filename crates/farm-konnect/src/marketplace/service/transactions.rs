use chrono::Utc;
use tracing::info;

use super::listings::LISTING_NOT_FOUND;
use super::{require_role, MarketplaceService, ServiceError};
use crate::marketplace::domain::{
    Transaction, TransactionId, TransactionStatus, User, UserRole,
};
use crate::marketplace::input::TransactionInput;
use crate::marketplace::photos::PhotoStorage;
use crate::marketplace::repository::MarketplaceStore;
use crate::marketplace::views::TransactionView;

impl<S, P> MarketplaceService<S, P>
where
    S: MarketplaceStore + 'static,
    P: PhotoStorage + 'static,
{
    /// Record a lease agreement. Admin only; the parties are not checked against the store.
    pub fn record_transaction(
        &self,
        actor: &User,
        input: TransactionInput,
    ) -> Result<Transaction, ServiceError> {
        require_role(actor, UserRole::Admin)?;
        let draft = input.validate()?;

        let listing = draft
            .listing_id
            .map(|id| self.store.fetch_listing(&id))
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound(LISTING_NOT_FOUND))?;

        let transaction = Transaction {
            id: TransactionId::generate(),
            listing_id: listing.id,
            landowner: draft.landowner,
            farmer: draft.farmer,
            total_amount: draft.total_amount,
            platform_fee: draft.platform_fee,
            status: TransactionStatus::Pending,
            payment_details: draft.payment_details,
            created_at: Utc::now(),
        };

        let transaction = self.store.insert_transaction(transaction)?;
        info!(
            transaction_id = %transaction.id,
            listing_id = %listing.id,
            total_amount = transaction.total_amount,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Visible to admins and to the two parties of the agreement.
    pub fn transaction(&self, actor: &User, id: &str) -> Result<TransactionView, ServiceError> {
        let transaction = TransactionId::parse(id)
            .map(|id| self.store.fetch_transaction(&id))
            .transpose()?
            .flatten()
            .ok_or(ServiceError::NotFound("Transaction not found"))?;

        if !actor.is_admin() && !transaction.is_party(&actor.id) {
            return Err(ServiceError::Forbidden(
                "Not authorized to view this transaction".to_string(),
            ));
        }

        let listing = self.listing_title(&transaction.listing_id)?;
        let landowner_details = self.party(&transaction.landowner)?;
        let farmer_details = self.party(&transaction.farmer)?;
        Ok(TransactionView {
            transaction,
            listing,
            landowner_details,
            farmer_details,
        })
    }
}

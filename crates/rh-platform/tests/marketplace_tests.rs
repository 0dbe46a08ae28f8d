//! Marketplace operation tests
//!
//! Drive the use cases against the in-memory repositories.

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;

use rh_platform::listing::operations::{
    SearchListingsUseCase, SetAdvertiseCommand, SetAdvertiseUseCase, SetVerificationStatusCommand,
    SetVerificationStatusUseCase,
};
use rh_platform::listing::{
    InMemoryListingRepository, Listing, ListingChanges, ListingPredicate, ListingRepository, ListingSearch,
    VerificationStatus,
};
use rh_platform::offer::operations::{
    AcceptOfferCommand, AcceptOfferUseCase, SetOfferStatusCommand, SetOfferStatusUseCase,
    SubmitOfferCommand, SubmitOfferUseCase,
};
use rh_platform::offer::{InMemoryOfferRepository, Offer, OfferRepository, OfferStatus};
use rh_platform::payment::operations::{RecordPaymentCommand, RecordPaymentUseCase};
use rh_platform::payment::{InMemoryPaymentRepository, Payment, PaymentRepository};
use rh_platform::report::operations::{FileReportCommand, FileReportUseCase, ResolveReportCommand, ResolveReportUseCase};
use rh_platform::report::{InMemoryReportRepository, ReportRepository, ReportStatus};
use rh_platform::review::operations::{AddReviewCommand, AddReviewUseCase};
use rh_platform::review::{InMemoryReviewRepository, Review, ReviewRepository};
use rh_platform::user::operations::{ChangeRoleCommand, ChangeRoleUseCase};
use rh_platform::user::{InMemoryUserRepository, User, UserRepository, UserRole};
use rh_platform::wishlist::operations::{AddToWishlistCommand, AddToWishlistUseCase};
use rh_platform::wishlist::{InMemoryWishlistRepository, WishlistRepository};
use rh_platform::{PlatformError, Result, StepStatus};

const AGENT: &str = "agent@example.com";
const OTHER_AGENT: &str = "other.agent@example.com";
const BUYER: &str = "buyer@example.com";
const SECOND_BUYER: &str = "second.buyer@example.com";

async fn verified_listing(repo: &InMemoryListingRepository, agent: &str, location: &str, min: f64, max: f64) -> Listing {
    let mut listing = Listing::new(agent, format!("House in {}", location), location, min, max);
    listing.status = VerificationStatus::Verified;
    repo.insert(&listing).await.unwrap();
    listing
}

fn store_down() -> PlatformError {
    PlatformError::Internal { message: "store unavailable".to_string() }
}

fn step_statuses(err: Result<impl std::fmt::Debug>) -> Vec<StepStatus> {
    match err {
        Err(PlatformError::PartialFailure { steps, .. }) => steps.iter().map(|s| s.status).collect(),
        other => panic!("expected partial failure, got {other:?}"),
    }
}

fn offer_with_status(listing: &Listing, buyer: &str, price: f64, status: OfferStatus) -> Offer {
    let mut offer = Offer::new(listing, buyer, price);
    offer.status = status;
    offer
}

/// Review store whose bulk delete always fails
struct FailingReviewRepository {
    inner: InMemoryReviewRepository,
}

#[async_trait]
impl ReviewRepository for FailingReviewRepository {
    async fn insert(&self, review: &Review) -> Result<()> {
        self.inner.insert(review).await
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Review>> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Review>> {
        self.inner.find_all().await
    }

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Review>> {
        self.inner.find_by_listing(listing_id).await
    }

    async fn find_by_reviewer(&self, email: &str) -> Result<Vec<Review>> {
        self.inner.find_by_reviewer(email).await
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        self.inner.delete(id).await
    }

    async fn delete_by_listing(&self, _listing_id: &str) -> Result<u64> {
        Err(store_down())
    }
}

/// Listing store whose advertise flag cannot be written
struct FailingListingRepository {
    inner: InMemoryListingRepository,
}

#[async_trait]
impl ListingRepository for FailingListingRepository {
    async fn insert(&self, listing: &Listing) -> Result<()> {
        self.inner.insert(listing).await
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Listing>> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Listing>> {
        self.inner.find_all().await
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Listing>> {
        self.inner.find_by_agent(agent_email).await
    }

    async fn find_advertised(&self) -> Result<Vec<Listing>> {
        self.inner.find_advertised().await
    }

    async fn search(&self, predicate: &ListingPredicate, skip: u64, limit: Option<i64>) -> Result<Vec<Listing>> {
        self.inner.search(predicate, skip, limit).await
    }

    async fn count(&self, predicate: &ListingPredicate) -> Result<u64> {
        self.inner.count(predicate).await
    }

    async fn set_status(&self, id: &ObjectId, status: VerificationStatus) -> Result<bool> {
        self.inner.set_status(id, status).await
    }

    async fn set_advertise(&self, _id: &ObjectId, _advertise: bool) -> Result<bool> {
        Err(store_down())
    }

    async fn update_details(&self, id: &ObjectId, changes: &ListingChanges) -> Result<bool> {
        self.inner.update_details(id, changes).await
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64> {
        self.inner.delete(id).await
    }

    async fn delete_by_agent(&self, agent_email: &str) -> Result<u64> {
        self.inner.delete_by_agent(agent_email).await
    }
}

#[derive(Clone, Copy, PartialEq)]
enum OfferWrite {
    RejectSiblings,
    MarkBought,
}

/// Offer store where one bulk write always fails
struct FailingOfferRepository {
    inner: InMemoryOfferRepository,
    fails: OfferWrite,
}

#[async_trait]
impl OfferRepository for FailingOfferRepository {
    async fn insert_unique(&self, offer: &Offer) -> Result<bool> {
        self.inner.insert_unique(offer).await
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Offer>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_listing_and_buyer(&self, listing_id: &str, buyer_email: &str) -> Result<Option<Offer>> {
        self.inner.find_by_listing_and_buyer(listing_id, buyer_email).await
    }

    async fn find_by_listing(&self, listing_id: &str) -> Result<Vec<Offer>> {
        self.inner.find_by_listing(listing_id).await
    }

    async fn find_by_agent(&self, agent_email: &str) -> Result<Vec<Offer>> {
        self.inner.find_by_agent(agent_email).await
    }

    async fn find_by_buyer(&self, buyer_email: &str) -> Result<Vec<Offer>> {
        self.inner.find_by_buyer(buyer_email).await
    }

    async fn set_status(&self, id: &ObjectId, status: OfferStatus) -> Result<bool> {
        self.inner.set_status(id, status).await
    }

    async fn reject_siblings(&self, listing_id: &str, keep: &ObjectId) -> Result<u64> {
        if self.fails == OfferWrite::RejectSiblings {
            return Err(store_down());
        }
        self.inner.reject_siblings(listing_id, keep).await
    }

    async fn mark_bought(&self, id: &ObjectId, transaction_id: &str) -> Result<bool> {
        if self.fails == OfferWrite::MarkBought {
            return Err(store_down());
        }
        self.inner.mark_bought(id, transaction_id).await
    }
}

mod offer_tests {
    use super::*;

    fn fixtures() -> (Arc<InMemoryListingRepository>, Arc<InMemoryOfferRepository>) {
        (Arc::new(InMemoryListingRepository::new()), Arc::new(InMemoryOfferRepository::new()))
    }

    #[tokio::test]
    async fn test_second_offer_by_same_buyer_is_duplicate() {
        let (listings, offers) = fixtures();
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let submit = SubmitOfferUseCase::new(listings.clone(), offers.clone());

        let command = SubmitOfferCommand {
            property_id: listing.id.to_hex(),
            offered_price: 150.0,
            buyer_name: Some("Buyer".to_string()),
        };
        let first = submit.execute(command.clone(), BUYER).await.unwrap();
        assert_eq!(first.status, OfferStatus::Pending);
        assert_eq!(first.agent_email, AGENT);

        let second = submit.execute(command, BUYER).await;
        assert!(matches!(second, Err(PlatformError::Duplicate { .. })));
        assert_eq!(offers.find_by_listing(&listing.id.to_hex()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_offer_price_must_fall_within_listing_range() {
        let (listings, offers) = fixtures();
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let submit = SubmitOfferUseCase::new(listings, offers);

        for price in [99.0, 200.5] {
            let result = submit
                .execute(
                    SubmitOfferCommand { property_id: listing.id.to_hex(), offered_price: price, buyer_name: None },
                    BUYER,
                )
                .await;
            assert!(matches!(result, Err(PlatformError::Validation { .. })), "price {price}");
        }
    }

    #[tokio::test]
    async fn test_unverified_listing_rejects_offers() {
        let (listings, offers) = fixtures();
        let listing = Listing::new(AGENT, "Pending house", "Sylhet", 100.0, 200.0);
        listings.insert(&listing).await.unwrap();

        let result = SubmitOfferUseCase::new(listings, offers)
            .execute(
                SubmitOfferCommand { property_id: listing.id.to_hex(), offered_price: 150.0, buyer_name: None },
                BUYER,
            )
            .await;
        assert!(matches!(result, Err(PlatformError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_accept_rejects_every_sibling() {
        let (listings, offers) = fixtures();
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let elsewhere = verified_listing(&listings, AGENT, "Khulna", 100.0, 200.0).await;

        let target = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Pending);
        let pending = offer_with_status(&listing, SECOND_BUYER, 160.0, OfferStatus::Pending);
        let bought = offer_with_status(&listing, "third@example.com", 170.0, OfferStatus::Bought);
        let unrelated = offer_with_status(&elsewhere, SECOND_BUYER, 120.0, OfferStatus::Pending);
        for offer in [&target, &pending, &bought, &unrelated] {
            assert!(offers.insert_unique(offer).await.unwrap());
        }

        let outcome = AcceptOfferUseCase::new(offers.clone())
            .execute(AcceptOfferCommand { offer_id: target.id }, AGENT)
            .await
            .unwrap();

        assert_eq!(outcome.rejected, 2);
        assert_eq!(outcome.steps.len(), 2);
        assert!(outcome.steps.iter().all(|s| s.status == StepStatus::Completed));

        let after = offers.find_by_listing(&listing.id.to_hex()).await.unwrap();
        let accepted: Vec<_> = after.iter().filter(|o| o.status == OfferStatus::Accepted).collect();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, target.id);
        assert!(after.iter().filter(|o| o.id != target.id).all(|o| o.status == OfferStatus::Rejected));

        let untouched = offers.find_by_id(&unrelated.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, OfferStatus::Pending);
    }

    #[tokio::test]
    async fn test_accept_missing_offer_changes_nothing() {
        let (listings, offers) = fixtures();
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let existing = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Pending);
        offers.insert_unique(&existing).await.unwrap();

        let result = AcceptOfferUseCase::new(offers.clone())
            .execute(AcceptOfferCommand { offer_id: ObjectId::new() }, AGENT)
            .await;

        assert!(matches!(result, Err(PlatformError::NotFound { .. })));
        let stored = offers.find_by_id(&existing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OfferStatus::Pending);
    }

    #[tokio::test]
    async fn test_only_listing_agent_may_accept() {
        let (listings, offers) = fixtures();
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let offer = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Pending);
        offers.insert_unique(&offer).await.unwrap();

        let result = AcceptOfferUseCase::new(offers.clone())
            .execute(AcceptOfferCommand { offer_id: offer.id }, OTHER_AGENT)
            .await;
        assert!(matches!(result, Err(PlatformError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_set_status_refuses_accepted() {
        let (listings, offers) = fixtures();
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let offer = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Pending);
        offers.insert_unique(&offer).await.unwrap();
        let use_case = SetOfferStatusUseCase::new(offers.clone());

        let result = use_case
            .execute(SetOfferStatusCommand { offer_id: offer.id, status: OfferStatus::Accepted }, AGENT)
            .await;
        assert!(matches!(result, Err(PlatformError::Validation { .. })));

        use_case
            .execute(SetOfferStatusCommand { offer_id: offer.id, status: OfferStatus::Rejected }, AGENT)
            .await
            .unwrap();
        let stored = offers.find_by_id(&offer.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OfferStatus::Rejected);
    }

    #[tokio::test]
    async fn test_failed_sibling_rejection_reports_partial_failure() {
        let listings = InMemoryListingRepository::new();
        let offers = Arc::new(FailingOfferRepository {
            inner: InMemoryOfferRepository::new(),
            fails: OfferWrite::RejectSiblings,
        });
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let target = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Pending);
        let sibling = offer_with_status(&listing, SECOND_BUYER, 160.0, OfferStatus::Pending);
        offers.insert_unique(&target).await.unwrap();
        offers.insert_unique(&sibling).await.unwrap();

        let result = AcceptOfferUseCase::new(offers.clone())
            .execute(AcceptOfferCommand { offer_id: target.id }, AGENT)
            .await;

        assert_eq!(step_statuses(result), vec![StepStatus::Completed, StepStatus::Failed]);
        assert_eq!(offers.find_by_id(&target.id).await.unwrap().unwrap().status, OfferStatus::Accepted);
        assert_eq!(offers.find_by_id(&sibling.id).await.unwrap().unwrap().status, OfferStatus::Pending);
    }
}

mod settlement_tests {
    use super::*;

    #[tokio::test]
    async fn test_payment_settles_accepted_offer() {
        let listings = InMemoryListingRepository::new();
        let offers = Arc::new(InMemoryOfferRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let offer = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Accepted);
        offers.insert_unique(&offer).await.unwrap();

        let outcome = RecordPaymentUseCase::new(offers.clone(), payments.clone())
            .execute(
                RecordPaymentCommand { bought_id: offer.id.to_hex(), transaction_id: "pi_123".to_string() },
                BUYER,
            )
            .await
            .unwrap();

        assert_eq!(outcome.payment.price, 150.0);
        assert_eq!(outcome.steps.len(), 2);
        assert_eq!(outcome.steps[1].affected, 1);
        assert_eq!(payments.len(), 1);

        let stored = offers.find_by_id(&offer.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OfferStatus::Bought);
        assert_eq!(stored.transaction_id.as_deref(), Some("pi_123"));

        let sales = payments.find_by_agent(AGENT).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].transaction_id, "pi_123");
    }

    #[tokio::test]
    async fn test_pending_offer_cannot_be_paid() {
        let listings = InMemoryListingRepository::new();
        let offers = Arc::new(InMemoryOfferRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let offer = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Pending);
        offers.insert_unique(&offer).await.unwrap();

        let result = RecordPaymentUseCase::new(offers.clone(), payments.clone())
            .execute(
                RecordPaymentCommand { bought_id: offer.id.to_hex(), transaction_id: "pi_1".to_string() },
                BUYER,
            )
            .await;

        assert!(matches!(result, Err(PlatformError::Conflict { .. })));
        assert!(payments.is_empty());
    }

    #[tokio::test]
    async fn test_only_buyer_can_pay() {
        let listings = InMemoryListingRepository::new();
        let offers = Arc::new(InMemoryOfferRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let offer = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Accepted);
        offers.insert_unique(&offer).await.unwrap();

        let result = RecordPaymentUseCase::new(offers, payments.clone())
            .execute(
                RecordPaymentCommand { bought_id: offer.id.to_hex(), transaction_id: "pi_1".to_string() },
                SECOND_BUYER,
            )
            .await;

        assert!(matches!(result, Err(PlatformError::Forbidden { .. })));
        assert!(payments.is_empty());
    }

    #[tokio::test]
    async fn test_failed_settlement_keeps_payment_and_reports_both_steps() {
        let listings = InMemoryListingRepository::new();
        let offers = Arc::new(FailingOfferRepository {
            inner: InMemoryOfferRepository::new(),
            fails: OfferWrite::MarkBought,
        });
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let offer = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Accepted);
        offers.insert_unique(&offer).await.unwrap();

        let result = RecordPaymentUseCase::new(offers.clone(), payments.clone())
            .execute(
                RecordPaymentCommand { bought_id: offer.id.to_hex(), transaction_id: "pi_9".to_string() },
                BUYER,
            )
            .await;

        match result {
            Err(PlatformError::PartialFailure { steps, .. }) => {
                assert_eq!(steps.len(), 2);
                assert_eq!(steps[0].status, StepStatus::Completed);
                assert_eq!(steps[1].status, StepStatus::Failed);
                assert_eq!(steps[1].step, "mark offer bought");
            }
            other => panic!("expected partial failure, got {other:?}"),
        }

        let sales = payments.find_by_agent(AGENT).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].transaction_id, "pi_9");
        assert_eq!(offers.find_by_id(&offer.id).await.unwrap().unwrap().status, OfferStatus::Accepted);
    }

    #[tokio::test]
    async fn test_second_payment_for_same_offer_is_duplicate() {
        let listings = InMemoryListingRepository::new();
        let offers = Arc::new(InMemoryOfferRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let offer = offer_with_status(&listing, BUYER, 150.0, OfferStatus::Accepted);
        offers.insert_unique(&offer).await.unwrap();

        // A concurrent payer has written its row but not yet settled the offer.
        assert!(payments.insert_unique(&Payment::for_offer(&offer, "pi_first")).await.unwrap());

        let result = RecordPaymentUseCase::new(offers.clone(), payments.clone())
            .execute(
                RecordPaymentCommand { bought_id: offer.id.to_hex(), transaction_id: "pi_second".to_string() },
                BUYER,
            )
            .await;

        assert!(matches!(result, Err(PlatformError::Duplicate { .. })));
        assert_eq!(payments.len(), 1);
        assert_eq!(offers.find_by_id(&offer.id).await.unwrap().unwrap().status, OfferStatus::Accepted);
    }
}

mod moderation_tests {
    use super::*;

    #[tokio::test]
    async fn test_fraud_purges_only_that_agents_listings() {
        let users = Arc::new(InMemoryUserRepository::new());
        let listings = Arc::new(InMemoryListingRepository::new());

        let agent = User::new(AGENT).with_role(UserRole::Agent);
        users.insert_if_absent(&agent).await.unwrap();
        verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        verified_listing(&listings, AGENT, "Sylhet", 100.0, 200.0).await;
        let kept = verified_listing(&listings, OTHER_AGENT, "Khulna", 100.0, 200.0).await;

        let steps = ChangeRoleUseCase::new(users.clone(), listings.clone())
            .execute(ChangeRoleCommand { user_id: agent.id, role: UserRole::Fraud })
            .await
            .unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].affected, 2);
        assert!(listings.find_by_agent(AGENT).await.unwrap().is_empty());

        let remaining = listings.find_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept.id);

        let stored = users.find_by_id(&agent.id).await.unwrap().unwrap();
        assert_eq!(stored.role, UserRole::Fraud);
    }

    #[tokio::test]
    async fn test_promotion_has_no_cascade() {
        let users = Arc::new(InMemoryUserRepository::new());
        let listings = Arc::new(InMemoryListingRepository::new());
        let user = User::new(BUYER);
        users.insert_if_absent(&user).await.unwrap();

        let steps = ChangeRoleUseCase::new(users.clone(), listings)
            .execute(ChangeRoleCommand { user_id: user.id, role: UserRole::Agent })
            .await
            .unwrap();

        assert_eq!(steps.len(), 1);
        assert_eq!(users.find_by_id(&user.id).await.unwrap().unwrap().role, UserRole::Agent);
    }

    #[tokio::test]
    async fn test_resolving_report_removes_listing_and_reviews() {
        let listings = Arc::new(InMemoryListingRepository::new());
        let reviews = Arc::new(InMemoryReviewRepository::new());
        let reports = Arc::new(InMemoryReportRepository::new());

        let reported = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let other = verified_listing(&listings, OTHER_AGENT, "Khulna", 100.0, 200.0).await;

        let add_review = AddReviewUseCase::new(listings.clone(), reviews.clone());
        for (listing, text) in [(&reported, "misleading"), (&reported, "fake photos"), (&other, "lovely")] {
            add_review
                .execute(
                    AddReviewCommand {
                        property_id: listing.id.to_hex(),
                        rating: 2,
                        review: text.to_string(),
                        reviewer_name: None,
                        reviewer_image: None,
                    },
                    BUYER,
                )
                .await
                .unwrap();
        }

        let report = FileReportUseCase::new(listings.clone(), reports.clone())
            .execute(
                FileReportCommand {
                    property_id: reported.id.to_hex(),
                    description: "Listing does not exist".to_string(),
                    reporter_name: None,
                },
                BUYER,
            )
            .await
            .unwrap();

        let steps = ResolveReportUseCase::new(listings.clone(), reviews.clone(), reports.clone())
            .execute(ResolveReportCommand { report_id: report.id })
            .await
            .unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].affected, 2);
        assert!(listings.find_by_id(&reported.id).await.unwrap().is_none());
        assert!(reviews.find_by_listing(&reported.id.to_hex()).await.unwrap().is_empty());
        assert_eq!(reviews.find_by_listing(&other.id.to_hex()).await.unwrap().len(), 1);

        let stored = reports.find_by_id(&report.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReportStatus::Removed);
    }

    #[tokio::test]
    async fn test_failed_review_purge_reports_partial_failure() {
        let listings = Arc::new(InMemoryListingRepository::new());
        let reviews = Arc::new(FailingReviewRepository { inner: InMemoryReviewRepository::new() });
        let reports = Arc::new(InMemoryReportRepository::new());

        let reported = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let report = FileReportUseCase::new(listings.clone(), reports.clone())
            .execute(
                FileReportCommand {
                    property_id: reported.id.to_hex(),
                    description: "Scam".to_string(),
                    reporter_name: None,
                },
                BUYER,
            )
            .await
            .unwrap();

        let result = ResolveReportUseCase::new(listings.clone(), reviews, reports.clone())
            .execute(ResolveReportCommand { report_id: report.id })
            .await;

        match result {
            Err(PlatformError::PartialFailure { steps, .. }) => {
                let statuses: Vec<_> = steps.iter().map(|s| s.status).collect();
                assert_eq!(statuses, vec![StepStatus::Completed, StepStatus::Failed, StepStatus::Skipped]);
                assert_eq!(steps[1].step, "delete listing reviews");
            }
            other => panic!("expected partial failure, got {other:?}"),
        }

        assert!(listings.find_by_id(&reported.id).await.unwrap().is_none());
        let stored = reports.find_by_id(&report.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ReportStatus::Open);
    }
}

mod listing_tests {
    use super::*;

    fn advertised(agent: &str) -> Listing {
        let mut listing = Listing::new(agent, "Penthouse", "Gulshan, Dhaka", 100.0, 200.0);
        listing.status = VerificationStatus::Verified;
        listing.advertise = true;
        listing
    }

    #[tokio::test]
    async fn test_unverifying_withdraws_advertisement() {
        let listings = Arc::new(InMemoryListingRepository::new());
        let listing = advertised(AGENT);
        listings.insert(&listing).await.unwrap();

        let steps = SetVerificationStatusUseCase::new(listings.clone())
            .execute(SetVerificationStatusCommand { id: listing.id, status: VerificationStatus::Rejected })
            .await
            .unwrap();

        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.status == StepStatus::Completed));
        let stored = listings.find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VerificationStatus::Rejected);
        assert!(!stored.advertise);
    }

    #[tokio::test]
    async fn test_failed_withdrawal_reports_partial_failure() {
        let listings = Arc::new(FailingListingRepository { inner: InMemoryListingRepository::new() });
        let listing = advertised(AGENT);
        listings.insert(&listing).await.unwrap();

        let result = SetVerificationStatusUseCase::new(listings.clone())
            .execute(SetVerificationStatusCommand { id: listing.id, status: VerificationStatus::Rejected })
            .await;

        assert_eq!(step_statuses(result), vec![StepStatus::Completed, StepStatus::Failed]);
        let stored = listings.find_by_id(&listing.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VerificationStatus::Rejected);
    }

    #[tokio::test]
    async fn test_pending_listing_cannot_be_advertised() {
        let listings = Arc::new(InMemoryListingRepository::new());
        let listing = Listing::new(AGENT, "Pending flat", "Mirpur, Dhaka", 100.0, 200.0);
        listings.insert(&listing).await.unwrap();

        let result = SetAdvertiseUseCase::new(listings.clone())
            .execute(SetAdvertiseCommand { id: listing.id, advertise: true })
            .await;

        assert!(matches!(result, Err(PlatformError::Validation { .. })));
        assert!(!listings.find_by_id(&listing.id).await.unwrap().unwrap().advertise);
    }
}

mod wishlist_tests {
    use super::*;

    #[tokio::test]
    async fn test_same_listing_is_saved_once_per_buyer() {
        let listings = Arc::new(InMemoryListingRepository::new());
        let wishlist = Arc::new(InMemoryWishlistRepository::new());
        let listing = verified_listing(&listings, AGENT, "Dhaka", 100.0, 200.0).await;
        let add = AddToWishlistUseCase::new(listings.clone(), wishlist.clone());
        let command = AddToWishlistCommand { property_id: listing.id.to_hex() };

        add.execute(command.clone(), BUYER).await.unwrap();
        let again = add.execute(command.clone(), BUYER).await;
        assert!(matches!(again, Err(PlatformError::Duplicate { .. })));
        assert_eq!(wishlist.find_by_buyer(BUYER).await.unwrap().len(), 1);

        add.execute(command, SECOND_BUYER).await.unwrap();
        assert_eq!(wishlist.find_by_buyer(SECOND_BUYER).await.unwrap().len(), 1);
    }
}

mod search_tests {
    use super::*;

    async fn seeded() -> Arc<InMemoryListingRepository> {
        let listings = Arc::new(InMemoryListingRepository::new());
        verified_listing(&listings, AGENT, "Gulshan, Dhaka", 150.0, 300.0).await;
        verified_listing(&listings, AGENT, "Banani, Dhaka", 50.0, 120.0).await;
        verified_listing(&listings, AGENT, "Sylhet", 200.0, 250.0).await;
        listings
            .insert(&Listing::new(AGENT, "Unverified", "Mirpur, Dhaka", 150.0, 200.0))
            .await
            .unwrap();
        listings
    }

    #[tokio::test]
    async fn test_location_filter_is_case_insensitive() {
        let listings = seeded().await;
        let search = ListingSearch::new(Some("Verified"), Some("dhaka"), None, None, None, None).unwrap();

        let page = SearchListingsUseCase::new(listings).execute(&search).await.unwrap();

        assert_eq!(page.count, 2);
        assert!(page.listings.iter().all(|l| l.location.contains("Dhaka")));
        assert!(page.listings.iter().all(|l| l.status == VerificationStatus::Verified));
    }

    #[tokio::test]
    async fn test_price_range_replaces_other_filters() {
        let listings = seeded().await;
        let search = ListingSearch::new(Some("Verified"), Some("Sylhet"), Some(100.0), Some(300.0), None, None).unwrap();

        let page = SearchListingsUseCase::new(listings).execute(&search).await.unwrap();

        // Contained ranges only; the unverified listing matches because status is dropped.
        let mut locations: Vec<_> = page.listings.iter().map(|l| l.location.as_str()).collect();
        locations.sort();
        assert_eq!(locations, vec!["Gulshan, Dhaka", "Mirpur, Dhaka", "Sylhet"]);
        assert_eq!(page.count, 3);
    }

    #[tokio::test]
    async fn test_paging_keeps_full_count() {
        let listings = seeded().await;
        let search = ListingSearch::new(Some("Verified"), None, None, None, Some(2), Some(2)).unwrap();

        let page = SearchListingsUseCase::new(listings).execute(&search).await.unwrap();

        assert_eq!(page.count, 3);
        assert_eq!(page.listings.len(), 1);
    }
}

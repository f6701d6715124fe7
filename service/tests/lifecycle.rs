//! End-to-end scenarios of the broker-selection lifecycle.
//!
//! Each scenario drives the [`Service`] through its public [`Command`]s and
//! [`Query`]s against the in-memory store, with a recording notification
//! sink standing in for the external dispatcher.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use common::{money::Currency, operations::Insert, DateTime, Money};
use rust_decimal::Decimal;
use secrecy::SecretBox;
use service::{
    command::{
        select_offer, submit_offer, AuthorizeUserSession, CompleteCase,
        CompleteShowing, CreateCase, CreateUser, CreateUserSession,
        ForceCaseStatus, ImpersonateUser, MarkOfferViewed, RegisterAgent,
        ReturnToAdmin, ScheduleShowing, SelectOffer, SubmitCase, SubmitOffer,
        WithdrawCase,
    },
    domain::{case, offer, showing, user, Offer},
    infra::{
        database::Mem,
        estimate::NoValuation,
        notify::{Kind, Notification, Payload, Sink},
    },
    query, Command as _, Config, Service,
};

/// Notification sink recording everything it receives.
#[derive(Debug, Default)]
struct RecordingSink(Mutex<Vec<Notification>>);

#[async_trait]
impl Sink for RecordingSink {
    async fn send(&self, notification: Notification) -> bool {
        self.0.lock().unwrap().push(notification);
        true
    }
}

impl RecordingSink {
    fn sent(&self) -> Vec<Notification> {
        self.0.lock().unwrap().clone()
    }
}

fn config() -> Config {
    Config {
        jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(b"secret"),
        jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(b"secret"),
        scoring: offer::score::Config::default(),
        valuation: service::command::create_case::Config::default(),
        plausibility: service::command::submit_offer::Config::default(),
    }
}

fn harness() -> (Service<Mem>, service::task::Background, Arc<RecordingSink>)
{
    let sink = Arc::new(RecordingSink::default());
    let (service, bg) = Service::new(
        config(),
        Mem::new(),
        Arc::new(NoValuation),
        Arc::clone(&sink) as Arc<dyn Sink>,
    );
    (service, bg, sink)
}

fn dkk(amount: i64) -> Money {
    Money {
        amount: Decimal::from(amount),
        currency: Currency::Dkk,
    }
}

fn password(s: &str) -> SecretBox<user::Password> {
    SecretBox::new(Box::new(user::Password::new(s).unwrap()))
}

async fn create_user(
    service: &Service<Mem>,
    login: &str,
    role: user::Role,
) -> user::Id {
    let agency = (role == user::Role::Agent)
        .then(|| user::Agency::new(format!("{login} & co")).unwrap());
    service
        .execute(CreateUser {
            name: user::Name::new(login).unwrap(),
            login: user::Login::new(login).unwrap(),
            password: password("hunter42"),
            email: user::Email::new(format!("{login}@example.dk")).unwrap(),
            role,
            agency,
            municipalities: BTreeSet::new(),
        })
        .await
        .unwrap()
        .id
}

async fn create_case(service: &Service<Mem>, seller_id: user::Id) -> case::Id {
    service
        .execute(CreateCase {
            seller_id,
            address: case::Address::new("Strandvejen 12").unwrap(),
            postal_code: case::PostalCode::new("2900").unwrap(),
            municipality: case::Municipality::new("Gentofte").unwrap(),
            kind: case::Kind::Villa,
            size_sqm: 180,
            num_rooms: 6,
            construction_year: 1968,
            energy_label: case::EnergyLabel::C,
            expected_price: dkk(3_000_000),
            notes: None,
        })
        .await
        .unwrap()
        .case
        .id
}

async fn status(service: &Service<Mem>, case_id: case::Id) -> case::Status {
    service
        .execute(query::case::ById::by(case_id))
        .await
        .unwrap()
        .unwrap()
        .status()
}

fn make_offer(
    case_id: case::Id,
    agent_id: user::Id,
    price: i64,
    commission: i64,
) -> SubmitOffer {
    SubmitOffer {
        case_id,
        agent_id,
        price: dkk(price),
        commission: dkk(commission),
        binding_period: 6,
        marketing: offer::Marketing {
            channels: BTreeSet::from([
                offer::Channel::Portal,
                offer::Channel::OpenHouse,
            ]),
            strategy: None,
        },
    }
}

#[tokio::test]
async fn full_broker_selection_scenario() {
    let (service, bg, sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let agent_a = create_user(&service, "agenta", user::Role::Agent).await;
    let agent_b = create_user(&service, "agentb", user::Role::Agent).await;
    let admin = create_user(&service, "admin", user::Role::Admin).await;

    let case_id = create_case(&service, seller).await;
    assert_eq!(status(&service, case_id).await, case::Status::Draft);

    service
        .execute(SubmitCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();
    assert_eq!(status(&service, case_id).await, case::Status::Active);

    service
        .execute(RegisterAgent {
            case_id,
            agent_id: agent_a,
            decision: showing::Decision::Registered,
        })
        .await
        .unwrap();
    service
        .execute(RegisterAgent {
            case_id,
            agent_id: agent_b,
            decision: showing::Decision::Declined,
        })
        .await
        .unwrap();

    service
        .execute(ScheduleShowing {
            case_id,
            seller_id: seller,
            at: DateTime::from_rfc3339("2025-06-01T10:00:00Z")
                .unwrap()
                .coerce(),
        })
        .await
        .unwrap();
    assert_eq!(
        status(&service, case_id).await,
        case::Status::ShowingScheduled,
    );

    service
        .execute(CompleteShowing {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();
    assert_eq!(
        status(&service, case_id).await,
        case::Status::ShowingCompleted,
    );

    let submitted = service
        .execute(make_offer(case_id, agent_a, 3_050_000, 28_000))
        .await
        .unwrap();
    assert!(submitted.warnings.is_empty());
    assert_eq!(
        status(&service, case_id).await,
        case::Status::OffersReceived,
    );

    let ranked = service
        .execute(query::offers::Ranked { case_id })
        .await
        .unwrap();
    assert_eq!(ranked.len(), 1);
    assert!(ranked[0].score > offer::Score::MIN);
    // Offered 50,000 above the expected price.
    assert!(ranked[0].deviation > offer::Deviation::from(Decimal::ZERO));
    assert!(ranked[0].commission_share.is_some());

    let viewed = service
        .execute(MarkOfferViewed {
            case_id,
            offer_id: submitted.offer.id,
            seller_id: seller,
        })
        .await
        .unwrap();
    assert!(viewed.seller_viewed_at.is_some());

    let selection = service
        .execute(SelectOffer {
            case_id,
            offer_id: submitted.offer.id,
            actor: seller.into(),
        })
        .await
        .unwrap();
    assert_eq!(selection.offer_id, submitted.offer.id);
    assert_eq!(
        status(&service, case_id).await,
        case::Status::BrokerSelected,
    );

    let snapshot = service
        .execute(query::case::ById::by(case_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.selection.unwrap().offer_id, submitted.offer.id);

    // An administrator finishes the paperwork acting as the seller: the
    // impersonated session passes the ownership check because it IS the
    // seller, while keeping the admin back-reference.
    let impersonated = service
        .execute(ImpersonateUser {
            admin_id: admin,
            target_id: seller,
        })
        .await
        .unwrap();
    service
        .execute(CompleteCase {
            case_id,
            actor: impersonated.session.into(),
        })
        .await
        .unwrap();
    assert_eq!(status(&service, case_id).await, case::Status::Completed);

    // Closing the service drains the notification queue.
    drop(service);
    bg.await.unwrap();

    let sent = sink.sent();
    let won = sent
        .iter()
        .filter(|n| {
            n.kind == Kind::AgentCaseClosed
                && matches!(n.payload, Payload::CaseClosed { won: true, .. })
        })
        .collect::<Vec<_>>();
    assert_eq!(won.len(), 1);
    assert_eq!(won[0].recipient, agent_a);

    // Agent B never submitted an offer, so no won/lost notification.
    assert!(!sent
        .iter()
        .any(|n| n.kind == Kind::AgentCaseClosed && n.recipient == agent_b));

    // Both agents were notified about the new case, the seller about the
    // received offer.
    assert!(sent
        .iter()
        .any(|n| n.kind == Kind::AgentNewCase && n.recipient == agent_a));
    assert!(sent
        .iter()
        .any(|n| n.kind == Kind::AgentNewCase && n.recipient == agent_b));
    assert!(sent.iter().any(|n| {
        n.kind == Kind::SellerOffersReceived && n.recipient == seller
    }));
}

#[tokio::test]
async fn resubmitting_replaces_the_offer_in_place() {
    let (service, _bg, _sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let agent = create_user(&service, "agent", user::Role::Agent).await;
    // An agent who declined the showing may still submit an offer.
    let case_id = create_case(&service, seller).await;
    service
        .execute(SubmitCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();
    service
        .execute(RegisterAgent {
            case_id,
            agent_id: agent,
            decision: showing::Decision::Declined,
        })
        .await
        .unwrap();
    service
        .execute(ScheduleShowing {
            case_id,
            seller_id: seller,
            at: DateTime::now().coerce(),
        })
        .await
        .unwrap();
    service
        .execute(CompleteShowing {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();

    let first = service
        .execute(make_offer(case_id, agent, 3_000_000, 30_000))
        .await
        .unwrap()
        .offer;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = service
        .execute(make_offer(case_id, agent, 3_100_000, 25_000))
        .await
        .unwrap()
        .offer;

    let snapshot = service
        .execute(query::case::ById::by(case_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.offers.len(), 1);

    let stored = &snapshot.offers[0];
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.price, dkk(3_100_000));
    assert_eq!(stored.commission, dkk(25_000));
    assert_eq!(stored.first_submitted_at, first.first_submitted_at);
    assert!(stored.submitted_at > first.submitted_at);
    assert_eq!(second.id, first.id);
}

#[tokio::test]
async fn second_selection_is_rejected() {
    let (service, _bg, _sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let agent_a = create_user(&service, "agenta", user::Role::Agent).await;
    let agent_b = create_user(&service, "agentb", user::Role::Agent).await;
    let case_id = create_case(&service, seller).await;
    service
        .execute(SubmitCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();
    service
        .execute(ScheduleShowing {
            case_id,
            seller_id: seller,
            at: DateTime::now().coerce(),
        })
        .await
        .unwrap();
    service
        .execute(CompleteShowing {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();

    let first = service
        .execute(make_offer(case_id, agent_a, 3_000_000, 30_000))
        .await
        .unwrap()
        .offer;
    let second = service
        .execute(make_offer(case_id, agent_b, 3_200_000, 35_000))
        .await
        .unwrap()
        .offer;

    service
        .execute(SelectOffer {
            case_id,
            offer_id: first.id,
            actor: seller.into(),
        })
        .await
        .unwrap();

    let err = service
        .execute(SelectOffer {
            case_id,
            offer_id: second.id,
            actor: seller.into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        select_offer::ExecutionError::AlreadySelected(_),
    ));

    // The stored selection still reflects the first call.
    let snapshot = service
        .execute(query::case::ById::by(case_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.selection.unwrap().offer_id, first.id);
}

#[tokio::test]
async fn archived_override_dominates_later_writes() {
    let (service, _bg, _sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let agent = create_user(&service, "agent", user::Role::Agent).await;
    let admin = create_user(&service, "admin", user::Role::Admin).await;
    let case_id = create_case(&service, seller).await;
    service
        .execute(SubmitCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();

    service
        .execute(ForceCaseStatus {
            case_id,
            status: case::ManualStatus::Archived,
            admin_id: admin,
        })
        .await
        .unwrap();
    assert_eq!(status(&service, case_id).await, case::Status::Archived);

    // Offers can no longer be submitted through the ledger.
    let err = service
        .execute(make_offer(case_id, agent, 3_000_000, 30_000))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        submit_offer::ExecutionError::CaseNotOpenForOffers(_),
    ));

    // Even a stray offer write landing in the store cannot resurrect the
    // case: resolution still observes the terminal override first.
    let stray = Offer {
        id: offer::Id::new(),
        case_id,
        agent_id: agent,
        price: dkk(3_000_000),
        commission: dkk(30_000),
        binding_period: 6,
        marketing: offer::Marketing::default(),
        first_submitted_at: DateTime::now().coerce(),
        submitted_at: DateTime::now().coerce(),
        seller_viewed_at: None,
    };
    service.database().execute(Insert(stray)).await.unwrap();
    assert_eq!(status(&service, case_id).await, case::Status::Archived);
}

#[tokio::test]
async fn withdrawal_notifies_seller_and_engaged_agents() {
    let (service, bg, sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let agent = create_user(&service, "agent", user::Role::Agent).await;
    let case_id = create_case(&service, seller).await;
    service
        .execute(SubmitCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();
    service
        .execute(RegisterAgent {
            case_id,
            agent_id: agent,
            decision: showing::Decision::Registered,
        })
        .await
        .unwrap();

    service
        .execute(WithdrawCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();
    assert_eq!(status(&service, case_id).await, case::Status::Withdrawn);

    drop(service);
    bg.await.unwrap();

    let sent = sink.sent();
    assert!(sent.iter().any(|n| {
        n.kind == Kind::SellerCaseWithdrawn && n.recipient == seller
    }));
    assert!(sent
        .iter()
        .any(|n| n.kind == Kind::AgentCaseClosed && n.recipient == agent));
}

#[tokio::test]
async fn suspiciously_small_commission_warns_but_submits() {
    let (service, _bg, _sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let agent = create_user(&service, "agent", user::Role::Agent).await;
    let case_id = create_case(&service, seller).await;
    service
        .execute(SubmitCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();
    service
        .execute(ScheduleShowing {
            case_id,
            seller_id: seller,
            at: DateTime::now().coerce(),
        })
        .await
        .unwrap();
    service
        .execute(CompleteShowing {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();

    // "2" reads like a percentage, not an absolute commission.
    let output = service
        .execute(make_offer(case_id, agent, 3_000_000, 2))
        .await
        .unwrap();
    assert_eq!(output.warnings.len(), 1);
    assert!(matches!(
        output.warnings[0],
        submit_offer::Warning::CommissionLooksLikePercentage { .. },
    ));

    // The offer still landed in the ledger.
    assert_eq!(
        status(&service, case_id).await,
        case::Status::OffersReceived,
    );
}

#[tokio::test]
async fn impersonation_carries_a_capability_back_to_the_admin() {
    let (service, _bg, _sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let admin = create_user(&service, "admin", user::Role::Admin).await;

    let impersonated = service
        .execute(ImpersonateUser {
            admin_id: admin,
            target_id: seller,
        })
        .await
        .unwrap();
    assert_eq!(impersonated.session.user_id, seller);
    assert_eq!(impersonated.session.impersonator_id, Some(admin));

    let target = service
        .execute(query::user::ById::by(seller))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(impersonated.user.id, target.id);

    // The impersonated token round-trips through ordinary authorization.
    let session = service
        .execute(AuthorizeUserSession {
            token: impersonated.token,
        })
        .await
        .unwrap();
    assert_eq!(session.impersonator_id, Some(admin));

    // Only the back-reference allows returning to the administrator.
    let restored = service
        .execute(ReturnToAdmin { session })
        .await
        .unwrap();
    assert_eq!(restored.session.user_id, admin);
    assert_eq!(restored.session.impersonator_id, None);

    let plain = service
        .execute(CreateUserSession::ByUserId(seller))
        .await
        .unwrap();
    let plain_session = service
        .execute(AuthorizeUserSession { token: plain.token })
        .await
        .unwrap();
    let err = service
        .execute(ReturnToAdmin {
            session: plain_session,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        service::command::return_to_admin::ExecutionError::NotImpersonating,
    ));
}

#[tokio::test]
async fn browsing_open_cases_filters_by_status() {
    let (service, _bg, _sink) = harness();

    let seller = create_user(&service, "seller", user::Role::Seller).await;
    let case_id = create_case(&service, seller).await;

    // A draft is invisible to agents browsing for active cases.
    let active_filter = service::read::case::list::Filter {
        status: Some(case::Status::Active),
        ..service::read::case::list::Filter::default()
    };
    let page = service
        .execute(query::cases::List::by(
            service::read::case::list::Selector {
                arguments: common::pagination::Arguments::new(
                    Some(10_usize),
                    None,
                    None,
                    None,
                    10,
                )
                .unwrap(),
                filter: active_filter.clone(),
            },
        ))
        .await
        .unwrap();
    assert!(page.edges.is_empty());

    service
        .execute(SubmitCase {
            case_id,
            seller_id: seller,
        })
        .await
        .unwrap();

    let page = service
        .execute(query::cases::List::by(
            service::read::case::list::Selector {
                arguments: common::pagination::Arguments::new(
                    Some(10_usize),
                    None,
                    None,
                    None,
                    10,
                )
                .unwrap(),
                filter: active_filter,
            },
        ))
        .await
        .unwrap();
    assert_eq!(page.edges.len(), 1);
    assert_eq!(page.edges[0].node.case.id, case_id);
}

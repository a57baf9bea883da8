//! End-to-end dispatcher behavior: authorization, lifecycle enforcement,
//! the protocol trail and notification fan-out.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use transdoc_dispatch::Dispatcher;
use transdoc_model::{
    address, insurance, patient, protocol_entry, service_provider, transport_details,
    transport_document, user, Command, DomainError, Notification, Patient, Response,
    TransportDetails, TransportDocument, User,
};
use transdoc_storage::MemDirectory;
use transdoc_types::{
    DocumentStatus, EntityKind, Id, OperationKind, Reference, TransportReason, TransportationType,
    UserRole,
};

fn dispatcher() -> Dispatcher {
    Dispatcher::in_memory(MemDirectory::new())
}

/// A session user that exists only in the session, which is all the
/// permission check needs.
fn session(role: UserRole) -> User {
    User {
        id: Id::generate(),
        last_name: "Muster".to_string(),
        first_name: "Max".to_string(),
        address: Reference::to_value("addr-session"),
        service_provider: Reference::to_value("prov-session"),
        role,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_address_cmd(city: &str) -> Command {
    Command::Address(address::Command::Create {
        name: None,
        street_name: "Hauptstraße".to_string(),
        house_number: "1".to_string(),
        country: "DE".to_string(),
        post_code: "50667".to_string(),
        city: city.to_string(),
    })
}

async fn seed_address(d: &Dispatcher, su: &User, city: &str) -> transdoc_model::Address {
    match d.dispatch(Some(su), create_address_cmd(city)).await {
        Ok(Response::Address(a)) => a,
        other => panic!("address create failed: {other:?}"),
    }
}

async fn seed_patient(d: &Dispatcher, su: &User, insurance_number: &str) -> Patient {
    let addr = seed_address(d, su, "Köln").await;
    let ins = d
        .dispatch(
            Some(su),
            Command::Insurance(insurance::Command::Create {
                insurance_id: format!("ins-{insurance_number}"),
                name: "Gesund AG".to_string(),
                address: Reference::to(addr.id.clone()),
            }),
        )
        .await;
    let ins = match ins {
        Ok(Response::Insurance(i)) => i,
        other => panic!("insurance create failed: {other:?}"),
    };
    let created = d
        .dispatch(
            Some(su),
            Command::Patient(patient::Command::CreateWithInsuranceData {
                insurance_number: insurance_number.to_string(),
                insurance: Reference::to(ins.id),
                insurance_status: 1,
                last_name: "Schmidt".to_string(),
                first_name: "Anna".to_string(),
                birth_date: date(1960, 4, 2),
                address: Reference::to(addr.id),
            }),
        )
        .await;
    match created {
        Ok(Response::Patient(p)) => p,
        other => panic!("patient create failed: {other:?}"),
    }
}

async fn seed_provider(
    d: &Dispatcher,
    su: &User,
    id: &str,
    healthcare: bool,
    transport: bool,
) -> transdoc_model::ServiceProvider {
    let addr = seed_address(d, su, "Bonn").await;
    let created = d
        .dispatch(
            Some(su),
            Command::ServiceProvider(service_provider::Command::Create {
                service_provider_id: id.to_string(),
                name: "Klinikum".to_string(),
                provider_type: "hospital".to_string(),
                is_healthcare_provider: healthcare,
                is_transport_provider: transport,
                address: Reference::to(addr.id),
                contact_info: None,
            }),
        )
        .await;
    match created {
        Ok(Response::ServiceProvider(p)) => p,
        other => panic!("provider create failed: {other:?}"),
    }
}

/// Creates a draft document prescribed by `su` at a fresh healthcare
/// provider.
async fn seed_document(d: &Dispatcher, su: &User, provider_id: &str) -> TransportDocument {
    let provider = seed_provider(d, su, provider_id, true, false).await;
    let created = d
        .dispatch(
            Some(su),
            Command::TransportDocument(transport_document::Command::Create {
                patient: None,
                insurance_data: None,
                transport_reason: TransportReason::AmbulantTaxi,
                start_date: date(2026, 2, 1),
                end_date: None,
                weekly_frequency: Some(2),
                healthcare_service_provider: Reference::to(provider.id),
                transportation_type: TransportationType::Taxi,
                additional_info: None,
                signature: Reference::to(su.id.clone()),
            }),
        )
        .await;
    match created {
        Ok(Response::TransportDocument(doc)) => doc,
        other => panic!("document create failed: {other:?}"),
    }
}

async fn assign_patient(
    d: &Dispatcher,
    su: &User,
    doc: &TransportDocument,
    patient: &Patient,
) -> TransportDocument {
    let assigned = d
        .dispatch(
            Some(su),
            Command::TransportDocument(transport_document::Command::AssignPatient {
                id: doc.id.clone(),
                patient: Reference::to(patient.insurance_number.clone()),
                insurance_data: patient.insurance_data.clone(),
            }),
        )
        .await;
    match assigned {
        Ok(Response::TransportDocument(doc)) => doc,
        other => panic!("assign patient failed: {other:?}"),
    }
}

async fn seed_leg(d: &Dispatcher, su: &User, doc: &TransportDocument) -> TransportDetails {
    let created = d
        .dispatch(
            Some(su),
            Command::TransportDetails(transport_details::Command::Create {
                transport_document: Reference::to(doc.id.clone()),
                transport_date: date(2026, 2, 3),
            }),
        )
        .await;
    match created {
        Ok(Response::TransportDetails(leg)) => leg,
        other => panic!("details create failed: {other:?}"),
    }
}

async fn sign_leg(d: &Dispatcher, su: &User, leg: &TransportDetails) {
    let patient_signed = d
        .dispatch(
            Some(su),
            Command::TransportDetails(transport_details::Command::UpdatePatientSignature {
                id: leg.id.clone(),
                patient_signature: "A. Schmidt".to_string(),
                patient_signature_date: date(2026, 2, 3),
            }),
        )
        .await;
    assert!(patient_signed.is_ok(), "{patient_signed:?}");
    let transporter_signed = d
        .dispatch(
            Some(su),
            Command::TransportDetails(transport_details::Command::UpdateTransporterSignature {
                id: leg.id.clone(),
                transporter_signature: "B. Fahrer".to_string(),
                transporter_signature_date: date(2026, 2, 3),
            }),
        )
        .await;
    assert!(transporter_signed.is_ok(), "{transporter_signed:?}");
}

/// Drives a fresh document all the way to `Signed` and returns it.
async fn seed_signed_document(d: &Dispatcher, su: &User, tag: &str) -> TransportDocument {
    let doc = seed_document(d, su, &format!("hc-{tag}")).await;
    let patient = seed_patient(d, su, &format!("K{tag}")).await;
    let doc = assign_patient(d, su, &doc, &patient).await;
    let leg = seed_leg(d, su, &doc).await;
    let transporter = seed_provider(d, su, &format!("tp-{tag}"), false, true).await;
    let assigned = d
        .dispatch(
            Some(su),
            Command::TransportDetails(transport_details::Command::AssignTransportProvider {
                id: leg.id.clone(),
                transport_provider: Reference::to(transporter.id),
            }),
        )
        .await;
    assert!(assigned.is_ok(), "{assigned:?}");
    sign_leg(d, su, &leg).await;
    match d
        .dispatch(
            Some(su),
            Command::TransportDocument(transport_document::Command::Get { id: doc.id.clone() }),
        )
        .await
    {
        Ok(Response::TransportDocument(doc)) => doc,
        other => panic!("document get failed: {other:?}"),
    }
}

// ── Sessions and authorization ──────────────────────────────────────────

#[tokio::test]
async fn commands_require_a_session_user() {
    let d = dispatcher();
    let result = d.dispatch(None, create_address_cmd("Köln")).await;
    assert_eq!(result, Err(DomainError::UserNotProvided));
}

#[tokio::test]
async fn denied_roles_get_a_typed_rejection() {
    let d = dispatcher();
    let transport_user = session(UserRole::TransportUser);
    let result = d
        .dispatch(
            Some(&transport_user),
            Command::TransportDocument(transport_document::Command::Delete {
                id: Id::generate(),
            }),
        )
        .await;
    assert_eq!(
        result,
        Err(DomainError::UserNotAllowed {
            entity: EntityKind::TransportDocument,
            operation: OperationKind::Delete,
        })
    );
}

#[tokio::test]
async fn every_role_may_read() {
    let d = dispatcher();
    for role in UserRole::ALL {
        let user = session(role);
        let result = d
            .dispatch(
                Some(&user),
                Command::Patient(patient::Command::GetList {
                    filter: patient::Filter::default(),
                }),
            )
            .await;
        assert_eq!(result, Ok(Response::PatientList(Vec::new())), "{role}");
    }
}

#[tokio::test]
async fn login_does_not_reveal_user_names() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let addr = seed_address(&d, &su, "Köln").await;
    let provider = seed_provider(&d, &su, "hc-login", true, false).await;
    let created = d
        .dispatch(
            Some(&su),
            Command::User(user::Command::Create {
                user_name: "anna".to_string(),
                password: "correct horse".to_string(),
                last_name: "Schmidt".to_string(),
                first_name: "Anna".to_string(),
                address: Reference::to(addr.id),
                service_provider: Reference::to(provider.id),
                role: UserRole::HealthcareUser,
            }),
        )
        .await;
    assert!(created.is_ok(), "{created:?}");

    let wrong_password = d
        .dispatch(
            None,
            Command::User(user::Command::LoginUser {
                user_name: "anna".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await;
    let unknown_name = d
        .dispatch(
            None,
            Command::User(user::Command::LoginUser {
                user_name: "nobody".to_string(),
                password: "wrong".to_string(),
            }),
        )
        .await;
    assert_eq!(wrong_password, Err(DomainError::WrongCredentials));
    assert_eq!(unknown_name, wrong_password);
}

#[tokio::test]
async fn duplicate_user_name_is_rejected_atomically() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let addr = seed_address(&d, &su, "Köln").await;
    let provider = seed_provider(&d, &su, "hc-dup", true, false).await;
    let create = |last_name: &str| {
        Command::User(user::Command::Create {
            user_name: "anna".to_string(),
            password: "pw".to_string(),
            last_name: last_name.to_string(),
            first_name: "Anna".to_string(),
            address: Reference::to(addr.id.clone()),
            service_provider: Reference::to(provider.id.clone()),
            role: UserRole::HealthcareUser,
        })
    };
    assert!(d.dispatch(Some(&su), create("First")).await.is_ok());

    let second = d.dispatch(Some(&su), create("Second")).await;
    assert_eq!(
        second,
        Err(DomainError::UserNameAlreadyUsed {
            user_name: "anna".to_string()
        })
    );
    // The rejected create left no second user record behind.
    let users = d
        .dispatch(
            Some(&su),
            Command::User(user::Command::GetList {
                filter: user::Filter {
                    first_name: Some("Anna".to_string()),
                    ..Default::default()
                },
            }),
        )
        .await;
    match users {
        Ok(Response::UserList(list)) => assert_eq!(list.len(), 1),
        other => panic!("user list failed: {other:?}"),
    }
}

#[tokio::test]
async fn registration_bootstrap_then_login() {
    let d = dispatcher();
    let registered = d
        .dispatch(
            None,
            Command::User(user::Command::CreateFull {
                user_name: "admin".to_string(),
                password: "first run".to_string(),
                last_name: "Root".to_string(),
                first_name: "Rita".to_string(),
                address: address::NewAddress {
                    name: None,
                    street_name: "Domkloster".to_string(),
                    house_number: "4".to_string(),
                    country: "DE".to_string(),
                    post_code: "50667".to_string(),
                    city: "Köln".to_string(),
                },
                service_provider: service_provider::NewServiceProvider {
                    service_provider_id: "hc-root".to_string(),
                    name: "Klinikum".to_string(),
                    provider_type: "hospital".to_string(),
                    is_healthcare_provider: true,
                    is_transport_provider: false,
                    address: address::NewAddress {
                        name: Some("Klinikum".to_string()),
                        street_name: "Kerpener Straße".to_string(),
                        house_number: "62".to_string(),
                        country: "DE".to_string(),
                        post_code: "50937".to_string(),
                        city: "Köln".to_string(),
                    },
                    contact_info: None,
                },
                role: UserRole::SuperUser,
            }),
        )
        .await;
    let registered = match registered {
        Ok(Response::User(u)) => u,
        other => panic!("registration failed: {other:?}"),
    };
    assert_eq!(registered.role, UserRole::SuperUser);

    let logged_in = d
        .dispatch(
            None,
            Command::User(user::Command::LoginUser {
                user_name: "admin".to_string(),
                password: "first run".to_string(),
            }),
        )
        .await;
    assert_eq!(logged_in, Ok(Response::User(registered)));
}

#[tokio::test]
async fn update_credentials_needs_the_old_pair() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let addr = seed_address(&d, &su, "Köln").await;
    let provider = seed_provider(&d, &su, "hc-cred", true, false).await;
    let created = d
        .dispatch(
            Some(&su),
            Command::User(user::Command::Create {
                user_name: "anna".to_string(),
                password: "old pw".to_string(),
                last_name: "Schmidt".to_string(),
                first_name: "Anna".to_string(),
                address: Reference::to(addr.id),
                service_provider: Reference::to(provider.id),
                role: UserRole::HealthcareUser,
            }),
        )
        .await;
    assert!(created.is_ok(), "{created:?}");

    let wrong_old = d
        .dispatch(
            Some(&su),
            Command::User(user::Command::UpdateCredentials {
                old_user_name: "anna".to_string(),
                new_user_name: "anna".to_string(),
                old_password: "not the old pw".to_string(),
                new_password: "new pw".to_string(),
            }),
        )
        .await;
    assert_eq!(wrong_old, Err(DomainError::WrongCredentials));

    let changed = d
        .dispatch(
            Some(&su),
            Command::User(user::Command::UpdateCredentials {
                old_user_name: "anna".to_string(),
                new_user_name: "anna.schmidt".to_string(),
                old_password: "old pw".to_string(),
                new_password: "new pw".to_string(),
            }),
        )
        .await;
    assert_eq!(changed, Ok(Response::Acknowledged));

    let login = d
        .dispatch(
            None,
            Command::User(user::Command::LoginUser {
                user_name: "anna.schmidt".to_string(),
                password: "new pw".to_string(),
            }),
        )
        .await;
    assert!(login.is_ok(), "{login:?}");
}

// ── Reads ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_fails_with_typed_not_found() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let id: Id<TransportDocument> = Id::new("does-not-exist");
    let result = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Get { id: id.clone() }),
        )
        .await;
    assert_eq!(
        result,
        Err(DomainError::TransportDocumentNotFound {
            id: "does-not-exist".to_string()
        })
    );
}

#[tokio::test]
async fn get_list_applies_the_filter() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    seed_address(&d, &su, "Köln").await;
    seed_address(&d, &su, "Bonn").await;

    let matching = d
        .dispatch(
            Some(&su),
            Command::Address(address::Command::GetList {
                filter: address::Filter {
                    city: Some("köln".to_string()),
                    ..Default::default()
                },
            }),
        )
        .await;
    match matching {
        Ok(Response::AddressList(list)) => {
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].city, "Köln");
        }
        other => panic!("list failed: {other:?}"),
    }

    let none = d
        .dispatch(
            Some(&su),
            Command::Address(address::Command::GetList {
                filter: address::Filter {
                    city: Some("Hamburg".to_string()),
                    ..Default::default()
                },
            }),
        )
        .await;
    assert_eq!(none, Ok(Response::AddressList(Vec::new())));
}

#[tokio::test]
async fn get_list_by_id_list_fails_on_first_missing_id() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_document(&d, &su, "hc-ids").await;
    let leg = seed_leg(&d, &su, &doc).await;

    let result = d
        .dispatch(
            Some(&su),
            Command::TransportDetails(transport_details::Command::GetListByIdList {
                ids: vec![leg.id.clone(), Id::new("missing-leg")],
            }),
        )
        .await;
    assert_eq!(
        result,
        Err(DomainError::TransportDetailsNotFound {
            id: "missing-leg".to_string()
        })
    );
}

// ── Document lifecycle ──────────────────────────────────────────────────

#[tokio::test]
async fn assign_patient_advances_a_draft() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_document(&d, &su, "hc-draft").await;
    assert_eq!(doc.status, DocumentStatus::Draft);

    let patient = seed_patient(&d, &su, "K100").await;
    let assigned = assign_patient(&d, &su, &doc, &patient).await;
    assert_eq!(assigned.status, DocumentStatus::AssignedPatient);
    assert_eq!(
        assigned.patient,
        Some(Reference::to(patient.insurance_number))
    );
}

#[tokio::test]
async fn assigning_a_transport_provider_advances_the_document() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_document(&d, &su, "hc-adv").await;
    let patient = seed_patient(&d, &su, "K101").await;
    let doc = assign_patient(&d, &su, &doc, &patient).await;
    let leg = seed_leg(&d, &su, &doc).await;
    let transporter = seed_provider(&d, &su, "tp-adv", false, true).await;

    let assigned = d
        .dispatch(
            Some(&su),
            Command::TransportDetails(transport_details::Command::AssignTransportProvider {
                id: leg.id,
                transport_provider: Reference::to(transporter.id),
            }),
        )
        .await;
    assert!(assigned.is_ok(), "{assigned:?}");

    let doc = match d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Get { id: doc.id }),
        )
        .await
    {
        Ok(Response::TransportDocument(doc)) => doc,
        other => panic!("get failed: {other:?}"),
    };
    assert_eq!(doc.status, DocumentStatus::AssignedProvider);
}

#[tokio::test]
async fn only_transport_providers_may_be_assigned() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_document(&d, &su, "hc-wrongtp").await;
    let patient = seed_patient(&d, &su, "K102").await;
    let doc = assign_patient(&d, &su, &doc, &patient).await;
    let leg = seed_leg(&d, &su, &doc).await;
    // A healthcare-only provider cannot run the transport.
    let not_a_transporter = seed_provider(&d, &su, "hc-wrongtp-2", true, false).await;

    let result = d
        .dispatch(
            Some(&su),
            Command::TransportDetails(transport_details::Command::AssignTransportProvider {
                id: leg.id,
                transport_provider: Reference::to(not_a_transporter.id),
            }),
        )
        .await;
    assert!(
        matches!(result, Err(DomainError::IllegalProcess(_))),
        "{result:?}"
    );
}

#[tokio::test]
async fn full_signatures_move_the_document_to_signed() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_signed_document(&d, &su, "signed").await;
    assert_eq!(doc.status, DocumentStatus::Signed);
}

#[tokio::test]
async fn archive_requires_assignments_and_signatures() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_document(&d, &su, "hc-early").await;

    // Draft document: no patient yet.
    let result = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Archive {
                id: doc.id.clone(),
            }),
        )
        .await;
    assert!(
        matches!(result, Err(DomainError::IsNotArchivable { .. })),
        "{result:?}"
    );

    // Patient assigned but the leg is unsigned.
    let patient = seed_patient(&d, &su, "K103").await;
    let doc = assign_patient(&d, &su, &doc, &patient).await;
    seed_leg(&d, &su, &doc).await;
    let result = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Archive { id: doc.id }),
        )
        .await;
    assert!(
        matches!(result, Err(DomainError::IsNotArchivable { .. })),
        "{result:?}"
    );
}

#[tokio::test]
async fn archived_documents_reject_every_mutation() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_signed_document(&d, &su, "arch").await;
    let archived = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Archive {
                id: doc.id.clone(),
            }),
        )
        .await;
    match archived {
        Ok(Response::TransportDocument(doc)) => {
            assert_eq!(doc.status, DocumentStatus::Archived)
        }
        other => panic!("archive failed: {other:?}"),
    }

    let is_archived = Err(DomainError::IsArchived {
        id: doc.id.to_string(),
    });

    // A second archive is a mutation on an archived document too.
    let again = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Archive {
                id: doc.id.clone(),
            }),
        )
        .await;
    assert_eq!(again, is_archived);

    let update = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Update {
                id: doc.id.clone(),
                transport_reason: doc.transport_reason,
                start_date: doc.start_date,
                end_date: doc.end_date,
                weekly_frequency: doc.weekly_frequency,
                healthcare_service_provider: doc.healthcare_service_provider.clone(),
                transportation_type: doc.transportation_type,
                additional_info: Some("too late".to_string()),
                signature: doc.signature.clone(),
            }),
        )
        .await;
    assert_eq!(update, is_archived);

    // Legs of an archived document are frozen as well.
    let legs = match d
        .dispatch(
            Some(&su),
            Command::TransportDetails(transport_details::Command::GetList {
                filter: transport_details::Filter {
                    transport_document: Some(Reference::to(doc.id.clone())),
                    ..Default::default()
                },
            }),
        )
        .await
    {
        Ok(Response::TransportDetailsList(legs)) => legs,
        other => panic!("leg list failed: {other:?}"),
    };
    let leg_update = d
        .dispatch(
            Some(&su),
            Command::TransportDetails(transport_details::Command::Update {
                id: legs[0].id.clone(),
                start_address: None,
                end_address: None,
                direction: None,
                patient_condition: None,
                tour_number: Some("T-9".to_string()),
                payment_exemption: None,
            }),
        )
        .await;
    assert_eq!(leg_update, is_archived);

    let delete = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Delete { id: doc.id }),
        )
        .await;
    assert_eq!(delete, is_archived);

    // Reads still work.
    let get = d
        .dispatch(
            Some(&su),
            Command::TransportDetails(transport_details::Command::Get {
                id: legs[0].id.clone(),
            }),
        )
        .await;
    assert!(get.is_ok(), "{get:?}");
}

#[tokio::test]
async fn racing_update_and_archive_leaves_a_consistent_document() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_signed_document(&d, &su, "race").await;

    let update = d.dispatch(
        Some(&su),
        Command::TransportDocument(transport_document::Command::Update {
            id: doc.id.clone(),
            transport_reason: doc.transport_reason,
            start_date: doc.start_date,
            end_date: doc.end_date,
            weekly_frequency: doc.weekly_frequency,
            healthcare_service_provider: doc.healthcare_service_provider.clone(),
            transportation_type: doc.transportation_type,
            additional_info: Some("raced".to_string()),
            signature: doc.signature.clone(),
        }),
    );
    let archive = d.dispatch(
        Some(&su),
        Command::TransportDocument(transport_document::Command::Archive {
            id: doc.id.clone(),
        }),
    );
    let (update, archive) = tokio::join!(update, archive);

    // Each command either applied cleanly or failed with a typed error;
    // either way the stored document is one of the two outcomes, not a
    // blend.
    for result in [&update, &archive] {
        match result {
            Ok(_)
            | Err(DomainError::Processing(_))
            | Err(DomainError::IsArchived { .. }) => {}
            other => panic!("unexpected race outcome: {other:?}"),
        }
    }
    let stored = match d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Get { id: doc.id }),
        )
        .await
    {
        Ok(Response::TransportDocument(doc)) => doc,
        other => panic!("get failed: {other:?}"),
    };
    if archive.is_ok() {
        assert_eq!(stored.status, DocumentStatus::Archived);
    }
    if stored.additional_info.as_deref() == Some("raced") {
        assert!(update.is_ok());
    }
}

// ── Protocol trail and notifications ────────────────────────────────────

#[tokio::test]
async fn mutations_land_in_the_protocol_trail() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let addr = seed_address(&d, &su, "Köln").await;

    let entries = match d
        .dispatch(
            Some(&su),
            Command::ProtocolEntry(protocol_entry::Command::GetList {
                filter: protocol_entry::Filter::default(),
            }),
        )
        .await
    {
        Ok(Response::ProtocolEntryList(entries)) => entries,
        other => panic!("protocol list failed: {other:?}"),
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].actor, Reference::to(su.id.clone()));
    assert_eq!(entries[0].entity, EntityKind::Address);
    assert_eq!(entries[0].entity_id, addr.id.to_string());
    assert_eq!(entries[0].action, OperationKind::Create);
}

#[tokio::test]
async fn reads_leave_no_protocol_trace() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    seed_address(&d, &su, "Köln").await;
    let before = match d
        .dispatch(
            Some(&su),
            Command::ProtocolEntry(protocol_entry::Command::GetList {
                filter: protocol_entry::Filter::default(),
            }),
        )
        .await
    {
        Ok(Response::ProtocolEntryList(entries)) => entries.len(),
        other => panic!("protocol list failed: {other:?}"),
    };

    let _ = d
        .dispatch(
            Some(&su),
            Command::Address(address::Command::GetList {
                filter: address::Filter::default(),
            }),
        )
        .await;

    let after = match d
        .dispatch(
            Some(&su),
            Command::ProtocolEntry(protocol_entry::Command::GetList {
                filter: protocol_entry::Filter::default(),
            }),
        )
        .await
    {
        Ok(Response::ProtocolEntryList(entries)) => entries.len(),
        other => panic!("protocol list failed: {other:?}"),
    };
    assert_eq!(before, after);
}

#[tokio::test]
async fn notifications_fan_out_to_subscribers() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let mut notifications = d.subscribe();

    let addr = seed_address(&d, &su, "Köln").await;
    let event = notifications.recv().await.unwrap();
    assert_eq!(
        event,
        Notification::EntityCreated {
            entity: EntityKind::Address,
            id: addr.id.to_string(),
        }
    );
}

#[tokio::test]
async fn archiving_pushes_a_dedicated_notification() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let doc = seed_signed_document(&d, &su, "notif").await;
    let mut notifications = d.subscribe();

    let archived = d
        .dispatch(
            Some(&su),
            Command::TransportDocument(transport_document::Command::Archive {
                id: doc.id.clone(),
            }),
        )
        .await;
    assert!(archived.is_ok(), "{archived:?}");

    let event = notifications.recv().await.unwrap();
    assert_eq!(
        event,
        Notification::DocumentArchived {
            id: doc.id.to_string(),
        }
    );
}

// ── Rejected commands leave no partial effects ──────────────────────────

#[tokio::test]
async fn create_with_insurance_data_is_atomic() {
    let d = dispatcher();
    let su = session(UserRole::SuperUser);
    let patient = seed_patient(&d, &su, "K200").await;

    // Same insurance number again: the patient create fails and the
    // freshly created insurance data record is unwound.
    let addr = seed_address(&d, &su, "Köln").await;
    let data_before = match d
        .dispatch(
            Some(&su),
            Command::InsuranceData(transdoc_model::insurance_data::Command::GetList {
                filter: Default::default(),
            }),
        )
        .await
    {
        Ok(Response::InsuranceDataList(list)) => list.len(),
        other => panic!("data list failed: {other:?}"),
    };

    let ins = match d
        .dispatch(
            Some(&su),
            Command::Insurance(insurance::Command::GetList {
                filter: insurance::Filter::default(),
            }),
        )
        .await
    {
        Ok(Response::InsuranceList(list)) => list[0].clone(),
        other => panic!("insurance list failed: {other:?}"),
    };
    let duplicate = d
        .dispatch(
            Some(&su),
            Command::Patient(patient::Command::CreateWithInsuranceData {
                insurance_number: patient.insurance_number.to_string(),
                insurance: Reference::to(ins.id),
                insurance_status: 3,
                last_name: "Doppel".to_string(),
                first_name: "Dora".to_string(),
                birth_date: date(1970, 7, 7),
                address: Reference::to(addr.id),
            }),
        )
        .await;
    assert!(
        matches!(duplicate, Err(DomainError::IllegalProcess(_))),
        "{duplicate:?}"
    );

    let data_after = match d
        .dispatch(
            Some(&su),
            Command::InsuranceData(transdoc_model::insurance_data::Command::GetList {
                filter: Default::default(),
            }),
        )
        .await
    {
        Ok(Response::InsuranceDataList(list)) => list.len(),
        other => panic!("data list failed: {other:?}"),
    };
    assert_eq!(data_before, data_after);
}

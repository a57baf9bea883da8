//! Role capability table.
//!
//! Authorization is a flat table `role -> allowed (entity, operation)`
//! consulted before any command executes, not an inheritance hierarchy.
//! Every role carries the baseline grants (reads, login, self-service
//! operations); the per-role arms below add the mutations.

use transdoc_types::{EntityKind, OperationKind, UserRole};

/// Whether `role` may execute `operation` on `entity`.
pub fn is_allowed(role: UserRole, entity: EntityKind, operation: OperationKind) -> bool {
    baseline(entity, operation) || granted(role, entity, operation)
}

/// Grants every role holds: all reads, login, credential self-service,
/// user profile updates and address creation.
fn baseline(entity: EntityKind, operation: OperationKind) -> bool {
    use EntityKind as E;
    use OperationKind as O;
    matches!(
        operation,
        O::Get | O::GetList | O::GetListByIdList | O::Login
    ) || matches!(
        (entity, operation),
        (E::Address, O::Create) | (E::User, O::Update) | (E::User, O::UpdateCredentials)
    )
}

fn granted(role: UserRole, entity: EntityKind, operation: OperationKind) -> bool {
    use EntityKind as E;
    use OperationKind as O;
    match role {
        UserRole::SuperUser => true,

        UserRole::HealthcareAdmin => matches!(
            (entity, operation),
            (E::Address, O::Update)
                | (E::ServiceProvider, O::CreateFull)
                | (E::ServiceProvider, O::Move)
                | (E::ServiceProvider, O::Update)
                | (E::ServiceProvider, O::UpdateService)
                | (E::User, O::Create)
                | (E::User, O::Delete)
                | (E::User, O::UpdateRole)
        ),

        UserRole::HealthcareDoctor | UserRole::HealthcareUser => matches!(
            (entity, operation),
            (E::Insurance, O::Create)
                | (E::Insurance, O::Update)
                | (E::Insurance, O::Move)
                | (E::InsuranceData, O::Create)
                | (E::TransportDetails, O::Create)
                | (E::TransportDocument, O::AssignPatient)
                | (E::TransportDocument, O::Create)
                | (E::TransportDocument, O::Delete)
                | (E::TransportDocument, O::Update)
        ),

        UserRole::TransportAdmin => matches!(
            (entity, operation),
            (E::Address, O::Update)
                | (E::ServiceProvider, O::Move)
                | (E::ServiceProvider, O::Update)
                | (E::ServiceProvider, O::UpdateService)
                | (E::User, O::Create)
                | (E::User, O::Delete)
                | (E::User, O::UpdateRole)
        ),

        UserRole::TransportDoctor => matches!(
            (entity, operation),
            (E::Insurance, O::Create)
                | (E::Insurance, O::Update)
                | (E::Insurance, O::Move)
                | (E::InsuranceData, O::Create)
                | (E::TransportDetails, O::AssignTransportProvider)
                | (E::TransportDetails, O::Create)
                | (E::TransportDetails, O::Delete)
                | (E::TransportDetails, O::Update)
                | (E::TransportDetails, O::UpdatePatientSignature)
                | (E::TransportDetails, O::UpdateTransporterSignature)
                | (E::TransportDocument, O::AssignPatient)
                | (E::TransportDocument, O::Create)
                | (E::TransportDocument, O::Delete)
                | (E::TransportDocument, O::Update)
        ),

        UserRole::TransportInvoice => matches!(
            (entity, operation),
            (E::TransportDetails, O::AssignTransportProvider)
                | (E::TransportDetails, O::Delete)
                | (E::TransportDetails, O::Update)
                | (E::TransportDetails, O::UpdatePatientSignature)
                | (E::TransportDetails, O::UpdateTransporterSignature)
                | (E::Invoice, O::Create)
                | (E::Invoice, O::Settle)
                | (E::Invoice, O::Delete)
        ),

        UserRole::TransportUser => matches!(
            (entity, operation),
            (E::TransportDetails, O::AssignTransportProvider)
                | (E::TransportDetails, O::Delete)
                | (E::TransportDetails, O::Update)
                | (E::TransportDetails, O::UpdatePatientSignature)
                | (E::TransportDetails, O::UpdateTransporterSignature)
        ),

        UserRole::InsuranceAdmin => matches!(
            (entity, operation),
            (E::Address, O::Update)
                | (E::Insurance, O::Update)
                | (E::Insurance, O::Move)
                | (E::User, O::Create)
                | (E::User, O::Delete)
                | (E::User, O::UpdateRole)
        ),

        UserRole::InsuranceUser => matches!(
            (entity, operation),
            (E::InsuranceData, O::Create)
                | (E::Patient, O::Create)
                | (E::Patient, O::CreateWithInsuranceData)
                | (E::Patient, O::Move)
                | (E::Patient, O::Update)
                | (E::Patient, O::UpdateInsuranceData)
                | (E::TransportDocument, O::Archive)
        ),
    }
}

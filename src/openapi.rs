use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HomeRent API",
        version = "1.0.0",
        description = "Backend API for HomeRent - properties, tenants, rent and complaints for small owners",
        contact(
            name = "HomeRent Team"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "session", description = "Simulated login as owner or tenant"),
        (name = "properties", description = "Properties, occupancy and rent generation"),
        (name = "payments", description = "Rent payments and reminders"),
        (name = "complaints", description = "Tenant complaints"),
        (name = "tenants", description = "Registered tenants"),
        (name = "dashboard", description = "Owner and tenant overviews")
    ),
    paths(
        // Session
        crate::api::session::get_session,
        crate::api::session::login,
        crate::api::session::logout,
        // Properties
        crate::api::properties::list_properties,
        crate::api::properties::create_property,
        crate::api::properties::list_available,
        crate::api::properties::get_property,
        crate::api::properties::add_tenant,
        crate::api::properties::remove_tenant,
        crate::api::properties::rent_property,
        crate::api::properties::generate_monthly_rent,
        // Payments
        crate::api::payments::list_payments,
        crate::api::payments::pay_rent,
        crate::api::payments::send_reminder,
        // Complaints
        crate::api::complaints::list_complaints,
        crate::api::complaints::raise_complaint,
        crate::api::complaints::update_status,
        crate::api::complaints::advance_status,
        // Tenants
        crate::api::tenants::list_tenants,
        // Dashboard
        crate::api::dashboard::owner_dashboard,
        crate::api::dashboard::tenant_dashboard,
    ),
    components(
        schemas(
            // Session
            crate::models::User,
            crate::models::UserRole,
            crate::models::LoginRequest,
            crate::api::session::SessionResponse,
            // Properties
            crate::models::Property,
            crate::models::PropertyType,
            crate::models::CreatePropertyRequest,
            crate::models::AddTenantRequest,
            crate::api::properties::AddTenantResponse,
            crate::api::properties::RentPropertyResponse,
            // Payments
            crate::models::Payment,
            crate::models::PaymentStatus,
            crate::models::PaymentType,
            crate::api::payments::ReminderResponse,
            // Complaints
            crate::models::Complaint,
            crate::models::ComplaintStatus,
            crate::models::RaiseComplaintRequest,
            crate::models::UpdateComplaintStatusRequest,
            // Dashboard
            crate::models::OwnerDashboard,
            crate::models::PendingPaymentView,
            crate::models::PropertyOverview,
            crate::models::TenantDashboard,
        )
    )
)]
pub struct ApiDoc;
